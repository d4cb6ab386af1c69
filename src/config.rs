//! Configuration loader: credentials and host for one Web-KM200 device.
//!
//! The file is YAML with three required fields:
//!
//! ```yaml
//! gateway_password: "NeUC-syQM-LVYq-KJec"   # from the sticker on the device
//! private_password: "..."                   # set by the owner in the vendor app
//! host: 192.168.1.30
//! ```
//!
//! `port` and `timeout_secs` are optional overrides.

use core::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors from the configuration loader.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config file unreadable: {0}")]
    Io(String),

    /// Config file is not valid YAML or is missing a required field.
    #[error("config parse failed: {0}")]
    Parse(String),

    /// No config file exists at any of the default locations.
    #[error("no config file found (tried {0})")]
    NotFound(String),
}

/// Credentials and connection settings for one gateway.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Device password printed on the sticker on the Web-KM200.
    pub gateway_password: String,
    /// Password set by the owner in the vendor's smartphone app.
    pub private_password: String,
    /// IP address or host name of the gateway.
    pub host: String,
    /// HTTP port, default 80.
    #[serde(default)]
    pub port: Option<u16>,
    /// Request timeout in seconds, default 10.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        serde_yaml::from_str(&raw)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }

    /// Load configuration, falling back to the default locations.
    ///
    /// An explicit `path` wins. Otherwise `~/.km200.yml` is tried first,
    /// then `/etc/km200.yml`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let candidates = default_locations();
        for candidate in &candidates {
            if candidate.exists() {
                return Self::load_from(candidate);
            }
        }

        Err(ConfigError::NotFound(
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gateway_password", &"<secret>")
            .field("private_password", &"<secret>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::with_capacity(2);
    if let Some(home) = std::env::var_os("HOME") {
        locations.push(PathBuf::from(home).join(".km200.yml"));
    }
    locations.push(PathBuf::from("/etc/km200.yml"));
    locations
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn loads_all_fields() {
        let file = write_config(
            "gateway_password: NeUCsyQMLVYqKJec\n\
             private_password: HnE75f+a%aXP\n\
             host: 192.168.1.30\n\
             port: 8080\n\
             timeout_secs: 3\n",
        );

        let config = Config::load_from(file.path()).expect("load");
        assert_eq!(config.gateway_password, "NeUCsyQMLVYqKJec");
        assert_eq!(config.private_password, "HnE75f+a%aXP");
        assert_eq!(config.host, "192.168.1.30");
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.timeout_secs, Some(3));
    }

    #[test]
    fn optional_fields_default_to_none() {
        let file = write_config(
            "gateway_password: a\nprivate_password: b\nhost: boiler.local\n",
        );

        let config = Config::load_from(file.path()).expect("load");
        assert_eq!(config.port, None);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let file = write_config("gateway_password: a\nhost: boiler.local\n");

        let err = Config::load_from(file.path()).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ConfigError::Parse(_)), "{message}");
        assert!(message.contains("private_password"), "{message}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load(Some(Path::new("/nonexistent/km200.yml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn explicit_path_wins_over_defaults() {
        let file = write_config(
            "gateway_password: a\nprivate_password: b\nhost: explicit.local\n",
        );

        let config = Config::load(Some(file.path())).expect("load");
        assert_eq!(config.host, "explicit.local");
    }

    #[test]
    fn debug_masks_passwords() {
        let file = write_config(
            "gateway_password: topsecret\nprivate_password: alsosecret\nhost: boiler.local\n",
        );

        let config = Config::load_from(file.path()).expect("load");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("alsosecret"));
        assert!(rendered.contains("boiler.local"));
    }
}
