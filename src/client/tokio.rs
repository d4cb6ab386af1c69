use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::client::core::ClientCore;
use crate::config::Config;
use crate::crypto::{Key, SecretBytes};
use crate::error::{Error, Result};
use crate::transport::tokio::HttpTransport;
use crate::transport::{AsyncTransport, DEFAULT_USER_AGENT};
use crate::types::{SwitchPoint, Value};

/// An async Web-KM200 client.
///
/// The async twin of the blocking [`Client`](crate::Client): same stateless
/// request/response calls, same shared immutable key, driven by an
/// [`AsyncTransport`].
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Box<dyn AsyncTransport + Send + Sync>,
    core: ClientCore,
}

/// Builder for the async [`Client`].
pub struct ClientBuilder {
    host: String,
    gateway_password: Option<SecretBytes>,
    private_password: Option<SecretBytes>,
    port: u16,
    timeout: Duration,
    user_agent: String,
    transport: Option<Box<dyn AsyncTransport + Send + Sync>>,
}

impl ClientBuilder {
    /// Create a new builder for a gateway host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            gateway_password: None,
            private_password: None,
            port: 80,
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: None,
        }
    }

    /// Create a builder pre-filled from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new(config.host.clone())
            .gateway_password(&config.gateway_password)
            .private_password(&config.private_password);
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
    }

    /// Set the gateway password (bytes). Printed on the sticker on the device.
    pub fn gateway_password_bytes(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.gateway_password = Some(SecretBytes::new(password.into()));
        self
    }

    /// Set the gateway password (UTF-8 string).
    pub fn gateway_password(self, password: impl AsRef<str>) -> Self {
        self.gateway_password_bytes(password.as_ref().as_bytes().to_vec())
    }

    /// Set the private password (bytes). Chosen by the owner in the vendor app.
    pub fn private_password_bytes(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.private_password = Some(SecretBytes::new(password.into()));
        self
    }

    /// Set the private password (UTF-8 string).
    pub fn private_password(self, password: impl AsRef<str>) -> Self {
        self.private_password_bytes(password.as_ref().as_bytes().to_vec())
    }

    /// Set the HTTP port. The device listens on port 80.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the user-agent header sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the built-in HTTP transport.
    ///
    /// The host, port, timeout, and user-agent settings are ignored when a
    /// transport is injected.
    pub fn transport(mut self, transport: Box<dyn AsyncTransport + Send + Sync>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Derive the device key and build the [`Client`].
    pub fn build(self) -> Result<Client> {
        let gateway_password = self
            .gateway_password
            .ok_or(Error::InvalidArgument("gateway password is required"))?;
        let private_password = self
            .private_password
            .ok_or(Error::InvalidArgument("private password is required"))?;
        if self.host.is_empty() && self.transport.is_none() {
            return Err(Error::InvalidArgument("host is required"));
        }

        let key = Key::derive(gateway_password.expose(), private_password.expose());

        let transport: Box<dyn AsyncTransport + Send + Sync> = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::connect(
                &self.host,
                self.port,
                self.timeout,
                &self.user_agent,
            )?),
        };

        Ok(Client {
            inner: Arc::new(Inner {
                transport,
                core: ClientCore::new(key),
            }),
        })
    }
}

impl Client {
    /// Create a [`ClientBuilder`].
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }

    /// Read a resource and return its decrypted JSON text.
    pub async fn read_raw(&self, path: &str) -> Result<String> {
        let start = Instant::now();
        let result = self.read_raw_inner(path).await;
        self.record("read", path, start, &result);
        result
    }

    /// Read a resource and decode its envelope into a typed [`Value`].
    pub async fn read_value(&self, path: &str) -> Result<Value> {
        let start = Instant::now();
        let result = self.read_value_inner(path).await;
        self.record("read", path, start, &result);
        result
    }

    /// Read a `floatValue` resource.
    pub async fn read_float(&self, path: &str) -> Result<f64> {
        match self.read_value(path).await? {
            Value::Float(v) => Ok(v),
            other => Err(unexpected_envelope(path, "floatValue", &other)),
        }
    }

    /// Read a `stringValue` resource.
    pub async fn read_string(&self, path: &str) -> Result<String> {
        match self.read_value(path).await? {
            Value::String(v) => Ok(v),
            other => Err(unexpected_envelope(path, "stringValue", &other)),
        }
    }

    /// Read a `switchProgram` resource.
    pub async fn read_switch_program(&self, path: &str) -> Result<Vec<SwitchPoint>> {
        match self.read_value(path).await? {
            Value::SwitchProgram(points) => Ok(points),
            other => Err(unexpected_envelope(path, "switchProgram", &other)),
        }
    }

    /// Read a `refEnum` resource: the set of child resource ids.
    pub async fn read_ref_enum(&self, path: &str) -> Result<BTreeSet<String>> {
        match self.read_value(path).await? {
            Value::RefEnum(ids) => Ok(ids),
            other => Err(unexpected_envelope(path, "refEnum", &other)),
        }
    }

    /// Encrypt a cleartext JSON body and POST it to a resource.
    ///
    /// The response body is not interpreted; success is a 2xx status.
    pub async fn write(&self, path: &str, json: &str) -> Result<()> {
        let start = Instant::now();
        let result = self.write_inner(path, json).await;
        self.record("write", path, start, &result);
        result
    }

    /// Write `{"value": <value>}` to a numeric resource.
    pub async fn write_float(&self, path: &str, value: f64) -> Result<()> {
        self.write(path, &serde_json::json!({ "value": value }).to_string())
            .await
    }

    /// Write `{"value": "<value>"}` to a string resource.
    pub async fn write_string(&self, path: &str, value: &str) -> Result<()> {
        self.write(path, &serde_json::json!({ "value": value }).to_string())
            .await
    }

    async fn read_raw_inner(&self, path: &str) -> Result<String> {
        let body = self.inner.transport.get(path).await?;
        crate::debug::dump_body("gateway response body", &body);
        self.inner.core.decode_response(path, &body)
    }

    async fn read_value_inner(&self, path: &str) -> Result<Value> {
        let body = self.inner.transport.get(path).await?;
        crate::debug::dump_body("gateway response body", &body);
        self.inner.core.decode_value(path, &body)
    }

    async fn write_inner(&self, path: &str, json: &str) -> Result<()> {
        let body = self.inner.core.encode_request(json);
        self.inner.transport.post(path, &body).await?;
        Ok(())
    }

    fn record<T>(&self, op: &'static str, path: &str, start: Instant, result: &Result<T>) {
        let elapsed = start.elapsed();
        match result {
            Ok(_) => crate::observe::record_ok("async", op, path, elapsed),
            Err(err) => crate::observe::record_err("async", op, path, elapsed, err),
        }
    }
}

fn unexpected_envelope(path: &str, wanted: &str, got: &Value) -> Error {
    Error::protocol(
        path,
        format!("expected a {wanted} envelope, found {}", got.kind()),
    )
}
