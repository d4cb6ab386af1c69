use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::{Transport, map_reqwest_err};

/// Blocking HTTP transport for the Web-KM200.
///
/// The gateway speaks plain HTTP on port 80; encryption happens at the body
/// level, above this layer. Requests are not retried here.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for one gateway host.
    pub fn connect(host: &str, port: u16, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("http://{host}:{port}"),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .map_err(map_reqwest_err)?;
        read_body(response)
    }

    fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.url(path))
            .body(body.to_vec())
            .send()
            .map_err(map_reqwest_err)?;
        read_body(response)
    }
}

fn read_body(response: reqwest::blocking::Response) -> Result<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().map_err(map_reqwest_err)?;
    Ok(bytes.to_vec())
}
