use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::{AsyncTransport, map_reqwest_err};

/// Async HTTP transport for the Web-KM200.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for one gateway host.
    pub fn connect(host: &str, port: u16, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
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

    async fn get_impl(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(map_reqwest_err)?;
        read_body(response).await
    }

    async fn post_impl(&self, path: &str, body: &[u8]) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.url(path))
            .body(body.to_vec())
            .send()
            .await
            .map_err(map_reqwest_err)?;
        read_body(response).await
    }
}

impl AsyncTransport for HttpTransport {
    fn get<'a>(
        &'a self,
        path: &'a str,
    ) -> core::pin::Pin<Box<dyn core::future::Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(self.get_impl(path))
    }

    fn post<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
    ) -> core::pin::Pin<Box<dyn core::future::Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(self.post_impl(path, body))
    }
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(map_reqwest_err)?;
    Ok(bytes.to_vec())
}
