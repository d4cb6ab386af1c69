#[cfg(feature = "blocking")]
use crate::error::Result;

/// User agent the vendor's own tooling sends. Some firmware revisions only
/// answer requests carrying it.
#[cfg(any(feature = "blocking", feature = "async"))]
pub(crate) const DEFAULT_USER_AGENT: &str = "TeleHeater";

#[cfg(any(feature = "blocking", feature = "async"))]
pub(crate) fn map_reqwest_err(e: reqwest::Error) -> crate::error::Error {
    if e.is_timeout() {
        crate::error::Error::Timeout
    } else {
        crate::error::Error::Transport(e.to_string())
    }
}

/// A synchronous transport for exchanging encrypted bodies with the gateway.
#[cfg(feature = "blocking")]
pub trait Transport {
    /// Fetch the encrypted body of a resource.
    fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Send an encrypted body to a resource and return the response body.
    fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>>;
}

#[cfg(feature = "async")]
mod async_support {
    use core::future::Future;
    use core::pin::Pin;

    use crate::error::Result;

    /// An asynchronous transport for exchanging encrypted bodies with the gateway.
    pub trait AsyncTransport {
        /// Fetch the encrypted body of a resource.
        fn get<'a>(
            &'a self,
            path: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

        /// Send an encrypted body to a resource and return the response body.
        fn post<'a>(
            &'a self,
            path: &'a str,
            body: &'a [u8],
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;
    }
}

#[cfg(feature = "async")]
pub use async_support::AsyncTransport;

#[cfg(feature = "blocking")]
pub(crate) mod blocking;

#[cfg(feature = "async")]
pub(crate) mod tokio;
