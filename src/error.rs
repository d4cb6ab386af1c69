use std::io;

use thiserror::Error;

/// Result type used across this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (socket, OS, etc.).
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Request timed out waiting for the gateway.
    #[error("timeout waiting for gateway response")]
    Timeout,

    /// Gateway answered with a non-2xx HTTP status.
    #[error("gateway returned HTTP status {status}")]
    Http {
        /// Raw HTTP status code returned by the gateway.
        status: u16,
    },

    /// Transport-level failure (connection refused, DNS, malformed response).
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded (malformed base64, bad ciphertext length).
    #[error("decoding error: {0}")]
    Decoding(&'static str),

    /// Decrypted payload is not valid JSON or does not match the envelope
    /// shape for its declared type.
    #[error("protocol error at {path}: {message}")]
    Protocol {
        /// Resource path of the offending request.
        path: String,
        /// What was wrong with the envelope.
        message: String,
    },

    /// Invalid caller-supplied argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    pub(crate) fn protocol(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            path: path.into(),
            message: message.into(),
        }
    }
}
