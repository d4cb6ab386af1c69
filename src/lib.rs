#![deny(unsafe_code)]
#![warn(missing_docs)]

//! A client library for the Bosch/Buderus Web-KM200 heating gateway.
//!
//! The gateway serves a tree of JSON resources over plain HTTP and hides
//! every request and response body behind AES-256 and base64. The crate
//! implements:
//! - key derivation from the two device passwords
//! - the body codec (AES-256-ECB for writes, AES-256-CBC with an all-zero
//!   IV for reads, zero-byte padding)
//! - typed decoding of the gateway's tagged JSON envelopes
//!
//! It exposes a small public API (`Client`, `ClientBuilder`, [`Value`], and
//! a few types) while keeping the HTTP details swappable behind the
//! [`Transport`] trait. The [`crypto`] module is public for callers that
//! only need the codec.
//!
//! The encryption does not protect the heating system from an attacker on
//! the local network; it only obfuscates the wire format. Treat the two
//! passwords as secrets anyway, since together they give full write access
//! to the device.

mod client;
pub mod config;
pub mod crypto;
mod debug;
mod error;
mod observe;
mod transport;
mod types;

#[cfg(feature = "blocking")]
pub use crate::client::blocking::{Client, ClientBuilder};
#[cfg(feature = "async")]
pub use crate::client::tokio::{Client as AsyncClient, ClientBuilder as AsyncClientBuilder};
pub use crate::config::{Config, ConfigError};
pub use crate::crypto::Key;
pub use crate::error::{Error, Result};
#[cfg(feature = "async")]
pub use crate::transport::AsyncTransport;
#[cfg(feature = "blocking")]
pub use crate::transport::Transport;
pub use crate::types::{SwitchPoint, Value};
