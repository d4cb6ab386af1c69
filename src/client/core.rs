use crate::crypto::{self, Key};
use crate::error::{Error, Result};
use crate::types::Value;

/// Transport-free half of the client.
///
/// Holds the derived device key and translates between cleartext JSON and
/// the encrypted wire bodies. All methods are pure; concurrent use needs no
/// locking.
#[derive(Debug, Clone)]
pub(crate) struct ClientCore {
    key: Key,
}

impl ClientCore {
    pub(crate) fn new(key: Key) -> Self {
        Self { key }
    }

    /// Encrypt a cleartext request body for POSTing.
    pub(crate) fn encode_request(&self, cleartext: &str) -> Vec<u8> {
        crypto::encrypt(&self.key, cleartext.as_bytes()).into_bytes()
    }

    /// Decrypt a response body into its cleartext JSON string.
    pub(crate) fn decode_response(&self, path: &str, body: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(body)
            .map_err(|_| Error::Decoding("response body is not ASCII base64"))?;
        let cleartext = crypto::decrypt(&self.key, text)?;
        String::from_utf8(cleartext)
            .map_err(|_| Error::protocol(path, "decrypted payload is not valid UTF-8"))
    }

    /// Decrypt and decode a response body into a typed [`Value`].
    pub(crate) fn decode_value(&self, path: &str, body: &[u8]) -> Result<Value> {
        let json = self.decode_response(path, body)?;
        Value::decode(path, &json)
    }
}
