//! Key derivation and the body codec for the Web-KM200.
//!
//! Everything here is fixed by the device firmware: MD5-based key
//! derivation salted with [`MAGIC`], zero-byte padding, AES-256-ECB for
//! data sent to the device, and AES-256-CBC with an all-zero IV for data
//! received from it. The asymmetric mode pairing must stay exactly as the
//! firmware has it.

use core::fmt;

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use md5::{Digest, Md5};
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Fixed 32-byte salt baked into the Web-KM200 firmware, used on both key
/// halves during derivation.
pub const MAGIC: [u8; 32] = [
    0x86, 0x78, 0x45, 0xE9, 0x7C, 0x4E, 0x29, 0xDC, 0xE5, 0x22, 0xB9, 0xA7, 0xD3, 0xA3, 0xE0,
    0x7B, 0x15, 0x2B, 0xFF, 0xAD, 0xDD, 0xBE, 0xD7, 0xF5, 0xFF, 0xD8, 0x42, 0xE9, 0x89, 0x5A,
    0xD1, 0xE4,
];

/// A minimal secret container that zeroizes its contents on drop.
///
/// This is intentionally small and avoids exposing secrets via `Debug`.
#[derive(Clone)]
pub(crate) struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<secret>")
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// The 32-byte AES-256 key shared with a single Web-KM200 device.
///
/// Derived once from the two device passwords and held immutably for the
/// lifetime of a client; safe to share read-only across concurrent requests.
#[derive(Clone)]
pub struct Key([u8; 32]);

impl Key {
    /// Derive the device key from the gateway password (printed on the
    /// device sticker) and the private password (set in the vendor app).
    ///
    /// The two halves salt with [`MAGIC`] in opposite orders; the device
    /// firmware does the same, so the order must not be normalized.
    pub fn derive(gateway_password: &[u8], private_password: &[u8]) -> Self {
        let mut key = [0u8; 32];
        key[..16].copy_from_slice(&md5_pair(gateway_password, &MAGIC));
        key[16..].copy_from_slice(&md5_pair(&MAGIC, private_password));
        Self(key)
    }

    /// Build a key from raw bytes, e.g. one recorded from a known device.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key material.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<key>")
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

fn md5_pair(first: &[u8], second: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(first);
    hasher.update(second);
    hasher.finalize().into()
}

/// Encrypt a request body for the gateway.
///
/// The cleartext is zero-padded to a whole number of 16-byte blocks and
/// encrypted with AES-256 in ECB mode (the mode the device expects for
/// inbound data), then base64-encoded without line wrapping.
pub fn encrypt(key: &Key, cleartext: &[u8]) -> String {
    let padding = (16 - cleartext.len() % 16) % 16;
    let mut padded = Vec::with_capacity(cleartext.len() + padding);
    padded.extend_from_slice(cleartext);
    padded.resize(cleartext.len() + padding, 0);

    let cipher = Aes256::new(GenericArray::from_slice(key.as_bytes()));

    let mut out = Vec::with_capacity(padded.len());
    for block in padded.chunks(16) {
        let mut ga = GenericArray::clone_from_slice(block);
        cipher.encrypt_block(&mut ga);
        out.extend_from_slice(&ga);
    }

    BASE64.encode(out)
}

/// Decrypt a response body from the gateway.
///
/// The device encrypts outbound data with AES-256 in CBC mode against an
/// all-zero IV; that pairing with the ECB writes is part of the wire
/// contract and both sides must keep it. Embedded line breaks in the base64
/// input are tolerated. Every zero byte in the decrypted buffer is removed,
/// not just a trailing pad region.
pub fn decrypt(key: &Key, data: &str) -> Result<Vec<u8>> {
    let compact: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let ciphertext = BASE64
        .decode(compact)
        .map_err(|_| Error::Decoding("response body is not valid base64"))?;

    if !ciphertext.len().is_multiple_of(16) {
        return Err(Error::Decoding(
            "ciphertext length is not a multiple of the AES block size",
        ));
    }

    let cipher = Aes256::new(GenericArray::from_slice(key.as_bytes()));

    let mut out = Vec::with_capacity(ciphertext.len());
    let mut prev = [0u8; 16];

    for block in ciphertext.chunks(16) {
        let mut ga = GenericArray::clone_from_slice(block);
        cipher.decrypt_block(&mut ga);
        for (i, byte) in ga.iter_mut().enumerate() {
            *byte ^= prev[i];
        }
        out.extend_from_slice(&ga);
        prev.copy_from_slice(block);
    }

    out.retain(|&b| b != 0);
    Ok(out)
}

/// Encrypt the way the gateway itself does for responses: CBC against an
/// all-zero IV. Used to build realistic read fixtures in tests.
#[cfg(test)]
pub(crate) fn encrypt_gateway_side(key: &Key, cleartext: &[u8]) -> String {
    let padding = (16 - cleartext.len() % 16) % 16;
    let mut padded = Vec::with_capacity(cleartext.len() + padding);
    padded.extend_from_slice(cleartext);
    padded.resize(cleartext.len() + padding, 0);

    let cipher = Aes256::new(GenericArray::from_slice(key.as_bytes()));

    let mut out = Vec::with_capacity(padded.len());
    let mut prev = [0u8; 16];
    for block in padded.chunks(16) {
        let mut xored = [0u8; 16];
        for i in 0..16 {
            xored[i] = block[i] ^ prev[i];
        }
        let mut ga = GenericArray::clone_from_slice(&xored);
        cipher.encrypt_block(&mut ga);
        out.extend_from_slice(&ga);
        prev.copy_from_slice(&ga);
    }

    BASE64.encode(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_GATEWAY_PASSWORD: &[u8] = b"NeUCsyQMLVYqKJec";
    const EXAMPLE_PRIVATE_PASSWORD: &[u8] = b"HnE75f+a%aXP";

    // Key recorded from a device configured with the example passwords.
    const EXAMPLE_KEY: [u8; 32] = [
        0x91, 0xDF, 0x2C, 0xD7, 0x63, 0x1C, 0x30, 0x9F, 0x20, 0x27, 0xB8, 0x9A, 0x51, 0x26, 0xA4,
        0x81, 0xBF, 0x39, 0xAD, 0xE2, 0x56, 0x5B, 0x0A, 0xF0, 0x94, 0x7F, 0xAA, 0xD4, 0x56, 0xA5,
        0xCC, 0x9C,
    ];

    fn example_key() -> Key {
        Key::derive(EXAMPLE_GATEWAY_PASSWORD, EXAMPLE_PRIVATE_PASSWORD)
    }

    #[test]
    fn derive_matches_recorded_device_key() {
        let key = example_key();
        assert_eq!(key.as_bytes(), &EXAMPLE_KEY);
    }

    #[test]
    fn derive_is_deterministic() {
        let a = Key::derive(b"gw", b"private");
        let b = Key::derive(b"gw", b"private");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn key_halves_differ_for_identical_passwords() {
        // The halves salt in opposite orders, so even equal passwords must
        // produce distinct halves.
        let key = Key::derive(b"same", b"same");
        assert_ne!(key.as_bytes()[..16], key.as_bytes()[16..]);
    }

    #[test]
    fn derive_accepts_arbitrary_lengths() {
        let key = Key::derive(b"", &[0xFFu8; 100]);
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn key_debug_does_not_leak_material() {
        let key = example_key();
        assert_eq!(format!("{key:?}"), "<key>");

        let secret = SecretBytes::new(b"hunter2".to_vec());
        assert_eq!(format!("{secret:?}"), "<secret>");
    }

    #[test]
    fn encrypt_single_block_vector() {
        let ciphertext = encrypt(&example_key(), br#"{"value":    55}"#);
        assert_eq!(ciphertext, "CrzAyGdGDqmdxVWZrIXvCg==");
    }

    #[test]
    fn encrypt_pads_with_trailing_zeros() {
        let key = example_key();

        let ciphertext = encrypt(&key, br#"{"value":55}"#);
        assert_eq!(ciphertext, "D+YsDffkGOj5CCK487Cpkg==");

        // A caller-padded buffer encrypts to the same ciphertext.
        let ciphertext = encrypt(&key, b"{\"value\":55}\0\0\0\0");
        assert_eq!(ciphertext, "D+YsDffkGOj5CCK487Cpkg==");
    }

    #[test]
    fn decrypt_single_block_vector() {
        let cleartext = decrypt(&example_key(), "CrzAyGdGDqmdxVWZrIXvCg==").expect("decrypt");
        assert_eq!(cleartext, br#"{"value":    55}"#);
    }

    #[test]
    fn decrypt_strips_zero_padding() {
        let cleartext = decrypt(&example_key(), "D+YsDffkGOj5CCK487Cpkg==").expect("decrypt");
        assert_eq!(cleartext, br#"{"value":55}"#);
    }

    #[test]
    fn decrypt_tolerates_line_wrapped_base64() {
        let cleartext =
            decrypt(&example_key(), "CrzAyGdGDqmd\nxVWZrIXvCg==\n").expect("decrypt");
        assert_eq!(cleartext, br#"{"value":    55}"#);
    }

    #[test]
    fn round_trip_within_one_block() {
        let key = example_key();
        // ECB and CBC-with-zero-IV coincide on the first block, so payloads
        // that fit one padded block survive a local round trip.
        for payload in [
            b"5".as_slice(),
            b"21.5".as_slice(),
            b"{\"value\":55}".as_slice(),
            b"0123456789abcdef".as_slice(),
        ] {
            let decrypted = decrypt(&key, &encrypt(&key, payload)).expect("decrypt");
            assert_eq!(decrypted, payload);
        }
    }

    #[test]
    fn embedded_nul_bytes_are_lost_on_decrypt() {
        // Zero stripping removes every NUL, including ones that were in the
        // original cleartext. Lossy, and matches the device.
        let key = example_key();
        let decrypted = decrypt(&key, &encrypt(&key, b"a\0b")).expect("decrypt");
        assert_eq!(decrypted, b"ab");
    }

    #[test]
    fn gateway_side_ciphertext_round_trips_across_blocks() {
        let key = example_key();
        let body = br#"{"id":"/system/sensors/temperatures/outdoor_t1","value":7.5}"#;
        let ciphertext = encrypt_gateway_side(&key, body);
        let decrypted = decrypt(&key, &ciphertext).expect("decrypt");
        assert_eq!(decrypted, body);
    }

    #[test]
    fn decrypt_rejects_malformed_base64() {
        let err = decrypt(&example_key(), "!!not base64!!").unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
    }

    #[test]
    fn decrypt_rejects_partial_blocks() {
        let eight_bytes = BASE64.encode([0x55u8; 8]);
        let err = decrypt(&example_key(), &eight_bytes).unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
    }

    #[test]
    fn decrypt_of_empty_body_is_empty() {
        let cleartext = decrypt(&example_key(), "").expect("decrypt");
        assert!(cleartext.is_empty());
    }
}
