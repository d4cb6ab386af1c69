#![cfg(feature = "blocking")]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use km200::{Client, Error, Key, Result, SwitchPoint, Transport, Value, crypto};

const GATEWAY_PASSWORD: &str = "NeUCsyQMLVYqKJec";
const PRIVATE_PASSWORD: &str = "HnE75f+a%aXP";

fn device_key() -> Key {
    Key::derive(GATEWAY_PASSWORD.as_bytes(), PRIVATE_PASSWORD.as_bytes())
}

fn client_with(transport: Box<dyn Transport + Send + Sync>) -> Client {
    Client::builder("")
        .gateway_password(GATEWAY_PASSWORD)
        .private_password(PRIVATE_PASSWORD)
        .transport(transport)
        .build()
        .expect("build client")
}

struct CannedTransport {
    body: &'static [u8],
}

impl Transport for CannedTransport {
    fn get(&self, _path: &str) -> Result<Vec<u8>> {
        Ok(self.body.to_vec())
    }

    fn post(&self, _path: &str, _body: &[u8]) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

struct RecordingTransport {
    posts: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl Transport for RecordingTransport {
    fn get(&self, _path: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>> {
        self.posts
            .lock()
            .expect("lock")
            .push((path.to_owned(), body.to_vec()));
        Ok(Vec::new())
    }
}

struct RefusedTransport;

impl Transport for RefusedTransport {
    fn get(&self, _path: &str) -> Result<Vec<u8>> {
        Err(Error::Http { status: 404 })
    }

    fn post(&self, _path: &str, _body: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Http { status: 404 })
    }
}

// Ciphertext recorded from a device configured with the example passwords:
// the body decrypts to `{"value":    55}`.
const RECORDED_BODY: &[u8] = b"CrzAyGdGDqmdxVWZrIXvCg==";

#[test]
fn read_raw_decrypts_a_recorded_gateway_body() {
    let client = client_with(Box::new(CannedTransport {
        body: RECORDED_BODY,
    }));

    let raw = client
        .read_raw("/heatingCircuits/hc1/currentRoomSetpoint")
        .expect("read_raw");
    assert_eq!(raw, r#"{"value":    55}"#);
}

#[test]
fn read_value_passes_untagged_objects_through() {
    let client = client_with(Box::new(CannedTransport {
        body: RECORDED_BODY,
    }));

    let value = client
        .read_value("/heatingCircuits/hc1/currentRoomSetpoint")
        .expect("read_value");

    let Value::Raw(json) = value else {
        panic!("expected raw passthrough for an untagged object");
    };
    assert_eq!(json["value"], 55);
}

#[test]
fn write_posts_the_encrypted_body() {
    let posts = Arc::new(Mutex::new(Vec::new()));
    let client = client_with(Box::new(RecordingTransport {
        posts: Arc::clone(&posts),
    }));

    client
        .write_string("/heatingCircuits/hc1/operationMode", "auto")
        .expect("write");

    let posts = posts.lock().expect("lock");
    let (path, body) = &posts[0];
    assert_eq!(path, "/heatingCircuits/hc1/operationMode");

    let wire = std::str::from_utf8(body).expect("ascii body");
    let decrypted = crypto::decrypt(&device_key(), wire).expect("decrypt");
    assert_eq!(decrypted, br#"{"value":"auto"}"#);
}

#[test]
fn http_failures_are_reported_not_swallowed() {
    let client = client_with(Box::new(RefusedTransport));

    let err = client.read_raw("/gateway/DateTime").unwrap_err();
    assert!(matches!(err, Error::Http { status: 404 }));

    let err = client.write("/gateway/DateTime", "{}").unwrap_err();
    assert!(matches!(err, Error::Http { status: 404 }));
}

#[test]
fn crypto_module_is_usable_on_its_own() {
    let key = device_key();

    let ciphertext = crypto::encrypt(&key, br#"{"value":55}"#);
    assert_eq!(ciphertext, "D+YsDffkGOj5CCK487Cpkg==");

    let cleartext = crypto::decrypt(&key, &ciphertext).expect("decrypt");
    assert_eq!(cleartext, br#"{"value":55}"#);
}

#[test]
fn envelope_decoding_is_usable_on_its_own() {
    let value = Value::decode(
        "/heatingCircuits/hc1/switchPrograms/A",
        r#"{"type":"switchProgram","switchPoints":[{"dayOfWeek":"Sa","setpoint":"comfort2","time":420}]}"#,
    )
    .expect("decode");

    assert_eq!(
        value,
        Value::SwitchProgram(vec![SwitchPoint {
            day_of_week: "Sa".to_owned(),
            setpoint: "comfort2".to_owned(),
            time: 420,
        }])
    );

    let value = Value::decode(
        "/system",
        r#"{"type":"refEnum","references":[{"id":"/system/brand"},{"id":"/system/bus"}]}"#,
    )
    .expect("decode");
    assert_eq!(
        value,
        Value::RefEnum(BTreeSet::from([
            "/system/brand".to_owned(),
            "/system/bus".to_owned(),
        ]))
    );
}
