use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{Error, Result};

/// One entry of a weekly switch program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchPoint {
    /// Day the point fires, in the device's two-letter notation (`"Mo"`, `"Tu"`, ...).
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: String,
    /// Name of the setpoint to switch to (`"eco"`, `"comfort2"`, ...).
    pub setpoint: String,
    /// Minutes after midnight.
    pub time: u32,
}

/// A decoded gateway response.
///
/// The gateway tags most responses with a `type` field; each known tag maps
/// to one variant here. Untagged objects (directory-listing nodes) and
/// unknown tags pass through as [`Value::Raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A `floatValue` envelope: sensor readings, temperatures, setpoints.
    Float(f64),
    /// A `stringValue` envelope: operation modes, firmware strings.
    String(String),
    /// A `switchProgram` envelope: the weekly schedule of a heating circuit.
    SwitchProgram(Vec<SwitchPoint>),
    /// A `refEnum` envelope: the set of child resource ids.
    RefEnum(BTreeSet<String>),
    /// Anything else, parsed but otherwise untouched.
    Raw(Json),
}

impl Value {
    /// Decode a decrypted gateway response body.
    ///
    /// `path` is the resource path the body came from; it is carried into
    /// error messages so a failing envelope can be located on the device.
    pub fn decode(path: &str, json: &str) -> Result<Self> {
        let envelope: Json = serde_json::from_str(json)
            .map_err(|e| Error::protocol(path, format!("response is not valid JSON: {e}")))?;
        Self::from_envelope(path, envelope)
    }

    fn from_envelope(path: &str, envelope: Json) -> Result<Self> {
        let Some(tag) = envelope.get("type").and_then(Json::as_str) else {
            return Ok(Value::Raw(envelope));
        };

        match tag {
            "floatValue" => envelope
                .get("value")
                .and_then(Json::as_f64)
                .map(Value::Float)
                .ok_or_else(|| {
                    Error::protocol(path, "floatValue envelope has no numeric `value` field")
                }),
            "stringValue" => envelope
                .get("value")
                .and_then(Json::as_str)
                .map(|s| Value::String(s.to_owned()))
                .ok_or_else(|| {
                    Error::protocol(path, "stringValue envelope has no string `value` field")
                }),
            "switchProgram" => {
                let points = envelope.get("switchPoints").cloned().ok_or_else(|| {
                    Error::protocol(path, "switchProgram envelope has no `switchPoints` field")
                })?;
                let points: Vec<SwitchPoint> = serde_json::from_value(points).map_err(|e| {
                    Error::protocol(
                        path,
                        format!("switchProgram envelope has a malformed switch point: {e}"),
                    )
                })?;
                Ok(Value::SwitchProgram(points))
            }
            "refEnum" => {
                let references = envelope
                    .get("references")
                    .and_then(Json::as_array)
                    .ok_or_else(|| {
                        Error::protocol(path, "refEnum envelope has no `references` array")
                    })?;
                let mut ids = BTreeSet::new();
                for reference in references {
                    let id = reference.get("id").and_then(Json::as_str).ok_or_else(|| {
                        Error::protocol(path, "refEnum reference has no string `id` field")
                    })?;
                    ids.insert(id.to_owned());
                }
                Ok(Value::RefEnum(ids))
            }
            _ => Ok(Value::Raw(envelope)),
        }
    }

    /// Envelope family this value was decoded from, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Float(_) => "floatValue",
            Value::String(_) => "stringValue",
            Value::SwitchProgram(_) => "switchProgram",
            Value::RefEnum(_) => "refEnum",
            Value::Raw(_) => "untagged",
        }
    }
}
