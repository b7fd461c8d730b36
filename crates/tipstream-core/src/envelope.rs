//! The JSON wrapper every stream-format probe returns.

use serde_json::Value;

/// A successfully parsed probe envelope.
///
/// `display_rules` is already checked by the time this exists: an explicit
/// null there never produces an `Envelope`, it produces [`Probe::Blocked`].
#[derive(Debug, Clone)]
pub struct Envelope {
    pub source: String,
    pub stream_type: String,
    pub data: String,
}

/// Per-probe control signal: one of matched-shape, skip, or hard abort.
///
/// Modelled as an enum so the factory loop can tell "this format does not
/// apply" apart from "upstream blocked playback", which outranks everything.
#[derive(Debug)]
pub enum Probe {
    Parsed(Envelope),
    /// Body was not the expected shape; the probe loop logs and moves on.
    Malformed(&'static str),
    /// `displayRules` was explicitly null: abort with this operator text.
    Blocked(String),
}

pub fn parse_probe(body: &str) -> Probe {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return Probe::Malformed("body is not a JSON object");
    };
    let Some(display_rules) = map.get("displayRules") else {
        return Probe::Malformed("missing displayRules");
    };
    if display_rules.is_null() {
        // The block text travels in the free-text data field.
        return match map.get("data").and_then(Value::as_str) {
            Some(message) => Probe::Blocked(message.to_string()),
            None => Probe::Malformed("null displayRules without message data"),
        };
    }
    let Some(source) = map.get("source").and_then(Value::as_str) else {
        return Probe::Malformed("missing source");
    };
    let Some(stream_type) = map.get("type").and_then(Value::as_str) else {
        return Probe::Malformed("missing type");
    };
    let Some(data) = map.get("data").and_then(Value::as_str) else {
        return Probe::Malformed("missing data");
    };
    Probe::Parsed(Envelope {
        source: source.to_string(),
        stream_type: stream_type.to_string(),
        data: data.to_string(),
    })
}
