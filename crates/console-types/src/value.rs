//! Decoded message values.

use serde_json::{Map, Value};

/// The output of a decoder.
///
/// JSON payloads are passed through verbatim as [`DecodedValue::RawJson`]
/// without being parsed at decode time. Every other decoder produces a
/// structured [`serde_json::Value`], which is the closed union of null, bool,
/// number, string, array and object.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    RawJson(Vec<u8>),
    Value(Value),
}

impl DecodedValue {
    /// Interpret the value as a JSON document.
    ///
    /// For raw payloads this is the first time the bytes are parsed, so a
    /// malformed document surfaces here rather than in the decoder.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        match self {
            DecodedValue::RawJson(bytes) => serde_json::from_slice(bytes),
            DecodedValue::Value(value) => Ok(value.clone()),
        }
    }
}

impl From<Value> for DecodedValue {
    fn from(value: Value) -> Self {
        DecodedValue::Value(value)
    }
}

impl From<Map<String, Value>> for DecodedValue {
    fn from(map: Map<String, Value>) -> Self {
        DecodedValue::Value(Value::Object(map))
    }
}
