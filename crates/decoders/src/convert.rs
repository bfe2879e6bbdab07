//! Built-in field converters.

use base64::Engine;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::Converter;

/// Expands bytes fields that carry a JSON document.
///
/// Avro bytes reach the converter as base64 strings. Any top-level string
/// that base64-decodes to a JSON object or array is replaced by that
/// document; everything else is left alone.
#[derive(Debug, Default)]
pub struct EmbeddedJsonConverter;

impl EmbeddedJsonConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Converter for EmbeddedJsonConverter {
    fn convert_fields(&self, record: &mut Map<String, Value>) -> Result<()> {
        for value in record.values_mut() {
            let Value::String(encoded) = value else {
                continue;
            };
            let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(encoded.as_bytes())
            else {
                continue;
            };
            if let Ok(document @ (Value::Object(_) | Value::Array(_))) =
                serde_json::from_slice::<Value>(&bytes)
            {
                *value = document;
            }
        }
        Ok(())
    }
}
