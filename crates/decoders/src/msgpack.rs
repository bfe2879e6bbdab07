use base64::Engine;
use console_types::DecodedValue;
use rmpv::Value as MsgPackValue;
use serde_json::{Map, Number, Value};

use crate::error::{DecodeError, Result};
use crate::Decoder;

/// Decodes MessagePack payloads whose top level is a map with string keys.
#[derive(Debug, Default)]
pub struct MsgPackDecoder;

impl MsgPackDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for MsgPackDecoder {
    fn validate_schemas(&mut self, _schemas: &str) -> Result<()> {
        Ok(())
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedValue> {
        let mut reader = payload;
        let decoded = rmpv::decode::read_value(&mut reader)
            .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;

        match decoded {
            MsgPackValue::Map(entries) => Ok(DecodedValue::from(normalize_map(entries)?)),
            other => Err(DecodeError::DecodeFailed(format!(
                "expected a map at the top level, found {other}"
            ))),
        }
    }
}

/// Binary and extension data become base64 strings, the way byte slices are
/// printed as JSON.
fn normalize(value: MsgPackValue) -> Result<Value> {
    Ok(match value {
        MsgPackValue::Nil => Value::Null,
        MsgPackValue::Boolean(b) => Value::Bool(b),
        MsgPackValue::Integer(i) => match (i.as_u64(), i.as_i64()) {
            (Some(u), _) => Value::from(u),
            (None, Some(n)) => Value::from(n),
            (None, None) => return Err(DecodeError::DecodeFailed(format!("integer {i} out of range"))),
        },
        MsgPackValue::F32(f) => float(f64::from(f))?,
        MsgPackValue::F64(f) => float(f)?,
        MsgPackValue::String(s) => match s.into_str() {
            Some(s) => Value::String(s),
            None => return Err(DecodeError::DecodeFailed("string is not valid UTF-8".to_string())),
        },
        MsgPackValue::Binary(bytes) => Value::String(base64::engine::general_purpose::STANDARD.encode(bytes)),
        MsgPackValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(normalize)
                .collect::<Result<Vec<_>>>()?,
        ),
        MsgPackValue::Map(entries) => Value::Object(normalize_map(entries)?),
        MsgPackValue::Ext(kind, data) => {
            let mut ext = Map::new();
            ext.insert("type".to_string(), Value::from(kind));
            ext.insert(
                "data".to_string(),
                Value::String(base64::engine::general_purpose::STANDARD.encode(data)),
            );
            Value::Object(ext)
        }
    })
}

fn normalize_map(entries: Vec<(MsgPackValue, MsgPackValue)>) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for (key, value) in entries {
        let key = match key {
            MsgPackValue::String(s) => s
                .into_str()
                .ok_or_else(|| DecodeError::DecodeFailed("map key is not valid UTF-8".to_string()))?,
            other => {
                return Err(DecodeError::DecodeFailed(format!(
                    "map key {other} is not a string"
                )))
            }
        };
        map.insert(key, normalize(value)?);
    }
    Ok(map)
}

fn float(f: f64) -> Result<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| DecodeError::DecodeFailed(format!("non-finite float {f} cannot be printed as JSON")))
}
