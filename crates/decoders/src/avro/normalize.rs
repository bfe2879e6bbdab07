//! Conversion of Avro values into plain JSON.
//!
//! The codec hands back [`apache_avro::types::Value`], which carries unions,
//! records, enums and logical types that a JSON serializer can't print as-is.
//! This walks the tree once and rebuilds it out of `serde_json::Value`.

use apache_avro::types::Value as AvroValue;
use base64::Engine;
use serde_json::{Map, Number, Value};

use crate::error::{DecodeError, Result};

/// Normalize a single Avro value, recursing into containers.
pub fn normalize(value: AvroValue) -> Result<Value> {
    Ok(match value {
        AvroValue::Null => Value::Null,
        AvroValue::Boolean(b) => Value::Bool(b),
        AvroValue::Int(i) => Value::from(i),
        AvroValue::Long(l) => Value::from(l),
        AvroValue::Float(f) => float(f64::from(f))?,
        AvroValue::Double(d) => float(d)?,
        AvroValue::String(s) => Value::String(s),
        AvroValue::Bytes(bytes) | AvroValue::Fixed(_, bytes) => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        AvroValue::Enum(_, symbol) => Value::String(symbol),
        AvroValue::Union(_, inner) => normalize(*inner)?,
        AvroValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(normalize)
                .collect::<Result<Vec<_>>>()?,
        ),
        AvroValue::Map(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key, normalize(value)?);
            }
            Value::Object(map)
        }
        AvroValue::Record(fields) => Value::Object(normalize_record(fields)?),
        // Logical types (dates, timestamps, decimals, uuids, durations) are
        // leaves; the codec knows how to render them.
        other => Value::try_from(other).map_err(|e| DecodeError::DecodeFailed(e.to_string()))?,
    })
}

/// Normalize the fields of a record into a JSON object.
pub fn normalize_record(fields: Vec<(String, AvroValue)>) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for (name, value) in fields {
        map.insert(name, normalize(value)?);
    }
    Ok(map)
}

fn float(f: f64) -> Result<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| DecodeError::DecodeFailed(format!("non-finite float {f} cannot be printed as JSON")))
}

/// Short name of an Avro value's variant, for error messages.
pub(crate) fn kind_name(value: &AvroValue) -> &'static str {
    match value {
        AvroValue::Null => "null",
        AvroValue::Boolean(_) => "boolean",
        AvroValue::Int(_) => "int",
        AvroValue::Long(_) => "long",
        AvroValue::Float(_) => "float",
        AvroValue::Double(_) => "double",
        AvroValue::Bytes(_) => "bytes",
        AvroValue::String(_) => "string",
        AvroValue::Fixed(_, _) => "fixed",
        AvroValue::Enum(_, _) => "enum",
        AvroValue::Union(_, _) => "union",
        AvroValue::Array(_) => "array",
        AvroValue::Map(_) => "map",
        AvroValue::Record(_) => "record",
        _ => "logical type",
    }
}
