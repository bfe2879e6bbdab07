//! Avro decoding against a schema loaded at startup.

mod normalize;

pub use normalize::{normalize, normalize_record};

use std::path::Path;

use apache_avro::types::Value as AvroValue;
use apache_avro::Schema;
use console_types::DecodedValue;
use tracing::debug;

use crate::error::{DecodeError, Result};
use crate::{Converter, Decoder};

/// File extension every Avro schema path must carry.
pub const SCHEMA_EXTENSION: &str = ".avsc";

/// Decodes Avro binary payloads (no container header) into JSON objects.
///
/// The schema is compiled by [`Decoder::validate_schemas`]; until then every
/// decode fails with [`DecodeError::NoCodec`].
#[derive(Default)]
pub struct AvroDecoder {
    converter: Option<Box<dyn Converter>>,
    schema: Option<Schema>,
}

impl AvroDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a converter that runs on every decoded record.
    pub fn with_converter(mut self, converter: Box<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// The compiled schema, once validation has succeeded.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }
}

impl Decoder for AvroDecoder {
    fn validate_schemas(&mut self, schemas: &str) -> Result<()> {
        let path = Path::new(schemas);
        if !schemas.ends_with(SCHEMA_EXTENSION) {
            return Err(DecodeError::InvalidSchemaKind {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|source| DecodeError::SchemaReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let schema = Schema::parse_str(&text).map_err(|e| DecodeError::CodecCreationFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!("Compiled Avro schema from {}", path.display());
        self.schema = Some(schema);
        Ok(())
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedValue> {
        let schema = self.schema.as_ref().ok_or(DecodeError::NoCodec)?;

        let mut reader = payload;
        let native = apache_avro::from_avro_datum(schema, &mut reader, None)
            .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;

        let mut record = match native {
            AvroValue::Record(fields) => normalize_record(fields)?,
            AvroValue::Map(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key, normalize(value)?);
                }
                map
            }
            other => {
                return Err(DecodeError::TypeAssertionFailed {
                    found: normalize::kind_name(&other).to_string(),
                })
            }
        };

        if let Some(converter) = &self.converter {
            converter.convert_fields(&mut record)?;
        }

        Ok(DecodedValue::from(record))
    }
}
