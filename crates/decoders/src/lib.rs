//! Message decoders for kafka-console-consumer.
//!
//! A [`Decoder`] turns the raw value of a Kafka message into a
//! [`DecodedValue`] that can be printed as JSON. Three variants ship here:
//!
//! - [`JsonDecoder`]: passes JSON payloads through untouched
//! - [`MsgPackDecoder`]: parses MessagePack maps
//! - [`AvroDecoder`]: decodes Avro binary against a `.avsc` schema, with an
//!   optional [`Converter`] for post-processing fields
//!
//! Other decoders can be supplied by implementing [`Decoder`] and registering
//! a factory with the plugin registry in the binary crate.

pub mod avro;
pub mod convert;
pub mod error;
pub mod json;
pub mod msgpack;

use console_types::DecodedValue;
use serde_json::{Map, Value};

pub use avro::AvroDecoder;
pub use convert::EmbeddedJsonConverter;
pub use error::{DecodeError, Result};
pub use json::JsonDecoder;
pub use msgpack::MsgPackDecoder;

/// Capability for turning message payloads into printable values.
///
/// `validate_schemas` is called exactly once at startup, before any message is
/// decoded. Implementations that have no notion of a schema return `Ok(())`.
/// After validation the decoder's state is read-only, so `decode` takes
/// `&self` and gives the same answer for the same bytes every time.
pub trait Decoder: Send {
    /// Validate the schema specification and prepare any codec state.
    fn validate_schemas(&mut self, schemas: &str) -> Result<()>;

    /// Decode one message payload.
    fn decode(&self, payload: &[u8]) -> Result<DecodedValue>;
}

/// Capability for post-processing the fields of a decoded Avro record.
///
/// Runs after normalization and may rewrite fields in place, e.g. turning a
/// bytes field back into the JSON document it carries. An error aborts the
/// decode of that one message.
pub trait Converter: Send + Sync {
    fn convert_fields(&self, record: &mut Map<String, Value>) -> Result<()>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn validate_schemas(&mut self, schemas: &str) -> Result<()> {
        (**self).validate_schemas(schemas)
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedValue> {
        (**self).decode(payload)
    }
}
