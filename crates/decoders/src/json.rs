use std::sync::Arc;

use console_types::{DecodedValue, LogSink};

use crate::error::{DecodeError, Result};
use crate::Decoder;

/// Passes JSON payloads through as-is.
///
/// The bytes are not parsed here. A payload that turns out not to be JSON
/// fails later, when the presenter formats it.
pub struct JsonDecoder {
    sink: Arc<dyn LogSink>,
}

impl JsonDecoder {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl Decoder for JsonDecoder {
    fn validate_schemas(&mut self, _schemas: &str) -> Result<()> {
        Ok(())
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedValue> {
        self.sink.debug("Decoding JSON message...");
        // Any valid JSON document is at least one byte long
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        Ok(DecodedValue::RawJson(payload.to_vec()))
    }
}
