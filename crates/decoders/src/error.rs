use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while validating schemas or decoding payloads.
///
/// Schema errors (`InvalidSchemaKind`, `SchemaReadFailed`,
/// `CodecCreationFailed`) only come out of `validate_schemas` and are fatal
/// at startup. Everything else is scoped to a single message.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON, payload is empty")]
    EmptyPayload,

    #[error("error decoding message: {0}")]
    DecodeFailed(String),

    #[error("invalid schema {path:?}, schemas must be .avsc files")]
    InvalidSchemaKind { path: PathBuf },

    #[error("error reading schema {path:?}: {source}")]
    SchemaReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error creating codec for schema {path:?}: {message}")]
    CodecCreationFailed { path: PathBuf, message: String },

    #[error("could not find codec, was validate_schemas called yet?")]
    NoCodec,

    #[error("could not decode message, expected a record but found {found}")]
    TypeAssertionFailed { found: String },

    #[error("error converting fields: {0}")]
    ConversionFailed(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
