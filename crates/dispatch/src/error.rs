use thiserror::Error;

/// Failure to turn a decoded value into printable JSON.
#[derive(Error, Debug)]
pub enum PresentError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("formatted output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors surfaced by the dispatch task itself.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("dispatch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
