use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Note is not valid UTF-8: {0}")]
    DecodeError(#[from] std::string::FromUtf8Error),

    #[error("Invalid note path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}
