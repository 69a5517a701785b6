use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum StorageError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ReadError(msg) => write!(f, "failed to read: {}", msg),
            StorageError::WriteError(msg) => write!(f, "failed to write: {}", msg),
            StorageError::ParseError(msg) => write!(f, "failed to parse: {}", msg),
            StorageError::SerializeError(msg) => write!(f, "failed to serialize: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::ReadError(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::ParseError(e.to_string())
    }
}

impl From<StorageError> for String {
    fn from(e: StorageError) -> Self {
        e.to_string()
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
