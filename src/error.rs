//! Error types for graph export

use thiserror::Error;

use crate::protocol::RespError;

/// Errors that abort an export run
#[derive(Error, Debug)]
pub enum ExportError {
    /// Endpoint unreachable, handshake refused, or connection dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// Server rejected or failed a query
    #[error("Query error: {0}")]
    Query(String),

    /// Malformed RESP or a reply shape the exporter does not understand
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering of a nested value
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<RespError> for ExportError {
    fn from(err: RespError) -> Self {
        match err {
            RespError::Io(e) => ExportError::Connection(e.to_string()),
            other => ExportError::Protocol(other.to_string()),
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
