//! Index client error types.
//!
//! This module defines the unified error type for every failure communicating
//! with the search engine: authentication, network, quota and malformed
//! requests all surface here with the underlying cause attached.

use thiserror::Error;

/// Unified errors from search engine operations.
///
/// Used by the `SearchEngine` trait and the `IndexClient` service. Nothing in
/// this crate swallows these errors; callers decide whether to retry or abort.
#[derive(Debug, Clone, Error)]
pub enum IndexClientError {
    /// Invalid input to an index operation (e.g. an empty product id).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The engine did not answer within the configured timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The engine answered with a non-success status (auth, quota, bad request).
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Failed to parse a response from the engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a request for the engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An asynchronous engine task did not complete.
    #[error("Task error: {0}")]
    TaskError(String),

    /// A chunk of a batched upsert or delete failed. Earlier chunks are committed.
    #[error("Chunk {chunk} of {total} failed after {committed} records were committed: {source}")]
    ChunkFailed {
        chunk: usize,
        total: usize,
        committed: usize,
        source: Box<IndexClientError>,
    },

    /// Unknown error.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl IndexClientError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a request failure from a response status and body.
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a task error.
    pub fn task(msg: impl Into<String>) -> Self {
        Self::TaskError(msg.into())
    }

    /// Wrap the failure of one chunk of a batched operation.
    pub fn chunk_failed(
        chunk: usize,
        total: usize,
        committed: usize,
        source: IndexClientError,
    ) -> Self {
        Self::ChunkFailed {
            chunk,
            total,
            committed,
            source: Box::new(source),
        }
    }

    /// Create an unknown error.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }

    /// Whether the engine rejected the credentials.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::RequestFailed { status, .. } => *status == 401 || *status == 403,
            Self::ChunkFailed { source, .. } => source.is_auth_failure(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for IndexClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else if let Some(status) = err.status() {
            Self::RequestFailed {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            Self::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for IndexClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
