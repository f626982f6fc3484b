//! Error types for the product search indexer.

use product_search_repository::IndexClientError;
use thiserror::Error;

/// A (product, variant) pair could not be turned into an index record.
///
/// Only the product and variant identifiers are required; every other field
/// has a fallback. The failing pair is skipped, never the whole batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Failure reading from the source catalog.
#[derive(Error, Debug, Clone)]
pub enum CatalogFetchError {
    /// The request could not be sent or the connection failed.
    #[error("Catalog request error: {0}")]
    RequestError(String),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned status {status}: {body}")]
    StatusError { status: u16, body: String },

    /// The catalog's response did not have the expected shape.
    #[error("Catalog parse error: {0}")]
    ParseError(String),

    /// The call did not complete within its timeout.
    #[error("Catalog timeout: {0}")]
    Timeout(String),
}

impl CatalogFetchError {
    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::StatusError {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}

impl From<reqwest::Error> for CatalogFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::RequestError(err.to_string())
        }
    }
}

/// Failure looking up the stock of one variant remotely.
///
/// Never escapes the inventory resolver; it only ever becomes a quantity of 0.
#[derive(Error, Debug, Clone)]
pub enum InventoryLookupError {
    #[error("Inventory request error: {0}")]
    RequestError(String),

    #[error("Inventory API returned status {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Inventory parse error: {0}")]
    ParseError(String),

    #[error("Inventory timeout: {0}")]
    Timeout(String),
}

impl InventoryLookupError {
    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::StatusError {
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for InventoryLookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::RequestError(err.to_string())
        }
    }
}

/// Errors that abort a sync run or an incremental update.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Reading the catalog failed. Nothing was written to the index.
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogFetchError),

    /// The search engine rejected or failed an operation.
    #[error("Index error: {0}")]
    IndexError(#[from] IndexClientError),

    /// The input could not be transformed at all.
    #[error("Transform error: {0}")]
    TransformError(#[from] TransformError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_wraps_sources() {
        let err: SyncError = CatalogFetchError::status(401, "unauthorized").into();
        assert_eq!(
            err.to_string(),
            "Catalog error: Catalog returned status 401: unauthorized"
        );

        let err: SyncError = IndexClientError::timeout("batch").into();
        assert_eq!(err.to_string(), "Index error: Timeout: batch");

        let err: SyncError = TransformError::MissingField("product.id").into();
        assert_eq!(
            err.to_string(),
            "Transform error: Missing required field: product.id"
        );
    }
}
