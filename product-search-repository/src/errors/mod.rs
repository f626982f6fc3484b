//! Error types for the product search repository.
//!
//! This module provides a unified error type for all search engine operations.

mod index_client_error;

pub use index_client_error::IndexClientError;
