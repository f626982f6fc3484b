//! # Product Search
//!
//! Search indexing and query layer for the commerce catalog. Denormalizes the
//! product / variant / price / inventory graph into flat records, keeps an
//! Algolia index consistent with the catalog, and serves filtered queries.
//!
//! ## Architecture
//!
//! 1. **Catalog**: Reads published products from the commerce admin API
//! 2. **Inventory**: Resolves a stocked quantity from whichever inventory shape a variant carries
//! 3. **Processor**: Transforms (product, variant) pairs into index records
//! 4. **Sync**: Full clear-then-repopulate reindex of the catalog
//! 5. **Incremental**: Per-product reindex on lifecycle events
//! 6. **Query**: Translates search requests into engine filters
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`catalog`]: Catalog source trait, HTTP client and in-memory catalog
//! - [`inventory`]: Inventory quantity resolution
//! - [`processor`]: Record transformer
//! - [`sync`]: Catalog sync service
//! - [`incremental`]: Incremental update service
//! - [`query`]: Query service
//! - [`errors`]: Error types for the indexer

pub mod catalog;
pub mod config;
pub mod errors;
pub mod incremental;
pub mod inventory;
pub mod processor;
pub mod query;
pub mod sync;
pub mod utils;

pub use catalog::{CatalogSource, HttpCatalogClient, InMemoryCatalog};
pub use config::{Dependencies, SearchConfig};
pub use errors::{CatalogFetchError, InventoryLookupError, SyncError, TransformError};
pub use incremental::{EventBatchSummary, IncrementalUpdater, ProductEvent, UpdateOutcome};
pub use inventory::{InventoryResolver, InventoryShape};
pub use processor::RecordTransformer;
pub use query::QueryService;
pub use sync::{CatalogSyncService, SyncConfig, SyncReport};

use product_search_repository::IndexClientError;
use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Applying index settings failed.
    #[error("Index setup error: {0}")]
    SetupError(#[from] IndexClientError),

    /// A sync run failed.
    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
