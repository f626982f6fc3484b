//! Search engine trait definition.
//!
//! This module defines the abstract interface for engine operations, allowing
//! for different backend implementations (Algolia, in-memory, etc.).

use async_trait::async_trait;
use product_search_shared::IndexRecord;
use serde_json::Value;

use crate::errors::IndexClientError;
use crate::types::{EngineQuery, EngineSearchResponse};

/// Abstracts the underlying search engine.
///
/// Implementations are injected into `IndexClient`, which adds chunking,
/// validation and the composite operations (delete-by-product-id, stats) on
/// top of these primitives. Data operations target the implementation's
/// primary index; settings operations name their index explicitly so that
/// replicas can be configured through the same interface.
///
/// All methods may suspend and every failure is returned as an
/// `IndexClientError`.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Name of the primary index this engine writes to and reads from.
    fn index_name(&self) -> &str;

    /// Replace the settings of an index.
    async fn set_settings(&self, index_name: &str, settings: &Value)
        -> Result<(), IndexClientError>;

    /// Read the current settings of an index.
    async fn get_settings(&self, index_name: &str) -> Result<Value, IndexClientError>;

    /// Create or fully replace records by `objectID` in a single request.
    async fn save_objects(&self, records: &[IndexRecord]) -> Result<(), IndexClientError>;

    /// Delete records by `objectID` in a single request.
    ///
    /// Ids that do not exist are ignored.
    async fn delete_objects(&self, object_ids: &[String]) -> Result<(), IndexClientError>;

    /// Run a query against the primary index.
    async fn search_single_index(
        &self,
        query: &EngineQuery,
    ) -> Result<EngineSearchResponse, IndexClientError>;

    /// Remove every record from the primary index, keeping its settings.
    async fn clear_objects(&self) -> Result<(), IndexClientError>;
}
