//! Index client service implementation.
//!
//! This module provides the main service for interacting with the product
//! index. The sync, incremental and query paths all go through it.

use std::sync::Arc;

use product_search_shared::IndexRecord;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::algolia::{get_index_settings, get_replica_settings, IndexConfig, ReplicaOrder};
use crate::config::IndexClientConfig;
use crate::errors::IndexClientError;
use crate::filters::Filter;
use crate::interfaces::SearchEngine;
use crate::types::{EngineQuery, EngineSearchResponse, IndexStats, UpsertSummary};

/// The main service for interacting with the search index.
///
/// This is the high-level API that application code should use. It validates
/// input, splits large writes into chunks, and delegates to a `SearchEngine`
/// for the actual backend operations. All operations return
/// `IndexClientError`.
///
/// Chunks are written sequentially. When a chunk fails, the chunks before it
/// stay committed and the error reports how many records that was.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use product_search_repository::{AlgoliaConfig, AlgoliaProvider, IndexClient, IndexConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AlgoliaConfig::new("APPID", "write-key", IndexConfig::new("products"));
/// let client = IndexClient::new(Arc::new(AlgoliaProvider::new(config)?));
///
/// client.configure_index().await?;
/// let removed = client.delete_by_product_id("prod_1").await?;
/// # Ok(())
/// # }
/// ```
pub struct IndexClient {
    engine: Arc<dyn SearchEngine>,
    config: IndexClientConfig,
}

impl IndexClient {
    /// Create a new IndexClient with default configuration.
    ///
    /// The default configuration writes at most 1000 records per request.
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self {
            engine,
            config: IndexClientConfig::default(),
        }
    }

    /// Create a new IndexClient with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `engine` - The search engine implementation (e.g. `AlgoliaProvider`)
    /// * `config` - Custom chunking configuration
    pub fn with_config(engine: Arc<dyn SearchEngine>, config: IndexClientConfig) -> Self {
        Self { engine, config }
    }

    /// Name of the primary index.
    pub fn index_name(&self) -> &str {
        self.engine.index_name()
    }

    /// Apply the product index settings to the primary index and its replicas.
    ///
    /// The primary is configured first because it declares the replicas.
    /// Applying the same settings again is a no-op from the caller's view.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every index accepted its settings
    /// * `Err(IndexClientError)` - On the first index that rejects them
    pub async fn configure_index(&self) -> Result<(), IndexClientError> {
        let index = IndexConfig::new(self.index_name());

        self.engine
            .set_settings(&index.index_name, &get_index_settings(&index))
            .await?;

        for order in ReplicaOrder::ALL {
            let replica = index.replica_name(order);
            self.engine
                .set_settings(&replica, &get_replica_settings(order))
                .await?;
        }

        info!(
            index = %index.index_name,
            replicas = ?index.replica_names(),
            "Index configured"
        );
        Ok(())
    }

    /// Read the current settings of the primary index.
    pub async fn get_settings(&self) -> Result<Value, IndexClientError> {
        self.engine.get_settings(self.index_name()).await
    }

    /// Create or replace records by object id, in chunks.
    ///
    /// Records without an object id or product title are dropped with a
    /// warning and counted in the summary. An empty input makes no engine
    /// call.
    ///
    /// # Returns
    ///
    /// * `Ok(UpsertSummary)` - Counts of submitted, written and dropped records
    /// * `Err(IndexClientError::ChunkFailed)` - If a chunk fails; earlier chunks stay committed
    pub async fn upsert_batch(
        &self,
        records: Vec<IndexRecord>,
    ) -> Result<UpsertSummary, IndexClientError> {
        let total = records.len();
        let (indexable, dropped): (Vec<IndexRecord>, Vec<IndexRecord>) =
            records.into_iter().partition(IndexRecord::is_indexable);

        for record in &dropped {
            warn!(
                object_id = %record.object_id,
                product_id = %record.product_id,
                "Dropping record without object id or product title"
            );
        }

        let chunk_size = self.config.effective_chunk_size();
        let chunk_count = indexable.len().div_ceil(chunk_size);
        let mut upserted = 0;

        for (i, chunk) in indexable.chunks(chunk_size).enumerate() {
            if let Err(e) = self.engine.save_objects(chunk).await {
                error!(
                    chunk = i + 1,
                    chunks = chunk_count,
                    committed = upserted,
                    error = %e,
                    "Upsert chunk failed"
                );
                return Err(IndexClientError::chunk_failed(i + 1, chunk_count, upserted, e));
            }
            upserted += chunk.len();
            debug!(chunk = i + 1, chunks = chunk_count, size = chunk.len(), "Upsert chunk written");
        }

        Ok(UpsertSummary {
            total,
            upserted,
            dropped: dropped.len(),
            chunks: chunk_count,
        })
    }

    /// Delete records by object id, in chunks. Unknown ids are ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every chunk was deleted
    /// * `Err(IndexClientError::ChunkFailed)` - If a chunk fails; earlier chunks stay deleted
    pub async fn delete_records(&self, object_ids: &[String]) -> Result<(), IndexClientError> {
        let chunk_size = self.config.effective_chunk_size();
        let chunk_count = object_ids.len().div_ceil(chunk_size);
        let mut deleted = 0;

        for (i, chunk) in object_ids.chunks(chunk_size).enumerate() {
            self.engine
                .delete_objects(chunk)
                .await
                .map_err(|e| IndexClientError::chunk_failed(i + 1, chunk_count, deleted, e))?;
            deleted += chunk.len();
        }

        Ok(())
    }

    /// Delete every record belonging to a product.
    ///
    /// Lists the product's records through a `product_id` filter, retrieving
    /// only their object ids, then deletes them. A product with no records is
    /// a no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records deleted
    /// * `Err(IndexClientError::ValidationError)` - If `product_id` is empty
    /// * `Err(IndexClientError)` - If listing or deleting fails
    pub async fn delete_by_product_id(&self, product_id: &str) -> Result<usize, IndexClientError> {
        if product_id.trim().is_empty() {
            return Err(IndexClientError::validation("product_id is required"));
        }

        let object_ids = self.object_ids_for_product(product_id).await?;
        if object_ids.is_empty() {
            debug!(product_id, "No records to delete");
            return Ok(0);
        }

        self.delete_records(&object_ids).await?;

        info!(product_id, count = object_ids.len(), "Deleted product records");
        Ok(object_ids.len())
    }

    async fn object_ids_for_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<String>, IndexClientError> {
        let page_size = self.config.delete_lookup_page_size.max(1);
        let mut object_ids = Vec::new();
        let mut page = 0;

        loop {
            let query = EngineQuery::new("")
                .with_filter(Filter::eq("product_id", product_id))
                .with_page(page, page_size)
                .retrieving(&["objectID"]);
            let response = self.engine.search_single_index(&query).await?;

            if response.hits.is_empty() {
                break;
            }
            object_ids.extend(response.hits.into_iter().map(|hit| hit.object_id));

            page += 1;
            if page >= response.nb_pages.unwrap_or(0) {
                break;
            }
        }

        Ok(object_ids)
    }

    /// Remove every record from the primary index, keeping its settings.
    pub async fn clear_all(&self) -> Result<(), IndexClientError> {
        self.engine.clear_objects().await?;
        warn!(index = %self.index_name(), "All records cleared from index");
        Ok(())
    }

    /// Report the index name and its current record count.
    pub async fn get_stats(&self) -> Result<IndexStats, IndexClientError> {
        let response = self
            .engine
            .search_single_index(&EngineQuery::new("").with_page(0, 0))
            .await?;

        Ok(IndexStats {
            index_name: self.index_name().to_string(),
            record_count: response.nb_hits.unwrap_or(0),
        })
    }

    /// Run a query against the primary index.
    pub async fn search(
        &self,
        query: &EngineQuery,
    ) -> Result<EngineSearchResponse, IndexClientError> {
        self.engine.search_single_index(query).await
    }
}
