//! Incremental update service.
//!
//! Applies targeted index updates for single-product lifecycle events. A
//! created or updated product (or any variant event) reindexes the whole
//! product: refetch, transform, delete the product's existing records, then
//! upsert the fresh set, so a variant removed between updates leaves no
//! orphaned record. A deleted product only has its records removed.
//!
//! Events for the same product are serialized through an in-process lock;
//! events for different products run independently.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use product_search_repository::IndexClient;
use product_search_shared::SourceProduct;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::CatalogSource;
use crate::errors::{SyncError, TransformError};
use crate::processor::RecordTransformer;
use crate::sync::transform_products;

/// A catalog lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    ProductCreated { product_id: String },
    ProductUpdated { product_id: String },
    ProductDeleted { product_id: String },
    VariantCreated { product_id: String, variant_id: String },
    VariantUpdated { product_id: String, variant_id: String },
    VariantDeleted { product_id: String, variant_id: String },
}

impl ProductEvent {
    pub fn product_created(product_id: impl Into<String>) -> Self {
        Self::ProductCreated {
            product_id: product_id.into(),
        }
    }

    pub fn product_updated(product_id: impl Into<String>) -> Self {
        Self::ProductUpdated {
            product_id: product_id.into(),
        }
    }

    pub fn product_deleted(product_id: impl Into<String>) -> Self {
        Self::ProductDeleted {
            product_id: product_id.into(),
        }
    }

    pub fn variant_created(product_id: impl Into<String>, variant_id: impl Into<String>) -> Self {
        Self::VariantCreated {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
        }
    }

    pub fn variant_updated(product_id: impl Into<String>, variant_id: impl Into<String>) -> Self {
        Self::VariantUpdated {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
        }
    }

    pub fn variant_deleted(product_id: impl Into<String>, variant_id: impl Into<String>) -> Self {
        Self::VariantDeleted {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
        }
    }

    /// The product the event applies to. Variant events apply to their owning product.
    pub fn product_id(&self) -> &str {
        match self {
            Self::ProductCreated { product_id }
            | Self::ProductUpdated { product_id }
            | Self::ProductDeleted { product_id }
            | Self::VariantCreated { product_id, .. }
            | Self::VariantUpdated { product_id, .. }
            | Self::VariantDeleted { product_id, .. } => product_id,
        }
    }

    /// Event name as used in logs, e.g. `product.updated`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProductCreated { .. } => "product.created",
            Self::ProductUpdated { .. } => "product.updated",
            Self::ProductDeleted { .. } => "product.deleted",
            Self::VariantCreated { .. } => "product-variant.created",
            Self::VariantUpdated { .. } => "product-variant.updated",
            Self::VariantDeleted { .. } => "product-variant.deleted",
        }
    }
}

impl fmt::Display for ProductEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.product_id())
    }
}

/// What an update did to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The product's records were replaced.
    Reindexed { deleted: usize, indexed: usize },
    /// The product's records were removed.
    Removed { deleted: usize },
}

/// A failed event and its error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFailure {
    pub event: ProductEvent,
    pub error: String,
}

/// Result of handling a batch of events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<EventFailure>,
}

type ProductLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// A task's reference to a product lock. Dropping the last one outside the
/// map removes the map entry.
struct LockEntry<'a> {
    locks: &'a ProductLocks,
    product_id: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for LockEntry<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = locks
            .get(self.product_id)
            .is_some_and(|held| Arc::ptr_eq(held, &self.lock) && Arc::strong_count(held) == 2);
        if unused {
            locks.remove(self.product_id);
        }
    }
}

/// Service applying single-product updates to the index.
pub struct IncrementalUpdater {
    catalog: Arc<dyn CatalogSource>,
    transformer: Arc<RecordTransformer>,
    index: Arc<IndexClient>,
    locks: ProductLocks,
}

impl IncrementalUpdater {
    /// Create a new incremental updater.
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        transformer: Arc<RecordTransformer>,
        index: Arc<IndexClient>,
    ) -> Self {
        Self {
            catalog,
            transformer,
            index,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run `work` while holding the lock for `product_id`.
    ///
    /// The lock entry is removed once no other task holds or waits for it,
    /// including when the returned future is dropped before completing.
    async fn with_product_lock<F, T>(&self, product_id: &str, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let entry = LockEntry {
            locks: &self.locks,
            product_id,
            lock: self
                .locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(product_id.to_string())
                .or_default()
                .clone(),
        };

        let _guard = entry.lock.lock().await;
        work.await
    }

    /// Number of products with a live lock entry.
    pub fn active_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Replace the index records of a product with records built from `product`.
    ///
    /// Variants are transformed before anything is deleted. A product that
    /// is not published has its records removed instead.
    ///
    /// # Returns
    ///
    /// * `Ok(UpdateOutcome)` - What was written
    /// * `Err(SyncError::TransformError)` - If the product has no id
    /// * `Err(SyncError::IndexError)` - If the delete or the upsert failed
    pub async fn update_product(
        &self,
        product: &SourceProduct,
    ) -> Result<UpdateOutcome, SyncError> {
        if product.id.trim().is_empty() {
            return Err(TransformError::MissingField("product.id").into());
        }
        self.with_product_lock(&product.id, self.apply_product(product))
            .await
    }

    /// Remove every record of a product.
    pub async fn delete_product(&self, product_id: &str) -> Result<usize, SyncError> {
        self.with_product_lock(product_id, self.remove_records(product_id))
            .await
    }

    /// Refetch a product from the catalog and reindex it.
    ///
    /// A product the catalog no longer returns is removed from the index.
    pub async fn reindex_product(&self, product_id: &str) -> Result<UpdateOutcome, SyncError> {
        self.with_product_lock(product_id, self.refetch_and_apply(product_id))
            .await
    }

    async fn refetch_and_apply(&self, product_id: &str) -> Result<UpdateOutcome, SyncError> {
        match self.catalog.get_product(product_id).await? {
            Some(product) => self.apply_product(&product).await,
            None => {
                debug!(product_id, "Product no longer in catalog");
                let deleted = self.remove_records(product_id).await?;
                Ok(UpdateOutcome::Removed { deleted })
            }
        }
    }

    async fn apply_product(&self, product: &SourceProduct) -> Result<UpdateOutcome, SyncError> {
        if !product.status.is_published() {
            debug!(product_id = %product.id, status = %product.status, "Product not published");
            let deleted = self.remove_records(&product.id).await?;
            return Ok(UpdateOutcome::Removed { deleted });
        }

        let batch = transform_products(&self.transformer, std::slice::from_ref(product)).await;

        let deleted = self.index.delete_by_product_id(&product.id).await?;
        let summary = self.index.upsert_batch(batch.records).await?;

        info!(
            product_id = %product.id,
            deleted,
            indexed = summary.upserted,
            skipped = batch.skipped + summary.dropped,
            "Product reindexed"
        );
        Ok(UpdateOutcome::Reindexed {
            deleted,
            indexed: summary.upserted,
        })
    }

    async fn remove_records(&self, product_id: &str) -> Result<usize, SyncError> {
        let deleted = self.index.delete_by_product_id(product_id).await?;
        info!(product_id, deleted, "Product records removed");
        Ok(deleted)
    }

    /// Apply one lifecycle event.
    #[instrument(skip(self, event), fields(event = %event))]
    pub async fn handle_event(&self, event: &ProductEvent) -> Result<UpdateOutcome, SyncError> {
        match event {
            ProductEvent::ProductDeleted { product_id } => {
                let deleted = self.delete_product(product_id).await?;
                Ok(UpdateOutcome::Removed { deleted })
            }
            _ => self.reindex_product(event.product_id()).await,
        }
    }

    /// Apply a batch of events in order.
    ///
    /// Each event is isolated: a failure is logged and recorded in the
    /// summary, and processing continues with the next event.
    pub async fn handle_events(&self, events: &[ProductEvent]) -> EventBatchSummary {
        let mut summary = EventBatchSummary {
            total: events.len(),
            ..Default::default()
        };

        for event in events {
            match self.handle_event(event).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    error!(event = %event, error = %e, "Failed to handle event");
                    summary.failed += 1;
                    summary.failures.push(EventFailure {
                        event: event.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if summary.failed > 0 {
            warn!(
                total = summary.total,
                failed = summary.failed,
                "Event batch completed with failures"
            );
        }
        summary
    }
}
