//! Catalog sync service.
//!
//! Full reindexing of the published catalog: fetch everything, transform,
//! clear the index, then repopulate it.
//!
//! The fetch is read-only and completes before the index is touched, so a
//! catalog failure leaves the index as it was. Clear-then-repopulate has no
//! atomic swap: the index is briefly empty during a run, and an upsert
//! failure leaves it partially repopulated.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use product_search_repository::{IndexClient, UpsertSummary};
use product_search_shared::{IndexRecord, SourceProduct};
use tracing::{error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

use crate::catalog::{fetch_all_published, CatalogSource};
use crate::errors::{CatalogFetchError, SyncError};
use crate::processor::RecordTransformer;

/// Configuration for the sync service.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Products requested per catalog page.
    pub catalog_page_size: u32,
    /// Upper bound for fetching the whole catalog.
    pub catalog_fetch_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            catalog_page_size: 100,
            catalog_fetch_timeout: Duration::from_secs(60),
        }
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Products read from the catalog (or passed in).
    pub products_fetched: usize,
    /// Records written to the index.
    pub records_indexed: usize,
    /// Variants skipped by the transformer plus records dropped by the index client.
    pub records_skipped: usize,
    /// Upsert requests issued.
    pub chunks: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Records produced from a set of products, with the number of variants
/// that could not be transformed.
#[derive(Debug, Default)]
pub struct TransformedBatch {
    pub records: Vec<IndexRecord>,
    pub skipped: usize,
}

/// Transform every product, logging and skipping variants that fail.
pub async fn transform_products(
    transformer: &RecordTransformer,
    products: &[SourceProduct],
) -> TransformedBatch {
    let mut batch = TransformedBatch::default();

    for product in products {
        for result in transformer.transform_product(product).await {
            match result {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    warn!(product_id = %product.id, error = %e, "Skipping variant");
                    batch.skipped += 1;
                }
            }
        }
    }

    batch
}

/// Service that rebuilds the index from the catalog.
pub struct CatalogSyncService {
    catalog: Arc<dyn CatalogSource>,
    transformer: Arc<RecordTransformer>,
    index: Arc<IndexClient>,
    config: SyncConfig,
}

impl CatalogSyncService {
    /// Create a new sync service.
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        transformer: Arc<RecordTransformer>,
        index: Arc<IndexClient>,
        config: SyncConfig,
    ) -> Self {
        Self {
            catalog,
            transformer,
            index,
            config,
        }
    }

    /// Rebuild the index from every published product.
    ///
    /// The run is logged under a span carrying a fresh `sync_run_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReport)` - Counts for the run
    /// * `Err(SyncError::CatalogError)` - If the fetch failed; the index was not touched
    /// * `Err(SyncError::IndexError)` - If clearing or an upsert chunk failed
    pub async fn full_resync(&self) -> Result<SyncReport, SyncError> {
        let span = info_span!("full_resync", sync_run_id = %Uuid::new_v4());
        self.run_full_resync().instrument(span).await
    }

    async fn run_full_resync(&self) -> Result<SyncReport, SyncError> {
        let started_at = Utc::now();
        info!(index = %self.index.index_name(), "Starting full resync");

        let products = self.fetch_catalog().await.map_err(|e| {
            error!(error = %e, "Catalog fetch failed, index left untouched");
            e
        })?;
        info!(products = products.len(), "Catalog fetched");

        let batch = transform_products(&self.transformer, &products).await;

        self.index.clear_all().await?;
        let summary = self.upsert(batch.records).await?;

        let report = SyncReport {
            products_fetched: products.len(),
            records_indexed: summary.upserted,
            records_skipped: batch.skipped + summary.dropped,
            chunks: summary.chunks,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            products = report.products_fetched,
            records_indexed = report.records_indexed,
            records_skipped = report.records_skipped,
            chunks = report.chunks,
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Full resync completed"
        );
        Ok(report)
    }

    async fn fetch_catalog(&self) -> Result<Vec<SourceProduct>, CatalogFetchError> {
        let fetch = fetch_all_published(self.catalog.as_ref(), self.config.catalog_page_size);

        match tokio::time::timeout(self.config.catalog_fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(CatalogFetchError::timeout(format!(
                "catalog fetch exceeded {}s",
                self.config.catalog_fetch_timeout.as_secs()
            ))),
        }
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<UpsertSummary, SyncError> {
        self.index.upsert_batch(records).await.map_err(|e| {
            error!(error = %e, "Upsert failed, index is partially repopulated");
            SyncError::from(e)
        })
    }

    /// Transform and upsert the given products without clearing the index.
    #[instrument(skip(self, products), fields(products = products.len()))]
    pub async fn index_products(
        &self,
        products: &[SourceProduct],
    ) -> Result<SyncReport, SyncError> {
        let started_at = Utc::now();
        let batch = transform_products(&self.transformer, products).await;
        let summary = self.upsert(batch.records).await?;

        Ok(SyncReport {
            products_fetched: products.len(),
            records_indexed: summary.upserted,
            records_skipped: batch.skipped + summary.dropped,
            chunks: summary.chunks,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Upsert already-built records without clearing the index.
    pub async fn index_records(
        &self,
        records: Vec<IndexRecord>,
    ) -> Result<UpsertSummary, SyncError> {
        self.upsert(records).await
    }
}
