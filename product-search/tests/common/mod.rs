//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use product_search::{Dependencies, InMemoryCatalog, InventoryResolver, SearchConfig};
use product_search_repository::{
    EngineQuery, EngineSearchResponse, IndexClientError, InMemorySearchEngine, SearchEngine,
};
use product_search_shared::{IndexRecord, SourceProduct};
use serde_json::{json, Value};

/// Build a product from JSON in the catalog's wire shape.
pub fn product(raw: Value) -> SourceProduct {
    serde_json::from_value(raw).unwrap()
}

/// A published product with the given variants, each carrying a price and stock.
pub fn published(id: &str, title: &str, variants: &[(&str, u64, u64)]) -> SourceProduct {
    let variants: Vec<Value> = variants
        .iter()
        .map(|(variant_id, price, stock)| {
            json!({
                "id": variant_id,
                "title": format!("{} {}", title, variant_id),
                "sku": format!("SKU-{}-{}", id, variant_id),
                "prices": [{"amount": price, "currency_code": "usd"}],
                "inventory_quantity": stock
            })
        })
        .collect();

    product(json!({
        "id": id,
        "title": title,
        "status": "published",
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-02T12:00:00Z",
        "variants": variants
    }))
}

/// Wiring around in-memory collaborators.
pub struct Harness {
    pub catalog: Arc<InMemoryCatalog>,
    pub engine: Arc<RecordingEngine>,
    pub deps: Dependencies,
}

impl Harness {
    pub fn new(products: Vec<SourceProduct>) -> Self {
        Self::with_config(products, SearchConfig::default())
    }

    pub fn with_config(products: Vec<SourceProduct>, config: SearchConfig) -> Self {
        let catalog = Arc::new(InMemoryCatalog::with_products(products));
        let engine = Arc::new(RecordingEngine::new());
        let deps = Dependencies::with_components(
            config,
            engine.clone(),
            catalog.clone(),
            InventoryResolver::new(),
        );
        Self {
            catalog,
            engine,
            deps,
        }
    }

    pub fn object_ids(&self) -> Vec<String> {
        self.engine
            .inner
            .records()
            .into_iter()
            .map(|r| r.object_id)
            .collect()
    }
}

/// Engine operation, as observed by `RecordingEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOp {
    SetSettings(String),
    Save(usize),
    Delete(usize),
    Search,
    Clear,
}

/// In-memory engine that also records the order of operations.
pub struct RecordingEngine {
    pub inner: InMemorySearchEngine,
    ops: Mutex<Vec<EngineOp>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            inner: InMemorySearchEngine::new("products"),
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn ops(&self) -> Vec<EngineOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn reset_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    fn push(&self, op: EngineOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl SearchEngine for RecordingEngine {
    fn index_name(&self) -> &str {
        self.inner.index_name()
    }

    async fn set_settings(
        &self,
        index_name: &str,
        settings: &Value,
    ) -> Result<(), IndexClientError> {
        self.push(EngineOp::SetSettings(index_name.to_string()));
        self.inner.set_settings(index_name, settings).await
    }

    async fn get_settings(&self, index_name: &str) -> Result<Value, IndexClientError> {
        self.inner.get_settings(index_name).await
    }

    async fn save_objects(&self, records: &[IndexRecord]) -> Result<(), IndexClientError> {
        self.push(EngineOp::Save(records.len()));
        self.inner.save_objects(records).await
    }

    async fn delete_objects(&self, object_ids: &[String]) -> Result<(), IndexClientError> {
        self.push(EngineOp::Delete(object_ids.len()));
        self.inner.delete_objects(object_ids).await
    }

    async fn search_single_index(
        &self,
        query: &EngineQuery,
    ) -> Result<EngineSearchResponse, IndexClientError> {
        self.push(EngineOp::Search);
        self.inner.search_single_index(query).await
    }

    async fn clear_objects(&self) -> Result<(), IndexClientError> {
        self.push(EngineOp::Clear);
        self.inner.clear_objects().await
    }
}
