//! In-memory search engine for testing and local development.
//!
//! The `InMemorySearchEngine` keeps records in a map keyed by `objectID` and
//! answers queries with a case-insensitive substring match over the
//! searchable attributes, the same `Filter` semantics the real engine uses,
//! and the index's custom ranking. It can be told to fail, which lets tests
//! exercise partial-failure paths without network access.
//!
//! # Example
//!
//! ```ignore
//! use product_search_repository::{IndexClient, InMemorySearchEngine};
//! use std::sync::Arc;
//!
//! let engine = Arc::new(InMemorySearchEngine::new("products"));
//! let client = IndexClient::new(engine.clone());
//! client.upsert_batch(records).await?;
//! assert_eq!(engine.record_count(), 3);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use product_search_shared::IndexRecord;
use serde_json::Value;

use crate::algolia::SEARCHABLE_ATTRIBUTES;
use crate::errors::IndexClientError;
use crate::interfaces::SearchEngine;
use crate::types::{EngineQuery, EngineSearchResponse};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Search engine backed by process memory.
pub struct InMemorySearchEngine {
    index_name: String,
    records: RwLock<BTreeMap<String, IndexRecord>>,
    settings: RwLock<HashMap<String, Value>>,
    save_batches: RwLock<Vec<usize>>,
    delete_batches: RwLock<Vec<usize>>,
    clear_count: AtomicUsize,
    fail_save_on_call: RwLock<Option<usize>>,
    failing: AtomicBool,
}

impl InMemorySearchEngine {
    /// Create an empty engine whose primary index is `index_name`.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            records: RwLock::new(BTreeMap::new()),
            settings: RwLock::new(HashMap::new()),
            save_batches: RwLock::new(Vec::new()),
            delete_batches: RwLock::new(Vec::new()),
            clear_count: AtomicUsize::new(0),
            fail_save_on_call: RwLock::new(None),
            failing: AtomicBool::new(false),
        }
    }

    /// Create an engine pre-populated with records.
    pub fn with_records(index_name: impl Into<String>, records: Vec<IndexRecord>) -> Self {
        let engine = Self::new(index_name);
        engine.insert_records(records);
        engine
    }

    /// Insert records directly, bypassing failure injection and call tracking.
    pub fn insert_records(&self, records: Vec<IndexRecord>) {
        let mut stored = write(&self.records);
        for record in records {
            stored.insert(record.object_id.clone(), record);
        }
    }

    /// Make the `call`-th `save_objects` call (1-based) fail.
    pub fn fail_save_on_call(&self, call: usize) {
        *write(&self.fail_save_on_call) = Some(call);
    }

    /// Make every operation fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of every stored record, ordered by `objectID`.
    pub fn records(&self) -> Vec<IndexRecord> {
        read(&self.records).values().cloned().collect()
    }

    /// Look up one record by `objectID`.
    pub fn get(&self, object_id: &str) -> Option<IndexRecord> {
        read(&self.records).get(object_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        read(&self.records).len()
    }

    /// Settings applied to `index_name`, if any.
    pub fn settings_for(&self, index_name: &str) -> Option<Value> {
        read(&self.settings).get(index_name).cloned()
    }

    /// Sizes of the `save_objects` calls received so far, in order.
    pub fn save_batch_sizes(&self) -> Vec<usize> {
        read(&self.save_batches).clone()
    }

    /// Sizes of the `delete_objects` calls received so far, in order.
    pub fn delete_batch_sizes(&self) -> Vec<usize> {
        read(&self.delete_batches).clone()
    }

    /// Number of `clear_objects` calls received so far.
    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }

    fn check_failing(&self, operation: &str) -> Result<(), IndexClientError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IndexClientError::request_failed(
                503,
                format!("in-memory engine unavailable during {}", operation),
            ));
        }
        Ok(())
    }
}

impl Default for InMemorySearchEngine {
    fn default() -> Self {
        Self::new("products")
    }
}

fn matches_text(record: &IndexRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    SEARCHABLE_ATTRIBUTES.iter().any(|attribute| {
        let values: Vec<&str> = match *attribute {
            "product_title" => vec![record.product_title.as_str()],
            "variant_title" => vec![record.variant_title.as_str()],
            other => record.string_values(other),
        };
        values.iter().any(|v| v.to_lowercase().contains(needle))
    })
}

/// Keep only the named attributes of a hit. Omitted attributes fall back to defaults.
fn project(record: &IndexRecord, attributes: &[String]) -> Result<IndexRecord, IndexClientError> {
    let full = serde_json::to_value(record)?;
    let mut projected = serde_json::Map::new();
    if let Value::Object(fields) = full {
        for (key, value) in fields {
            if attributes.iter().any(|a| a == &key) {
                projected.insert(key, value);
            }
        }
    }
    serde_json::from_value(Value::Object(projected))
        .map_err(|e| IndexClientError::parse(e.to_string()))
}

#[async_trait]
impl SearchEngine for InMemorySearchEngine {
    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn set_settings(
        &self,
        index_name: &str,
        settings: &Value,
    ) -> Result<(), IndexClientError> {
        self.check_failing("set_settings")?;
        write(&self.settings).insert(index_name.to_string(), settings.clone());
        Ok(())
    }

    async fn get_settings(&self, index_name: &str) -> Result<Value, IndexClientError> {
        self.check_failing("get_settings")?;
        read(&self.settings)
            .get(index_name)
            .cloned()
            .ok_or_else(|| {
                IndexClientError::request_failed(
                    404,
                    format!("Index {} does not exist", index_name),
                )
            })
    }

    async fn save_objects(&self, records: &[IndexRecord]) -> Result<(), IndexClientError> {
        self.check_failing("save_objects")?;

        let call = {
            let mut batches = write(&self.save_batches);
            batches.push(records.len());
            batches.len()
        };
        if *read(&self.fail_save_on_call) == Some(call) {
            return Err(IndexClientError::request_failed(
                429,
                format!("save call {} rejected", call),
            ));
        }

        self.insert_records(records.to_vec());
        Ok(())
    }

    async fn delete_objects(&self, object_ids: &[String]) -> Result<(), IndexClientError> {
        self.check_failing("delete_objects")?;
        write(&self.delete_batches).push(object_ids.len());

        let mut stored = write(&self.records);
        for id in object_ids {
            stored.remove(id);
        }
        Ok(())
    }

    async fn search_single_index(
        &self,
        query: &EngineQuery,
    ) -> Result<EngineSearchResponse, IndexClientError> {
        self.check_failing("search")?;

        let needle = query.query.trim().to_lowercase();
        let mut matched: Vec<IndexRecord> = read(&self.records)
            .values()
            .filter(|r| matches_text(r, &needle))
            .filter(|r| query.filter.as_ref().map_or(true, |f| f.matches(r)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            b.stocked_quantity
                .cmp(&a.stocked_quantity)
                .then(a.price.cmp(&b.price))
                .then_with(|| a.object_id.cmp(&b.object_id))
        });

        let hits_per_page = query.hits_per_page.max(1);
        let nb_hits = matched.len() as u64;
        let nb_pages = nb_hits.div_ceil(u64::from(hits_per_page)) as u32;
        let start = (query.page as usize).saturating_mul(hits_per_page as usize);

        let hits = matched
            .into_iter()
            .skip(start)
            .take(hits_per_page as usize)
            .map(|r| match &query.attributes_to_retrieve {
                Some(attributes) => project(&r, attributes),
                None => Ok(r),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EngineSearchResponse {
            hits,
            nb_hits: Some(nb_hits),
            page: Some(query.page),
            nb_pages: Some(nb_pages),
            hits_per_page: Some(hits_per_page),
            processing_time_ms: Some(0),
            query: Some(query.query.clone()),
        })
    }

    async fn clear_objects(&self) -> Result<(), IndexClientError> {
        self.check_failing("clear_objects")?;
        self.clear_count.fetch_add(1, Ordering::SeqCst);
        write(&self.records).clear();
        Ok(())
    }
}
