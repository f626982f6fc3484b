//! Request and response types for search engine operations.

use product_search_shared::IndexRecord;
use serde::{Deserialize, Serialize};

use crate::filters::Filter;

/// A query against the primary index.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineQuery {
    /// Free-text query; empty matches every record.
    pub query: String,
    /// Optional filter expression.
    pub filter: Option<Filter>,
    /// Zero-based page.
    pub page: u32,
    /// Hits per page.
    pub hits_per_page: u32,
    /// Restrict the attributes returned in hits. `None` returns all.
    pub attributes_to_retrieve: Option<Vec<String>>,
}

impl EngineQuery {
    /// Create a query for the first page with default paging.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filter: None,
            page: 0,
            hits_per_page: 20,
            attributes_to_retrieve: None,
        }
    }

    /// Set the filter expression.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the page and hits per page.
    pub fn with_page(mut self, page: u32, hits_per_page: u32) -> Self {
        self.page = page;
        self.hits_per_page = hits_per_page;
        self
    }

    /// Only return the given attributes in hits.
    pub fn retrieving(mut self, attributes: &[&str]) -> Self {
        self.attributes_to_retrieve = Some(attributes.iter().map(|a| a.to_string()).collect());
        self
    }
}

/// Raw search response from the engine.
///
/// Metadata fields are optional because engines are not guaranteed to return
/// all of them; the query service normalizes missing values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EngineSearchResponse {
    #[serde(default)]
    pub hits: Vec<IndexRecord>,
    #[serde(rename = "nbHits", default)]
    pub nb_hits: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(rename = "nbPages", default)]
    pub nb_pages: Option<u32>,
    #[serde(rename = "hitsPerPage", default)]
    pub hits_per_page: Option<u32>,
    #[serde(rename = "processingTimeMS", default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub query: Option<String>,
}

/// Statistics about the primary index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    pub index_name: String,
    /// Number of records currently searchable in the index.
    pub record_count: u64,
}

/// Summary of a chunked upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Number of records submitted by the caller.
    pub total: usize,
    /// Number of records written to the engine.
    pub upserted: usize,
    /// Number of records dropped because they lacked an id or product title.
    pub dropped: usize,
    /// Number of engine requests issued.
    pub chunks: usize,
}
