//! Search result types for the product search index.
//!
//! This module defines the normalized response returned from search operations.

use serde::{Deserialize, Serialize};

use crate::types::index_record::IndexRecord;

/// Complete search response with hits and paging metadata.
///
/// Every field is always present, even when the engine omitted it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    /// The matching records for the requested page.
    pub hits: Vec<IndexRecord>,

    /// Total number of matching records across all pages.
    pub total_hits: u64,

    /// Zero-based page number of this response.
    pub page: u32,

    /// Total number of pages.
    pub total_pages: u32,

    /// Hits per page used for this response.
    pub page_size: u32,

    /// Time taken by the engine in milliseconds.
    pub processing_time_ms: u64,

    /// The query string the engine actually used.
    pub query: String,
}

impl SearchResult {
    /// Create an empty result for the given query and paging.
    pub fn empty(query: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self {
            hits: Vec::new(),
            total_hits: 0,
            page,
            total_pages: 0,
            page_size,
            processing_time_ms: 0,
            query: query.into(),
        }
    }

    /// Returns true if there are no hits on this page.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits on this page.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}
