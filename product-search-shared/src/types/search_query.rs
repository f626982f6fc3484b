//! Search query types for the product search index.
//!
//! This module defines the request structures used to search the index.

use serde::{Deserialize, Serialize};

/// Default number of hits per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page the search engine will return.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Structured filters applied to a search.
///
/// Every filter is optional; the ones that are set are ANDed together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SearchFilters {
    /// Exact match against the record's category names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Exact match against the record's currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    /// Inclusive lower price bound in minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<u64>,

    /// Inclusive upper price bound in minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<u64>,

    /// Only records with a positive stocked quantity.
    #[serde(default)]
    pub in_stock: bool,

    /// Records carrying any of these tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl SearchFilters {
    /// Returns true if no filter is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.currency_code.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && !self.in_stock
            && self.tags.is_empty()
    }
}

/// Search request parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query. May be empty to browse by filters only.
    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub filters: SearchFilters,

    /// Zero-based page number.
    #[serde(default)]
    pub page: u32,

    /// Hits per page. Default is 20, maximum is 1000.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl SearchRequest {
    /// Create a request for the first page of a free-text query.
    ///
    /// # Example
    ///
    /// ```
    /// use product_search_shared::SearchRequest;
    ///
    /// let request = SearchRequest::new("shirt").with_page(2).with_page_size(50);
    /// assert_eq!(request.page, 2);
    /// ```
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::default(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the filters.
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Page size as sent to the engine, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Validate the request parameters.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.filters.price_min, self.filters.price_max) {
            if min > max {
                return Err(format!(
                    "price_min ({}) cannot be greater than price_max ({})",
                    min, max
                ));
            }
        }

        if self.filters.tags.iter().any(|t| t.trim().is_empty()) {
            return Err("Tag filters cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new("")
    }
}
