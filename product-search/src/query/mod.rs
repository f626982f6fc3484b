//! Query service.
//!
//! Translates a search request into the engine's query and filter language
//! and normalizes the response.

use std::sync::Arc;

use product_search_repository::{
    EngineQuery, EngineSearchResponse, Filter, IndexClient, IndexClientError,
};
use product_search_shared::{ProductStatus, SearchFilters, SearchRequest, SearchResult};
use tracing::{debug, instrument};

/// Upper price bound used when only `price_min` is given (2^53 - 1).
pub const UNBOUNDED_PRICE: u64 = 9_007_199_254_740_991;

/// Build the filter for a request.
///
/// Every set filter is ANDed; tags are OR-combined among themselves. The
/// `status = published` clause is always appended and cannot be overridden.
pub fn build_filter(filters: &SearchFilters) -> Filter {
    let mut clauses = Vec::new();

    if let Some(category) = filters.category.as_deref() {
        clauses.push(Filter::eq("categories", category));
    }
    if let Some(currency) = filters.currency_code.as_deref() {
        clauses.push(Filter::eq("currency_code", currency));
    }
    if filters.price_min.is_some() || filters.price_max.is_some() {
        clauses.push(Filter::range(
            "price",
            filters.price_min.unwrap_or(0),
            filters.price_max.unwrap_or(UNBOUNDED_PRICE),
        ));
    }
    if filters.in_stock {
        clauses.push(Filter::greater_than("stocked_quantity", 0));
    }
    if !filters.tags.is_empty() {
        clauses.push(Filter::any_of("tags", filters.tags.iter().cloned()));
    }

    clauses.push(Filter::eq("status", ProductStatus::Published.as_str()));
    Filter::And(clauses)
}

/// Normalize an engine response. Missing numeric fields become 0; a
/// missing query falls back to the requested one.
pub fn normalize_response(response: EngineSearchResponse, requested_query: &str) -> SearchResult {
    SearchResult {
        hits: response.hits,
        total_hits: response.nb_hits.unwrap_or(0),
        page: response.page.unwrap_or(0),
        total_pages: response.nb_pages.unwrap_or(0),
        page_size: response.hits_per_page.unwrap_or(0),
        processing_time_ms: response.processing_time_ms.unwrap_or(0),
        query: response
            .query
            .unwrap_or_else(|| requested_query.to_string()),
    }
}

/// Service answering product searches.
pub struct QueryService {
    index: Arc<IndexClient>,
}

impl QueryService {
    pub fn new(index: Arc<IndexClient>) -> Self {
        Self { index }
    }

    /// Search published records.
    ///
    /// # Arguments
    ///
    /// * `query` - Free text; empty browses by filters only
    /// * `filters` - Structured filters
    /// * `page` - Zero-based page
    /// * `page_size` - Hits per page, clamped to 1..=1000
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - Normalized result, possibly with zero hits
    /// * `Err(IndexClientError)` - If the filters are invalid or the engine failed
    pub async fn search(
        &self,
        query: &str,
        filters: SearchFilters,
        page: u32,
        page_size: u32,
    ) -> Result<SearchResult, IndexClientError> {
        let request = SearchRequest::new(query)
            .with_filters(filters)
            .with_page(page)
            .with_page_size(page_size);
        self.search_request(&request).await
    }

    /// Search with a prepared request.
    #[instrument(skip(self, request), fields(query = %request.query, page = request.page))]
    pub async fn search_request(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResult, IndexClientError> {
        request.validate().map_err(IndexClientError::validation)?;

        let filter = build_filter(&request.filters);
        debug!(filter = %filter, "Built search filter");

        let engine_query = EngineQuery::new(request.query.clone())
            .with_filter(filter)
            .with_page(request.page, request.effective_page_size());
        let response = self.index.search(&engine_query).await?;

        Ok(normalize_response(response, &request.query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_default_is_published_only() {
        assert_eq!(
            build_filter(&SearchFilters::default()).to_string(),
            r#"status:"published""#
        );
    }

    #[test]
    fn test_build_filter_all_clauses() {
        let filters = SearchFilters {
            category: Some("Shirts".to_string()),
            currency_code: Some("eur".to_string()),
            price_min: Some(500),
            price_max: Some(1500),
            in_stock: true,
            tags: vec!["summer".to_string(), "sale".to_string()],
        };

        assert_eq!(
            build_filter(&filters).to_string(),
            r#"categories:"Shirts" AND currency_code:"eur" AND price:500 TO 1500 AND stocked_quantity > 0 AND (tags:"summer" OR tags:"sale") AND status:"published""#
        );
    }

    #[test]
    fn test_build_filter_open_price_bounds() {
        let min_only = SearchFilters {
            price_min: Some(100),
            ..Default::default()
        };
        let max_only = SearchFilters {
            price_max: Some(900),
            ..Default::default()
        };

        assert_eq!(
            build_filter(&min_only).to_string(),
            r#"price:100 TO 9007199254740991 AND status:"published""#
        );
        assert_eq!(
            build_filter(&max_only).to_string(),
            r#"price:0 TO 900 AND status:"published""#
        );
    }

    #[test]
    fn test_normalize_fills_missing_fields() {
        let result = normalize_response(EngineSearchResponse::default(), "mug");

        assert_eq!(result, SearchResult::empty("mug", 0, 0));
    }
}
