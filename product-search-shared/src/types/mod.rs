//! This module defines the core data structures used across the product search indexer.

pub mod index_record;
pub mod search_query;
pub mod search_result;
pub mod source_product;

pub use index_record::IndexRecord;
pub use search_query::{SearchFilters, SearchRequest};
pub use search_result::SearchResult;
pub use source_product::{SourceProduct, SourceVariant};
