//! # Product Search Shared
//!
//! This crate defines shared data structures used across the product search
//! indexer. It includes the read-only shapes of the source catalog, the flat
//! `IndexRecord` stored in the search engine, and the search request/result
//! types used on the query path.

pub mod types;

pub use types::index_record::{IndexRecord, DEFAULT_VARIANT_ID};
pub use types::search_query::{SearchFilters, SearchRequest};
pub use types::search_result::SearchResult;
pub use types::source_product::{
    InventoryItemEntry, InventoryObject, ProductStatus, SourceCategory, SourceInventory,
    SourceOption, SourceOptionDefinition, SourcePrice, SourceProduct, SourceTag, SourceVariant,
};
