//! Algolia implementation of the search engine.

mod index_config;
mod provider;

pub use index_config::{
    get_index_settings, get_replica_settings, IndexConfig, ReplicaOrder, DEFAULT_INDEX_NAME,
    SEARCHABLE_ATTRIBUTES,
};
pub use provider::{AlgoliaConfig, AlgoliaProvider};
