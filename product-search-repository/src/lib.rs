//! # Product Search Repository
//!
//! This crate provides traits and implementations for interacting with the
//! product search index. It includes the error type, the `SearchEngine`
//! interface, a concrete implementation for Algolia, an in-memory engine for
//! tests and local development, and the `IndexClient` service that the
//! indexer and query paths use.

pub mod algolia;
pub mod config;
pub mod errors;
pub mod filters;
pub mod interfaces;
pub mod memory;
pub mod service;
pub mod types;

pub use algolia::{AlgoliaConfig, AlgoliaProvider, IndexConfig, ReplicaOrder};
pub use config::IndexClientConfig;
pub use errors::IndexClientError;
pub use filters::Filter;
pub use interfaces::SearchEngine;
pub use memory::InMemorySearchEngine;
pub use service::IndexClient;
pub use types::{EngineQuery, EngineSearchResponse, IndexStats, UpsertSummary};
