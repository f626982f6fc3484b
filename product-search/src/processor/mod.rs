//! Processor module for the product search indexer.
//!
//! Transforms catalog products into index records.

mod record_transformer;

pub use record_transformer::RecordTransformer;
