//! Configuration types for the IndexClient.

/// Default number of records sent to the engine per batch request.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Configuration for the IndexClient.
///
/// Chunks are sent one after another, never concurrently.
#[derive(Debug, Clone)]
pub struct IndexClientConfig {
    /// Maximum number of records in a single save or delete request.
    ///
    /// Defaults to 1000. Values below 1 are treated as 1.
    pub chunk_size: usize,

    /// Hits per page when listing the records of a product before deleting them.
    pub delete_lookup_page_size: u32,
}

impl Default for IndexClientConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            delete_lookup_page_size: 1000,
        }
    }
}

impl IndexClientConfig {
    /// Create a config with a custom chunk size.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - Maximum number of records per engine request
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// The chunk size actually used, never zero.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
