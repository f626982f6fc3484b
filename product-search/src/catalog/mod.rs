//! Source catalog collaborator.
//!
//! The indexer reads products through the `CatalogSource` trait so the sync
//! and incremental paths do not depend on how the catalog is reached.
//! `HttpCatalogClient` talks to the commerce admin API; `InMemoryCatalog`
//! backs tests and local runs.

mod http_client;
mod memory;

pub use http_client::{HttpCatalogClient, PRODUCT_FIELDS};
pub use memory::InMemoryCatalog;

use async_trait::async_trait;
use product_search_shared::SourceProduct;
use serde::Deserialize;
use tracing::debug;

use crate::errors::CatalogFetchError;

/// Largest page the catalog API serves.
pub const MAX_CATALOG_PAGE_SIZE: u32 = 1000;

/// One page of published products.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<SourceProduct>,
    /// Total number of matching products, when the catalog reports it.
    #[serde(default)]
    pub count: Option<u64>,
}

/// Read access to the product catalog, with variants, prices, options,
/// inventory, categories and tags expanded.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List one page of published products.
    async fn list_published_products(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<ProductPage, CatalogFetchError>;

    /// Fetch one product regardless of status. `Ok(None)` if it does not exist.
    async fn get_product(&self, product_id: &str)
        -> Result<Option<SourceProduct>, CatalogFetchError>;
}

/// Fetch every published product, page by page.
///
/// When the catalog reports a `count`, pages are requested until that many
/// products have been read or a page comes back empty; a catalog may serve
/// fewer rows than requested. Without a `count`, the first short page ends
/// the fetch. Any page failure fails the whole fetch; partial results are
/// discarded.
pub async fn fetch_all_published(
    catalog: &dyn CatalogSource,
    page_size: u32,
) -> Result<Vec<SourceProduct>, CatalogFetchError> {
    let limit = page_size.clamp(1, MAX_CATALOG_PAGE_SIZE);
    let mut products = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let page = catalog.list_published_products(offset, limit).await?;
        let received = page.products.len();
        products.extend(page.products);
        offset += received as u64;

        debug!(offset, received, count = ?page.count, "Fetched catalog page");

        let done = match page.count {
            Some(count) => received == 0 || offset >= count,
            None => received < limit as usize,
        };
        if done {
            break;
        }
    }

    Ok(products)
}
