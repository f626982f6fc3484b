//! In-memory catalog for testing and local development.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use product_search_shared::SourceProduct;

use super::{CatalogSource, ProductPage};
use crate::errors::CatalogFetchError;

/// Catalog backed by a map of products ordered by id.
///
/// Listing returns published products only and reports their total count;
/// `get_product` returns products of any status.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<BTreeMap<String, SourceProduct>>,
    list_calls: RwLock<Vec<(u64, u32)>>,
    failing: AtomicBool,
    max_page_size: RwLock<Option<u32>>,
    delay: RwLock<Option<Duration>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with products.
    pub fn with_products(products: Vec<SourceProduct>) -> Self {
        let catalog = Self::new();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    /// Insert or replace a product.
    pub fn insert(&self, product: SourceProduct) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.id.clone(), product);
    }

    /// Remove a product. Returns true if it existed.
    pub fn remove(&self, product_id: &str) -> bool {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(product_id)
            .is_some()
    }

    /// Make every call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Serve at most `max` products per page, whatever limit is requested.
    pub fn set_max_page_size(&self, max: Option<u32>) {
        *self
            .max_page_size
            .write()
            .unwrap_or_else(PoisonError::into_inner) = max;
    }

    /// Delay every call by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self
            .delay
            .write()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// `(offset, limit)` of every listing call so far.
    pub fn list_calls(&self) -> Vec<(u64, u32)> {
        self.list_calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn wait(&self) {
        let delay = *self.delay.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_failing(&self) -> Result<(), CatalogFetchError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogFetchError::status(503, "catalog unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn list_published_products(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<ProductPage, CatalogFetchError> {
        self.list_calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((offset, limit));
        self.check_failing()?;

        self.wait().await;

        let served = self
            .max_page_size
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(limit, |max| limit.min(max));

        let products = self.products.read().unwrap_or_else(PoisonError::into_inner);
        let published: Vec<&SourceProduct> = products
            .values()
            .filter(|p| p.status.is_published())
            .collect();

        Ok(ProductPage {
            count: Some(published.len() as u64),
            products: published
                .into_iter()
                .skip(offset as usize)
                .take(served as usize)
                .cloned()
                .collect(),
        })
    }

    async fn get_product(
        &self,
        product_id: &str,
    ) -> Result<Option<SourceProduct>, CatalogFetchError> {
        self.check_failing()?;
        self.wait().await;
        Ok(self
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(product_id)
            .cloned())
    }
}
