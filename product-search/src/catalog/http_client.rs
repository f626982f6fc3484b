//! HTTP client for the commerce catalog's admin API.

use std::time::Duration;

use async_trait::async_trait;
use product_search_shared::SourceProduct;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;

use super::{CatalogSource, ProductPage};
use crate::errors::CatalogFetchError;

/// Expansion requested for every product: variants with prices, options and
/// inventory, plus categories and tags.
pub const PRODUCT_FIELDS: &str = "id,title,handle,status,thumbnail,created_at,updated_at,\
*categories,*tags,*variants,*variants.prices,*variants.options,*variants.options.option,\
+variants.inventory_quantity,*variants.inventory_items";

#[derive(Debug, Deserialize)]
struct SingleProductResponse {
    product: SourceProduct,
}

/// Catalog client using the admin products endpoints.
///
/// # Example
///
/// ```ignore
/// let client = HttpCatalogClient::new(base_url, Some(token), Duration::from_secs(10))?;
/// let page = client.list_published_products(0, 100).await?;
/// ```
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpCatalogClient {
    /// Create a client with a per-request timeout.
    ///
    /// `base_url` should end with a slash when it carries a path prefix.
    pub fn new(
        base_url: Url,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogFetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogFetchError::request(e.to_string()))?;

        info!(base_url = %base_url, authenticated = token.is_some(), "Created catalog client");

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogFetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CatalogFetchError::request(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn list_url(&self, offset: u64, limit: u32) -> Result<Url, CatalogFetchError> {
        let mut url = self.endpoint(&["admin", "products"])?;
        url.query_pairs_mut()
            .append_pair("status[]", "published")
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("fields", PRODUCT_FIELDS);
        Ok(url)
    }

    fn product_url(&self, product_id: &str) -> Result<Url, CatalogFetchError> {
        let mut url = self.endpoint(&["admin", "products", product_id])?;
        url.query_pairs_mut().append_pair("fields", PRODUCT_FIELDS);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, CatalogFetchError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    async fn error_for_status(response: reqwest::Response) -> CatalogFetchError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "Catalog request failed");
        CatalogFetchError::status(status.as_u16(), body)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn list_published_products(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<ProductPage, CatalogFetchError> {
        let response = self.get(self.list_url(offset, limit)?).await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let page: ProductPage = response
            .json()
            .await
            .map_err(|e| CatalogFetchError::parse(e.to_string()))?;

        debug!(offset, limit, received = page.products.len(), "Listed catalog products");
        Ok(page)
    }

    async fn get_product(
        &self,
        product_id: &str,
    ) -> Result<Option<SourceProduct>, CatalogFetchError> {
        let response = self.get(self.product_url(product_id)?).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(product_id, "Product not found in catalog");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body: SingleProductResponse = response
            .json()
            .await
            .map_err(|e| CatalogFetchError::parse(e.to_string()))?;
        Ok(Some(body.product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpCatalogClient {
        HttpCatalogClient::new(Url::parse(base).unwrap(), None, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_list_url() {
        let url = client("http://localhost:9000").list_url(200, 100).unwrap();

        assert_eq!(url.path(), "/admin/products");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("status[]".to_string(), "published".to_string()));
        assert_eq!(pairs[1], ("limit".to_string(), "100".to_string()));
        assert_eq!(pairs[2], ("offset".to_string(), "200".to_string()));
        assert_eq!(pairs[3].1, PRODUCT_FIELDS);
    }

    #[test]
    fn test_product_url_keeps_prefix_and_encodes_id() {
        let url = client("https://shop.example.com/store/")
            .product_url("prod 1")
            .unwrap();

        assert_eq!(url.path(), "/store/admin/products/prod%201");
    }

    #[test]
    fn test_single_product_response_shape() {
        let body: SingleProductResponse = serde_json::from_str(
            r#"{"product": {"id": "prod_1", "title": "Mug", "status": "published", "variants": null}}"#,
        )
        .unwrap();

        assert_eq!(body.product.id, "prod_1");
        assert!(body.product.variants.is_empty());
    }
}
