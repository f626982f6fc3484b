//! Remote inventory lookup by variant id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::InventoryLookupError;
use crate::utils::coerce_quantity;

/// Looks up a variant's stocked quantity in an external inventory API.
#[async_trait]
pub trait InventoryLookup: Send + Sync {
    /// Total stocked quantity across all locations for a variant.
    async fn stocked_quantity(&self, variant_id: &str) -> Result<u64, InventoryLookupError>;
}

#[derive(Debug, Deserialize)]
struct InventoryItemsResponse {
    #[serde(default)]
    inventory_items: Vec<InventoryItem>,
}

#[derive(Debug, Deserialize)]
struct InventoryItem {
    #[serde(default)]
    location_levels: Vec<LocationLevel>,
}

#[derive(Debug, Deserialize)]
struct LocationLevel {
    #[serde(default)]
    stocked_quantity: Option<Value>,
    #[serde(default)]
    available_quantity: Option<Value>,
}

impl LocationLevel {
    fn quantity(&self) -> u64 {
        self.stocked_quantity
            .as_ref()
            .and_then(coerce_quantity)
            .or_else(|| self.available_quantity.as_ref().and_then(coerce_quantity))
            .unwrap_or(0)
    }
}

impl InventoryItemsResponse {
    fn total(&self) -> u64 {
        self.inventory_items
            .iter()
            .flat_map(|item| item.location_levels.iter())
            .map(LocationLevel::quantity)
            .fold(0, u64::saturating_add)
    }
}

/// Inventory lookup against the catalog's admin inventory endpoint.
///
/// Requests `GET {base}/admin/inventory-items?variant_id={id}` with location
/// levels expanded and sums every level's stocked (else available) quantity.
pub struct HttpInventoryClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpInventoryClient {
    /// Create a client with a per-request timeout.
    pub fn new(
        base_url: Url,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InventoryLookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InventoryLookupError::request(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn lookup_url(&self, variant_id: &str) -> Result<Url, InventoryLookupError> {
        let mut url = self
            .base_url
            .join("admin/inventory-items")
            .map_err(|e| InventoryLookupError::request(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("variant_id", variant_id)
            .append_pair("fields", "id,*location_levels");
        Ok(url)
    }
}

#[async_trait]
impl InventoryLookup for HttpInventoryClient {
    async fn stocked_quantity(&self, variant_id: &str) -> Result<u64, InventoryLookupError> {
        let url = self.lookup_url(variant_id)?;
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryLookupError::status(status.as_u16(), body));
        }

        let parsed: InventoryItemsResponse = response.json().await?;
        let total = parsed.total();
        debug!(variant_id, total, "Remote inventory resolved");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sums_location_levels() {
        let response: InventoryItemsResponse = serde_json::from_value(json!({
            "inventory_items": [
                {"location_levels": [
                    {"stocked_quantity": 4, "available_quantity": 1},
                    {"available_quantity": "3"}
                ]},
                {"location_levels": [{"stocked_quantity": "bad"}]},
                {}
            ]
        }))
        .unwrap();

        assert_eq!(response.total(), 7);
    }

    #[test]
    fn test_location_level_sum_saturates() {
        let response: InventoryItemsResponse = serde_json::from_value(json!({
            "inventory_items": [
                {"location_levels": [{"stocked_quantity": 1e20}, {"stocked_quantity": 5}]}
            ]
        }))
        .unwrap();

        assert_eq!(response.total(), u64::MAX);
    }

    #[test]
    fn test_lookup_url() {
        let client = HttpInventoryClient::new(
            Url::parse("http://localhost:9000/").unwrap(),
            None,
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            client.lookup_url("variant 1").unwrap().as_str(),
            "http://localhost:9000/admin/inventory-items?variant_id=variant+1&fields=id%2C*location_levels"
        );
    }
}
