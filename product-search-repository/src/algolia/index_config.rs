//! Algolia index configuration and settings.
//!
//! This module defines the settings for the product index and its two
//! price-sorted replicas.

use serde_json::{json, Value};

/// Default name of the product index.
pub const DEFAULT_INDEX_NAME: &str = "products";

/// Attributes matched by free-text queries, in priority order.
pub const SEARCHABLE_ATTRIBUTES: [&str; 6] = [
    "product_title",
    "variant_title",
    "sku",
    "option_value",
    "categories",
    "tags",
];

/// String attributes usable in filters but not returned as facet counts.
///
/// `product_id` is needed by delete-by-product-id.
pub const FILTER_ONLY_ATTRIBUTES: [&str; 5] =
    ["currency_code", "categories", "tags", "status", "product_id"];

/// Numeric attributes usable as facets and in numeric filters.
pub const NUMERIC_ATTRIBUTES: [&str; 2] = ["price", "stocked_quantity"];

/// Tie-breaking ranking: best stocked first, then cheapest.
pub const CUSTOM_RANKING: [&str; 2] = ["desc(stocked_quantity)", "asc(price)"];

/// The engine's built-in ranking criteria, appended after a replica's sort.
const DEFAULT_RANKING: [&str; 8] = [
    "typo",
    "geo",
    "words",
    "filters",
    "proximity",
    "attribute",
    "exact",
    "custom",
];

/// Sort order of a replica index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaOrder {
    PriceAsc,
    PriceDesc,
}

impl ReplicaOrder {
    pub const ALL: [ReplicaOrder; 2] = [ReplicaOrder::PriceAsc, ReplicaOrder::PriceDesc];

    /// Suffix appended to the primary index name.
    pub fn suffix(&self) -> &'static str {
        match self {
            ReplicaOrder::PriceAsc => "price_asc",
            ReplicaOrder::PriceDesc => "price_desc",
        }
    }

    /// The sort criterion placed first in the replica's ranking.
    pub fn sort_criterion(&self) -> &'static str {
        match self {
            ReplicaOrder::PriceAsc => "asc(price)",
            ReplicaOrder::PriceDesc => "desc(price)",
        }
    }
}

/// Configuration for the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// The primary index name.
    pub index_name: String,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The primary index name
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
        }
    }

    /// Name of the replica sorted by `order`, e.g. `products_price_asc`.
    pub fn replica_name(&self, order: ReplicaOrder) -> String {
        format!("{}_{}", self.index_name, order.suffix())
    }

    /// Names of every replica, in `ReplicaOrder::ALL` order.
    pub fn replica_names(&self) -> Vec<String> {
        ReplicaOrder::ALL
            .iter()
            .map(|order| self.replica_name(*order))
            .collect()
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

fn attributes_for_faceting() -> Vec<String> {
    FILTER_ONLY_ATTRIBUTES
        .iter()
        .map(|a| format!("filterOnly({})", a))
        .chain(NUMERIC_ATTRIBUTES.iter().map(|a| a.to_string()))
        .collect()
}

/// Settings shared by the primary index and its replicas.
fn base_settings() -> Value {
    json!({
        "searchableAttributes": SEARCHABLE_ATTRIBUTES,
        "attributesForFaceting": attributes_for_faceting(),
        "customRanking": CUSTOM_RANKING,
    })
}

/// Get the settings of the primary product index.
///
/// The configuration includes:
/// - **searchableAttributes**: titles, SKU, option value, categories and tags
/// - **attributesForFaceting**: filter-only string facets plus numeric facets
/// - **customRanking**: stocked quantity descending, then price ascending
/// - **replicas**: one index per `ReplicaOrder`
pub fn get_index_settings(config: &IndexConfig) -> Value {
    let mut settings = base_settings();
    settings["replicas"] = json!(config.replica_names());
    settings
}

/// Get the settings of a replica: the shared settings with the replica's
/// sort criterion ranked ahead of the built-in criteria.
pub fn get_replica_settings(order: ReplicaOrder) -> Value {
    let mut settings = base_settings();
    let ranking: Vec<&str> = std::iter::once(order.sort_criterion())
        .chain(DEFAULT_RANKING)
        .collect();
    settings["ranking"] = json!(ranking);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings(&IndexConfig::default());

        assert_eq!(
            settings["searchableAttributes"],
            json!(["product_title", "variant_title", "sku", "option_value", "categories", "tags"])
        );
        assert_eq!(
            settings["attributesForFaceting"],
            json!([
                "filterOnly(currency_code)",
                "filterOnly(categories)",
                "filterOnly(tags)",
                "filterOnly(status)",
                "filterOnly(product_id)",
                "price",
                "stocked_quantity"
            ])
        );
        assert_eq!(
            settings["customRanking"],
            json!(["desc(stocked_quantity)", "asc(price)"])
        );
        assert_eq!(
            settings["replicas"],
            json!(["products_price_asc", "products_price_desc"])
        );
    }

    #[test]
    fn test_replica_settings_rank_by_price_first() {
        let asc = get_replica_settings(ReplicaOrder::PriceAsc);
        let desc = get_replica_settings(ReplicaOrder::PriceDesc);

        assert_eq!(asc["ranking"][0], "asc(price)");
        assert_eq!(desc["ranking"][0], "desc(price)");
        assert_eq!(asc["ranking"].as_array().unwrap().len(), 9);
        assert!(asc.get("replicas").is_none());
    }

    #[test]
    fn test_replica_names() {
        let config = IndexConfig::new("shop_products");
        assert_eq!(
            config.replica_name(ReplicaOrder::PriceDesc),
            "shop_products_price_desc"
        );
        assert_eq!(config.replica_names().len(), 2);
    }
}
