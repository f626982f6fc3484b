//! Index record types for the search index.
//!
//! This module defines the flat document stored in the search engine. One
//! record exists per (product, variant) pair, or a single `_default` record
//! for a product without variants.

use serde::{Deserialize, Serialize};

use crate::types::source_product::ProductStatus;

/// Variant id used for the single record of a product that has no variants.
pub const DEFAULT_VARIANT_ID: &str = "default";

/// Document representation for the search index.
///
/// Every field has a serde default so hits that were retrieved with a reduced
/// attribute list (e.g. only `objectID`) still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IndexRecord {
    /// Composite key `{product_id}_{variant_id}`.
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub variant_id: String,
    #[serde(default)]
    pub product_title: String,
    #[serde(default)]
    pub variant_title: String,
    /// Empty when the variant has no SKU, never null.
    #[serde(default)]
    pub sku: String,
    /// Price in minor currency units.
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub stocked_quantity: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Title of the first declared option only.
    #[serde(default)]
    pub option_name: String,
    #[serde(default)]
    pub option_value: String,
}

impl IndexRecord {
    /// Build the composite object id for a product/variant pair.
    ///
    /// # Example
    ///
    /// ```
    /// use product_search_shared::IndexRecord;
    ///
    /// assert_eq!(IndexRecord::composite_id("prod_1", "variant_1"), "prod_1_variant_1");
    /// ```
    pub fn composite_id(product_id: &str, variant_id: &str) -> String {
        format!("{}_{}", product_id, variant_id)
    }

    /// Whether the record satisfies the minimum the index requires: a
    /// non-empty object id and a non-empty product title.
    pub fn is_indexable(&self) -> bool {
        !self.object_id.trim().is_empty() && !self.product_title.trim().is_empty()
    }

    /// Whether this is the placeholder record of a variant-less product.
    pub fn is_default_variant(&self) -> bool {
        self.variant_id == DEFAULT_VARIANT_ID
    }

    /// String values of a facet attribute, used when evaluating filters.
    ///
    /// List attributes return every element; unknown attributes return an
    /// empty list.
    pub fn string_values(&self, attribute: &str) -> Vec<&str> {
        match attribute {
            "objectID" => vec![self.object_id.as_str()],
            "product_id" => vec![self.product_id.as_str()],
            "variant_id" => vec![self.variant_id.as_str()],
            "sku" => vec![self.sku.as_str()],
            "currency_code" => vec![self.currency_code.as_str()],
            "status" => vec![self.status.as_str()],
            "handle" => vec![self.handle.as_str()],
            "option_name" => vec![self.option_name.as_str()],
            "option_value" => vec![self.option_value.as_str()],
            "categories" => self.categories.iter().map(String::as_str).collect(),
            "tags" => self.tags.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Numeric value of a numeric attribute, used when evaluating filters.
    pub fn numeric_value(&self, attribute: &str) -> Option<u64> {
        match attribute {
            "price" => Some(self.price),
            "stocked_quantity" => Some(self.stocked_quantity),
            _ => None,
        }
    }
}
