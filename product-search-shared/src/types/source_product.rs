//! Source catalog types.
//!
//! These structs mirror the product graph returned by the commerce catalog's
//! admin API with variants, prices, options, inventory, categories and tags
//! expanded. They are read-only inputs to the indexer; nothing in this
//! workspace mutates the catalog.
//!
//! Numeric fields that are not uniform across catalog API versions (price
//! amounts and inventory quantities) are kept as raw JSON values and coerced
//! by the record transformer, so a malformed value never fails deserialization of the
//! whole product.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Publication status of a catalog product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Proposed,
    Published,
    Rejected,
}

impl ProductStatus {
    /// Returns the status as stored in index records and used in filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Proposed => "proposed",
            ProductStatus::Published => "published",
            ProductStatus::Rejected => "rejected",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, ProductStatus::Published)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A product as returned by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceProduct {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// URL slug. May be missing or empty on older products.
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProductStatus,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<SourceCategory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<SourceTag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<SourceVariant>,
}

/// A product category reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceCategory {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A product tag reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceTag {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceVariant {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prices: Vec<SourcePrice>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<SourceOption>,
    /// Inventory data in whichever shape the catalog returned.
    #[serde(flatten)]
    pub inventory: SourceInventory,
}

/// A price of a variant in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourcePrice {
    /// Integer amount in minor units; numbers and numeric strings are accepted.
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// A selected option value on a variant, e.g. `Size: M`.
///
/// Older catalog versions put the option title directly on the entry, newer
/// ones nest it under `option`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceOption {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub option: Option<SourceOptionDefinition>,
}

impl SourceOption {
    /// The option's display name, preferring the flat title.
    pub fn name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or_else(|| self.option.as_ref().and_then(|o| o.title.as_deref()))
    }
}

/// The option a value belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceOptionDefinition {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Raw inventory fields of a variant.
///
/// At most one shape is expected to be populated: a flat quantity under one
/// of several field names, a list of inventory items, or a single nested
/// inventory object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceInventory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stocked_quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_items: Option<Vec<InventoryItemEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryObject>,
}

impl SourceInventory {
    /// Look up a flat quantity field by its wire name.
    pub fn direct_field(&self, name: &str) -> Option<&Value> {
        let value = match name {
            "inventory_quantity" => self.inventory_quantity.as_ref(),
            "stocked_quantity" => self.stocked_quantity.as_ref(),
            "available_quantity" => self.available_quantity.as_ref(),
            "quantity" => self.quantity.as_ref(),
            _ => None,
        };
        value.filter(|v| !v.is_null())
    }
}

/// One entry of a variant's inventory item list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InventoryItemEntry {
    #[serde(default)]
    pub inventory_item_id: Option<String>,
    #[serde(default)]
    pub stocked_quantity: Option<Value>,
    #[serde(default)]
    pub available_quantity: Option<Value>,
}

/// A single nested inventory object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InventoryObject {
    #[serde(default)]
    pub stocked_quantity: Option<Value>,
    #[serde(default)]
    pub available_quantity: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

/// Treat an explicit `null` the same as a missing field.
///
/// A product or variant with a null id still deserializes (with an empty id)
/// so the transformer can skip that one record instead of failing the page.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
