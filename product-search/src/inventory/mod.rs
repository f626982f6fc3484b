//! Inventory quantity resolution.
//!
//! The catalog does not return inventory in one shape. Depending on API
//! version and expansion a variant carries a flat quantity field, a list of
//! inventory items, or a single nested inventory object. `InventoryShape`
//! names these cases and `InventoryResolver` turns whichever one is present
//! into a best-effort stocked quantity, optionally falling back to a remote
//! lookup. Resolution never fails; anything unusable resolves to 0.

mod remote;

pub use remote::{HttpInventoryClient, InventoryLookup};

use std::sync::Arc;

use product_search_shared::{InventoryItemEntry, InventoryObject, SourceInventory, SourceVariant};
use tracing::debug;

use crate::utils::coerce_quantity;

/// Flat quantity field names, in priority order.
pub const DIRECT_QUANTITY_FIELDS: [&str; 4] = [
    "inventory_quantity",
    "stocked_quantity",
    "available_quantity",
    "quantity",
];

/// The inventory representation found on a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryShape<'a> {
    /// A well-formed flat quantity under one of `DIRECT_QUANTITY_FIELDS`.
    Direct { field: &'static str, quantity: u64 },
    /// A non-empty list of inventory items.
    ItemList(&'a [InventoryItemEntry]),
    /// A nested inventory object with at least one well-formed quantity.
    Nested(&'a InventoryObject),
    /// Nothing usable locally; only a remote lookup can answer.
    RemoteLookupNeeded,
}

impl<'a> InventoryShape<'a> {
    /// Classify a variant's inventory data. The first populated shape wins:
    /// direct field, then item list, then nested object.
    ///
    /// A direct field or nested object that is present but malformed does not
    /// count as populated.
    pub fn classify(inventory: &'a SourceInventory) -> Self {
        for field in DIRECT_QUANTITY_FIELDS {
            if let Some(quantity) = inventory.direct_field(field).and_then(coerce_quantity) {
                return Self::Direct { field, quantity };
            }
        }

        if let Some(items) = inventory.inventory_items.as_deref() {
            if !items.is_empty() {
                return Self::ItemList(items);
            }
        }

        if let Some(object) = &inventory.inventory {
            if nested_quantity(object).is_some() {
                return Self::Nested(object);
            }
        }

        Self::RemoteLookupNeeded
    }

    /// The quantity this shape yields without a network call.
    pub fn local_quantity(&self) -> Option<u64> {
        match self {
            Self::Direct { quantity, .. } => Some(*quantity),
            Self::ItemList(items) => Some(
                items
                    .iter()
                    .map(item_quantity)
                    .fold(0, u64::saturating_add),
            ),
            Self::Nested(object) => nested_quantity(object),
            Self::RemoteLookupNeeded => None,
        }
    }
}

/// Stocked, else available; entries with neither count as 0.
fn item_quantity(item: &InventoryItemEntry) -> u64 {
    item.stocked_quantity
        .as_ref()
        .and_then(coerce_quantity)
        .or_else(|| item.available_quantity.as_ref().and_then(coerce_quantity))
        .unwrap_or(0)
}

fn nested_quantity(object: &InventoryObject) -> Option<u64> {
    [
        &object.stocked_quantity,
        &object.available_quantity,
        &object.quantity,
    ]
    .into_iter()
    .find_map(|value| value.as_ref().and_then(coerce_quantity))
}

/// Resolves a variant's stocked quantity.
#[derive(Clone, Default)]
pub struct InventoryResolver {
    remote: Option<Arc<dyn InventoryLookup>>,
}

impl InventoryResolver {
    /// A resolver that only reads the variant's own data.
    pub fn new() -> Self {
        Self { remote: None }
    }

    /// A resolver that asks `lookup` when the variant carries no usable data.
    pub fn with_remote_lookup(lookup: Arc<dyn InventoryLookup>) -> Self {
        Self {
            remote: Some(lookup),
        }
    }

    pub fn has_remote_lookup(&self) -> bool {
        self.remote.is_some()
    }

    /// Resolve a variant's stocked quantity. Never fails.
    ///
    /// Remote lookup errors are logged at debug level and resolve to 0
    /// without retry.
    pub async fn resolve(&self, variant: &SourceVariant) -> u64 {
        if let Some(quantity) = InventoryShape::classify(&variant.inventory).local_quantity() {
            return quantity;
        }

        let Some(remote) = &self.remote else {
            return 0;
        };
        if variant.id.trim().is_empty() {
            return 0;
        }

        match remote.stocked_quantity(&variant.id).await {
            Ok(quantity) => quantity,
            Err(e) => {
                debug!(variant_id = %variant.id, error = %e, "Inventory lookup failed, using 0");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InventoryLookupError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn variant(raw: serde_json::Value) -> SourceVariant {
        serde_json::from_value(raw).unwrap()
    }

    struct FixedLookup {
        result: Result<u64, InventoryLookupError>,
        calls: AtomicUsize,
    }

    impl FixedLookup {
        fn new(result: Result<u64, InventoryLookupError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl InventoryLookup for FixedLookup {
        async fn stocked_quantity(&self, _variant_id: &str) -> Result<u64, InventoryLookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_direct_field_wins_over_item_list() {
        let v = variant(json!({
            "id": "v1",
            "inventory_quantity": 5,
            "inventory_items": [{"stocked_quantity": 40}, {"stocked_quantity": 2}]
        }));

        assert_eq!(InventoryResolver::new().resolve(&v).await, 5);
    }

    #[tokio::test]
    async fn test_direct_field_priority_order() {
        let v = variant(json!({"id": "v1", "quantity": 9, "available_quantity": 3}));

        assert_eq!(
            InventoryShape::classify(&v.inventory),
            InventoryShape::Direct {
                field: "available_quantity",
                quantity: 3
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_direct_field_falls_through() {
        let v = variant(json!({
            "id": "v1",
            "inventory_quantity": "unknown",
            "inventory_items": [{"stocked_quantity": "4"}, {"available_quantity": 6}, {}]
        }));

        assert_eq!(InventoryResolver::new().resolve(&v).await, 10);
    }

    #[tokio::test]
    async fn test_nested_object_fallbacks() {
        let stocked = variant(json!({
            "id": "v1",
            "inventory": {"stocked_quantity": 8, "quantity": 1}
        }));
        let available = variant(json!({"id": "v1", "inventory": {"available_quantity": 3}}));
        let other = variant(json!({"id": "v1", "inventory": {"quantity": "2"}}));

        let resolver = InventoryResolver::new();
        assert_eq!(resolver.resolve(&stocked).await, 8);
        assert_eq!(resolver.resolve(&available).await, 3);
        assert_eq!(resolver.resolve(&other).await, 2);
    }

    #[tokio::test]
    async fn test_no_shape_resolves_to_zero() {
        let v = variant(json!({"id": "v1", "inventory_quantity": null, "inventory": {}}));

        assert_eq!(
            InventoryShape::classify(&v.inventory),
            InventoryShape::RemoteLookupNeeded
        );
        assert_eq!(InventoryResolver::new().resolve(&v).await, 0);
    }

    #[tokio::test]
    async fn test_negative_quantity_clamps_to_zero() {
        let v = variant(json!({"id": "v1", "stocked_quantity": -3}));
        assert_eq!(InventoryResolver::new().resolve(&v).await, 0);
    }

    #[tokio::test]
    async fn test_item_list_sum_saturates() {
        let v = variant(json!({
            "id": "v1",
            "inventory_items": [{"stocked_quantity": u64::MAX}, {"stocked_quantity": 1}]
        }));

        assert_eq!(InventoryResolver::new().resolve(&v).await, u64::MAX);
    }

    #[tokio::test]
    async fn test_remote_lookup_used_only_without_local_data() {
        let lookup = FixedLookup::new(Ok(11));
        let resolver = InventoryResolver::with_remote_lookup(lookup.clone());

        let local = variant(json!({"id": "v1", "inventory_quantity": 2}));
        let bare = variant(json!({"id": "v2"}));

        assert_eq!(resolver.resolve(&local).await, 2);
        assert_eq!(resolver.resolve(&bare).await, 11);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_lookup_failure_resolves_to_zero() {
        let lookup = FixedLookup::new(Err(InventoryLookupError::Timeout("slow".to_string())));
        let resolver = InventoryResolver::with_remote_lookup(lookup.clone());

        assert_eq!(resolver.resolve(&variant(json!({"id": "v1"}))).await, 0);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }
}
