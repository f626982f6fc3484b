//! Record transformer implementation.
//!
//! Flattens one (product, variant) pair from the catalog graph into an
//! `IndexRecord`.

use futures::stream::{self, StreamExt};
use product_search_shared::{IndexRecord, SourceProduct, SourceVariant, DEFAULT_VARIANT_ID};
use tracing::{debug, instrument};

use crate::errors::TransformError;
use crate::inventory::InventoryResolver;
use crate::utils::{coerce_quantity, normalize_timestamp, slugify};

/// Variants of one product resolved at the same time. Bounds the remote
/// inventory requests a single product can start.
pub const VARIANT_CONCURRENCY: usize = 8;

/// Transforms catalog products into index records.
///
/// The transformer is responsible for:
/// - Building the composite `{product_id}_{variant_id}` object id
/// - Applying fallbacks for every optional field (title, price, currency, handle)
/// - Resolving the stocked quantity through the `InventoryResolver`
pub struct RecordTransformer {
    default_currency: String,
    resolver: InventoryResolver,
}

impl RecordTransformer {
    /// Create a transformer.
    ///
    /// # Arguments
    ///
    /// * `default_currency` - Currency code used when a variant has no price
    /// * `resolver` - Inventory resolver for stocked quantities
    pub fn new(default_currency: impl Into<String>, resolver: InventoryResolver) -> Self {
        Self {
            default_currency: default_currency.into(),
            resolver,
        }
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Build the record for a product/variant pair with a known stocked quantity.
    ///
    /// Pass `None` as the variant for the placeholder record of a product
    /// without variants.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexRecord)` - The flattened record
    /// * `Err(TransformError::MissingField)` - If the product or variant id is empty
    pub fn build_record(
        &self,
        product: &SourceProduct,
        variant: Option<&SourceVariant>,
        stocked_quantity: u64,
    ) -> Result<IndexRecord, TransformError> {
        if product.id.trim().is_empty() {
            return Err(TransformError::MissingField("product.id"));
        }

        let variant_id = match variant {
            Some(v) if v.id.trim().is_empty() => {
                return Err(TransformError::MissingField("variant.id"))
            }
            Some(v) => v.id.as_str(),
            None => DEFAULT_VARIANT_ID,
        };

        let variant_title = variant
            .and_then(|v| v.title.as_deref())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(product.title.as_str());

        let first_price = variant.and_then(|v| v.prices.first());
        let price = first_price
            .and_then(|p| p.amount.as_ref())
            .and_then(coerce_quantity)
            .unwrap_or(0);
        let currency_code = first_price
            .and_then(|p| p.currency_code.as_deref())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(self.default_currency.as_str());

        let first_option = variant.and_then(|v| v.options.first());
        let option_name = first_option.and_then(|o| o.name()).unwrap_or_default();
        let option_value = first_option
            .and_then(|o| o.value.as_deref())
            .unwrap_or_default();

        let handle = product
            .handle
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&product.title));

        Ok(IndexRecord {
            object_id: IndexRecord::composite_id(&product.id, variant_id),
            product_id: product.id.clone(),
            variant_id: variant_id.to_string(),
            product_title: product.title.clone(),
            variant_title: variant_title.to_string(),
            sku: variant
                .and_then(|v| v.sku.clone())
                .unwrap_or_default(),
            price,
            currency_code: currency_code.to_string(),
            stocked_quantity,
            created_at: normalize_timestamp(product.created_at.as_deref()),
            updated_at: normalize_timestamp(product.updated_at.as_deref()),
            status: product.status,
            handle,
            thumbnail: product.thumbnail.clone().filter(|t| !t.trim().is_empty()),
            categories: non_blank(product.categories.iter().map(|c| c.name.as_deref())),
            tags: non_blank(product.tags.iter().map(|t| t.value.as_deref())),
            option_name: option_name.to_string(),
            option_value: option_value.to_string(),
        })
    }

    /// Transform one variant, resolving its stocked quantity.
    pub async fn transform_variant(
        &self,
        product: &SourceProduct,
        variant: &SourceVariant,
    ) -> Result<IndexRecord, TransformError> {
        let stocked_quantity = self.resolver.resolve(variant).await;
        self.build_record(product, Some(variant), stocked_quantity)
    }

    /// Transform every variant of a product.
    ///
    /// A product without variants yields exactly one `{id}_default` record.
    /// Results are returned per variant, in catalog order, so the caller can
    /// skip the failures.
    #[instrument(
        skip(self, product),
        fields(product_id = %product.id, variants = product.variants.len())
    )]
    pub async fn transform_product(
        &self,
        product: &SourceProduct,
    ) -> Vec<Result<IndexRecord, TransformError>> {
        if product.variants.is_empty() {
            debug!("Product has no variants, using default record");
            return vec![self.build_record(product, None, 0)];
        }

        let futures: Vec<_> = product
            .variants
            .iter()
            .map(|variant| self.transform_variant(product, variant))
            .collect();
        stream::iter(futures)
            .buffered(VARIANT_CONCURRENCY)
            .collect()
            .await
    }
}

/// Keep the non-blank values, in order.
fn non_blank<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InventoryLookupError;
    use crate::inventory::InventoryLookup;
    use async_trait::async_trait;
    use product_search_shared::ProductStatus;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn transformer() -> RecordTransformer {
        RecordTransformer::new("usd", InventoryResolver::new())
    }

    fn product(raw: serde_json::Value) -> SourceProduct {
        serde_json::from_value(raw).unwrap()
    }

    fn full_product() -> SourceProduct {
        product(json!({
            "id": "prod_1",
            "title": "Blue T-Shirt",
            "handle": "blue-tee",
            "status": "published",
            "thumbnail": "https://cdn.example.com/tee.png",
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-02-03T04:05:06.789+01:00",
            "categories": [{"name": "Shirts"}, {"name": "  "}, {"name": null}, {"name": "Summer"}],
            "tags": [{"value": "cotton"}, {"value": ""}],
            "variants": [
                {
                    "id": "variant_1",
                    "title": "M / Blue",
                    "sku": "TS-M-BLUE",
                    "prices": [{"amount": 1500, "currency_code": "eur"}, {"amount": 1700, "currency_code": "usd"}],
                    "options": [
                        {"value": "M", "option": {"title": "Size"}},
                        {"value": "Blue", "option": {"title": "Color"}}
                    ],
                    "inventory_quantity": 7
                },
                {"id": "variant_2"}
            ]
        }))
    }

    #[tokio::test]
    async fn test_transform_full_variant() {
        let p = full_product();
        let record = transformer()
            .transform_variant(&p, &p.variants[0])
            .await
            .unwrap();

        assert_eq!(record.object_id, "prod_1_variant_1");
        assert_eq!(record.variant_title, "M / Blue");
        assert_eq!(record.sku, "TS-M-BLUE");
        assert_eq!(record.price, 1500);
        assert_eq!(record.currency_code, "eur");
        assert_eq!(record.stocked_quantity, 7);
        assert_eq!(record.option_name, "Size");
        assert_eq!(record.option_value, "M");
        assert_eq!(record.handle, "blue-tee");
        assert_eq!(record.status, ProductStatus::Published);
        assert_eq!(record.categories, vec!["Shirts", "Summer"]);
        assert_eq!(record.tags, vec!["cotton"]);
        assert_eq!(record.created_at, "2024-01-02T03:04:05.000Z");
        assert_eq!(record.updated_at, "2024-02-03T03:05:06.789Z");
        assert_eq!(
            record.thumbnail.as_deref(),
            Some("https://cdn.example.com/tee.png")
        );
    }

    #[tokio::test]
    async fn test_transform_bare_variant_uses_fallbacks() {
        let p = full_product();
        let record = transformer()
            .transform_variant(&p, &p.variants[1])
            .await
            .unwrap();

        assert_eq!(record.object_id, "prod_1_variant_2");
        assert_eq!(record.variant_title, "Blue T-Shirt");
        assert_eq!(record.sku, "");
        assert_eq!(record.price, 0);
        assert_eq!(record.currency_code, "usd");
        assert_eq!(record.stocked_quantity, 0);
        assert_eq!(record.option_name, "");
        assert_eq!(record.option_value, "");
    }

    #[test]
    fn test_handle_fallback_slug() {
        let p = product(json!({"id": "prod_2", "title": "Blue T-Shirt!!"}));
        let record = transformer().build_record(&p, None, 0).unwrap();

        assert_eq!(record.handle, "blue-t-shirt");
    }

    #[test]
    fn test_unparsable_price_coerces_to_zero() {
        let p = product(json!({
            "id": "prod_3",
            "title": "Mug",
            "variants": [{"id": "v1", "prices": [{"amount": "twelve"}]}]
        }));
        let record = transformer()
            .build_record(&p, Some(&p.variants[0]), 0)
            .unwrap();

        assert_eq!(record.price, 0);
        assert_eq!(record.currency_code, "usd");
    }

    #[test]
    fn test_missing_ids_fail() {
        let t = transformer();
        let no_product_id = product(json!({"title": "Mug"}));
        assert_eq!(
            t.build_record(&no_product_id, None, 0),
            Err(TransformError::MissingField("product.id"))
        );

        let p = product(json!({"id": "prod_4", "title": "Mug", "variants": [{"title": "S"}]}));
        assert_eq!(
            t.build_record(&p, Some(&p.variants[0]), 0),
            Err(TransformError::MissingField("variant.id"))
        );
    }

    #[tokio::test]
    async fn test_product_without_variants_yields_default_record() {
        let p = product(json!({"id": "prod_5", "title": "Gift Card", "status": "published"}));
        let records = transformer().transform_product(&p).await;

        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.object_id, "prod_5_default");
        assert_eq!(record.variant_id, "default");
        assert_eq!(record.variant_title, "Gift Card");
        assert_eq!(record.stocked_quantity, 0);
    }

    #[tokio::test]
    async fn test_transform_product_keeps_variant_order_and_failures() {
        let p = product(json!({
            "id": "prod_6",
            "title": "Socks",
            "variants": [{"id": "a"}, {"title": "no id"}, {"id": "c"}]
        }));
        let results = transformer().transform_product(&p).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().object_id, "prod_6_a");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().object_id, "prod_6_c");
    }

    struct SlowLookup {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl InventoryLookup for SlowLookup {
        async fn stocked_quantity(&self, variant_id: &str) -> Result<u64, InventoryLookupError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(variant_id.len() as u64)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_lookups_are_bounded_and_ordered() {
        let lookup = Arc::new(SlowLookup {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let transformer =
            RecordTransformer::new("usd", InventoryResolver::with_remote_lookup(lookup.clone()));
        let variants: Vec<_> = (0..40).map(|i| json!({"id": "v".repeat(i + 1)})).collect();
        let p = product(json!({"id": "prod_7", "title": "Bulk", "variants": variants}));

        let results = transformer.transform_product(&p).await;

        assert_eq!(results.len(), 40);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap().stocked_quantity, i as u64 + 1);
        }
        let peak = lookup.peak.load(Ordering::SeqCst);
        assert!(peak > 1 && peak <= VARIANT_CONCURRENCY);
    }
}
