//! Integration tests for the query service.

mod common;

use common::{product, published, Harness};
use product_search_repository::IndexClientError;
use product_search_shared::{SearchFilters, SearchRequest};
use serde_json::json;

fn catalog_harness() -> Harness {
    Harness::new(vec![
        product(json!({
            "id": "prod_1",
            "title": "Blue T-Shirt",
            "status": "published",
            "categories": [{"name": "Shirts"}],
            "tags": [{"value": "summer"}],
            "variants": [
                {"id": "s", "prices": [{"amount": 400, "currency_code": "usd"}], "inventory_quantity": 5},
                {"id": "m", "prices": [{"amount": 1000, "currency_code": "usd"}], "inventory_quantity": 0},
                {"id": "l", "prices": [{"amount": 1200, "currency_code": "eur"}], "inventory_quantity": 2}
            ]
        })),
        product(json!({
            "id": "prod_2",
            "title": "Red Hoodie",
            "status": "published",
            "categories": [{"name": "Sweaters"}],
            "tags": [{"value": "sale"}],
            "variants": [
                {"id": "v1", "prices": [{"amount": 1500, "currency_code": "usd"}], "inventory_quantity": 1},
                {"id": "v2", "prices": [{"amount": 1600, "currency_code": "usd"}], "inventory_quantity": 3}
            ]
        })),
        published("prod_3", "Wool Scarf", &[("v1", 800, 7)]),
    ])
}

#[tokio::test]
async fn test_price_and_stock_filters_hold_regardless_of_query() {
    let harness = catalog_harness();
    harness.deps.sync.full_resync().await.unwrap();
    // Draft record written directly; the query path must never return it.
    let mut draft = harness.engine.inner.get("prod_3_v1").unwrap();
    draft.object_id = "prod_4_v1".to_string();
    draft.product_id = "prod_4".to_string();
    draft.status = product_search_shared::ProductStatus::Draft;
    harness.engine.inner.insert_records(vec![draft]);

    let filters = SearchFilters {
        price_min: Some(500),
        price_max: Some(1500),
        in_stock: true,
        ..Default::default()
    };
    let result = harness
        .deps
        .query
        .search("", filters, 0, 20)
        .await
        .unwrap();

    let ids: Vec<&str> = result.hits.iter().map(|h| h.object_id.as_str()).collect();
    assert_eq!(ids, vec!["prod_3_v1", "prod_1_l", "prod_2_v1"]);
    for hit in &result.hits {
        assert!((500..=1500).contains(&hit.price));
        assert!(hit.stocked_quantity > 0);
        assert!(hit.status.is_published());
    }
    assert_eq!(result.total_hits, 3);
    assert_eq!(result.page_size, 20);
}

#[tokio::test]
async fn test_category_currency_and_tags() {
    let harness = catalog_harness();
    harness.deps.sync.full_resync().await.unwrap();

    let shirts_usd = SearchFilters {
        category: Some("Shirts".to_string()),
        currency_code: Some("usd".to_string()),
        ..Default::default()
    };
    let result = harness.deps.query.search("", shirts_usd, 0, 20).await.unwrap();
    assert_eq!(result.total_hits, 2);

    let tagged = SearchFilters {
        tags: vec!["sale".to_string(), "clearance".to_string()],
        ..Default::default()
    };
    let result = harness.deps.query.search("", tagged, 0, 20).await.unwrap();
    assert!(result.hits.iter().all(|h| h.product_id == "prod_2"));
    assert_eq!(result.total_hits, 2);
}

#[tokio::test]
async fn test_text_query_and_pagination() {
    let harness = catalog_harness();
    harness.deps.sync.full_resync().await.unwrap();

    let request = SearchRequest::new("shirt").with_page(1).with_page_size(2);
    let result = harness.deps.query.search_request(&request).await.unwrap();

    assert_eq!(result.total_hits, 3);
    assert_eq!(result.total_pages, 2);
    assert_eq!(result.page, 1);
    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.query, "shirt");
}

#[tokio::test]
async fn test_no_matches_is_empty_but_well_formed() {
    let harness = catalog_harness();
    harness.deps.sync.full_resync().await.unwrap();

    let result = harness
        .deps
        .query
        .search("telescope", SearchFilters::default(), 0, 20)
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.total_hits, 0);
    assert_eq!(result.total_pages, 0);
}

#[tokio::test]
async fn test_engine_errors_are_not_masked() {
    let harness = catalog_harness();
    harness.engine.inner.set_failing(true);

    let err = harness
        .deps
        .query
        .search("", SearchFilters::default(), 0, 20)
        .await
        .unwrap_err();

    assert!(matches!(err, IndexClientError::RequestFailed { status: 503, .. }));
}

#[tokio::test]
async fn test_invalid_price_range_rejected() {
    let harness = catalog_harness();
    let filters = SearchFilters {
        price_min: Some(2000),
        price_max: Some(100),
        ..Default::default()
    };

    let err = harness.deps.query.search("", filters, 0, 20).await.unwrap_err();
    assert!(matches!(err, IndexClientError::ValidationError(_)));
}
