//! Integration tests for health and catalog browsing endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p forgeline-storefront)
//!
//! Run with: cargo test -p forgeline-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use forgeline_integration_tests::{base_url, client};

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_product_listing_shape() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");

    assert!(body["items"].is_array());
    assert!(body["total_count"].is_number());
    assert!(body["page"].is_number());
    assert!(body["total_pages"].is_number());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_product_listing_filters_and_sort() {
    let client = client();
    let base_url = base_url();

    // Unknown sort values fall back to the default instead of erroring.
    let resp = client
        .get(format!("{base_url}/api/products?sort=bogus&page=1&limit=5"))
        .send()
        .await
        .expect("Failed to list products with bogus sort");
    assert_eq!(resp.status(), StatusCode::OK);

    // Price bounds and category filter are accepted together.
    let resp = client
        .get(format!(
            "{base_url}/api/products?category=animals&minPrice=1000&maxPrice=20000&sort=price-asc"
        ))
        .send()
        .await
        .expect("Failed to list filtered products");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse listing");
    assert!(body["items"].is_array());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_filter_endpoints() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/products/categories"))
        .send()
        .await
        .expect("Failed to list categories");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse categories");
    assert!(body.is_array());

    let resp = client
        .get(format!("{base_url}/api/products/attributes"))
        .send()
        .await
        .expect("Failed to list attributes");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse attributes");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_slug_is_404() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/products/no-such-product-slug"))
        .send()
        .await
        .expect("Failed to request unknown product");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_homepage_payload() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/home"))
        .send()
        .await
        .expect("Failed to fetch homepage payload");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse homepage");
    assert!(body["featured"].is_array());
    assert!(body["bestsellers"].is_array());
    assert!(body["categories"].is_array());
}
