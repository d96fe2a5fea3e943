//! Integration tests for the session cart.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p forgeline-storefront)
//!
//! Run with: cargo test -p forgeline-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use forgeline_integration_tests::{base_url, client};

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_fresh_session_cart_is_empty() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to fetch cart");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(body["item_count"], json!(0));
    assert!(body["items"].as_array().is_some_and(Vec::is_empty));

    let resp = client
        .get(format!("{base_url}/api/cart/count"))
        .send()
        .await
        .expect("Failed to fetch cart count");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse count");
    assert_eq!(body["count"], json!(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_add_unknown_variant_is_404() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({
            "variantId": Uuid::new_v4(),
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to post cart add");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_session_cookie_persists_across_requests() {
    let client = client();
    let base_url = base_url();

    // First request establishes the session cookie.
    let resp = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to fetch cart");
    assert_eq!(resp.status(), StatusCode::OK);

    // Mutations against the same session succeed even on an empty cart.
    let resp = client
        .post(format!("{base_url}/api/cart/clear"))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to re-fetch cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(body["item_count"], json!(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_with_empty_cart_is_rejected() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({
            "email": "ayesha@example.com",
            "name": "Ayesha Khan",
            "phone": "03001234567",
            "shipping": {
                "line1": "House 12, Street 4",
                "city": "Lahore",
                "province": "Punjab",
                "postalCode": "54000"
            },
            "useSameAddress": true
        }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse checkout error");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Your cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_order_confirmation_is_404() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/orders/{}", Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to fetch order confirmation");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
