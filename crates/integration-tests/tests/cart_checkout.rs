//! End-to-end cart merge and checkout tests.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p bazaar-api)
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use bazaar_integration_tests::{api_base_url, login, test_pool};

fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}+{nanos}@example.com")
}

/// Bootstrap a vendor with products priced for the exact-total check.
async fn seed_catalog(pool: &PgPool) -> (i32, i32, i32) {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();

    let owner_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, role) VALUES ($1, 'seller') RETURNING id",
    )
    .bind(unique_email("catalog-owner"))
    .fetch_one(pool)
    .await
    .expect("create seller");

    let vendor_id: i32 = sqlx::query_scalar(
        "INSERT INTO vendors (name, owner_id, domain) VALUES ('Checkout Shop', $1, $2) \
         RETURNING id",
    )
    .bind(owner_id)
    .bind(format!("checkout-{nanos}"))
    .fetch_one(pool)
    .await
    .expect("create vendor");

    let shirt: i32 = sqlx::query_scalar(
        "INSERT INTO products (vendor_id, name, price) \
         VALUES ($1, 'Shirt', 10.50) RETURNING id",
    )
    .bind(vendor_id)
    .fetch_one(pool)
    .await
    .expect("create shirt");

    let sticker: i32 = sqlx::query_scalar(
        "INSERT INTO products (vendor_id, name, price) \
         VALUES ($1, 'Sticker', 4.99) RETURNING id",
    )
    .bind(vendor_id)
    .fetch_one(pool)
    .await
    .expect("create sticker");

    (vendor_id, shirt, sticker)
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_readding_same_variant_merges_quantity() {
    let pool = test_pool().await;
    let base = api_base_url();

    let (_, shirt, _) = seed_catalog(&pool).await;
    let client = login(&pool, &unique_email("merge-buyer")).await;

    for quantity in [2, 3] {
        let resp = client
            .post(format!("{base}/api/cart"))
            .json(&json!({
                "product_id": shirt,
                "quantity": quantity,
                "size": "M",
                "color": "red",
            }))
            .send()
            .await
            .expect("add failed");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = client
        .get(format!("{base}/api/cart"))
        .send()
        .await
        .expect("list failed");
    let body: Value = resp.json().await.expect("body");
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1, "same variant must merge into one line");
    assert_eq!(items[0]["quantity"], 5);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_distinct_variants_stay_separate_lines() {
    let pool = test_pool().await;
    let base = api_base_url();

    let (_, shirt, _) = seed_catalog(&pool).await;
    let client = login(&pool, &unique_email("variant-buyer")).await;

    for size in ["M", "L"] {
        let resp = client
            .post(format!("{base}/api/cart"))
            .json(&json!({
                "product_id": shirt,
                "quantity": 1,
                "size": size,
                "color": "red",
            }))
            .send()
            .await
            .expect("add failed");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = client
        .get(format!("{base}/api/cart"))
        .send()
        .await
        .expect("list failed");
    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["items"].as_array().expect("items array").len(), 2);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_exact_total_and_cart_cleared() {
    let pool = test_pool().await;
    let base = api_base_url();

    let (vendor_id, shirt, sticker) = seed_catalog(&pool).await;
    let client = login(&pool, &unique_email("checkout-buyer")).await;

    // 10.50 x 2 + 4.99 x 1 = 25.99 exactly.
    for (product, quantity) in [(shirt, 2), (sticker, 1)] {
        let resp = client
            .post(format!("{base}/api/cart"))
            .json(&json!({ "product_id": product, "quantity": quantity }))
            .send()
            .await
            .expect("add failed");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = client
        .post(format!("{base}/api/orders/checkout"))
        .json(&json!({
            "vendor_id": vendor_id,
            "shipping_address": "1 Main St",
        }))
        .send()
        .await
        .expect("checkout failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["order"]["total"], "25.99");
    assert_eq!(body["order"]["status"], "pending");

    // The cart was cleared in the same transaction.
    let resp = client
        .get(format!("{base}/api/cart"))
        .send()
        .await
        .expect("list failed");
    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["items"], json!([]));

    // A second checkout finds nothing to buy.
    let resp = client
        .post(format!("{base}/api/orders/checkout"))
        .json(&json!({
            "vendor_id": vendor_id,
            "shipping_address": "1 Main St",
        }))
        .send()
        .await
        .expect("second checkout failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
