//! End-to-end multi-tenancy boundary tests.
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

/// Bootstrap a seller with a vendor and one product; returns
/// (`vendor_id`, `product_id`).
async fn seed_vendor(pool: &PgPool, owner_email: &str, label: &str) -> (i32, i32) {
    let owner_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, role) VALUES ($1, 'seller') \
         ON CONFLICT (email) DO UPDATE SET role = 'seller' \
         RETURNING id",
    )
    .bind(owner_email)
    .fetch_one(pool)
    .await
    .expect("create seller");

    let vendor_id: i32 = sqlx::query_scalar(
        "INSERT INTO vendors (name, owner_id, domain) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(format!("Shop {label}"))
    .bind(owner_id)
    .bind(label)
    .fetch_one(pool)
    .await
    .expect("create vendor");

    let product_id: i32 = sqlx::query_scalar(
        "INSERT INTO products (vendor_id, name, price) \
         VALUES ($1, 'Widget', 10.00) RETURNING id",
    )
    .bind(vendor_id)
    .fetch_one(pool)
    .await
    .expect("create product");

    (vendor_id, product_id)
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_seller_cannot_touch_foreign_vendor() {
    let pool = test_pool().await;
    let base = api_base_url();

    let seller_email = unique_email("seller-a");
    let rival_email = unique_email("seller-b");

    let client = login(&pool, &seller_email).await;
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    seed_vendor(&pool, &seller_email, &format!("shop-a-{nanos}")).await;
    let (rival_vendor, rival_product) =
        seed_vendor(&pool, &rival_email, &format!("shop-b-{nanos}")).await;

    // Mutating the rival's product is denied.
    let resp = client
        .put(format!("{base}/api/products/{rival_product}"))
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .expect("update failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Creating a product under the rival's vendor is denied.
    let resp = client
        .post(format!("{base}/api/products"))
        .json(&json!({
            "vendor_id": rival_vendor,
            "name": "Smuggled",
            "price": "1.00",
        }))
        .send()
        .await
        .expect("create failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // So is flipping a rival order's status.
    let buyer_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, role) VALUES ($1, 'buyer') RETURNING id",
    )
    .bind(unique_email("order-buyer"))
    .fetch_one(&pool)
    .await
    .expect("create buyer");
    let order_id: i32 = sqlx::query_scalar(
        "INSERT INTO orders (customer_id, vendor_id, total, shipping_address) \
         VALUES ($1, $2, 10.00, '1 Main St') RETURNING id",
    )
    .bind(buyer_id)
    .bind(rival_vendor)
    .fetch_one(&pool)
    .await
    .expect("create order");

    let resp = client
        .patch(format!("{base}/api/orders/{order_id}/status"))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .expect("status update failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_buyer_sees_empty_category_list() {
    let pool = test_pool().await;
    let base = api_base_url();

    let client = login(&pool, &unique_email("plain-buyer")).await;

    let resp = client
        .get(format!("{base}/api/categories"))
        .send()
        .await
        .expect("list failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["categories"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_storefront_resolution_two_tier() {
    let pool = test_pool().await;
    let base = api_base_url();

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let label = format!("resolve-{nanos}");
    let (vendor_id, _) = seed_vendor(&pool, &unique_email("resolve-owner"), &label).await;

    let client = bazaar_integration_tests::session_client();

    // Subdomain fallback: first label before the dot.
    let resp = client
        .get(format!(
            "{base}/api/storefront/by-domain?domain={label}.example.com"
        ))
        .send()
        .await
        .expect("resolve failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["vendor"]["id"], vendor_id);

    // Unknown hostname is a 404.
    let resp = client
        .get(format!(
            "{base}/api/storefront/by-domain?domain=nobody-{nanos}.example.com"
        ))
        .send()
        .await
        .expect("resolve failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
