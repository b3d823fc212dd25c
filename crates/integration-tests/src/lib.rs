//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply the schema
//! cargo run -p bazaar-cli -- migrate
//!
//! # Start the API
//! cargo run -p bazaar-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! The tests in `tests/` exercise the live HTTP surface: the
//! passwordless login flow, tenancy denials, cart merge semantics, and
//! transactional checkout. Each is `#[ignore]`-gated because it needs a
//! running server and database.

use reqwest::Client;
use serde_json::json;
use sqlx::PgPool;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("BAZAAR_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A cookie-holding client, one session per test actor.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the test database named by `BAZAAR_DATABASE_URL`.
///
/// # Panics
///
/// Panics if the variable is unset or the database is unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("BAZAAR_DATABASE_URL must be set for integration tests");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// Fetch the most recent unused one-time code for an email straight from
/// the database, standing in for reading the delivery inbox.
///
/// # Panics
///
/// Panics if no code exists.
pub async fn latest_code(pool: &PgPool, email: &str) -> String {
    sqlx::query_scalar(
        "SELECT code FROM otp_codes \
         WHERE email = $1 AND NOT used \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("no one-time code issued for email")
}

/// Drive the full passwordless login for `email`, registering a buyer
/// account on first contact. Returns the logged-in session client.
///
/// # Panics
///
/// Panics if any step of the flow fails.
pub async fn login(pool: &PgPool, email: &str) -> Client {
    let client = session_client();
    let base = api_base_url();

    // Delivery may fail in test environments without SMTP; the code is
    // persisted before dispatch either way.
    let _ = client
        .post(format!("{base}/api/auth/send-otp"))
        .json(&json!({ "email": email }))
        .send()
        .await;

    let code = latest_code(pool, email).await;

    let resp = client
        .post(format!("{base}/api/auth/verify-otp"))
        .json(&json!({ "email": email, "code": code }))
        .send()
        .await
        .expect("verify-otp request failed");
    assert!(resp.status().is_success(), "verify-otp rejected");

    let body: serde_json::Value = resp.json().await.expect("verify-otp body");
    if body["requires_registration"] == serde_json::Value::Bool(true) {
        let resp = client
            .post(format!("{base}/api/auth/register"))
            .json(&json!({ "email": email }))
            .send()
            .await
            .expect("register request failed");
        assert!(resp.status().is_success(), "register rejected");
    }

    client
}
