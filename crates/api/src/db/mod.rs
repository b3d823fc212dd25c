//! Database operations for the Bazaar `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - Accounts and roles
//! - `vendors` - Tenant storefronts (one owning seller each)
//! - `custom_domains` - Custom storefront domains
//! - `categories` - Global and vendor-scoped product categories
//! - `products` - Vendor catalog
//! - `cart_items` - Per-user cart lines, unique per variant combination
//! - `orders` / `order_items` - Frozen order snapshots
//! - `otp_codes` - One-time login codes
//! - tower-sessions storage (created by the session store itself)
//!
//! Queries are runtime-bound (`sqlx::query_as` + `bind`) rather than the
//! compile-time `query!` macros, so the workspace builds without a live
//! database. Migrations live in `crates/api/migrations/` and run via
//! `bazaar-cli migrate`.

pub mod cart;
pub mod categories;
pub mod custom_domains;
pub mod orders;
pub mod otp;
pub mod products;
pub mod users;
pub mod vendors;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Translate a unique-constraint violation into [`Self::Conflict`].
    pub(crate) fn from_unique_violation(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
