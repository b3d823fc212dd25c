//! Development seed data.
//!
//! Creates a seller with a vendor, a small catalog, and a buyer, so a
//! fresh database has something to browse. Idempotent: existing rows
//! are left alone via ON CONFLICT DO NOTHING.

use sqlx::PgPool;

use super::{CommandError, connect};

/// Seed the database with sample data.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let seller_id = upsert_user(&pool, "seller@example.com", "seller").await?;
    upsert_user(&pool, "buyer@example.com", "buyer").await?;

    let vendor_id: i32 = sqlx::query_scalar(
        "INSERT INTO vendors (name, owner_id, domain) \
         VALUES ('Acme Outfitters', $1, 'acme') \
         ON CONFLICT (owner_id) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(seller_id)
    .fetch_one(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO categories (name, vendor_id, is_global) \
         VALUES ('Apparel', NULL, TRUE) \
         ON CONFLICT DO NOTHING",
    )
    .execute(&pool)
    .await?;

    let products: &[(&str, &str)] = &[
        ("Trail Jacket", "89.99"),
        ("Wool Beanie", "19.50"),
        ("Canvas Tote", "24.00"),
    ];
    for (name, price) in products {
        sqlx::query(
            "INSERT INTO products (vendor_id, name, price) \
             SELECT $1, $2, $3::numeric \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM products WHERE vendor_id = $1 AND name = $2 \
             )",
        )
        .bind(vendor_id)
        .bind(name)
        .bind(price)
        .execute(&pool)
        .await?;
    }

    tracing::info!(vendor_id, "Seed data in place");
    Ok(())
}

async fn upsert_user(pool: &PgPool, email: &str, role: &str) -> Result<i32, CommandError> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, role, email_verified) \
         VALUES ($1, $2, TRUE) \
         ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role \
         RETURNING id",
    )
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
