//! Admin user management.

use std::str::FromStr;

use bazaar_core::Role;

use super::{CommandError, connect};

/// Create an admin user, pre-verified and protected from deletion.
///
/// # Errors
///
/// Returns an error for an unknown role, a duplicate email, or a
/// database failure.
pub async fn create_user(email: &str, role: &str) -> Result<(), CommandError> {
    let role = Role::from_str(role)
        .map_err(|_| CommandError::InvalidArgument(format!("unknown role: {role}")))?;
    if !role.is_admin() {
        return Err(CommandError::InvalidArgument(
            "role must be admin or super_admin".to_owned(),
        ));
    }

    let pool = connect().await?;

    // Bootstrap accounts are non-deletable so the last super admin
    // cannot be removed through the API.
    sqlx::query(
        "INSERT INTO users (email, role, email_verified, deletable) \
         VALUES ($1, $2, TRUE, FALSE)",
    )
    .bind(email)
    .bind(role)
    .execute(&pool)
    .await?;

    tracing::info!(email = %email, role = %role, "Admin user created");
    Ok(())
}
