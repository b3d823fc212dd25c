//! Public storefront resolution.
//!
//! Maps an inbound hostname to the vendor whose storefront should be
//! served: exact custom-domain match first, then the first hostname
//! label as a subdomain.

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Optional explicit domain, overriding the Host header.
#[derive(Debug, Deserialize)]
pub struct ByDomainQuery {
    #[serde(default)]
    pub domain: Option<String>,
}

/// Resolve the vendor for a hostname.
///
/// GET /api/storefront/by-domain
///
/// Keyed by the `domain` query parameter when present, otherwise the
/// Host header.
///
/// # Errors
///
/// Returns `AppError::Validation` when neither source yields a hostname
/// and `AppError::NotFound` when no vendor matches.
pub async fn by_domain(
    State(state): State<AppState>,
    Query(query): Query<ByDomainQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let host = match query.domain {
        Some(domain) if !domain.trim().is_empty() => domain,
        _ => headers
            .get(axum::http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("no hostname provided".to_owned()))?,
    };

    let vendor = state
        .domains()
        .resolve(&host)
        .await?
        .ok_or_else(|| AppError::NotFound("no storefront for this domain".to_owned()))?;

    Ok(Json(json!({ "vendor": vendor })))
}
