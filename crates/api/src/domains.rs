//! Hostname to vendor storefront resolution.
//!
//! A two-tier exact-match probe: the full hostname is tried against custom
//! domains first, then the first label (the part before the first dot) is
//! tried against vendor subdomains. There is no wildcard or suffix matching;
//! multi-level hostnames resolve by the first-label heuristic only. That is
//! a documented limitation of the scheme, not a bug.
//!
//! Lookups are cached with a short-TTL moka cache since storefront pages hit
//! this on every request.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::db::RepositoryError;
use crate::db::vendors::VendorRepository;
use crate::models::Vendor;

/// How long a resolved hostname stays cached.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Maximum number of cached hostnames.
const CACHE_CAPACITY: u64 = 1024;

/// Normalize an inbound hostname and derive the lookup candidates.
///
/// Strips a trailing `:port` suffix, lowercases, and, when the host
/// contains a dot, extracts the first label as the subdomain candidate.
/// Returns `None` for an empty host.
#[must_use]
pub fn host_candidates(host: &str) -> Option<(String, Option<String>)> {
    let host = host.trim();

    // Strip a :port suffix (e.g. "shop.example.com:8080").
    let host = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };

    if host.is_empty() {
        return None;
    }

    let host = host.to_ascii_lowercase();

    let subdomain = host
        .split_once('.')
        .map(|(label, _)| label.to_owned())
        .filter(|label| !label.is_empty());

    Some((host, subdomain))
}

/// Resolves hostnames to vendors, with caching.
#[derive(Clone)]
pub struct DomainResolver {
    pool: PgPool,
    cache: Cache<String, Vendor>,
}

impl DomainResolver {
    /// Create a resolver backed by `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { pool, cache }
    }

    /// Resolve `host` to the vendor whose storefront it serves.
    ///
    /// Custom-domain exact match wins; the first-label subdomain probe is
    /// the fallback. Misses are not cached so a newly activated domain is
    /// picked up immediately.
    ///
    /// # Errors
    ///
    /// Returns a repository error if a lookup fails.
    pub async fn resolve(&self, host: &str) -> Result<Option<Vendor>, RepositoryError> {
        let Some((host, subdomain)) = host_candidates(host) else {
            return Ok(None);
        };

        if let Some(vendor) = self.cache.get(&host).await {
            return Ok(Some(vendor));
        }

        let vendors = VendorRepository::new(&self.pool);

        let resolved = match vendors.get_by_custom_domain(&host).await? {
            Some(vendor) => Some(vendor),
            None => match subdomain {
                Some(label) => vendors.get_by_domain(&label).await?,
                None => None,
            },
        };

        if let Some(ref vendor) = resolved {
            self.cache.insert(host, vendor.clone()).await;
        }

        Ok(resolved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_host_has_no_subdomain_candidate() {
        let (host, subdomain) = host_candidates("shop").unwrap();
        assert_eq!(host, "shop");
        assert_eq!(subdomain, None);
    }

    #[test]
    fn test_dotted_host_yields_first_label() {
        let (host, subdomain) = host_candidates("shop.example.com").unwrap();
        assert_eq!(host, "shop.example.com");
        assert_eq!(subdomain.as_deref(), Some("shop"));
    }

    #[test]
    fn test_port_suffix_is_stripped() {
        let (host, subdomain) = host_candidates("shop.example.com:8080").unwrap();
        assert_eq!(host, "shop.example.com");
        assert_eq!(subdomain.as_deref(), Some("shop"));
    }

    #[test]
    fn test_hostname_is_lowercased() {
        let (host, _) = host_candidates("Shop.Example.COM").unwrap();
        assert_eq!(host, "shop.example.com");
    }

    #[test]
    fn test_first_label_only_for_multi_level_hosts() {
        // Documented limitation: only the first label is probed.
        let (_, subdomain) = host_candidates("a.b.c.example.com").unwrap();
        assert_eq!(subdomain.as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_host_rejected() {
        assert_eq!(host_candidates(""), None);
        assert_eq!(host_candidates(":8080"), None);
        assert_eq!(host_candidates("   "), None);
    }

    #[test]
    fn test_non_numeric_port_is_part_of_host() {
        // "host:abc" is not a port suffix; leave it alone.
        let (host, _) = host_candidates("host:abc").unwrap();
        assert_eq!(host, "host:abc");
    }
}
