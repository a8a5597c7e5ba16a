//! Candidate URL resolution.
//!
//! [`EndpointResolver`] is the single source of truth for where the backend
//! lives. It turns a logical path such as `/api/wallet/balance` into the
//! ordered list of URLs the requester walks through: the primary base, then
//! each fallback base, then the bare path itself.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::EndpointConfig;

/// Ordered, deduplicated candidate URLs for one logical path.
///
/// Never empty. When the relative fallback is enabled the bare path is the
/// last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidates(Vec<String>);

impl EndpointCandidates {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a EndpointCandidates {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolves logical paths to candidate URLs.
///
/// Cheap to clone; the configuration is shared behind an `Arc` so every
/// screen sees the same host list.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    config: Arc<EndpointConfig>,
}

impl EndpointResolver {
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Produce the candidate list for `path`.
    ///
    /// Trailing slashes on bases are stripped and the path always gets a
    /// leading slash, so `http://host/` + `api/x` becomes `http://host/api/x`.
    /// Malformed bases are kept as-is; the requester treats an unreachable
    /// candidate as "try the next one".
    pub fn resolve(&self, path: &str) -> EndpointCandidates {
        let path = normalize_path(path);

        let bases = self
            .config
            .primary
            .iter()
            .chain(self.config.fallbacks.iter())
            .map(|base| base.trim().trim_end_matches('/'))
            .filter(|base| !base.is_empty());

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for base in bases {
            let url = format!("{base}{path}");
            if seen.insert(url.clone()) {
                candidates.push(url);
            }
        }

        // A base is never blank here, so the bare path cannot already be present.
        if self.config.relative_fallback || candidates.is_empty() {
            candidates.push(path);
        }

        EndpointCandidates(candidates)
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(primary: Option<&str>, fallbacks: &[&str]) -> EndpointResolver {
        EndpointResolver::new(
            EndpointConfig::new(primary.map(str::to_string)).with_fallbacks(fallbacks.to_vec()),
        )
    }

    #[test]
    fn test_primary_first_relative_last() {
        let candidates = resolver(
            Some("https://api.example.com/"),
            &["http://localhost:5000", "http://127.0.0.1:5000"],
        )
        .resolve("/api/wallet/balance");

        assert_eq!(
            candidates.as_slice(),
            &[
                "https://api.example.com/api/wallet/balance",
                "http://localhost:5000/api/wallet/balance",
                "http://127.0.0.1:5000/api/wallet/balance",
                "/api/wallet/balance",
            ]
        );
    }

    #[test]
    fn test_duplicates_removed_order_kept() {
        let candidates = resolver(
            Some("http://localhost:5000"),
            &["http://localhost:5000/", "http://127.0.0.1:5000", "http://localhost:5000"],
        )
        .resolve("api/users/profile");

        assert_eq!(
            candidates.as_slice(),
            &[
                "http://localhost:5000/api/users/profile",
                "http://127.0.0.1:5000/api/users/profile",
                "/api/users/profile",
            ]
        );
    }

    #[test]
    fn test_blank_primary_is_absent() {
        let candidates = resolver(Some("   "), &["http://localhost:5000"]).resolve("/x");
        assert_eq!(candidates.as_slice(), &["http://localhost:5000/x", "/x"]);
    }

    #[test]
    fn test_never_empty() {
        let config = EndpointConfig::new(None)
            .with_fallbacks(Vec::<String>::new())
            .without_relative_fallback();
        let candidates = EndpointResolver::new(config).resolve("/api/wallet/balance");
        assert_eq!(candidates.as_slice(), &["/api/wallet/balance"]);
    }

    #[test]
    fn test_relative_fallback_can_be_disabled() {
        let config = EndpointConfig::new(Some("http://a".into()))
            .with_fallbacks(["http://b"])
            .without_relative_fallback();
        let candidates = EndpointResolver::new(config).resolve("/p");
        assert_eq!(candidates.as_slice(), &["http://a/p", "http://b/p"]);
    }

    #[test]
    fn test_property_over_many_configs() {
        let bases = ["http://a", "http://a/", "http://b", "", "http://c//", "not a url"];
        for primary in [None, Some("http://a"), Some("http://z/")] {
            for n in 0..=bases.len() {
                let candidates = resolver(primary, &bases[..n]).resolve("/api/thing");
                let list = candidates.as_slice();

                if let Some(primary) = primary {
                    assert!(list[0].starts_with(primary.trim_end_matches('/')));
                }
                assert_eq!(list.last().map(String::as_str), Some("/api/thing"));

                let unique: HashSet<_> = list.iter().collect();
                assert_eq!(unique.len(), list.len(), "duplicates in {list:?}");
            }
        }
    }
}
