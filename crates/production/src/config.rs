//! Composer configuration.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Lookup timing and paging for a [`ProductionComposer`](crate::ProductionComposer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Deadline for one inventory lookup; expiry counts as an empty result.
    pub lookup_timeout: Duration,
    /// Quiet period before a free-text search is sent.
    pub search_debounce: Duration,
    /// Page size for free-text searches.
    pub search_page_size: u32,
    /// Page size for variant pool fetches (one page should hold a whole pool).
    pub pool_page_size: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(5),
            search_debounce: Duration::from_millis(300),
            search_page_size: 20,
            pool_page_size: 500,
        }
    }
}

impl ComposerConfig {
    /// Read overrides from the environment, falling back to defaults.
    ///
    /// - `LUMBERYARD_LOOKUP_TIMEOUT_MS`
    /// - `LUMBERYARD_SEARCH_DEBOUNCE_MS`
    /// - `LUMBERYARD_SEARCH_PAGE_SIZE`
    /// - `LUMBERYARD_POOL_PAGE_SIZE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            lookup_timeout: Duration::from_millis(parse_or(
                &lookup,
                "LUMBERYARD_LOOKUP_TIMEOUT_MS",
                defaults.lookup_timeout.as_millis() as u64,
            )),
            search_debounce: Duration::from_millis(parse_or(
                &lookup,
                "LUMBERYARD_SEARCH_DEBOUNCE_MS",
                defaults.search_debounce.as_millis() as u64,
            )),
            search_page_size: parse_or(&lookup, "LUMBERYARD_SEARCH_PAGE_SIZE", defaults.search_page_size),
            pool_page_size: parse_or(&lookup, "LUMBERYARD_POOL_PAGE_SIZE", defaults.pool_page_size),
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    pub fn with_search_page_size(mut self, size: u32) -> Self {
        self.search_page_size = size;
        self
    }

    pub fn with_pool_page_size(mut self, size: u32) -> Self {
        self.pool_page_size = size;
        self
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "unparseable setting; using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_variables_yield_defaults() {
        assert_eq!(ComposerConfig::from_lookup(source(&[])), ComposerConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = ComposerConfig::from_lookup(source(&[
            ("LUMBERYARD_LOOKUP_TIMEOUT_MS", "1500"),
            ("LUMBERYARD_SEARCH_PAGE_SIZE", " 50 "),
        ]));
        assert_eq!(config.lookup_timeout, Duration::from_millis(1500));
        assert_eq!(config.search_page_size, 50);
        assert_eq!(config.pool_page_size, 500);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let config = ComposerConfig::from_lookup(source(&[("LUMBERYARD_SEARCH_DEBOUNCE_MS", "soon")]));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
    }
}
