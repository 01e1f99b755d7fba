//! Configuration for the caching lookup and its store.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use persondir_core::constants::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECONDS};
use persondir_core::error::{PersonDirError, Result};
use persondir_core::traits::CacheStore;
use persondir_core::types::AttributeValue;

use crate::store::{MemoryCacheStore, TtlCacheStore};

const ENV_KEY_ATTRIBUTES: &str = "PERSONDIR_CACHE_KEY_ATTRIBUTES";
const ENV_DEFAULT_ATTRIBUTE: &str = "PERSONDIR_DEFAULT_ATTRIBUTE";
const ENV_STORE: &str = "PERSONDIR_STORE";
const ENV_TTL_SECS: &str = "PERSONDIR_CACHE_TTL_SECS";
const ENV_MAX_ENTRIES: &str = "PERSONDIR_CACHE_MAX_ENTRIES";

/// Bounded store configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Default TTL in seconds
    pub default_ttl_seconds: u64,
    /// Whether to drop expired entries before evicting live ones
    pub auto_cleanup: bool,
}

impl StoreConfig {
    /// Rejects a zero capacity, which would make the store useless.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(PersonDirError::ConfigError(
                "cache capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Default TTL as a duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            auto_cleanup: true,
        }
    }
}

/// Which bundled store backs the cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Unbounded [`MemoryCacheStore`]
    #[default]
    Memory,
    /// Bounded [`TtlCacheStore`]
    Ttl,
}

impl FromStr for StoreKind {
    type Err = PersonDirError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "ttl" => Ok(StoreKind::Ttl),
            other => Err(PersonDirError::ConfigError(format!(
                "unknown cache store '{}', expected 'memory' or 'ttl'",
                other
            ))),
        }
    }
}

/// Caching lookup configuration.
///
/// Collaborators (the wrapped lookup) are not part of it; they are wired
/// in code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachingConfig {
    /// Seed attributes forming the cache key
    pub key_attributes: Vec<String>,
    /// Fallback key attribute when `key_attributes` is empty
    pub default_attribute: Option<String>,
    /// Backing store
    pub store: StoreKind,
    /// Settings for the bounded store
    pub store_config: StoreConfig,
}

impl CachingConfig {
    /// Reads configuration from `PERSONDIR_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable source.
    ///
    /// Unset and blank variables fall back to defaults.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| var(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(list) = var(ENV_KEY_ATTRIBUTES) {
            config.key_attributes = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        config.default_attribute = var(ENV_DEFAULT_ATTRIBUTE).map(|name| name.trim().to_string());
        if let Some(store) = var(ENV_STORE) {
            config.store = store.parse()?;
        }
        if let Some(ttl) = var(ENV_TTL_SECS) {
            config.store_config.default_ttl_seconds = parse_number(ENV_TTL_SECS, &ttl)?;
        }
        if let Some(max) = var(ENV_MAX_ENTRIES) {
            config.store_config.max_entries = parse_number(ENV_MAX_ENTRIES, &max)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the store settings.
    pub fn validate(&self) -> Result<()> {
        self.store_config.validate()
    }

    /// Creates the configured store.
    pub fn build_store<V: AttributeValue>(&self) -> Arc<dyn CacheStore<V>> {
        match self.store {
            StoreKind::Memory => Arc::new(MemoryCacheStore::new()),
            StoreKind::Ttl => Arc::new(TtlCacheStore::with_config(self.store_config.clone())),
        }
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| PersonDirError::ConfigError(format!("{} must be a number, got '{}'", name, raw)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_case::test_case;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_vars() {
        let config = CachingConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, CachingConfig::default());
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.store_config.max_entries, DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn test_from_vars() {
        let config = CachingConfig::from_vars(vars(&[
            (ENV_KEY_ATTRIBUTES, "uid, campus,,"),
            (ENV_DEFAULT_ATTRIBUTE, "username"),
            (ENV_STORE, "TTL"),
            (ENV_TTL_SECS, "60"),
            (ENV_MAX_ENTRIES, "10"),
        ]))
        .unwrap();

        assert_eq!(config.key_attributes, vec!["uid", "campus"]);
        assert_eq!(config.default_attribute.as_deref(), Some("username"));
        assert_eq!(config.store, StoreKind::Ttl);
        assert_eq!(config.store_config.default_ttl(), Duration::from_secs(60));
        assert_eq!(config.store_config.max_entries, 10);
    }

    #[test]
    fn test_blank_default_attribute_is_unset() {
        let config = CachingConfig::from_vars(vars(&[(ENV_DEFAULT_ATTRIBUTE, "  ")])).unwrap();
        assert!(config.default_attribute.is_none());
    }

    #[test_case(ENV_STORE, "redis" ; "unknown store")]
    #[test_case(ENV_TTL_SECS, "soon" ; "bad ttl")]
    #[test_case(ENV_MAX_ENTRIES, "-1" ; "negative capacity")]
    fn test_invalid_vars_are_config_errors(name: &str, value: &str) {
        let err = CachingConfig::from_vars(vars(&[(name, value)])).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = CachingConfig::from_vars(vars(&[(ENV_MAX_ENTRIES, "0")])).unwrap_err();
        assert!(err.is_config_error());

        let mut config = CachingConfig::default();
        config.store_config.max_entries = 0;
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_config_json() {
        let config: CachingConfig =
            serde_json::from_str(r#"{"key_attributes":["uid"],"store":"ttl"}"#).unwrap();
        assert_eq!(config.key_attributes, vec!["uid"]);
        assert_eq!(config.store, StoreKind::Ttl);
        assert!(config.store_config.auto_cleanup);
    }
}
