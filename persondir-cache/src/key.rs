//! Cache key derivation.

use std::collections::BTreeSet;

use tracing::debug;

use persondir_core::error::{PersonDirError, Result};
use persondir_core::types::{AttributeValue, CacheKey, Seed};

/// Derives cache keys from seeds.
///
/// # Policy
/// - A non-empty key-attribute set wins: the key holds every listed attribute.
/// - Otherwise the default attribute alone forms the key.
/// - With neither configured, derivation is a configuration error.
///
/// An empty key-attribute set is the same as an unset one. Blank attribute
/// names never become key components, so a policy made only of blank names
/// derives no key and caching is skipped for that call.
#[derive(Clone, Debug, Default)]
pub struct CacheKeyBuilder {
    key_attributes: BTreeSet<String>,
    default_attribute: Option<String>,
}

impl CacheKeyBuilder {
    /// Creates a builder with no policy configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attributes that form the key.
    pub fn with_key_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the fallback attribute used when no key attributes are set.
    pub fn with_default_attribute(mut self, name: impl Into<String>) -> Self {
        self.default_attribute = Some(name.into());
        self
    }

    /// Returns the configured key attributes.
    pub fn key_attributes(&self) -> &BTreeSet<String> {
        &self.key_attributes
    }

    /// Returns the configured fallback attribute.
    pub fn default_attribute(&self) -> Option<&str> {
        self.default_attribute.as_deref()
    }

    /// Returns true if a key can be derived at all.
    pub fn has_policy(&self) -> bool {
        !self.key_attributes.is_empty() || self.default_attribute.is_some()
    }

    /// Derives the cache key for `seed`.
    ///
    /// Attributes missing from the seed become absent components rather
    /// than being skipped. Returns `Ok(None)` when the key would be empty
    /// (every configured name is blank), which disables caching for that
    /// call.
    pub fn derive_key<V: AttributeValue>(&self, seed: &Seed<V>) -> Result<Option<CacheKey<V>>> {
        let mut key = CacheKey::new();

        if self.key_attributes.is_empty() {
            let default = self.default_attribute.as_deref().ok_or_else(|| {
                PersonDirError::ConfigError(
                    "neither cache key attributes nor a default attribute are configured".into(),
                )
            })?;

            if !is_blank(default) {
                key.insert(default, seed.get(default).cloned());
            }
            debug!(?key, default_attribute = default, "Created cache key from default attribute");
        } else {
            for attribute in self.key_attributes.iter().filter(|a| !is_blank(a)) {
                key.insert(attribute.as_str(), seed.get(attribute).cloned());
            }
            debug!(?key, attributes = ?self.key_attributes, "Created cache key from key attributes");
        }

        if key.is_empty() {
            Ok(None)
        } else {
            Ok(Some(key))
        }
    }
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}
