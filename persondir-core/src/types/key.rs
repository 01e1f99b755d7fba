//! Cache keys derived from seeds.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural cache key: chosen attribute name → seed value.
///
/// A component whose attribute was missing from the seed is `None`, so
/// every seed lacking that attribute maps to the same key.
///
/// Keys compare and hash by content, never by identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey<V = String> {
    components: BTreeMap<String, Option<V>>,
}

impl<V> CacheKey<V> {
    /// Creates a key with no components.
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    /// Adds a component, builder style.
    pub fn with(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a component.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<V>) {
        self.components.insert(name.into(), value);
    }

    /// Returns a component.
    ///
    /// The outer `Option` tells whether the attribute is part of the key,
    /// the inner one whether the seed carried a value for it.
    pub fn get(&self, name: &str) -> Option<Option<&V>> {
        self.components.get(name).map(Option::as_ref)
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the key has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates over components in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Option<V>> {
        self.components.iter()
    }
}

impl<V> Default for CacheKey<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Display> fmt::Display for CacheKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{}={}", name, value)?,
                None => write!(f, "{}=<absent>", name)?,
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_key_structural_equality() {
        let a: CacheKey = CacheKey::new().with("uid", Some("jdoe".into()));
        let b: CacheKey = CacheKey::new().with("uid", Some("jdoe".to_string()));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_key_absent_component() {
        let key: CacheKey = CacheKey::new().with("uid", None);
        assert_eq!(key.len(), 1);
        assert_eq!(key.get("uid"), Some(None));
        assert_eq!(key.get("mail"), None);
    }

    #[test]
    fn test_key_display() {
        let key: CacheKey = CacheKey::new()
            .with("uid", Some("jdoe".into()))
            .with("mail", None);
        assert_eq!(key.to_string(), "{mail=<absent>, uid=jdoe}");
        assert_eq!(CacheKey::<String>::new().to_string(), "{}");
    }
}
