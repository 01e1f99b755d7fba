//! Seed type: the partial identity a lookup starts from.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

/// Attribute name → single value mapping supplied by the caller.
///
/// No schema is enforced; any attribute name may appear.
///
/// # Example
/// ```
/// use persondir_core::Seed;
///
/// let seed: Seed = Seed::new()
///     .with("uid", "jdoe".to_string())
///     .with("mail", "jdoe@example.edu".to_string());
/// assert_eq!(seed.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed<V = String> {
    attributes: BTreeMap<String, V>,
}

impl<V> Seed<V> {
    /// Creates an empty seed.
    pub fn new() -> Self {
        Self {
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute, builder style.
    pub fn with(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets an attribute, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        self.attributes.insert(name.into(), value)
    }

    /// Returns the value of an attribute.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.attributes.get(name)
    }

    /// Returns true if the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the seed carries no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, V> {
        self.attributes.iter()
    }
}

impl<V> Default for Seed<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Seed<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a Seed<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = btree_map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
