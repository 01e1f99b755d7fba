//! Attribute records returned by lookups.

use indexmap::map::{self, IndexMap};
use serde::{Deserialize, Serialize};

use super::CaseInsensitiveRecord;

/// Resolved attributes of one person: name → ordered list of values.
///
/// Attribute names keep the order they were first inserted in, on iteration
/// and in serialized form. Records are cached verbatim, so equality is
/// structural and ignores that order.
///
/// # Example
/// ```
/// use persondir_core::AttributeRecord;
///
/// let mut record: AttributeRecord = AttributeRecord::new();
/// record.push("memberOf", "staff".to_string());
/// record.push("memberOf", "faculty".to_string());
/// assert_eq!(record.get("memberOf").unwrap().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRecord<V = String> {
    attributes: IndexMap<String, Vec<V>>,
}

impl<V> AttributeRecord<V> {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self {
            attributes: IndexMap::new(),
        }
    }

    /// Replaces all values of an attribute.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<V>) -> Option<Vec<V>> {
        self.attributes.insert(name.into(), values)
    }

    /// Appends one value to an attribute, creating it if needed.
    pub fn push(&mut self, name: impl Into<String>, value: V) {
        self.attributes.entry(name.into()).or_default().push(value);
    }

    /// Removes an attribute, returning its values.
    ///
    /// The remaining attributes keep their order.
    pub fn remove(&mut self, name: &str) -> Option<Vec<V>> {
        self.attributes.shift_remove(name)
    }

    /// Returns all values of an attribute.
    pub fn get(&self, name: &str) -> Option<&[V]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// Returns the first value of an attribute.
    pub fn first(&self, name: &str) -> Option<&V> {
        self.attributes.get(name).and_then(|values| values.first())
    }

    /// Returns true if the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Iterates over attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.keys().map(String::as_str)
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates over `(name, values)` pairs.
    pub fn iter(&self) -> map::Iter<'_, String, Vec<V>> {
        self.attributes.iter()
    }

    /// Wraps the record in a view that ignores attribute-name case.
    pub fn into_case_insensitive(self) -> CaseInsensitiveRecord<V> {
        CaseInsensitiveRecord::from(self)
    }
}

impl<V> Default for AttributeRecord<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, Vec<V>)> for AttributeRecord<V> {
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<V> IntoIterator for AttributeRecord<V> {
    type Item = (String, Vec<V>);
    type IntoIter = map::IntoIter<String, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a AttributeRecord<V> {
    type Item = (&'a String, &'a Vec<V>);
    type IntoIter = map::Iter<'a, String, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
