//! Attribute record that ignores attribute-name case on lookup.
//!
//! Directories disagree on the spelling of attribute names (`mail`, `Mail`,
//! `MAIL`). This view answers lookups for any spelling while keeping the
//! names exactly as the directory returned them.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::AttributeRecord;

/// Case-insensitive view over an [`AttributeRecord`].
///
/// Inserting a name that differs from an existing one only by case replaces
/// the values and keeps the first-seen spelling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseInsensitiveRecord<V = String> {
    record: AttributeRecord<V>,
    /// lowercase name → stored spelling
    folded: HashMap<String, String>,
}

impl<V> CaseInsensitiveRecord<V> {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self {
            record: AttributeRecord::new(),
            folded: HashMap::new(),
        }
    }

    fn fold(name: &str) -> String {
        name.to_lowercase()
    }

    fn stored_name(&self, name: &str) -> Option<&str> {
        self.folded.get(&Self::fold(name)).map(String::as_str)
    }

    /// Replaces all values of an attribute, matching its name by case.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<V>) -> Option<Vec<V>> {
        let name = name.into();
        match self.folded.get(&Self::fold(&name)) {
            Some(stored) => self.record.insert(stored.clone(), values),
            None => {
                self.folded.insert(Self::fold(&name), name.clone());
                self.record.insert(name, values)
            }
        }
    }

    /// Appends one value to an attribute, matching its name by case.
    pub fn push(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        let stored = self
            .folded
            .entry(Self::fold(&name))
            .or_insert(name)
            .clone();
        self.record.push(stored, value);
    }

    /// Removes an attribute by any spelling.
    pub fn remove(&mut self, name: &str) -> Option<Vec<V>> {
        let stored = self.folded.remove(&Self::fold(name))?;
        self.record.remove(&stored)
    }

    /// Returns all values of an attribute by any spelling.
    pub fn get(&self, name: &str) -> Option<&[V]> {
        self.stored_name(name).and_then(|stored| self.record.get(stored))
    }

    /// Returns the first value of an attribute by any spelling.
    pub fn first(&self, name: &str) -> Option<&V> {
        self.stored_name(name).and_then(|stored| self.record.first(stored))
    }

    /// Returns true if an attribute with this name exists in any case.
    pub fn contains(&self, name: &str) -> bool {
        self.stored_name(name).is_some()
    }

    /// Iterates over attribute names as first spelled.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.record.names()
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.record.len()
    }

    /// Returns true if the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    /// Borrows the underlying case-preserving record.
    pub fn as_record(&self) -> &AttributeRecord<V> {
        &self.record
    }

    /// Unwraps the underlying case-preserving record.
    pub fn into_record(self) -> AttributeRecord<V> {
        self.record
    }
}

impl<V> Default for CaseInsensitiveRecord<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<AttributeRecord<V>> for CaseInsensitiveRecord<V> {
    fn from(record: AttributeRecord<V>) -> Self {
        let mut view = Self::new();
        for (name, values) in record {
            view.insert(name, values);
        }
        view
    }
}

impl<V> From<CaseInsensitiveRecord<V>> for AttributeRecord<V> {
    fn from(view: CaseInsensitiveRecord<V>) -> Self {
        view.record
    }
}

impl<V: Serialize> Serialize for CaseInsensitiveRecord<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for CaseInsensitiveRecord<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        AttributeRecord::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    fn directory_record() -> CaseInsensitiveRecord {
        let mut record = AttributeRecord::new();
        record.push("givenName", "Jane".to_string());
        record.push("Mail", "jdoe@example.edu".to_string());
        record.into_case_insensitive()
    }

    #[test_case("mail" ; "lowercase")]
    #[test_case("MAIL" ; "uppercase")]
    #[test_case("Mail" ; "first spelling")]
    #[test_case("mAiL" ; "mixed")]
    fn test_lookup_ignores_case(name: &str) {
        let record = directory_record();
        assert!(record.contains(name));
        assert_eq!(record.first(name).map(String::as_str), Some("jdoe@example.edu"));
    }

    #[test]
    fn test_names_keep_first_spelling() {
        let record = directory_record();
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["givenName", "Mail"]);
    }

    #[test]
    fn test_directory_order_survives_wrapping() {
        let json = r#"{"username":["jdoe"],"Mail":["jdoe@example.edu"],"cn":["Jane Doe"]}"#;
        let record: AttributeRecord = serde_json::from_str(json).unwrap();
        let record = record.into_case_insensitive();

        assert_eq!(record.names().collect::<Vec<_>>(), vec!["username", "Mail", "cn"]);
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn test_insert_other_case_replaces_and_keeps_first_spelling() {
        let mut record = directory_record();
        record.insert("MAIL", vec!["jane@example.edu".to_string()]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("mail").unwrap(), &["jane@example.edu".to_string()]);
        assert!(record.as_record().contains("Mail"));
        assert!(!record.as_record().contains("MAIL"));
    }

    #[test]
    fn test_push_and_remove_any_case() {
        let mut record = directory_record();
        record.push("GIVENNAME", "J.".to_string());
        assert_eq!(record.get("givenname").unwrap().len(), 2);

        assert!(record.remove("GivenName").is_some());
        assert!(!record.contains("givenName"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_serializes_with_stored_names() {
        let record = directory_record();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"givenName":["Jane"],"Mail":["jdoe@example.edu"]}"#);

        let parsed: CaseInsensitiveRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.first("MAIL").map(String::as_str), Some("jdoe@example.edu"));
    }

    proptest! {
        #[test]
        fn test_any_casing_finds_value(name in "[a-zA-Z]{1,12}", value in "[a-z0-9]{0,8}") {
            let mut record = AttributeRecord::new();
            record.push(name.clone(), value.clone());
            let record = record.into_case_insensitive();

            prop_assert_eq!(record.first(&name.to_uppercase()), Some(&value));
            prop_assert_eq!(record.first(&name.to_lowercase()), Some(&value));
            prop_assert_eq!(record.names().collect::<Vec<_>>(), vec![name.as_str()]);
        }
    }
}
