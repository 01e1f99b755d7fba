//! In-memory person directory.
//!
//! Fast, thread-safe storage suitable for development, testing,
//! and small static deployments.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument};

use persondir_core::constants::USERNAME_ATTRIBUTE;
use persondir_core::error::{PersonDirError, Result};
use persondir_core::traits::AttributeLookup;
use persondir_core::types::{AttributeRecord, AttributeValue, Seed};

/// In-memory person directory.
///
/// Records are indexed on a single query attribute (`username` unless
/// configured otherwise). A seed resolves to the record whose first value
/// for that attribute equals the seed's value.
///
/// # Thread Safety
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug)]
pub struct MemoryDirectory<V: AttributeValue = String> {
    /// Primary storage: query attribute value → record
    records: DashMap<V, AttributeRecord<V>>,
    /// Attribute the directory is indexed on
    query_attribute: String,
    /// Resolve calls served so far
    lookups: AtomicU64,
    /// Artificial delay per resolve
    latency: Option<Duration>,
}

impl<V: AttributeValue> MemoryDirectory<V> {
    /// Creates an empty directory indexed on `username`.
    pub fn new() -> Self {
        Self::with_query_attribute(USERNAME_ATTRIBUTE)
    }

    /// Creates an empty directory indexed on the given attribute.
    pub fn with_query_attribute(attribute: impl Into<String>) -> Self {
        Self {
            records: DashMap::new(),
            query_attribute: attribute.into(),
            lookups: AtomicU64::new(0),
            latency: None,
        }
    }

    /// Delays every resolve, simulating a remote directory.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the attribute the directory is indexed on.
    pub fn query_attribute(&self) -> &str {
        &self.query_attribute
    }

    /// Returns how many resolve calls have been served.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Adds or replaces a record.
    ///
    /// Fails if the record has no value for the query attribute.
    pub fn insert(&self, record: AttributeRecord<V>) -> Result<()> {
        let id = self.index_of(&record)?;
        self.records.insert(id, record);
        Ok(())
    }

    /// Adds many records, returning how many were stored.
    ///
    /// Nothing is stored unless every record has a query attribute value.
    pub fn import(&self, records: impl IntoIterator<Item = AttributeRecord<V>>) -> Result<usize> {
        let indexed = self.index_all(records)?;
        let count = indexed.len();
        for (id, record) in indexed {
            self.records.insert(id, record);
        }
        Ok(count)
    }

    /// Replaces every record with `records`, returning how many were stored.
    ///
    /// On a validation failure the current records are left untouched.
    pub fn replace_all(&self, records: impl IntoIterator<Item = AttributeRecord<V>>) -> Result<usize> {
        let indexed = self.index_all(records)?;
        let count = indexed.len();
        self.records.clear();
        for (id, record) in indexed {
            self.records.insert(id, record);
        }
        Ok(count)
    }

    fn index_of(&self, record: &AttributeRecord<V>) -> Result<V> {
        record.first(&self.query_attribute).cloned().ok_or_else(|| {
            PersonDirError::ValidationError(format!(
                "record has no value for query attribute '{}'",
                self.query_attribute
            ))
        })
    }

    fn index_all(
        &self,
        records: impl IntoIterator<Item = AttributeRecord<V>>,
    ) -> Result<Vec<(V, AttributeRecord<V>)>> {
        records
            .into_iter()
            .map(|record| Ok((self.index_of(&record)?, record)))
            .collect()
    }

    /// Returns the query attribute value of every record, sorted.
    pub fn ids(&self) -> Vec<V>
    where
        V: Ord,
    {
        let mut ids: Vec<V> = self.records.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Removes all records.
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<V: AttributeValue> Default for MemoryDirectory<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V: AttributeValue> AttributeLookup<V> for MemoryDirectory<V> {
    /// Returns the matching record, or an empty one if nobody matches.
    #[instrument(skip(self, seed), fields(query_attribute = %self.query_attribute))]
    async fn resolve(&self, seed: &Seed<V>) -> Result<AttributeRecord<V>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let record = seed
            .get(&self.query_attribute)
            .and_then(|id| self.records.get(id).map(|entry| entry.value().clone()))
            .unwrap_or_default();

        debug!(attributes = record.len(), "Resolved seed from memory directory");
        Ok(record)
    }

    async fn possible_attribute_names(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .records
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .names()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(username: &str, mail: &str) -> AttributeRecord {
        let mut record = AttributeRecord::new();
        record.push("username", username.to_string());
        record.push("mail", mail.to_string());
        record
    }

    fn seed(username: &str) -> Seed {
        Seed::new().with("username", username.to_string())
    }

    #[tokio::test]
    async fn test_resolve_match() {
        let directory = MemoryDirectory::new();
        directory.insert(person("jdoe", "jdoe@example.edu")).unwrap();
        directory.insert(person("jsmith", "jsmith@example.edu")).unwrap();

        let record = directory.resolve(&seed("jdoe")).await.unwrap();
        assert_eq!(record.first("mail").map(String::as_str), Some("jdoe@example.edu"));
        assert_eq!(directory.lookups(), 1);
    }

    #[tokio::test]
    async fn test_resolve_no_match_is_empty() {
        let directory = MemoryDirectory::new();
        directory.insert(person("jdoe", "jdoe@example.edu")).unwrap();

        assert!(directory.resolve(&seed("nobody")).await.unwrap().is_empty());
        let no_query_attr = Seed::new().with("mail", "jdoe@example.edu".to_string());
        assert!(directory.resolve(&no_query_attr).await.unwrap().is_empty());
        assert_eq!(directory.lookups(), 2);
    }

    #[tokio::test]
    async fn test_custom_query_attribute() {
        let directory = MemoryDirectory::with_query_attribute("mail");
        directory.insert(person("jdoe", "jdoe@example.edu")).unwrap();

        let record = directory
            .resolve(&Seed::new().with("mail", "jdoe@example.edu".to_string()))
            .await
            .unwrap();
        assert_eq!(record.first("username").map(String::as_str), Some("jdoe"));
    }

    #[test]
    fn test_ids_sorted() {
        let directory = MemoryDirectory::new();
        directory.insert(person("jsmith", "jsmith@example.edu")).unwrap();
        directory.insert(person("jdoe", "jdoe@example.edu")).unwrap();

        assert_eq!(directory.ids(), vec!["jdoe".to_string(), "jsmith".to_string()]);
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let directory = MemoryDirectory::new();
        let mut unindexed = AttributeRecord::new();
        unindexed.push("mail", "x@example.edu".to_string());

        let result = directory.import(vec![person("jdoe", "jdoe@example.edu"), unindexed]);
        assert!(matches!(result, Err(PersonDirError::ValidationError(_))));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_replace_all_keeps_records_on_failure() {
        let directory = MemoryDirectory::new();
        directory.import(vec![person("jdoe", "jdoe@example.edu")]).unwrap();

        let mut unindexed = AttributeRecord::new();
        unindexed.push("mail", "x@example.edu".to_string());
        let result = directory.replace_all(vec![person("solo", "solo@example.edu"), unindexed]);
        assert!(matches!(result, Err(PersonDirError::ValidationError(_))));
        assert_eq!(directory.ids(), vec!["jdoe".to_string()]);

        let count = directory.replace_all(vec![person("solo", "solo@example.edu")]).unwrap();
        assert_eq!(count, 1);
        assert_eq!(directory.ids(), vec!["solo".to_string()]);
    }

    #[test]
    fn test_insert_requires_query_attribute() {
        let directory = MemoryDirectory::new();
        let mut record = AttributeRecord::new();
        record.push("mail", "anon@example.edu".to_string());

        let err = directory.insert(record).unwrap_err();
        assert!(matches!(err, PersonDirError::ValidationError(_)));
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn test_possible_attribute_names_union() {
        let directory = MemoryDirectory::new();
        let mut staff = person("jdoe", "jdoe@example.edu");
        staff.push("department", "IT".to_string());
        directory.import(vec![staff, person("jsmith", "jsmith@example.edu")]).unwrap();

        let names = directory.possible_attribute_names().await.unwrap();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["department", "mail", "username"]);
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let directory = MemoryDirectory::new().with_latency(Duration::from_millis(20));
        directory.insert(person("jdoe", "jdoe@example.edu")).unwrap();

        let started = std::time::Instant::now();
        directory.resolve(&seed("jdoe")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
