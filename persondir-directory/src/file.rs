//! File-backed person directory.
//!
//! Loads records from a JSON file into a memory directory. Suitable for
//! static deployments and local experiments.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, info, instrument};

use persondir_core::error::{PersonDirError, Result};
use persondir_core::traits::AttributeLookup;
use persondir_core::types::{AttributeRecord, AttributeValue, Seed};

use crate::MemoryDirectory;

/// File-backed person directory.
///
/// # File Format
///
/// A JSON array of records, each an object of attribute name → value list:
///
/// ```text
/// [
///   {"username": ["jdoe"], "mail": ["jdoe@example.edu"]},
///   {"username": ["jsmith"], "memberOf": ["staff", "faculty"]}
/// ]
/// ```
pub struct FileDirectory<V: AttributeValue = String> {
    /// Path to the directory file
    path: PathBuf,
    /// In-memory storage
    memory: MemoryDirectory<V>,
}

impl<V: AttributeValue + DeserializeOwned> FileDirectory<V> {
    /// Opens a directory file indexed on `username`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, MemoryDirectory::new()).await
    }

    /// Opens a directory file into a preconfigured memory directory.
    ///
    /// Any records already in `memory` are replaced.
    pub async fn open_with(path: impl AsRef<Path>, memory: MemoryDirectory<V>) -> Result<Self> {
        let directory = Self {
            path: path.as_ref().to_path_buf(),
            memory,
        };
        directory.reload().await?;
        Ok(directory)
    }

    /// Re-reads the file, replacing all records.
    ///
    /// If the file cannot be read, parsed or indexed, the records loaded
    /// before stay in place.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn reload(&self) -> Result<usize> {
        let contents = fs::read(&self.path).await.map_err(|e| {
            PersonDirError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to read directory file {}: {}", self.path.display(), e),
            ))
        })?;

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Err(PersonDirError::DirectoryError(format!(
                "directory file {} is empty",
                self.path.display()
            )));
        }

        let records: Vec<AttributeRecord<V>> = serde_json::from_slice(&contents)?;
        debug!(count = records.len(), "Parsed directory file");

        let count = self.memory.replace_all(records)?;
        info!(count, "Loaded person directory from file");

        Ok(count)
    }

    /// Returns the path of the directory file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the in-memory directory.
    pub fn memory(&self) -> &MemoryDirectory<V> {
        &self.memory
    }
}

#[async_trait]
impl<V: AttributeValue> AttributeLookup<V> for FileDirectory<V> {
    async fn resolve(&self, seed: &Seed<V>) -> Result<AttributeRecord<V>> {
        self.memory.resolve(seed).await
    }

    async fn possible_attribute_names(&self) -> Result<BTreeSet<String>> {
        self.memory.possible_attribute_names().await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use tempfile::NamedTempFile;

    use persondir_cache::{CachingLookup, MemoryCacheStore};

    use super::*;

    const PEOPLE: &str = r#"[
        {"username": ["jdoe"], "mail": ["jdoe@example.edu"], "memberOf": ["staff", "faculty"]},
        {"username": ["jsmith"], "mail": ["jsmith@example.edu"]}
    ]"#;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn seed(username: &str) -> Seed {
        Seed::new().with("username", username.to_string())
    }

    #[tokio::test]
    async fn test_open_and_resolve() {
        let file = write_file(PEOPLE);
        let directory: FileDirectory = FileDirectory::open(file.path()).await.unwrap();

        assert_eq!(directory.memory().len(), 2);
        let record = directory.resolve(&seed("jdoe")).await.unwrap();
        assert_eq!(record.get("memberOf").unwrap().len(), 2);

        let names = directory.possible_attribute_names().await.unwrap();
        assert!(names.contains("memberOf"));
    }

    #[tokio::test]
    async fn test_open_with_custom_index() {
        let file = write_file(PEOPLE);
        let directory: FileDirectory =
            FileDirectory::open_with(file.path(), MemoryDirectory::with_query_attribute("mail"))
                .await
                .unwrap();

        let record = directory
            .resolve(&Seed::new().with("mail", "jsmith@example.edu".to_string()))
            .await
            .unwrap();
        assert_eq!(record.first("username").map(String::as_str), Some("jsmith"));
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let file = write_file(PEOPLE);
        let directory: FileDirectory = FileDirectory::open(file.path()).await.unwrap();

        std::fs::write(file.path(), r#"[{"username": ["solo"]}]"#).unwrap();

        assert_eq!(directory.reload().await.unwrap(), 1);
        assert!(directory.resolve(&seed("jdoe")).await.unwrap().is_empty());
        assert!(!directory.resolve(&seed("solo")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_records() {
        let file = write_file(PEOPLE);
        let directory: FileDirectory = FileDirectory::open(file.path()).await.unwrap();

        std::fs::write(file.path(), r#"[{"username": ["solo"]}, {"mail": ["x@y"]}]"#).unwrap();
        let result = directory.reload().await;
        assert!(matches!(result, Err(PersonDirError::ValidationError(_))));
        assert_eq!(directory.memory().ids(), vec!["jdoe".to_string(), "jsmith".to_string()]);

        std::fs::write(file.path(), "not json").unwrap();
        assert!(matches!(directory.reload().await, Err(PersonDirError::JsonError(_))));
        assert_eq!(directory.memory().len(), 2);
        assert!(!directory.resolve(&seed("jdoe")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileDirectory::<String>::open(dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(PersonDirError::IoError(_))));
    }

    #[tokio::test]
    async fn test_empty_and_malformed_files() {
        let empty = write_file("  \n");
        let result = FileDirectory::<String>::open(empty.path()).await;
        assert!(matches!(result, Err(PersonDirError::DirectoryError(_))));

        let malformed = write_file(r#"{"username": "jdoe"}"#);
        let result = FileDirectory::<String>::open(malformed.path()).await;
        assert!(matches!(result, Err(PersonDirError::JsonError(_))));

        let unindexed = write_file(r#"[{"mail": ["x@example.edu"]}]"#);
        let result = FileDirectory::<String>::open(unindexed.path()).await;
        assert!(matches!(result, Err(PersonDirError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_caching_in_front_of_file_directory() {
        let file = write_file(PEOPLE);
        let directory = Arc::new(FileDirectory::<String>::open(file.path()).await.unwrap());
        let caching = CachingLookup::<String>::builder()
            .shared_lookup(directory.clone())
            .store(MemoryCacheStore::new())
            .default_attribute("username")
            .build()
            .unwrap();

        for _ in 0..3 {
            let record = caching.resolve_username("jdoe").await.unwrap();
            assert_eq!(record.first("mail").map(String::as_str), Some("jdoe@example.edu"));
        }

        assert_eq!(directory.memory().lookups(), 1);
        assert_eq!(caching.stats().snapshot().to_string(), "queries=3, hits=2, misses=1");
    }
}
