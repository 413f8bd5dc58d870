//! The tabular list store.
//!
//! One JSON document per named list under a single root directory. Reads
//! are lock-free (documents are only ever replaced by rename), mutations go
//! through [`LockManager`] so concurrent edits of the same list cannot lose
//! each other's changes.

use crate::document::{read_document, read_search_log, write_atomic};
use crate::error::{Result, StoreError};
use crate::locks::LockManager;
use crate::schema::{ListDocument, Record, RowEdit, SearchLogEntry, SCHEMA_VERSION};
use leadgrid_core::{ListName, LIST_EXTENSION};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of appending a batch of records.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    /// Records written
    pub appended: usize,
    /// Records dropped because their place ID was already in the list
    pub skipped: usize,
    /// Full record table after the append
    pub records: Vec<Record>,
}

/// Durable per-list record store.
#[derive(Debug)]
pub struct TabularStore {
    root: PathBuf,
    locks: LockManager,
}

impl TabularStore {
    /// Open (and create if needed) a store rooted at `root`.
    ///
    /// The root is canonicalized so every list maps to exactly one lock.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        tokio::fs::create_dir_all(root.as_ref()).await?;
        let root = tokio::fs::canonicalize(root.as_ref()).await?;
        info!(root = %root.display(), "opened list store");
        Ok(Self {
            root,
            locks: LockManager::new(),
        })
    }

    /// Directory holding the list documents.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical document path for a list name.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        let list = parse_name(name)?;
        Ok(self.document_path(&list))
    }

    /// File names of all lists, sorted.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let is_list = path.extension().is_some_and(|ext| ext == LIST_EXTENSION)
                && !file_name.starts_with('.')
                && entry.file_type().await?.is_file();
            if is_list {
                names.push(file_name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether a list with this name exists.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let list = parse_name(name)?;
        Ok(tokio::fs::try_exists(self.document_path(&list)).await?)
    }

    /// Create an empty list.
    pub async fn create(&self, name: &str) -> Result<ListName> {
        let list = parse_name(name)?;
        let path = self.document_path(&list);
        let _guard = self.locks.acquire(&path).await;

        if tokio::fs::try_exists(&path).await? {
            return Err(StoreError::AlreadyExists {
                list: list.file_name(),
            });
        }

        write_atomic(&path, &ListDocument::empty()).await?;
        info!(list = %list, "created list");
        Ok(list)
    }

    /// All records of a list, in stored order.
    pub async fn read_all(&self, name: &str) -> Result<Vec<Record>> {
        let list = parse_name(name)?;
        let document = read_document(&self.document_path(&list), &list.file_name()).await?;
        Ok(document.records)
    }

    /// Delete a list irrevocably.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let list = parse_name(name)?;
        let path = self.document_path(&list);
        let _guard = self.locks.acquire(&path).await;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(list = %list, "deleted list");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                list: list.file_name(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Apply a single field edit to the row with `place_id`.
    pub async fn update_field(&self, name: &str, place_id: &str, edit: RowEdit) -> Result<()> {
        let list = parse_name(name)?;
        let path = self.document_path(&list);
        let _guard = self.locks.acquire(&path).await;

        let mut records = read_document(&path, &list.file_name()).await?.records;
        let mut matched = 0usize;
        for record in records
            .iter_mut()
            .filter(|record| record.place_id.as_str() == place_id)
        {
            edit.apply(record);
            matched += 1;
        }

        if matched == 0 {
            return Err(StoreError::RowNotFound {
                list: list.file_name(),
                place_id: place_id.to_string(),
            });
        }

        self.rewrite_records(&path, &list, records).await?;
        debug!(list = %list, place_id, field = %edit.field(), "updated row");
        Ok(())
    }

    /// Append records to a list, skipping any whose place ID is already present.
    pub async fn append_records(&self, name: &str, new_records: Vec<Record>) -> Result<AppendOutcome> {
        let list = parse_name(name)?;
        let path = self.document_path(&list);
        let _guard = self.locks.acquire(&path).await;

        let mut records = read_document(&path, &list.file_name()).await?.records;
        let mut ids: HashSet<String> = records
            .iter()
            .map(|record| record.place_id.as_str().to_string())
            .collect();

        let offered = new_records.len();
        let mut appended = 0usize;
        for record in new_records {
            if ids.insert(record.place_id.as_str().to_string()) {
                records.push(record);
                appended += 1;
            } else {
                warn!(list = %list, place_id = %record.place_id, "skipping record already in list");
            }
        }
        let skipped = offered - appended;

        if appended > 0 {
            self.rewrite_records(&path, &list, records.clone()).await?;
        }

        info!(list = %list, appended, skipped, total = records.len(), "appended records");
        Ok(AppendOutcome {
            appended,
            skipped,
            records,
        })
    }

    /// Search history of a list; empty when none has been logged yet.
    pub async fn read_search_log(&self, name: &str) -> Result<Vec<SearchLogEntry>> {
        let list = parse_name(name)?;
        let searches = read_search_log(&self.document_path(&list), &list.file_name()).await?;
        Ok(searches.unwrap_or_default())
    }

    /// Append one entry to the search history of a list.
    pub async fn append_search_log(&self, name: &str, entry: SearchLogEntry) -> Result<()> {
        let list = parse_name(name)?;
        let path = self.document_path(&list);
        let _guard = self.locks.acquire(&path).await;

        let mut document = read_document(&path, &list.file_name()).await?;
        document.searches.get_or_insert_with(Vec::new).push(entry);
        document.schema_version = SCHEMA_VERSION;
        write_atomic(&path, &document).await?;
        debug!(list = %list, "logged search");
        Ok(())
    }

    /// Rewrite the primary table. The caller must hold the list lock.
    ///
    /// The document is rebuilt from `records` alone, so the search log is
    /// read back from disk first and reattached.
    async fn rewrite_records(&self, path: &Path, list: &ListName, records: Vec<Record>) -> Result<()> {
        let retained = read_search_log(path, &list.file_name()).await?;
        let mut document = ListDocument::from_records(records);
        document.searches = retained;
        write_atomic(path, &document).await
    }

    fn document_path(&self, list: &ListName) -> PathBuf {
        self.root.join(list.file_name())
    }
}

fn parse_name(name: &str) -> Result<ListName> {
    if name.trim().is_empty() {
        return Err(StoreError::MissingName);
    }
    ListName::new(name).map_err(|e| StoreError::InvalidName(e.to_string()))
}
