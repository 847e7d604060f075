// ============================
// backend-lib/src/storage.rs
// ============================
//! Storage abstraction with a single-file JSON implementation.
//!
//! The store holds named collections of JSON documents. Every document gets a
//! numeric id, assigned monotonically per collection and never reused. All
//! collections sit behind one `RwLock`: readers share it, and each write
//! (including persisting the file) holds it exclusively, so a check and the
//! write that depends on it cannot interleave with another writer.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::{fs as tokio_fs, sync::RwLock};
use tracing::debug;

use crate::error::AppError;

pub use marketplace_common::DocId;

/// Raw document body
pub type Record = serde_json::Map<String, Value>;

/// A stored document and its id
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub fields: Record,
}

impl Document {
    /// Deserialize the document body into a typed record
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.fields)).map_err(|e| {
            AppError::Storage(format!("document {} does not match its schema: {e}", self.id))
        })
    }

    /// Deserialize the document body with its id injected as an `id` field
    pub fn into_typed_with_id<T: DeserializeOwned>(mut self) -> Result<T, AppError> {
        self.fields.insert("id".to_string(), Value::from(self.id));
        self.into_typed()
    }
}

/// Document selector
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Match a single document by id
    Id(DocId),
    /// Match documents whose field equals the value
    Eq(String, Value),
}

impl Filter {
    pub fn id(id: DocId) -> Self {
        Filter::Id(id)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    fn matches(&self, id: DocId, fields: &Record) -> bool {
        match self {
            Filter::Id(wanted) => *wanted == id,
            Filter::Eq(field, value) => fields.get(field) == Some(value),
        }
    }
}

/// Serialize a typed value into a document body
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Trait for storage backends
#[async_trait]
pub trait DocumentStore: Send + Sync + Clone + 'static {
    /// Document by id
    async fn get(&self, collection: &str, id: DocId) -> Result<Option<Document>, AppError> {
        self.find_one(collection, &Filter::Id(id)).await
    }

    /// First document matching the filter
    async fn find_one(&self, collection: &str, filter: &Filter)
        -> Result<Option<Document>, AppError>;

    /// Every document matching the filter, in id order
    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, AppError>;

    /// Every document in the collection, in id order
    async fn all(&self, collection: &str) -> Result<Vec<Document>, AppError>;

    /// Insert a document and return its new id
    async fn insert(&self, collection: &str, record: Record) -> Result<DocId, AppError>;

    /// Insert a document unless another document already has the same value
    /// under `key`. Returns `None` when the key is taken. The check and the
    /// insert are one atomic step.
    async fn insert_unique(
        &self,
        collection: &str,
        key: &str,
        record: Record,
    ) -> Result<Option<DocId>, AppError>;

    /// Merge `patch` into every matching document; fields absent from the
    /// patch are kept. Returns the number of documents updated.
    async fn update(&self, collection: &str, filter: &Filter, patch: Record)
        -> Result<usize, AppError>;

    /// Replace the body of a document. Returns false when the id is unknown.
    async fn replace(&self, collection: &str, id: DocId, record: Record) -> Result<bool, AppError>;

    /// Remove every matching document and return how many were removed
    async fn remove(&self, collection: &str, filter: &Filter) -> Result<usize, AppError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Table {
    #[serde(default)]
    last_id: DocId,
    #[serde(default)]
    docs: BTreeMap<DocId, Record>,
}

impl Table {
    fn matching<'a>(&'a self, filter: &'a Filter) -> impl Iterator<Item = (&'a DocId, &'a Record)> {
        self.docs
            .iter()
            .filter(move |(id, fields)| filter.matches(**id, fields))
    }

    fn push(&mut self, record: Record) -> DocId {
        self.last_id += 1;
        self.docs.insert(self.last_id, record);
        self.last_id
    }
}

/// The whole database: collection name to table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Tables(BTreeMap<String, Table>);

impl Tables {
    fn table(&self, collection: &str) -> Option<&Table> {
        self.0.get(collection)
    }

    fn table_mut(&mut self, collection: &str) -> &mut Table {
        self.0.entry(collection.to_string()).or_default()
    }

    fn find_all(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        self.table(collection)
            .map(|table| {
                table
                    .matching(filter)
                    .map(|(id, fields)| Document {
                        id: *id,
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn update(&mut self, collection: &str, filter: &Filter, patch: &Record) -> usize {
        let table = self.table_mut(collection);
        let mut updated = 0;
        for (id, fields) in table.docs.iter_mut() {
            if filter.matches(*id, fields) {
                for (key, value) in patch {
                    fields.insert(key.clone(), value.clone());
                }
                updated += 1;
            }
        }
        updated
    }

    fn remove(&mut self, collection: &str, filter: &Filter) -> usize {
        let table = self.table_mut(collection);
        let before = table.docs.len();
        table.docs.retain(|id, fields| !filter.matches(*id, fields));
        before - table.docs.len()
    }
}

/// JSON document store persisted to a single file.
///
/// Built with [`JsonFileStore::in_memory`] it keeps everything in memory,
/// which is what the tests use.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    tables: Arc<RwLock<Tables>>,
    path: Option<PathBuf>,
}

impl JsonFileStore {
    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tables = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Tables::default(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AppError::Storage(format!("corrupt database file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), collections = tables.0.len(), "opened document store");

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
            path: Some(path),
        })
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            path: None,
        }
    }

    /// Apply a mutation under the write lock. The mutation runs on a copy
    /// which replaces the live tables only once it is safely on disk, so a
    /// failed write leaves both memory and file untouched.
    async fn mutate<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Tables) -> (T, bool),
    {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        let (out, changed) = f(&mut next);
        if changed {
            self.persist(&next).await?;
            *guard = next;
        }
        Ok(out)
    }

    async fn persist(&self, tables: &Tables) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_vec_pretty(tables)?;
        let tmp = path.with_extension("json.tmp");
        tokio_fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {e}", tmp.display())))?;
        tokio_fs::rename(&tmp, path)
            .await
            .map_err(|e| AppError::Storage(format!("rename to {}: {e}", path.display())))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.table(collection).and_then(|table| {
            table.matching(filter).next().map(|(id, fields)| Document {
                id: *id,
                fields: fields.clone(),
            })
        }))
    }

    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, AppError> {
        Ok(self.tables.read().await.find_all(collection, filter))
    }

    async fn all(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .table(collection)
            .map(|table| {
                table
                    .docs
                    .iter()
                    .map(|(id, fields)| Document {
                        id: *id,
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<DocId, AppError> {
        self.mutate(|tables| (tables.table_mut(collection).push(record), true))
            .await
    }

    async fn insert_unique(
        &self,
        collection: &str,
        key: &str,
        record: Record,
    ) -> Result<Option<DocId>, AppError> {
        let Some(value) = record.get(key).cloned() else {
            return Err(AppError::Internal(format!(
                "unique key '{key}' missing from record"
            )));
        };
        let filter = Filter::Eq(key.to_string(), value);

        self.mutate(|tables| {
            let table = tables.table_mut(collection);
            if table.matching(&filter).next().is_some() {
                (None, false)
            } else {
                (Some(table.push(record)), true)
            }
        })
        .await
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Record,
    ) -> Result<usize, AppError> {
        self.mutate(|tables| {
            let updated = tables.update(collection, filter, &patch);
            (updated, updated > 0)
        })
        .await
    }

    async fn replace(&self, collection: &str, id: DocId, record: Record) -> Result<bool, AppError> {
        self.mutate(|tables| match tables.table_mut(collection).docs.get_mut(&id) {
            Some(fields) => {
                *fields = record;
                (true, true)
            },
            None => (false, false),
        })
        .await
    }

    async fn remove(&self, collection: &str, filter: &Filter) -> Result<usize, AppError> {
        self.mutate(|tables| {
            let removed = tables.remove(collection, filter);
            (removed, removed > 0)
        })
        .await
    }
}
