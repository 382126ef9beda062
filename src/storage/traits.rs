use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Schemaless document body.
pub type Record = serde_json::Map<String, Value>;

/// A stored record together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Record,
}

impl Document {
    pub fn new<I: Into<String>>(id: I, data: Record) -> Self {
        Self { id: id.into(), data }
    }

    /// Deserialize the body into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

/// Serialize a value that must map to a JSON object.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Invalid(format!(
            "Document body must be an object, got {}",
            other
        ))),
    }
}

/// Binary payload addressed by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new<N: Into<String>>(file_name: N, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type<C: Into<String>>(mut self, content_type: C) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.trim().is_empty() || self.bytes.is_empty()
    }
}

/// Keyed record database with simple equality queries
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` when it does not exist
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Insert a record under a generated id
    async fn create_document(&self, collection: &str, record: Record) -> Result<String>;

    /// Merge fields into an existing document; fails with `NotFound` if absent
    async fn update_document(&self, collection: &str, id: &str, record: Record) -> Result<()>;

    /// Create or fully overwrite the document at `id`
    async fn set_document(&self, collection: &str, id: &str, record: Record) -> Result<()>;

    /// Remove a document; fails with `NotFound` if absent
    async fn delete_document(&self, collection: &str, id: &str) -> Result<()>;

    /// All documents whose `field` equals `value`, in no particular order
    async fn query_equals(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>>;
}

/// Blob storage addressed by path
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, path: &str, blob: &Blob) -> Result<()>;

    /// Public retrieval URL of a stored object
    async fn url(&self, path: &str) -> Result<String>;

    async fn delete(&self, path: &str) -> Result<()>;
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a 20 character document id.
pub fn generate_document_id(collection: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = format!("{}:{}:{}:{}", collection, nanos, seq, std::process::id());
    let hex = blake3::hash(seed.as_bytes()).to_hex();
    hex[..20].to_string()
}

/// Memory-only document store for testing and dry runs
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, HashMap<String, Record>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Seed a document without going through the async API.
    pub fn insert(&self, collection: &str, id: &str, record: Record) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), record);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn create_document(&self, collection: &str, record: Record) -> Result<String> {
        let id = generate_document_id(collection);
        self.insert(collection, &id, record);
        Ok(id)
    }

    async fn update_document(&self, collection: &str, id: &str, record: Record) -> Result<()> {
        let mut collections = self.collections.write();
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, id)))?;

        for (field, value) in record {
            existing.insert(field, value);
        }
        Ok(())
    }

    async fn set_document(&self, collection: &str, id: &str, record: Record) -> Result<()> {
        self.insert(collection, id, record);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write();
        collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, id)))
    }

    async fn query_equals(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, data)| data.get(field) == Some(value))
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect())
    }
}

/// Memory-only object store; URLs are `{base_url}/{path}`
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, Blob>>>,
    base_url: String,
}

impl MemoryObjectStore {
    pub fn new<U: Into<String>>(base_url: U) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    pub fn objects_count(&self) -> usize {
        self.objects.read().len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.read().contains_key(path)
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, path: &str, blob: &Blob) -> Result<()> {
        self.objects.write().insert(path.to_string(), blob.clone());
        Ok(())
    }

    async fn url(&self, path: &str) -> Result<String> {
        if !self.contains(path) {
            return Err(Error::NotFound(format!("object {}", path)));
        }
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.objects
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("object {}", path)))
    }
}
