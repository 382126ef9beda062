use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::storage::traits::{
    generate_document_id, Blob, Document, DocumentStore, ObjectStore, Record,
};

type Collection = BTreeMap<String, Record>;

/// Document store keeping one JSON file per collection
pub struct FileDocumentStore {
    root: PathBuf,
    // Serializes read-modify-write cycles on the collection files
    lock: Mutex<()>,
}

impl FileDocumentStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                Error::Storage(format!(
                    "Failed to create document directory '{}': {}",
                    root.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn collection_file(&self, collection: &str) -> Result<PathBuf> {
        if collection.is_empty()
            || !collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::Invalid(format!("Invalid collection name '{}'", collection)));
        }
        Ok(self.root.join(format!("{}.json", collection)))
    }

    fn load(&self, collection: &str) -> Result<Collection> {
        let file = self.collection_file(collection)?;
        if !file.exists() {
            return Ok(Collection::new());
        }

        let content = fs::read_to_string(&file).map_err(|e| {
            Error::Storage(format!("Failed to read '{}': {}", file.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, collection: &str, docs: &Collection) -> Result<()> {
        let file = self.collection_file(collection)?;
        let content = serde_json::to_string_pretty(docs)?;

        // Replace via a sibling temp file
        let tmp = file.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| {
            Error::Storage(format!("Failed to write '{}': {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &file).map_err(|e| {
            Error::Storage(format!("Failed to replace '{}': {}", file.display(), e))
        })?;

        tracing::debug!("Saved {} documents to {}", docs.len(), file.display());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let _guard = self.lock.lock();
        let docs = self.load(collection)?;
        Ok(docs.get(id).map(|data| Document::new(id, data.clone())))
    }

    async fn create_document(&self, collection: &str, record: Record) -> Result<String> {
        let _guard = self.lock.lock();
        let mut docs = self.load(collection)?;
        let id = generate_document_id(collection);
        docs.insert(id.clone(), record);
        self.save(collection, &docs)?;
        Ok(id)
    }

    async fn update_document(&self, collection: &str, id: &str, record: Record) -> Result<()> {
        let _guard = self.lock.lock();
        let mut docs = self.load(collection)?;
        let existing = docs
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, id)))?;
        for (field, value) in record {
            existing.insert(field, value);
        }
        self.save(collection, &docs)
    }

    async fn set_document(&self, collection: &str, id: &str, record: Record) -> Result<()> {
        let _guard = self.lock.lock();
        let mut docs = self.load(collection)?;
        docs.insert(id.to_string(), record);
        self.save(collection, &docs)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut docs = self.load(collection)?;
        if docs.remove(id).is_none() {
            return Err(Error::NotFound(format!("{}/{}", collection, id)));
        }
        self.save(collection, &docs)
    }

    async fn query_equals(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>> {
        let _guard = self.lock.lock();
        let docs = self.load(collection)?;
        Ok(docs
            .into_iter()
            .filter(|(_, data)| data.get(field) == Some(value))
            .map(|(id, data)| Document::new(id, data))
            .collect())
    }
}

/// Object store writing blobs below a directory; URLs are `file://` URLs
pub struct FileObjectStore {
    root: PathBuf,
}

impl FileObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                Error::Storage(format!(
                    "Failed to create object directory '{}': {}",
                    root.display(),
                    e
                ))
            })?;
        }

        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    /// Resolve an object path below the root, refusing anything that escapes it.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(Error::Invalid(format!("Invalid object path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn upload(&self, path: &str, blob: &Blob) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &blob.bytes).await.map_err(|e| {
            Error::Storage(format!("Failed to write '{}': {}", target.display(), e))
        })?;
        tracing::debug!("Stored {} bytes at {}", blob.bytes.len(), target.display());
        Ok(())
    }

    async fn url(&self, path: &str) -> Result<String> {
        let target = self.resolve(path)?;
        if !target.exists() {
            return Err(Error::NotFound(format!("object {}", path)));
        }
        url::Url::from_file_path(&target)
            .map(|u| u.to_string())
            .map_err(|_| Error::InvalidUrl(target.display().to_string()))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("object {}", path)))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}
