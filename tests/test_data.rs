//! Fixtures and call-recording store fakes shared by the integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use covid_news::error::{Error, Result};
use covid_news::storage::{
    Blob, Document, DocumentStore, MemoryDocumentStore, MemoryObjectStore, ObjectStore, Record,
};

pub const TODAY: &str = "2020-04-05T18:00:00+02:00";

pub const SUMMARY_RESPONSE: &str = r#"{
    "Global": {
        "NewConfirmed": 100,
        "TotalConfirmed": 1000,
        "NewDeaths": 10,
        "TotalDeaths": 100,
        "NewRecovered": 50,
        "TotalRecovered": 500
    },
    "Countries": [
        {
            "Country": "Spain",
            "CountryCode": "ES",
            "Slug": "spain",
            "NewConfirmed": 6023,
            "TotalConfirmed": 130759,
            "NewDeaths": 674,
            "TotalDeaths": 12418,
            "NewRecovered": 3706,
            "TotalRecovered": 38080,
            "Date": "2020-04-05T06:37:00Z"
        },
        {
            "Country": "Italy",
            "CountryCode": "IT",
            "Slug": "italy",
            "NewConfirmed": 50,
            "TotalConfirmed": 150,
            "NewDeaths": 5,
            "TotalDeaths": 20,
            "NewRecovered": 10,
            "TotalRecovered": 30,
            "Date": "2020-04-05T06:37:00Z"
        }
    ],
    "Date": "2020-04-05T06:37:00Z"
}"#;

/// Cached Italy record with only the fields the cache needs.
pub fn cached_italy(confirmed: u64, date: &str) -> Record {
    match serde_json::json!({
        "Country": "Italy",
        "Slug": "italy",
        "TotalConfirmed": confirmed,
        "Date": date
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Ordered log of store calls shared between fakes.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

/// Document store that logs every call and can be told to fail some of them
pub struct RecordingDocumentStore {
    pub inner: MemoryDocumentStore,
    pub log: CallLog,
    failing: Mutex<HashSet<&'static str>>,
}

impl RecordingDocumentStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            log,
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make the named operation (`"create"`, `"update"`, ...) fail.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    fn check(&self, operation: &'static str, detail: String) -> Result<()> {
        self.log.record(format!("doc.{} {}", operation, detail));
        if self.failing.lock().contains(operation) {
            return Err(Error::Storage(format!("{} rejected", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RecordingDocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.check("get", format!("{}/{}", collection, id))?;
        self.inner.get_document(collection, id).await
    }

    async fn create_document(&self, collection: &str, record: Record) -> Result<String> {
        self.check("create", collection.to_string())?;
        self.inner.create_document(collection, record).await
    }

    async fn update_document(&self, collection: &str, id: &str, record: Record) -> Result<()> {
        self.check("update", format!("{}/{}", collection, id))?;
        self.inner.update_document(collection, id, record).await
    }

    async fn set_document(&self, collection: &str, id: &str, record: Record) -> Result<()> {
        self.check("set", format!("{}/{}", collection, id))?;
        self.inner.set_document(collection, id, record).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        self.check("delete", format!("{}/{}", collection, id))?;
        self.inner.delete_document(collection, id).await
    }

    async fn query_equals(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>> {
        self.check("query", format!("{} {}={}", collection, field, value))?;
        self.inner.query_equals(collection, field, value).await
    }
}

/// Object store that logs every call and can be told to fail some of them
pub struct RecordingObjectStore {
    pub inner: MemoryObjectStore,
    pub log: CallLog,
    failing: Mutex<HashSet<&'static str>>,
}

impl RecordingObjectStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: MemoryObjectStore::new("https://storage.example.com"),
            log,
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    fn check(&self, operation: &'static str, path: &str) -> Result<()> {
        self.log.record(format!("obj.{} {}", operation, path));
        if self.failing.lock().contains(operation) {
            return Err(Error::HttpError(format!("network error during {}", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn upload(&self, path: &str, blob: &Blob) -> Result<()> {
        self.check("upload", path)?;
        self.inner.upload(path, blob).await
    }

    async fn url(&self, path: &str) -> Result<String> {
        self.check("url", path)?;
        self.inner.url(path).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.check("delete", path)?;
        self.inner.delete(path).await
    }
}
