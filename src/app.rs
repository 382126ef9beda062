use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::news::NewsService;
use crate::storage::{
    DocumentStore, FileDocumentStore, FileObjectStore, MemoryDocumentStore, MemoryObjectStore,
    ObjectStore,
};
use crate::summary::{HttpSummaryApi, SummaryApi, SummaryCache};

/// The two flows wired to one set of collaborators.
#[derive(Clone)]
pub struct Services {
    pub news: NewsService,
    pub summaries: SummaryCache,
}

impl Services {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        api: Arc<dyn SummaryApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            news: NewsService::new(documents.clone(), objects, clock.clone()),
            summaries: SummaryCache::new(documents, api, clock),
        }
    }

    /// File-backed stores under the configured data directory and the HTTP summary API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let data_dir = config.resolved_data_dir()?;
        tracing::debug!("Using data directory {}", data_dir.display());

        let documents = Arc::new(FileDocumentStore::new(data_dir.join("documents"))?);
        let objects = Arc::new(FileObjectStore::new(data_dir.join("images"))?);
        let api = HttpSummaryApi::new(&config.summary_api.base_url)?
            .with_timeout(Duration::from_secs(config.summary_api.timeout))
            .with_user_agent(config.summary_api.user_agent.clone());

        let mut services = Self::new(documents, objects, Arc::new(api), Arc::new(SystemClock));
        services.news = services.news.with_collection(config.storage.news_collection.clone());
        services.summaries = services
            .summaries
            .with_collection(config.storage.summary_collection.clone());
        Ok(services)
    }

    /// In-memory stores; nothing outlives the process.
    pub fn in_memory(api: Arc<dyn SummaryApi>, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryObjectStore::default()),
            api,
            clock,
        )
    }
}
