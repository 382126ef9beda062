use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::clock::{same_day, Clock};
use crate::error::{Error, FetchError, Result};
use crate::storage::{to_record, DocumentStore};
use crate::summary::{find_by_slug, CountrySummary, SummaryApi, SUMMARY_COLLECTION};

/// Counters describing how reads were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub refreshes: u64,
    pub failures: u64,
}

impl SummaryCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.stale;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

enum Lookup {
    Fresh(CountrySummary),
    Missing,
    Stale,
}

/// Read-through cache of country summaries that trusts an entry only on the
/// calendar day it was computed.
#[derive(Clone)]
pub struct SummaryCache {
    documents: Arc<dyn DocumentStore>,
    api: Arc<dyn SummaryApi>,
    clock: Arc<dyn Clock>,
    collection: String,
    stats: Arc<RwLock<SummaryCacheStats>>,
}

impl SummaryCache {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        api: Arc<dyn SummaryApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            api,
            clock,
            collection: SUMMARY_COLLECTION.to_string(),
            stats: Arc::new(RwLock::new(SummaryCacheStats::default())),
        }
    }

    pub fn with_collection<C: Into<String>>(mut self, collection: C) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn stats(&self) -> SummaryCacheStats {
        *self.stats.read()
    }

    /// Summary for `country`, from the cache when it was computed today,
    /// otherwise from the remote API (overwriting the cached entry).
    pub async fn get_summary(&self, country: &str) -> std::result::Result<CountrySummary, FetchError> {
        match self.read_through(country).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.stats.write().failures += 1;
                warn!("Summary for {} unavailable: {}", country, e);
                Err(FetchError::new(country, e))
            }
        }
    }

    async fn read_through(&self, country: &str) -> Result<CountrySummary> {
        match self.lookup(country).await? {
            Lookup::Fresh(summary) => {
                self.stats.write().hits += 1;
                debug!("Summary cache hit for {}", country);
                return Ok(summary);
            }
            Lookup::Missing => {
                self.stats.write().misses += 1;
                debug!("Summary cache miss for {}", country);
            }
            Lookup::Stale => {
                self.stats.write().stale += 1;
                debug!("Cached summary for {} is outdated", country);
            }
        }

        self.refresh(country).await
    }

    async fn lookup(&self, country: &str) -> Result<Lookup> {
        let Some(doc) = self.documents.get_document(&self.collection, country).await? else {
            return Ok(Lookup::Missing);
        };

        match doc.decode::<CountrySummary>() {
            Ok(summary) if same_day(self.clock.as_ref(), &summary.date) => Ok(Lookup::Fresh(summary)),
            Ok(_) => Ok(Lookup::Stale),
            Err(e) => {
                warn!("Ignoring unreadable cached summary for {}: {}", country, e);
                Ok(Lookup::Stale)
            }
        }
    }

    async fn refresh(&self, country: &str) -> Result<CountrySummary> {
        let countries = self.api.fetch_all_countries().await?;
        let summary = find_by_slug(countries, country)
            .ok_or_else(|| Error::NotFound(format!("No summary for country '{}'", country)))?;

        self.documents
            .set_document(&self.collection, country, to_record(&summary)?)
            .await?;
        self.stats.write().refreshes += 1;

        info!("Refreshed summary for {} ({} confirmed)", country, summary.total_confirmed);
        Ok(summary)
    }
}
