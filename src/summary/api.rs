use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tokio::time::timeout;
use tracing::debug;

use crate::error::{Error, Result};
use crate::summary::{CountrySummary, SummaryResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.covid19api.com";

/// Remote source of per-country summaries
#[async_trait]
pub trait SummaryApi: Send + Sync {
    async fn fetch_all_countries(&self) -> Result<Vec<CountrySummary>>;
}

/// `SummaryApi` over HTTP: `GET {base_url}/summary`
#[derive(Debug, Clone)]
pub struct HttpSummaryApi {
    client: Client,
    base_url: String,
    timeout_duration: Duration,
    user_agent: String,
}

impl HttpSummaryApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "Unsupported scheme '{}' in {}",
                parsed.scheme(),
                base_url
            )));
        }

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_duration: Duration::from_secs(30),
            user_agent: format!("covid-news/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_duration = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn summary_url(&self) -> String {
        format!("{}/summary", self.base_url)
    }

    async fn fetch_response(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("Request failed: {}", e)))
    }
}

#[async_trait]
impl SummaryApi for HttpSummaryApi {
    async fn fetch_all_countries(&self) -> Result<Vec<CountrySummary>> {
        let url = self.summary_url();
        debug!("Fetching summary from: {}", url);

        let response = timeout(self.timeout_duration, self.fetch_response(&url))
            .await
            .map_err(|_| Error::Timeout(format!("Request to {} timed out", url)))??;

        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "HTTP {} for {}: {}",
                response.status().as_u16(),
                url,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("Failed to read response body: {}", e)))?;
        debug!("Downloaded {} bytes from {}", body.len(), url);

        let summary: SummaryResponse = serde_json::from_slice(&body)?;
        Ok(summary.countries)
    }
}
