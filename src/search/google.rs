//! Google Custom Search JSON API engine
//!
//! Talks to the API directly with `reqwest`. The API returns at most 10 items
//! per request and refuses start indexes past 91, so larger result counts are
//! fetched page by page. Proxies from `HTTP_PROXY`/`HTTPS_PROXY` are honored by
//! reqwest's system proxy support.

use crate::search::{SearchEngine, SearchHit, SearchResults, http_client};
use crate::types::{AppError, Result};
use crate::utils::toml_config::SearchConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const MAX_PER_PAGE: usize = 10;
const MAX_START_INDEX: usize = 91;

pub struct GoogleSearch {
    client: reqwest::Client,
    api_key: String,
    cse_id: String,
    base_url: String,
    num_results: usize,
    max_attempts: u32,
    retry_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

impl GoogleSearch {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let (api_key, cse_id) = match (
            config.credential("google.api_key"),
            config.credential("google.cse_id"),
        ) {
            (Some(key), Some(cse)) => (key, cse),
            _ => {
                return Err(AppError::Configuration(format!(
                    "Google API key or CSE ID not found. Please set {} and {}.",
                    config.google.api_key_env, config.google.cse_id_env
                )));
            }
        };

        Self::with_base_url(api_key, cse_id, GOOGLE_SEARCH_URL, config)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        cse_id: impl Into<String>,
        base_url: impl Into<String>,
        config: &SearchConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout())?,
            api_key: api_key.into(),
            cse_id: cse_id.into(),
            base_url: base_url.into(),
            num_results: config.num_results,
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Override the retry policy for transport errors
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    async fn fetch_page(&self, query: &str, num: usize, start: usize) -> Result<GoogleResponse> {
        let num = num.to_string();
        let start = start.to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("cx", self.cse_id.as_str()),
            ("q", query),
            ("num", num.as_str()),
            ("start", start.as_str()),
        ];

        let mut attempt = 1;
        loop {
            let result = self
                .client
                .get(&self.base_url)
                .query(&params)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(response) => {
                    return response.json().await.map_err(|e| {
                        AppError::Search(format!("Google Search API returned invalid JSON: {}", e))
                    });
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        "Google Search request failed (attempt {}/{}): {}",
                        attempt, self.max_attempts, e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AppError::Search(format!("Google Search API: {}", e)));
                }
            }
        }
    }
}

#[async_trait]
impl SearchEngine for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        debug!(query, num_results = self.num_results, "Calling Google Search API");

        let mut hits = Vec::new();
        let mut start = 1;

        while hits.len() < self.num_results && start <= MAX_START_INDEX {
            let batch = (self.num_results - hits.len()).min(MAX_PER_PAGE);
            let page = self.fetch_page(query, batch, start).await?;
            if page.items.is_empty() {
                break;
            }

            start += page.items.len();
            hits.extend(page.items.into_iter().map(|item| SearchHit {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
            }));
        }

        hits.truncate(self.num_results);
        Ok(SearchResults::Hits(hits))
    }
}
