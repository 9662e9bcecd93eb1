//! Brave Search API engine

use crate::search::{SearchEngine, SearchHit, SearchResults, http_client};
use crate::types::{AppError, Result};
use crate::utils::toml_config::SearchConfig;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

pub struct BraveSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    num_results: usize,
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

impl BraveSearch {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_key = config.credential("brave.api_key").ok_or_else(|| {
            AppError::Configuration(format!(
                "Brave API key not found. Please set {} in your .env file.",
                config.brave.api_key_env
            ))
        })?;

        Self::with_base_url(api_key, BRAVE_SEARCH_URL, config)
    }

    /// Point the engine at a different endpoint (proxies, test servers)
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        config: &SearchConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout())?,
            api_key: api_key.into(),
            base_url: base_url.into(),
            num_results: config.num_results,
        })
    }
}

#[async_trait]
impl SearchEngine for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        debug!(query, "Calling Brave Search API");

        // Brave caps `count` at 20 per request
        let count = self.num_results.min(20).to_string();
        let response = self
            .client
            .get(&self.base_url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Search(format!("Brave Search API: {}", e)))?;

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Brave Search API returned invalid JSON: {}", e)))?;

        let hits = body
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.description,
            })
            .collect();

        Ok(SearchResults::Hits(hits))
    }
}
