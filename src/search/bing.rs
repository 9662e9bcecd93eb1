//! Bing Web Search API engine

use crate::search::{SearchEngine, SearchHit, SearchResults, http_client};
use crate::types::{AppError, Result};
use crate::utils::toml_config::SearchConfig;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const BING_SEARCH_URL: &str = "https://api.bing.microsoft.com/v7.0/search";

pub struct BingSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    num_results: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    #[serde(default)]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Debug, Deserialize)]
struct BingPage {
    name: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
}

impl BingSearch {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_key = config.credential("bing.api_key").ok_or_else(|| {
            AppError::Configuration(format!(
                "Bing API key not found. Please set {} in your .env file.",
                config.bing.api_key_env
            ))
        })?;

        Self::with_base_url(api_key, BING_SEARCH_URL, config)
    }

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
impl SearchEngine for BingSearch {
    fn name(&self) -> &str {
        "bing"
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        debug!(query, "Calling Bing Web Search API");

        let count = self.num_results.min(50).to_string();
        let response = self
            .client
            .get(&self.base_url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Search(format!("Bing Web Search API: {}", e)))?;

        let body: BingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Bing Web Search API returned invalid JSON: {}", e)))?;

        let hits = body
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .map(|page| SearchHit {
                title: page.name,
                url: page.url,
                snippet: page.snippet,
            })
            .collect();

        Ok(SearchResults::Hits(hits))
    }
}
