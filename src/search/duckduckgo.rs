//! Search engine implementation using daedra
//!
//! daedra scrapes DuckDuckGo, so this engine needs no API key.

use crate::search::{SearchEngine, SearchHit, SearchResults};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use tracing::debug;

/// Web search engine powered by daedra
pub struct DuckDuckGoSearch {
    num_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(num_results: usize) -> Self {
        Self { num_results }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        debug!(query, "Searching DuckDuckGo via daedra");

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.num_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("DuckDuckGo search failed: {}", e)))?;

        let hits = response
            .data
            .iter()
            .map(|r| SearchHit {
                title: Some(r.title.to_string()),
                url: Some(r.url.to_string()),
                snippet: Some(r.description.to_string()),
            })
            .collect();

        Ok(SearchResults::Hits(hits))
    }
}
