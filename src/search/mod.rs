//! Web Search Capability
//!
//! This module provides the search side of the research engine: a narrow
//! [`SearchEngine`] trait, the result records engines return, and an explicit
//! [`SearchEngineRegistry`] mapping engine names to factories.
//!
//! # Module Structure
//!
//! - [`registry`] - Engine registration, availability checks and default selection
//! - [`placeholder`] - Fixed offline results, always available
//! - [`google`] - Google Custom Search JSON API
//! - [`brave`] - Brave Search API
//! - [`bing`] - Bing Web Search API
//! - [`duckduckgo`] - Keyless DuckDuckGo search via `daedra`
//!
//! # Failure Contract
//!
//! Engines report transport and decoding problems as `AppError::Search`. The
//! research engine never lets these escape: a failed search degrades to
//! [`SearchResults::empty`] and the branch keeps going.
//!
//! ```ignore
//! let registry = SearchEngineRegistry::with_builtin_engines();
//! let engine = registry.resolve("auto", &config.search)?;
//! let results = engine.search("rust async runtimes").await?;
//! println!("{}", results.render("rust async runtimes"));
//! ```

pub mod bing;
pub mod brave;
pub mod duckduckgo;
pub mod google;
pub mod placeholder;
pub mod registry;

pub use registry::{EngineEntry, EngineInfo, SearchEngineRegistry};

use crate::types::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Snippets longer than this are cut when results are rendered into a prompt.
pub const SNIPPET_PREVIEW_CHARS: usize = 300;

/// A search backend
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Registry name of this engine (e.g. "brave")
    fn name(&self) -> &str;

    /// Run a query
    async fn search(&self, query: &str) -> Result<SearchResults>;
}

/// One structured search result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
            snippet: Some(snippet.into()),
        }
    }
}

/// What an engine returns: structured hits, or an engine-written text summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SearchResults {
    Hits(Vec<SearchHit>),
    Text(String),
}

impl SearchResults {
    pub fn empty() -> Self {
        SearchResults::Hits(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SearchResults::Hits(hits) => hits.is_empty(),
            SearchResults::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SearchResults::Hits(hits) => hits.len(),
            SearchResults::Text(text) if text.trim().is_empty() => 0,
            SearchResults::Text(_) => 1,
        }
    }

    /// URLs of the structured hits, in result order
    pub fn urls(&self) -> Vec<String> {
        match self {
            SearchResults::Hits(hits) => hits
                .iter()
                .filter_map(|hit| hit.url.clone())
                .filter(|url| !url.is_empty())
                .collect(),
            SearchResults::Text(_) => Vec::new(),
        }
    }

    /// Render results as prompt text.
    ///
    /// Empty results render as an explicit "no results" line so the summarizer
    /// still has something to work from.
    pub fn render(&self, query: &str) -> String {
        if self.is_empty() {
            return format!("No search results found for query: '{}'", query);
        }

        let hits = match self {
            SearchResults::Text(text) => return text.clone(),
            SearchResults::Hits(hits) => hits,
        };

        let mut out = format!("Found {} search results for '{}':\n\n", hits.len(), query);
        for (i, hit) in hits.iter().enumerate() {
            let _ = writeln!(out, "Result {}:", i + 1);
            if let Some(title) = hit.title.as_deref().filter(|t| !t.is_empty()) {
                let _ = writeln!(out, "  Title: {}", title);
            }
            if let Some(url) = hit.url.as_deref().filter(|u| !u.is_empty()) {
                let _ = writeln!(out, "  URL: {}", url);
            }
            if let Some(snippet) = hit.snippet.as_deref().filter(|s| !s.is_empty()) {
                let _ = writeln!(out, "  Snippet: {}", truncate_snippet(snippet));
            }
            out.push('\n');
        }
        out
    }
}

fn truncate_snippet(snippet: &str) -> String {
    match snippet.char_indices().nth(SNIPPET_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &snippet[..cut]),
        None => snippet.to_string(),
    }
}

/// Shared HTTP client for the API-backed engines
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("deepsearch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| crate::types::AppError::Configuration(format!("HTTP client: {}", e)))
}
