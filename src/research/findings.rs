use serde::{Deserialize, Serialize};

/// Source label attached to every finding produced from a web search.
pub const WEB_SEARCH_LABEL: &str = "Web Search";

/// One search + summarize step's result.
///
/// Findings are immutable once built; fields are only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    source_query: String,
    summary: String,
    source_label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    urls: Vec<String>,
}

impl Finding {
    pub fn new(source_query: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            source_query: source_query.into(),
            summary: summary.into(),
            source_label: WEB_SEARCH_LABEL.to_string(),
            urls: Vec::new(),
        }
    }

    /// Attach the URLs of the search results the summary was written from.
    pub fn with_urls(mut self, urls: Vec<String>) -> Self {
        self.urls = urls;
        self
    }

    pub fn source_query(&self) -> &str {
        &self.source_query
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// `- {summary} (Source: {source_label})`
    pub fn bullet(&self) -> String {
        format!("- {} (Source: {})", self.summary, self.source_label)
    }
}

/// Append-only, order-preserving collection of findings for one research run.
#[derive(Debug, Default)]
pub struct FindingsAccumulator {
    findings: Vec<Finding>,
}

impl FindingsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    pub fn as_slice(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_inner(self) -> Vec<Finding> {
        self.findings
    }
}
