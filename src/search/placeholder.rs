use crate::search::{SearchEngine, SearchHit, SearchResults};
use crate::types::Result;
use async_trait::async_trait;
use tracing::debug;

/// Offline engine returning two fixed results. Always available.
pub struct PlaceholderSearch;

#[async_trait]
impl SearchEngine for PlaceholderSearch {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        debug!(query, "Searching with placeholder engine");

        Ok(SearchResults::Hits(vec![
            SearchHit::new(
                "Placeholder Result 1",
                "http://example.com/1",
                format!("This is a placeholder snippet for the query '{}'.", query),
            ),
            SearchHit::new(
                "Placeholder Result 2",
                "http://example.com/2",
                format!("Another placeholder snippet for '{}'.", query),
            ),
        ]))
    }
}
