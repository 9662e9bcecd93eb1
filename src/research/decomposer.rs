use crate::llm::LLMClient;
use crate::research::{ResearchStage, prompts, with_deadline};
use crate::types::{AppError, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Turns the user's question into the initial set of sub-queries.
pub struct QueryDecomposer<'a> {
    llm: &'a dyn LLMClient,
    max_sub_queries: usize,
    deadline: Duration,
}

impl<'a> QueryDecomposer<'a> {
    pub fn new(llm: &'a dyn LLMClient, max_sub_queries: usize, deadline: Duration) -> Self {
        Self {
            llm,
            max_sub_queries: max_sub_queries.max(1),
            deadline,
        }
    }

    /// Produce between 1 and `max_sub_queries` sub-queries.
    ///
    /// An empty or unparseable response falls back to `[user_query]`, so the
    /// caller always has at least one branch to run. A generator failure or
    /// timeout aborts with [`ResearchStage::Decomposing`].
    pub async fn decompose(&self, user_query: &str) -> Result<Vec<String>> {
        let prompt = prompts::decompose_prompt(user_query, self.max_sub_queries);
        let response = with_deadline("decomposition", self.deadline, self.llm.generate(&prompt))
            .await
            .map_err(|e| AppError::aborted(ResearchStage::Decomposing, user_query, e))?;

        let mut sub_queries = prompts::parse_query_list(&response);
        if sub_queries.is_empty() {
            warn!("Decomposition produced no sub-queries, researching the original query");
            return Ok(vec![user_query.to_string()]);
        }

        if sub_queries.len() > self.max_sub_queries {
            debug!(
                "Keeping {} of {} sub-queries",
                self.max_sub_queries,
                sub_queries.len()
            );
            sub_queries.truncate(self.max_sub_queries);
        }

        debug!(?sub_queries, "Decomposed query");
        Ok(sub_queries)
    }
}
