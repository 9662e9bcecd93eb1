use crate::llm::LLMClient;
use crate::research::budget::CallBudget;
use crate::research::findings::Finding;
use crate::research::{ResearchStage, prompts, with_deadline};
use crate::search::{SearchEngine, SearchResults};
use crate::types::{AppError, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Search + summary, the calls every iteration makes.
pub(crate) const ITERATION_CALLS: usize = 2;

/// State of one branch's refinement loop.
#[derive(Debug, Clone)]
pub struct BranchState {
    original_sub_query: String,
    current_query: String,
    iteration_count: usize,
    local_findings: Vec<Finding>,
}

impl BranchState {
    pub fn new(sub_query: impl Into<String>) -> Self {
        let sub_query = sub_query.into();
        Self {
            current_query: sub_query.clone(),
            original_sub_query: sub_query,
            iteration_count: 0,
            local_findings: Vec::new(),
        }
    }

    pub fn original_sub_query(&self) -> &str {
        &self.original_sub_query
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    /// Zero-based index of the iteration in progress
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn local_findings(&self) -> &[Finding] {
        &self.local_findings
    }

    fn record(&mut self, finding: Finding) {
        self.local_findings.push(finding);
    }

    fn advance(&mut self, next_query: String) {
        self.current_query = next_query;
        self.iteration_count += 1;
    }

    fn into_findings(self) -> Vec<Finding> {
        self.local_findings
    }
}

/// Drives one sub-query through depth-bounded search → summarize → follow-up
/// iterations. Refinement is strictly linear: only the first follow-up
/// candidate is ever pursued.
pub struct BranchRefiner<'a> {
    llm: &'a dyn LLMClient,
    search: &'a dyn SearchEngine,
    deadline: Duration,
    budget: Option<&'a CallBudget>,
}

impl<'a> BranchRefiner<'a> {
    pub fn new(llm: &'a dyn LLMClient, search: &'a dyn SearchEngine, deadline: Duration) -> Self {
        Self {
            llm,
            search,
            deadline,
            budget: None,
        }
    }

    /// Charge deeper iterations against a shared call budget.
    ///
    /// The caller pays for every branch's first iteration up front
    /// (one search and one summary each), so a branch always yields at least one
    /// finding. Each further iteration reserves its follow-up generation plus
    /// its own search and summary before the follow-up is requested.
    pub fn with_budget(mut self, budget: &'a CallBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Refine `initial_sub_query` for at most `max_depth` iterations.
    ///
    /// Returns the branch's findings in iteration order, never fewer than one.
    pub async fn refine(
        &self,
        initial_sub_query: &str,
        original_query: &str,
        max_depth: usize,
    ) -> Result<Vec<Finding>> {
        let mut state = BranchState::new(initial_sub_query);

        while state.iteration_count() < max_depth {
            let iteration = state.iteration_count();
            info!(
                iteration = iteration + 1,
                max_depth,
                query = state.current_query(),
                "Branch iteration"
            );

            let results = self.search(state.current_query()).await;
            let summary = match self.summarize(state.current_query(), &results).await {
                Ok(summary) => summary,
                // Past the first iteration the branch already has something to show
                Err(e @ AppError::Timeout { .. }) if iteration > 0 => {
                    warn!(
                        findings = state.local_findings().len(),
                        "{}, branch stops refining",
                        e
                    );
                    break;
                }
                Err(e) => {
                    return Err(AppError::aborted(
                        ResearchStage::BranchIterating,
                        state.current_query(),
                        e,
                    ));
                }
            };
            let finding = Finding::new(state.current_query(), summary).with_urls(results.urls());
            state.record(finding);

            if iteration + 1 == max_depth {
                break;
            }
            if !self.reserve_deeper_iteration() {
                info!(iteration, "Call budget exhausted, branch stops refining");
                break;
            }

            match self.next_query(original_query, state.local_findings()).await? {
                Some(next) => {
                    debug!(next_query = %next, "Following up");
                    state.advance(next);
                }
                None => {
                    self.release(ITERATION_CALLS);
                    debug!("No follow-up query, branch complete");
                    break;
                }
            }
        }

        Ok(state.into_findings())
    }

    /// Follow-up generation plus the next iteration's search and summary.
    fn reserve_deeper_iteration(&self) -> bool {
        self.budget
            .is_none_or(|budget| budget.try_reserve(ITERATION_CALLS + 1))
    }

    fn release(&self, calls: usize) {
        if let Some(budget) = self.budget {
            budget.release(calls);
        }
    }

    /// Search failures and timeouts degrade to an empty result set.
    async fn search(&self, query: &str) -> SearchResults {
        match with_deadline("search", self.deadline, self.search.search(query)).await {
            Ok(results) => {
                debug!(engine = self.search.name(), hits = results.len(), "Search complete");
                results
            }
            Err(e) => {
                warn!(engine = self.search.name(), "Search failed, continuing without results: {}", e);
                SearchResults::empty()
            }
        }
    }

    async fn summarize(&self, query: &str, results: &SearchResults) -> Result<String> {
        let prompt = prompts::summarize_prompt(query, &results.render(query));
        with_deadline("summary", self.deadline, self.llm.generate(&prompt)).await
    }

    /// First follow-up candidate, if any. A timeout ends the branch rather than
    /// the whole run.
    async fn next_query(&self, original_query: &str, findings: &[Finding]) -> Result<Option<String>> {
        let prompt = prompts::follow_up_prompt(original_query, findings);
        match with_deadline("follow-up generation", self.deadline, self.llm.generate(&prompt)).await {
            Ok(response) => Ok(prompts::parse_query_list(&response).into_iter().next()),
            Err(e @ AppError::Timeout { .. }) => {
                warn!("{}, branch stops refining", e);
                Ok(None)
            }
            Err(e) => {
                let query = findings
                    .last()
                    .map(|f| f.source_query())
                    .unwrap_or(original_query);
                Err(AppError::aborted(ResearchStage::BranchIterating, query, e))
            }
        }
    }
}
