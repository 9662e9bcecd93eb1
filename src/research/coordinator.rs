use crate::{
    llm::LLMClient,
    research::{
        BranchRefiner, CallBudget, Finding, FindingsAccumulator, QueryDecomposer, ResearchStage,
        Synthesizer, branch::ITERATION_CALLS,
    },
    search::SearchEngine,
    types::{AppError, Result},
    utils::toml_config::ResearchConfig,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// Decomposition, merge and report: the calls a run makes outside its branches.
const FIXED_STAGE_CALLS: usize = 3;

/// Everything a research run produced, report included.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub run_id: Uuid,
    pub query: String,
    pub report: String,
    pub sub_queries: Vec<String>,
    /// Every finding, branch-major then iteration-minor
    pub findings: Vec<Finding>,
    pub consolidated: String,
    /// Generator and search calls charged against the budget
    pub calls_used: usize,
    pub elapsed_ms: u64,
}

/// The DeepSearch engine.
///
/// Sequences decomposition, per-branch refinement, merge and report for one
/// query at a time. Holds no state between runs.
pub struct ResearchCoordinator {
    llm: Box<dyn LLMClient>,
    search: Box<dyn SearchEngine>,
    config: ResearchConfig,
}

impl ResearchCoordinator {
    pub fn new(
        llm: Box<dyn LLMClient>,
        search: Box<dyn SearchEngine>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            llm,
            search,
            config,
        }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Research `user_query` and return only the final report.
    pub async fn deep_search(&self, user_query: &str, max_depth: usize) -> Result<String> {
        let outcome = self.research_with_depth(user_query, max_depth).await?;
        Ok(outcome.report)
    }

    /// Execute deep research on a query with the configured depth
    pub async fn research(&self, user_query: &str) -> Result<ResearchOutcome> {
        self.research_with_depth(user_query, self.config.max_depth)
            .await
    }

    /// Execute deep research on a query.
    ///
    /// Either returns a complete report or fails; there is no partial result.
    /// Failures without a local fallback come back as
    /// [`AppError::WorkflowAborted`] naming the stage and query involved.
    pub async fn research_with_depth(
        &self,
        user_query: &str,
        max_depth: usize,
    ) -> Result<ResearchOutcome> {
        let query = user_query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Research query cannot be empty".to_string(),
            ));
        }
        if max_depth == 0 {
            return Err(AppError::InvalidInput(
                "max_depth must be at least 1".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("deep_search", run_id = %run_id);
        let result = self
            .run(run_id, query, max_depth)
            .instrument(span.clone())
            .await;

        if let Err(e) = &result {
            span.in_scope(|| {
                error!(
                    stage = %ResearchStage::Failed,
                    failed_during = e.stage().map(|s| s.as_str()),
                    "Research failed: {}",
                    e
                )
            });
        }
        result
    }

    async fn run(&self, run_id: Uuid, query: &str, max_depth: usize) -> Result<ResearchOutcome> {
        let started = Instant::now();
        let deadline = self.config.call_timeout();
        let budget = CallBudget::new(self.config.max_total_calls);
        info!(stage = %ResearchStage::Init, query, max_depth, "Starting deep search");

        if !budget.try_reserve(FIXED_STAGE_CALLS) {
            return Err(AppError::BudgetExhausted {
                limit: budget.limit(),
            });
        }

        info!(stage = %ResearchStage::Decomposing, "Decomposing query");
        let mut sub_queries =
            QueryDecomposer::new(self.llm.as_ref(), self.config.max_sub_queries, deadline)
                .decompose(query)
                .await?;
        info!(count = sub_queries.len(), "Research branches planned");
        reserve_first_iterations(&budget, &mut sub_queries)?;

        info!(stage = %ResearchStage::BranchIterating, "Refining branches");
        let refiner = BranchRefiner::new(self.llm.as_ref(), self.search.as_ref(), deadline)
            .with_budget(&budget);
        let concurrency = if self.config.parallel_branches {
            self.config.max_concurrent_branches.max(1)
        } else {
            1
        };

        // `buffered` yields in input order, so accumulation stays branch-major
        // even when branches overlap.
        let branches: Vec<Vec<Finding>> = stream::iter(sub_queries.iter().enumerate())
            .map(|(index, sub_query)| {
                let span = info_span!("branch", index, sub_query = %sub_query);
                refiner.refine(sub_query, query, max_depth).instrument(span)
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        let mut accumulator = FindingsAccumulator::new();
        for findings in branches {
            accumulator.extend(findings);
        }
        info!(
            branches = sub_queries.len(),
            findings = accumulator.len(),
            "Branches complete"
        );

        let synthesizer = Synthesizer::new(self.llm.as_ref(), deadline);

        info!(stage = %ResearchStage::Merging, "Consolidating findings");
        let consolidated = synthesizer.merge(accumulator.as_slice(), query).await?;

        info!(stage = %ResearchStage::Reporting, "Writing report");
        let report = synthesizer.generate_report(&consolidated, query).await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            stage = %ResearchStage::Done,
            calls = budget.used(),
            elapsed_ms,
            "Deep search complete"
        );

        Ok(ResearchOutcome {
            run_id,
            query: query.to_string(),
            report,
            sub_queries,
            findings: accumulator.into_inner(),
            consolidated,
            calls_used: budget.used(),
            elapsed_ms,
        })
    }
}

/// Pay for one search and one summary per sub-query before any branch runs,
/// so every branch yields a finding however deep the others go. Sub-queries
/// past what the budget covers are dropped from the end of the list.
fn reserve_first_iterations(budget: &CallBudget, sub_queries: &mut Vec<String>) -> Result<()> {
    if budget.try_reserve(sub_queries.len() * ITERATION_CALLS) {
        return Ok(());
    }

    let affordable = budget.remaining() / ITERATION_CALLS;
    if affordable == 0 || !budget.try_reserve(affordable * ITERATION_CALLS) {
        return Err(AppError::BudgetExhausted {
            limit: budget.limit(),
        });
    }

    let dropped = sub_queries.split_off(affordable);
    warn!(
        kept = affordable,
        dropped = ?dropped,
        "Call budget cannot cover every sub-query, dropping the last ones"
    );
    Ok(())
}
