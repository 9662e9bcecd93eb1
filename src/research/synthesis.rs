use crate::llm::LLMClient;
use crate::research::findings::Finding;
use crate::research::{ResearchStage, prompts, with_deadline};
use crate::types::{AppError, Result};
use std::time::Duration;
use tracing::debug;

/// Merge-refine pass and final report generation. One generator call each.
pub struct Synthesizer<'a> {
    llm: &'a dyn LLMClient,
    deadline: Duration,
}

impl<'a> Synthesizer<'a> {
    pub fn new(llm: &'a dyn LLMClient, deadline: Duration) -> Self {
        Self { llm, deadline }
    }

    /// Consolidate every accumulated finding into one findings document.
    ///
    /// `original_query` is only used to give a failure its context. An empty
    /// findings list is still sent to the generator.
    pub async fn merge(&self, all_findings: &[Finding], original_query: &str) -> Result<String> {
        debug!(findings = all_findings.len(), "Merging findings");
        let prompt = prompts::merge_prompt(all_findings);
        with_deadline("merge", self.deadline, self.llm.generate(&prompt))
            .await
            .map_err(|e| AppError::aborted(ResearchStage::Merging, original_query, e))
    }

    pub async fn generate_report(&self, consolidated: &str, original_query: &str) -> Result<String> {
        let prompt = prompts::report_prompt(consolidated, original_query);
        with_deadline("report", self.deadline, self.llm.generate(&prompt))
            .await
            .map_err(|e| AppError::aborted(ResearchStage::Reporting, original_query, e))
    }
}
