//! Iterative Deep Research
//!
//! This module holds the research engine: it fans a question out into
//! sub-queries, refines each one through a depth-bounded
//! search → summarize → follow-up loop, and folds every finding into one
//! consolidated, cited report.
//!
//! # Architecture
//!
//! - [`decomposer::QueryDecomposer`] - Root query → initial sub-queries
//! - [`branch::BranchRefiner`] - One sub-query's linear refinement loop
//! - [`findings::FindingsAccumulator`] - Append-only record of every finding
//! - [`synthesis::Synthesizer`] - Merge-refine pass and final report
//! - [`budget::CallBudget`] - Hard ceiling on capability calls per run
//! - [`coordinator::ResearchCoordinator`] - Sequences the stages above
//!
//! The engine only talks to the outside world through [`LLMClient`] and
//! [`SearchEngine`]; it never does transport, credentials or HTML itself.
//!
//! # Usage
//!
//! ```ignore
//! use deepsearch::research::ResearchCoordinator;
//!
//! let coordinator = ResearchCoordinator::new(llm, engine, config.research.clone());
//!
//! let report = coordinator
//!     .deep_search("What are the latest advancements in AI?", 3)
//!     .await?;
//!
//! println!("{}", report);
//! ```
//!
//! # Research Workflow
//!
//! 1. **Decomposing** - One generator call produces 3-5 diverse sub-queries
//! 2. **Branch iterating** - Each sub-query is searched, summarized and deepened
//! 3. **Merging** - All findings are deduplicated and organized in one pass
//! 4. **Reporting** - The consolidated findings become the final report
//!
//! [`LLMClient`]: crate::llm::LLMClient
//! [`SearchEngine`]: crate::search::SearchEngine

pub mod branch;
pub mod budget;
pub mod coordinator;
pub mod decomposer;
pub mod findings;
pub mod prompts;
pub mod synthesis;

pub use branch::{BranchRefiner, BranchState};
pub use budget::CallBudget;
pub use coordinator::{ResearchCoordinator, ResearchOutcome};
pub use decomposer::QueryDecomposer;
pub use findings::{Finding, FindingsAccumulator, WEB_SEARCH_LABEL};
pub use synthesis::Synthesizer;

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Orchestrator state. A run moves strictly forward and never revisits a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStage {
    Init,
    Decomposing,
    BranchIterating,
    Merging,
    Reporting,
    Done,
    Failed,
}

impl ResearchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchStage::Init => "init",
            ResearchStage::Decomposing => "decomposing",
            ResearchStage::BranchIterating => "branch_iterating",
            ResearchStage::Merging => "merging",
            ResearchStage::Reporting => "reporting",
            ResearchStage::Done => "done",
            ResearchStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResearchStage::Done | ResearchStage::Failed)
    }
}

impl fmt::Display for ResearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run one capability call under a deadline.
pub(crate) async fn with_deadline<T, F>(operation: &str, deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout {
            operation: operation.to_string(),
            seconds: deadline.as_secs(),
        }),
    }
}
