use crate::research::ResearchStage;

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The text generator could not produce a completion (transport, auth, bad response).
    #[error("LLM error: {0}")]
    LLM(String),

    /// A search engine failed. Absorbed by the branch refiner, never surfaced from a research run.
    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Call budget of {limit} capability calls exhausted before any branch could run")]
    BudgetExhausted { limit: usize },

    /// A stage without a neutral fallback failed; the whole research call is abandoned.
    #[error("Research aborted during {stage} (query: '{query}'): {source}")]
    WorkflowAborted {
        stage: ResearchStage,
        query: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wrap an error with the stage and query that were being processed.
    pub fn aborted(stage: ResearchStage, query: impl Into<String>, source: AppError) -> Self {
        AppError::WorkflowAborted {
            stage,
            query: query.into(),
            source: Box::new(source),
        }
    }

    /// Stage at which a research run was abandoned, if this is a workflow failure.
    pub fn stage(&self) -> Option<ResearchStage> {
        match self {
            AppError::WorkflowAborted { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(err: crate::utils::toml_config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
