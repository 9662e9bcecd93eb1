//! Mock implementations for testing.
//!
//! Scripted text generators and search engines shared by the integration
//! tests. Every mock records what it was asked so tests can assert on call
//! counts and call order.

use async_trait::async_trait;
use deepsearch::llm::LLMClient;
use deepsearch::search::{SearchEngine, SearchHit, SearchResults};
use deepsearch::types::{AppError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Which research step a prompt belongs to, recognized by its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Decompose,
    Summarize,
    FollowUp,
    Merge,
    Report,
    Unknown,
}

impl PromptKind {
    pub fn of(prompt: &str) -> Self {
        if prompt.starts_with("You are planning a web research task.") {
            PromptKind::Decompose
        } else if prompt.starts_with("Summarize the search results below") {
            PromptKind::Summarize
        } else if prompt.starts_with("You are deepening a research branch.") {
            PromptKind::FollowUp
        } else if prompt.starts_with("Consolidate the research findings below") {
            PromptKind::Merge
        } else if prompt.starts_with("Write a research report") {
            PromptKind::Report
        } else {
            PromptKind::Unknown
        }
    }
}

/// Query a summarize prompt was built for (the text between the first pair of quotes).
pub fn summarized_query(prompt: &str) -> String {
    prompt
        .split('"')
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

type Responder = dyn Fn(PromptKind, &str) -> Result<String> + Send + Sync;

/// Sleep applied to prompts of one kind, optionally only those containing `needle`.
#[derive(Clone)]
struct Delay {
    kind: PromptKind,
    needle: Option<String>,
    duration: Duration,
}

impl Delay {
    fn applies_to(&self, kind: PromptKind, prompt: &str) -> bool {
        self.kind == kind
            && self
                .needle
                .as_deref()
                .is_none_or(|needle| prompt.contains(needle))
    }
}

/// Mock LLM client answering each prompt through a closure.
///
/// ```ignore
/// let llm = ScriptedLlm::research("a, b, c", "");
/// let log = llm.clone();
/// let coordinator = ResearchCoordinator::new(Box::new(llm), engine, config);
/// coordinator.research("q").await?;
/// assert_eq!(log.count(PromptKind::Merge), 1);
/// ```
#[derive(Clone)]
pub struct ScriptedLlm {
    responder: Arc<Responder>,
    delay: Option<Delay>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(PromptKind, &str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fixed decomposition and follow-up answers; summaries echo their query.
    pub fn research(decomposition: &str, follow_up: &str) -> Self {
        let decomposition = decomposition.to_string();
        let follow_up = follow_up.to_string();
        Self::new(move |kind, prompt| {
            Ok(match kind {
                PromptKind::Decompose => decomposition.clone(),
                PromptKind::Summarize => format!("Summary of {}", summarized_query(prompt)),
                PromptKind::FollowUp => follow_up.clone(),
                PromptKind::Merge => "Consolidated findings".to_string(),
                PromptKind::Report => "# Final report".to_string(),
                PromptKind::Unknown => String::new(),
            })
        })
    }

    /// Like [`Self::research`] but every call of `failing` kind errors.
    pub fn failing_at(decomposition: &str, follow_up: &str, failing: PromptKind) -> Self {
        let inner = Self::research(decomposition, follow_up);
        let responder = inner.responder.clone();
        Self::new(move |kind, prompt| {
            if kind == failing {
                Err(AppError::LLM("connection refused".to_string()))
            } else {
                responder(kind, prompt)
            }
        })
    }

    /// Sleep before answering prompts of `kind`.
    pub fn with_delay(mut self, kind: PromptKind, delay: Duration) -> Self {
        self.delay = Some(Delay {
            kind,
            needle: None,
            duration: delay,
        });
        self
    }

    /// Sleep before answering prompts of `kind` that contain `needle`.
    pub fn with_delay_matching(mut self, kind: PromptKind, needle: &str, delay: Duration) -> Self {
        self.delay = Some(Delay {
            kind,
            needle: Some(needle.to_string()),
            duration: delay,
        });
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn prompts_of(&self, kind: PromptKind) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| PromptKind::of(p) == kind)
            .collect()
    }

    pub fn count(&self, kind: PromptKind) -> usize {
        self.prompts_of(kind).len()
    }
}

#[async_trait]
impl LLMClient for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        let kind = PromptKind::of(prompt);

        if let Some(delay) = &self.delay
            && delay.applies_to(kind, prompt)
        {
            tokio::time::sleep(delay.duration).await;
        }

        (self.responder)(kind, prompt)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// What a [`ScriptedSearch`] does on every call.
#[derive(Clone)]
enum SearchBehavior {
    Hits,
    Empty,
    Fail,
    Hang,
}

/// Mock search engine that records its queries.
#[derive(Clone)]
pub struct ScriptedSearch {
    behavior: SearchBehavior,
    queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSearch {
    fn with_behavior(behavior: SearchBehavior) -> Self {
        Self {
            behavior,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One hit per query, with a URL derived from the query.
    pub fn hits() -> Self {
        Self::with_behavior(SearchBehavior::Hits)
    }

    pub fn empty() -> Self {
        Self::with_behavior(SearchBehavior::Empty)
    }

    /// Every call returns `AppError::Search`.
    pub fn failing() -> Self {
        Self::with_behavior(SearchBehavior::Fail)
    }

    /// Every call sleeps for an hour.
    pub fn hanging() -> Self {
        Self::with_behavior(SearchBehavior::Hang)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchEngine for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        self.queries.lock().push(query.to_string());

        match self.behavior {
            SearchBehavior::Hits => Ok(SearchResults::Hits(vec![SearchHit::new(
                format!("About {}", query),
                format!("https://example.org/{}", query.replace(' ', "-")),
                format!("Everything about {}.", query),
            )])),
            SearchBehavior::Empty => Ok(SearchResults::empty()),
            SearchBehavior::Fail => Err(AppError::Search("HTTP 503".to_string())),
            SearchBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(SearchResults::empty())
            }
        }
    }
}
