//! # DeepSearch - Iterative Web Research Engine
//!
//! DeepSearch answers a natural-language research question by decomposing it
//! into sub-queries, iteratively searching and summarizing each one, generating
//! follow-up queries to deepen coverage, and finally merging every finding into
//! a single cited report.
//!
//! ## Overview
//!
//! DeepSearch can be used in two ways:
//!
//! 1. **As a command-line tool** - Run the `deepsearch` binary
//! 2. **As a library** - Embed the research engine in your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use deepsearch::{DeepSearchConfig, Provider, ResearchCoordinator, SearchEngineRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeepSearchConfig::load_or_default("deepsearch.toml")?;
//!
//!     let llm = Provider::from_config(&config.llm)?.create_client().await?;
//!     let engine = SearchEngineRegistry::with_builtin_engines()
//!         .resolve(&config.search.engine, &config.search)?;
//!
//!     let coordinator = ResearchCoordinator::new(llm, engine, config.research.clone());
//!     let report = coordinator
//!         .deep_search("What are the latest advancements in AI?", 2)
//!         .await?;
//!     println!("{}", report);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints |
//! | `all-llm` | Both backends |
//!
//! ## Modules
//!
//! - [`research`] - Decomposition, branch refinement, merge and report
//! - [`llm`] - Text generation clients
//! - [`search`] - Search engines and the engine registry
//! - [`utils`] - TOML configuration
//! - [`cli`] - Command-line parsing and output
//! - [`types`] - Error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface for the `deepsearch` binary.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Iterative research orchestration.
pub mod research;
/// Web search engines and registry.
pub mod search;
/// Error types.
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, Provider};
pub use research::{Finding, ResearchCoordinator, ResearchOutcome, ResearchStage};
pub use search::{SearchEngine, SearchEngineRegistry, SearchHit, SearchResults};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, DeepSearchConfig};
