//! CLI module for DeepSearch
//!
//! Provides command-line interface parsing for the `deepsearch` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::utils::toml_config::{DeepSearchConfig, LlmProviderKind};
use clap::Parser;
use std::path::PathBuf;

/// DeepSearch - iterative web research from the command line
///
/// Decomposes a question into sub-queries, refines each with web search and an
/// LLM, and writes a single cited report.
#[derive(Parser, Debug)]
#[command(
    name = "deepsearch",
    version,
    about = "DeepSearch - iterative web research with an LLM",
    long_about = "Decomposes a question into sub-queries, refines each one through\n\
                  search, summarize and follow-up iterations, then merges every finding\n\
                  into a single cited report.\n\n\
                  Run without a query to be prompted for one.",
    after_help = "EXAMPLES:\n    \
                  deepsearch \"What are the latest advancements in AI?\"\n    \
                  deepsearch --max-depth 2 --search-engine brave \"rust async runtimes\"\n    \
                  deepsearch --llm openai --json \"quantum error correction\"\n    \
                  deepsearch --list-engines"
)]
pub struct Cli {
    /// Research question (prompted for on stdin when omitted)
    pub query: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "deepsearch.toml")]
    pub config: PathBuf,

    /// LLM provider to use (ollama or openai)
    #[arg(long, value_parser = parse_provider)]
    pub llm: Option<LlmProviderKind>,

    /// Search engine name, or "auto" for the first configured engine
    #[arg(short, long)]
    pub search_engine: Option<String>,

    /// Maximum refinement iterations per branch
    #[arg(short = 'd', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    /// Refine branches concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Print every finding after the report
    #[arg(long)]
    pub show_findings: bool,

    /// Print the full research outcome as JSON
    #[arg(long, conflicts_with = "show_findings")]
    pub json: bool,

    /// List search engines and their credential status, then exit
    #[arg(long)]
    pub list_engines: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

fn parse_provider(value: &str) -> Result<LlmProviderKind, String> {
    value
        .parse::<LlmProviderKind>()
        .map_err(|e| e.to_string())
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut DeepSearchConfig) {
        if let Some(provider) = self.llm {
            config.llm.provider = provider;
        }
        if let Some(engine) = &self.search_engine {
            config.search.engine = engine.clone();
        }
        if let Some(depth) = self.max_depth {
            config.research.max_depth = depth as usize;
        }
        if self.parallel {
            config.research.parallel_branches = true;
        }
    }
}
