//! TOML-based configuration for DeepSearch
//!
//! This module provides declarative configuration for the text-generation
//! backend, the search engines and the research policy via a TOML file
//! (`deepsearch.toml`). Every section has defaults, so the file is optional.
//!
//! Secrets never live in the file: each credential is referenced by the name of
//! the environment variable that holds it (`api_key_env`). Call
//! [`dotenvy::dotenv`] before loading if you keep them in a `.env` file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Root configuration structure loaded from deepsearch.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSearchConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Text generation backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// Search engine selection and credentials
    #[serde(default)]
    pub search: SearchConfig,

    /// Decomposition, depth and budget policy
    #[serde(default)]
    pub research: ResearchConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeepSearchConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            research: ResearchConfig::default(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    Ollama,
    #[serde(rename = "openai")]
    OpenAI,
}

impl std::str::FromStr for LlmProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProviderKind::Ollama),
            "openai" => Ok(LlmProviderKind::OpenAI),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown LLM provider '{}' (expected 'ollama' or 'openai')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub openai: OpenAIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Environment variable containing API key
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base")]
    pub api_base: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Engine name, or "auto" to pick the first configured engine
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_num_results")]
    pub num_results: usize,

    /// HTTP timeout for engines that call a remote API
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub google: GoogleSearchConfig,

    #[serde(default)]
    pub brave: BraveSearchConfig,

    #[serde(default)]
    pub bing: BingSearchConfig,
}

fn default_engine() -> String {
    "auto".to_string()
}

fn default_num_results() -> usize {
    10
}

fn default_search_timeout() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            num_results: default_num_results(),
            timeout_secs: default_search_timeout(),
            google: GoogleSearchConfig::default(),
            brave: BraveSearchConfig::default(),
            bing: BingSearchConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Resolve a credential key (as listed by an engine) to its value.
    ///
    /// Keys are `google.api_key`, `google.cse_id`, `brave.api_key` and
    /// `bing.api_key`. Unset and blank variables both count as missing.
    pub fn credential(&self, key: &str) -> Option<String> {
        let env_name = match key {
            "google.api_key" => &self.google.api_key_env,
            "google.cse_id" => &self.google.cse_id_env,
            "brave.api_key" => &self.brave.api_key_env,
            "bing.api_key" => &self.bing.api_key_env,
            _ => return None,
        };

        std::env::var(env_name)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSearchConfig {
    #[serde(default = "default_google_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_google_cse_env")]
    pub cse_id_env: String,
}

fn default_google_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_google_cse_env() -> String {
    "GOOGLE_CSE_ID".to_string()
}

impl Default for GoogleSearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_google_key_env(),
            cse_id_env: default_google_cse_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BraveSearchConfig {
    /// Environment variable containing the subscription token
    #[serde(default = "default_brave_key_env")]
    pub api_key_env: String,
}

fn default_brave_key_env() -> String {
    "BRAVE_API_KEY".to_string()
}

impl Default for BraveSearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_brave_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingSearchConfig {
    #[serde(default = "default_bing_key_env")]
    pub api_key_env: String,
}

fn default_bing_key_env() -> String {
    "BING_API_KEY".to_string()
}

impl Default for BingSearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_bing_key_env(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum refinement iterations per branch
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Upper bound on sub-queries kept from decomposition
    #[serde(default = "default_max_sub_queries")]
    pub max_sub_queries: usize,

    /// Hard ceiling on generator + search calls for one research run
    #[serde(default = "default_max_total_calls")]
    pub max_total_calls: usize,

    /// Deadline applied to every individual capability call
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Refine independent branches concurrently
    #[serde(default)]
    pub parallel_branches: bool,

    #[serde(default = "default_max_concurrent_branches")]
    pub max_concurrent_branches: usize,
}

fn default_max_depth() -> usize {
    3
}

fn default_max_sub_queries() -> usize {
    5
}

fn default_max_total_calls() -> usize {
    64
}

fn default_call_timeout() -> u64 {
    120
}

fn default_max_concurrent_branches() -> usize {
    3
}

/// Decomposition, one full iteration (search, summary, follow-up), merge and report.
pub const MIN_TOTAL_CALLS: usize = 6;

/// Largest accepted `max_sub_queries`.
pub const MAX_SUB_QUERIES_LIMIT: usize = 10;

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_sub_queries: default_max_sub_queries(),
            max_total_calls: default_max_total_calls(),
            call_timeout_secs: default_call_timeout(),
            parallel_branches: false,
            max_concurrent_branches: default_max_concurrent_branches(),
        }
    }
}

impl ResearchConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_sub_queries == 0 || self.max_sub_queries > MAX_SUB_QUERIES_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "research.max_sub_queries must be between 1 and {} (got {})",
                MAX_SUB_QUERIES_LIMIT, self.max_sub_queries
            )));
        }
        if self.max_total_calls < MIN_TOTAL_CALLS {
            return Err(ConfigError::ValidationError(format!(
                "research.max_total_calls must be at least {} (got {})",
                MIN_TOTAL_CALLS, self.max_total_calls
            )));
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "research.call_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent_branches == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_concurrent_branches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DeepSearchConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    ///
    /// Environment overrides and validation apply either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        debug!("No configuration file at {:?}, using defaults", path);
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse without touching the environment or validating
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply the well-known environment overrides for backend endpoints and models.
    ///
    /// `OLLAMA_HOST`, `OLLAMA_MODEL`, `OPENAI_BASE_URL` and `OPENAI_MODEL` win
    /// over values from the file.
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 4] = [
            ("OLLAMA_HOST", &mut self.llm.ollama.base_url),
            ("OLLAMA_MODEL", &mut self.llm.ollama.model),
            ("OPENAI_BASE_URL", &mut self.llm.openai.api_base),
            ("OPENAI_MODEL", &mut self.llm.openai.model),
        ];

        for (var, slot) in overrides {
            if let Some(value) = std::env::var(var).ok().filter(|v| !v.trim().is_empty()) {
                debug!(var, "Applying environment override");
                *slot = value;
            }
        }
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.research.validate()?;

        if self.search.num_results == 0 || self.search.num_results > 100 {
            return Err(ConfigError::ValidationError(format!(
                "search.num_results must be between 1 and 100 (got {})",
                self.search.num_results
            )));
        }
        if self.search.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "search.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.search.engine.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "search.engine must name an engine or be \"auto\"".to_string(),
            ));
        }

        Ok(())
    }
}
