//! LLM Client abstractions and provider management
//!
//! This module provides the single text-generation interface the research engine
//! depends on, plus one implementation per backend:
//! - **Ollama**: local inference through the Ollama chat API
//! - **OpenAI**: OpenAI and any OpenAI-compatible endpoint

use crate::types::{AppError, Result};
use crate::utils::toml_config::{LlmConfig, LlmProviderKind};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// Given a prompt, produce a completion. Implementations keep no conversational
/// state between calls; every call is independent.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Feature | Notes |
/// |----------|---------|-------|
/// | Ollama | `ollama` (default) | Local inference |
/// | OpenAI | `openai` | Also works with OpenAI-compatible gateways |
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4".to_string(),
    ///     max_tokens: 1024,
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        max_tokens: u32,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Build a provider from configuration, resolving credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` when the OpenAI API key variable is unset or empty.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match config.provider {
            LlmProviderKind::Ollama => Ok(Provider::Ollama {
                base_url: config.ollama.base_url.clone(),
                model: config.ollama.model.clone(),
            }),
            LlmProviderKind::OpenAI => {
                let api_key = std::env::var(&config.openai.api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Configuration(format!(
                            "OpenAI provider selected but '{}' is not set. \
                             Add it to your environment or .env file.",
                            config.openai.api_key_env
                        ))
                    })?;

                Ok(Provider::OpenAI {
                    api_key,
                    api_base: config.openai.api_base.clone(),
                    model: config.openai.model.clone(),
                    max_tokens: config.openai.max_tokens,
                })
            }
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the backend was not compiled in (see Cargo features)
    /// or the client could not be constructed.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                max_tokens,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *max_tokens,
            ))),

            #[cfg(not(feature = "openai"))]
            Provider::OpenAI { .. } => Err(AppError::Configuration(
                "OpenAI support not compiled in; rebuild with `--features openai`".to_string(),
            )),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone())?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { .. } => Err(AppError::Configuration(
                "Ollama support not compiled in; rebuild with `--features ollama`".to_string(),
            )),
        }
    }

    /// Check if this provider's backend is compiled into this build
    pub fn is_enabled(&self) -> bool {
        match self {
            Provider::OpenAI { .. } => cfg!(feature = "openai"),
            Provider::Ollama { .. } => cfg!(feature = "ollama"),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model identifier this provider will request
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}
