//! LLM Provider Clients and Abstractions
//!
//! This module provides the text-generation capability consumed by the research
//! engine. Provider-specific implementations sit behind the [`LLMClient`] trait,
//! so the orchestrator never knows which backend it is talking to.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] - Runtime provider selection, built from `[llm]` configuration
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use deepsearch::llm::Provider;
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3".to_string(),
//! }
//! .create_client()
//! .await?;
//!
//! let response = client.generate("What is 2+2?").await?;
//! println!("{}", response);
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
