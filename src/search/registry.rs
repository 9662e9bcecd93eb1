//! Explicit search engine registry
//!
//! Engines are registered by name with a factory and the credential keys they
//! need. The registry is a plain value: build it at startup, register what you
//! want, and hand it to whoever needs to create engines.

use crate::search::SearchEngine;
use crate::types::{AppError, Result};
use crate::utils::toml_config::SearchConfig;
use serde::Serialize;
use std::sync::Arc;

/// Name of the engine that is always available and used as the last resort.
pub const PLACEHOLDER_ENGINE: &str = "placeholder";

/// Factory that builds an engine from search configuration
pub type EngineFactory = Arc<dyn Fn(&SearchConfig) -> Result<Box<dyn SearchEngine>> + Send + Sync>;

/// A registered engine: what it is, what it needs, how to build it
#[derive(Clone)]
pub struct EngineEntry {
    pub description: String,
    /// Credential keys resolved through [`SearchConfig::credential`]
    pub required_keys: Vec<&'static str>,
    pub factory: EngineFactory,
}

impl EngineEntry {
    pub fn new<F>(description: impl Into<String>, required_keys: Vec<&'static str>, factory: F) -> Self
    where
        F: Fn(&SearchConfig) -> Result<Box<dyn SearchEngine>> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            required_keys,
            factory: Arc::new(factory),
        }
    }
}

/// Summary of a registered engine, for listing
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub config_status: Vec<(String, bool)>,
}

pub struct SearchEngineRegistry {
    engines: Vec<(String, EngineEntry)>,
}

impl Default for SearchEngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngineRegistry {
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
        }
    }

    /// Create a registry with every built-in engine.
    ///
    /// Registration order is the `auto` priority order: Google first, then
    /// Brave, Bing and DuckDuckGo, with the placeholder as the fallback.
    pub fn with_builtin_engines() -> Self {
        let mut registry = Self::new();

        registry.register(
            "google",
            EngineEntry::new(
                "Google Custom Search JSON API",
                vec!["google.api_key", "google.cse_id"],
                |config| Ok(Box::new(super::google::GoogleSearch::from_config(config)?)),
            ),
        );
        registry.register(
            "brave",
            EngineEntry::new("Brave Search API", vec!["brave.api_key"], |config| {
                Ok(Box::new(super::brave::BraveSearch::from_config(config)?))
            }),
        );
        registry.register(
            "bing",
            EngineEntry::new("Bing Web Search API", vec!["bing.api_key"], |config| {
                Ok(Box::new(super::bing::BingSearch::from_config(config)?))
            }),
        );
        registry.register(
            "duckduckgo",
            EngineEntry::new("DuckDuckGo (no API key required)", vec![], |config| {
                Ok(Box::new(super::duckduckgo::DuckDuckGoSearch::new(
                    config.num_results,
                )))
            }),
        );
        registry.register(
            PLACEHOLDER_ENGINE,
            EngineEntry::new("Fixed offline results for testing", vec![], |_| {
                Ok(Box::new(super::placeholder::PlaceholderSearch))
            }),
        );

        registry
    }

    /// Register an engine under `name` (case-insensitive).
    ///
    /// Re-registering a name replaces its entry but keeps its priority position.
    pub fn register(&mut self, name: &str, entry: EngineEntry) {
        let name = name.trim().to_lowercase();
        match self.engines.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = entry,
            None => self.engines.push((name, entry)),
        }
    }

    /// Registered engine names, in priority order
    pub fn names(&self) -> Vec<&str> {
        self.engines.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    fn entry(&self, name: &str) -> Option<&EngineEntry> {
        let name = name.trim().to_lowercase();
        self.engines
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, entry)| entry)
    }

    /// Create an engine by name
    pub fn create(&self, name: &str, config: &SearchConfig) -> Result<Box<dyn SearchEngine>> {
        let entry = self.entry(name).ok_or_else(|| {
            AppError::NotFound(format!(
                "Unsupported search engine: '{}'. Available engines: {}",
                name,
                self.names().join(", ")
            ))
        })?;

        (entry.factory)(config).map_err(|e| {
            AppError::Configuration(format!("Failed to create search engine '{}': {}", name, e))
        })
    }

    /// Per-key credential status for an engine; empty for unknown engines
    pub fn config_status(&self, name: &str, config: &SearchConfig) -> Vec<(String, bool)> {
        self.entry(name)
            .map(|entry| {
                entry
                    .required_keys
                    .iter()
                    .map(|key| (key.to_string(), config.credential(key).is_some()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Registered and fully configured. The placeholder is always available.
    pub fn is_available(&self, name: &str, config: &SearchConfig) -> bool {
        if !self.contains(name) {
            return false;
        }
        if name.trim().eq_ignore_ascii_case(PLACEHOLDER_ENGINE) {
            return true;
        }
        self.config_status(name, config)
            .iter()
            .all(|(_, present)| *present)
    }

    pub fn engine_info(&self, name: &str, config: &SearchConfig) -> Option<EngineInfo> {
        let entry = self.entry(name)?;
        Some(EngineInfo {
            name: name.trim().to_lowercase(),
            description: entry.description.clone(),
            available: self.is_available(name, config),
            config_status: self.config_status(name, config),
        })
    }

    /// Info for every registered engine, in priority order
    pub fn list(&self, config: &SearchConfig) -> Vec<EngineInfo> {
        self.names()
            .into_iter()
            .filter_map(|name| self.engine_info(name, config))
            .collect()
    }

    /// Name of the engine `auto` selects: the first available engine other than
    /// the placeholder, or the placeholder when nothing is configured.
    pub fn default_engine_name(&self, config: &SearchConfig) -> Option<&str> {
        self.names()
            .into_iter()
            .find(|name| *name != PLACEHOLDER_ENGINE && self.is_available(name, config))
            .or_else(|| {
                self.names()
                    .into_iter()
                    .find(|name| *name == PLACEHOLDER_ENGINE)
            })
    }

    pub fn create_default(&self, config: &SearchConfig) -> Result<Box<dyn SearchEngine>> {
        let name = self.default_engine_name(config).ok_or_else(|| {
            AppError::NotFound("No search engines are registered".to_string())
        })?;
        self.create(name, config)
    }

    /// Create the engine named by `name`, treating "auto" as [`Self::create_default`]
    pub fn resolve(&self, name: &str, config: &SearchConfig) -> Result<Box<dyn SearchEngine>> {
        if name.trim().eq_ignore_ascii_case("auto") {
            self.create_default(config)
        } else {
            self.create(name, config)
        }
    }
}
