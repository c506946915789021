//! Configuration management for the discovery engine.
//!
//! Configuration degrades gracefully: a missing or malformed source falls
//! back to built-in defaults with a warning. Only `validate()` failures on
//! explicitly provided values are surfaced as errors.

mod sub_configs;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult};

pub use sub_configs::{
    AggregationMethod, DedupStrategy, GapFillPolicy, MultiHopConfig, OrchestratorConfig,
    PatternConfig, TemporalConfig,
};

/// Aggregate configuration for a discovery engine instance.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub multi_hop: MultiHopConfig,
    #[serde(default)]
    pub temporal: TemporalConfig,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl EngineConfig {
    /// Load configuration from files and environment.
    ///
    /// Sources are layered in order:
    /// 1. `config/default.toml` (optional)
    /// 2. `config/{RELATION_GRAPH_ENV}.toml` (optional)
    /// 3. Environment variables with the `RELATION_GRAPH` prefix
    ///
    /// Any failure to assemble or deserialize the sources falls back to
    /// built-in defaults with a warning; absence of configuration is
    /// never fatal.
    pub fn load() -> Self {
        let env = std::env::var("RELATION_GRAPH_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("RELATION_GRAPH").separator("__"));

        let loaded: CoreResult<Self> = builder
            .build()
            .map_err(CoreError::from)
            .and_then(|c| c.try_deserialize().map_err(CoreError::from));

        match loaded.and_then(|c| c.validate().map(|_| c)) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit TOML file.
    ///
    /// Unlike [`EngineConfig::load`], an explicitly named file that is
    /// missing or malformed is an error.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate numeric ranges.
    pub fn validate(&self) -> CoreResult<()> {
        self.multi_hop.validate()?;
        self.temporal.validate()?;
        self.patterns.validate()?;
        self.orchestrator.validate()?;
        Ok(())
    }
}
