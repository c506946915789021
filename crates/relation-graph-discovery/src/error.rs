//! Error types for the discovery engine.
//!
//! Only graph-construction invariant breaches are fatal. Data-quality
//! findings travel as warnings in the report, and a failing discovery
//! task is isolated at fan-in rather than propagated.

use thiserror::Error;

/// Errors that can occur while orchestrating discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Graph construction failed (e.g. a relationship references an
    /// entity that does not exist). Downstream persistence would be
    /// silently wrong, so this aborts the run.
    #[error(transparent)]
    Graph(#[from] relation_graph_graph::GraphError),

    /// Configuration rejected by validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A spawned discovery task failed; recorded per task at fan-in.
    #[error("Discovery task '{task}' failed: {message}")]
    Task { task: String, message: String },

    /// An external collaborator (semantic miner, interpreter) failed.
    #[error("External collaborator error: {0}")]
    External(String),
}

impl From<relation_graph_core::CoreError> for DiscoveryError {
    fn from(err: relation_graph_core::CoreError) -> Self {
        DiscoveryError::Config(err.to_string())
    }
}

/// Result type alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
