//! External semantic mining hook.
//!
//! Semantic relationship mining (e.g. over free-text descriptions) lives
//! outside this engine. When a miner is registered and enabled it runs
//! as one more independent discovery task; its failures are isolated at
//! fan-in like any other task failure.

use async_trait::async_trait;

use relation_graph_core::types::{Entity, Relationship};

use crate::error::DiscoveryResult;

/// An external producer of semantic relationships.
#[async_trait]
pub trait SemanticMiner: Send + Sync {
    /// Mine relationships from the entity set.
    ///
    /// Returned relationships go through the same merge, dedup, and
    /// context filtering as every other discovery output.
    async fn mine(&self, entities: &[Entity]) -> DiscoveryResult<Vec<Relationship>>;
}
