//! Core domain types for the relation-graph discovery engine.
//!
//! This crate defines:
//! - Domain types (`Entity`, `Relationship`, `Event`, `GraphPattern`, etc.)
//! - Declarative relationship rules (`RelationshipRule`, `RuleSet`)
//! - The per-request `DiscoveryContext`
//! - Error types and result aliases
//! - Configuration structures with documented defaults
//!
//! # Example
//!
//! ```
//! use relation_graph_core::types::{Entity, EntityType};
//!
//! let acme = Entity::new("acme-corp", EntityType::Customer)
//!     .with_attribute("industry", "logistics");
//! assert_eq!(acme.attribute("industry"), Some("logistics"));
//! ```

pub mod config;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::{
    AggregationMethod, DedupStrategy, EngineConfig, GapFillPolicy, MultiHopConfig,
    OrchestratorConfig, PatternConfig, TemporalConfig,
};
pub use error::{CoreError, CoreResult};
pub use types::{
    CausalityMethod, CollaborationPattern, DataQualityWarning, Direction, DiscoveryContext,
    Entity, EntityId, EntityType, Event, GraphPattern, PathAnalysis, PatternMetadata,
    PatternType, Relationship, RelationshipId, RelationshipKind, RelationshipRule, RuleSet,
    Strength, TemporalAspect, TemporalCorrelation, TimeRange,
};
