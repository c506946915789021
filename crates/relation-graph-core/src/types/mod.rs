//! Domain types for relationship discovery.

mod analysis;
mod context;
mod entity;
mod pattern;
mod relationship;
mod rule;
mod warning;

pub use analysis::{CausalityMethod, PathAnalysis, TemporalCorrelation};
pub use context::{DiscoveryContext, TimeRange};
pub use entity::{Entity, EntityId, EntityType, Event};
pub use pattern::{CollaborationPattern, GraphPattern, PatternMetadata, PatternType};
pub use relationship::{
    DedupKey, Direction, KindCategory, Relationship, RelationshipId, RelationshipKind,
    Strength, TemporalAspect,
};
pub use rule::{RelationshipRule, RuleSet};
pub use warning::DataQualityWarning;
