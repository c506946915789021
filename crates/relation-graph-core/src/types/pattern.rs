//! Structural graph patterns: hubs, communities, triangles, chains, stars.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Structural motif categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Hub,
    Community,
    Triangle,
    Chain,
    Star,
}

impl PatternType {
    /// Base contribution to the composite importance score.
    pub fn base_score(&self) -> f64 {
        match self {
            PatternType::Hub => 0.9,
            PatternType::Community => 0.8,
            PatternType::Triangle | PatternType::Star => 0.7,
            PatternType::Chain => 0.6,
        }
    }
}

/// Free-form pattern measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternMetadata {
    /// Internal edge count over the maximum possible, in [0, 1].
    pub density: f64,
    /// Mean internal edge weight, in [0, 1].
    pub cohesion: f64,
    /// Member count per entity-type label.
    #[serde(default)]
    pub entity_type_counts: BTreeMap<String, usize>,
}

/// A detected structural pattern with its composite importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPattern {
    pub pattern_type: PatternType,
    /// Entities involved, sorted by id.
    pub entities: Vec<EntityId>,
    /// Combined centrality per member entity.
    pub centrality_scores: BTreeMap<EntityId, f64>,
    pub metadata: PatternMetadata,
    /// Composite importance; patterns are returned sorted descending on
    /// this value.
    pub importance: f64,
}

impl GraphPattern {
    /// Mean combined centrality across members (0 when empty).
    pub fn centrality_component(&self) -> f64 {
        if self.centrality_scores.is_empty() {
            return 0.0;
        }
        self.centrality_scores.values().sum::<f64>() / self.centrality_scores.len() as f64
    }
}

/// A triangle pattern enriched with collaboration scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationPattern {
    pub pattern: GraphPattern,
    /// Kind-weighted collaboration score, normalized by the pair count.
    pub collaboration_strength: f64,
    /// Label of the dominant relationship kind among the edges.
    pub collaboration_type: String,
}
