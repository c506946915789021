//! Per-request discovery parameters.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::relationship::{Relationship, RelationshipKind};

/// Inclusive-start, exclusive-end time window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }
}

/// Constraints threaded through a single discovery invocation.
///
/// A value object: never mutated concurrently, cheap to clone into tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryContext {
    /// Restrict temporal analysis to events inside this window.
    pub time_range: Option<TimeRange>,
    /// When set, only relationships touching one of these entities are
    /// returned.
    pub focus_entities: Option<HashSet<EntityId>>,
    /// Kinds removed from the output.
    pub excluded_kinds: HashSet<RelationshipKind>,
    /// Confidence floor for returned relationships.
    pub min_confidence: f64,
    /// Delegate path/pattern interpretation to an external service when
    /// one is registered.
    pub enable_semantic_interpretation: bool,
}

impl Default for DiscoveryContext {
    fn default() -> Self {
        Self {
            time_range: None,
            focus_entities: None,
            excluded_kinds: HashSet::new(),
            min_confidence: 0.0,
            enable_semantic_interpretation: false,
        }
    }
}

impl DiscoveryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_focus_entities(mut self, entities: impl IntoIterator<Item = EntityId>) -> Self {
        self.focus_entities = Some(entities.into_iter().collect());
        self
    }

    pub fn with_excluded_kind(mut self, kind: RelationshipKind) -> Self {
        self.excluded_kinds.insert(kind);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_semantic_interpretation(mut self, enabled: bool) -> Self {
        self.enable_semantic_interpretation = enabled;
        self
    }

    /// The output filter: confidence floor, excluded kinds, focus set.
    pub fn allows(&self, relationship: &Relationship) -> bool {
        if relationship.confidence < self.min_confidence {
            return false;
        }
        if self.excluded_kinds.contains(&relationship.kind) {
            return false;
        }
        if let Some(focus) = &self.focus_entities {
            if !focus.contains(&relationship.source) && !focus.contains(&relationship.target) {
                return false;
            }
        }
        true
    }
}
