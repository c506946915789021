//! Relationships: typed, scored, evidenced edges between entities.
//!
//! A `Relationship` never owns its endpoints; it references entities by
//! id and lives in its own independently lifetimed collection.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::EntityId;

/// Identifier for engine-generated relationships (UUID v4).
pub type RelationshipId = Uuid;

/// Closed set of relationship kinds.
///
/// Grouped by how a relationship comes into existence: explicit rule
/// application, multi-hop synthesis, temporal analysis, semantic mining,
/// or pattern detection. New kinds are added here deliberately; there are
/// no free-form string kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    // Explicit kinds, materialized from rules over entity attributes.
    ParentOf,
    ChildOf,
    Owns,
    OwnedBy,
    DependsOn,
    RequiredBy,
    HasRisk,
    RiskOf,
    AtRiskFrom,
    Endangers,
    BelongsTo,
    HasMember,
    AssignedTo,
    Supports,
    SupportedBy,
    CollaboratesWith,
    WorksWith,
    RelatedTo,
    // Multi-hop synthesized kinds.
    ConnectedVia,
    IndirectlyImpacts,
    IndirectlySupports,
    SharesRiskWith,
    // Temporal kinds.
    Precedes,
    Influences,
    CorrelatesWith,
    // Semantic mining.
    SemanticallyRelatedTo,
    // Pattern-based.
    ClusteredWith,
}

/// Provenance category of a relationship kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindCategory {
    Explicit,
    MultiHop,
    Temporal,
    Semantic,
    Pattern,
}

impl RelationshipKind {
    /// Reverse kind for bidirectional mirroring.
    ///
    /// The table is deliberately closed: a kind with no entry here cannot
    /// be mirrored, and rule loading must surface that as a configuration
    /// gap rather than dropping the mirror silently. Symmetric kinds
    /// reverse to themselves.
    pub fn reverse(&self) -> Option<RelationshipKind> {
        use RelationshipKind::*;
        match self {
            ParentOf => Some(ChildOf),
            ChildOf => Some(ParentOf),
            Owns => Some(OwnedBy),
            OwnedBy => Some(Owns),
            DependsOn => Some(RequiredBy),
            RequiredBy => Some(DependsOn),
            HasRisk => Some(RiskOf),
            RiskOf => Some(HasRisk),
            AtRiskFrom => Some(Endangers),
            Endangers => Some(AtRiskFrom),
            BelongsTo => Some(HasMember),
            HasMember => Some(BelongsTo),
            Supports => Some(SupportedBy),
            SupportedBy => Some(Supports),
            // AssignedTo has no defined reverse.
            AssignedTo => None,
            s if s.is_symmetric() => Some(*s),
            _ => None,
        }
    }

    /// Whether the kind reads the same in both directions.
    pub fn is_symmetric(&self) -> bool {
        use RelationshipKind::*;
        matches!(
            self,
            CollaboratesWith
                | WorksWith
                | RelatedTo
                | CorrelatesWith
                | SemanticallyRelatedTo
                | ClusteredWith
                | SharesRiskWith
        )
    }

    pub fn category(&self) -> KindCategory {
        use RelationshipKind::*;
        match self {
            ConnectedVia | IndirectlyImpacts | IndirectlySupports | SharesRiskWith => {
                KindCategory::MultiHop
            }
            Precedes | Influences | CorrelatesWith => KindCategory::Temporal,
            SemanticallyRelatedTo => KindCategory::Semantic,
            ClusteredWith => KindCategory::Pattern,
            _ => KindCategory::Explicit,
        }
    }

    /// Weight of this kind when scoring collaboration inside a triangle.
    pub fn collaboration_weight(&self) -> f64 {
        use RelationshipKind::*;
        match self {
            CollaboratesWith => 1.0,
            WorksWith => 0.9,
            AssignedTo => 0.7,
            BelongsTo => 0.6,
            _ => 0.5,
        }
    }

    /// Kebab-case label used in evidence strings.
    pub fn label(&self) -> &'static str {
        use RelationshipKind::*;
        match self {
            ParentOf => "parent-of",
            ChildOf => "child-of",
            Owns => "owns",
            OwnedBy => "owned-by",
            DependsOn => "depends-on",
            RequiredBy => "required-by",
            HasRisk => "has-risk",
            RiskOf => "risk-of",
            AtRiskFrom => "at-risk-from",
            Endangers => "endangers",
            BelongsTo => "belongs-to",
            HasMember => "has-member",
            AssignedTo => "assigned-to",
            Supports => "supports",
            SupportedBy => "supported-by",
            CollaboratesWith => "collaborates-with",
            WorksWith => "works-with",
            RelatedTo => "related-to",
            ConnectedVia => "connected-via",
            IndirectlyImpacts => "indirectly-impacts",
            IndirectlySupports => "indirectly-supports",
            SharesRiskWith => "shares-risk-with",
            Precedes => "precedes",
            Influences => "influences",
            CorrelatesWith => "correlates-with",
            SemanticallyRelatedTo => "semantically-related-to",
            ClusteredWith => "clustered-with",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a relationship is read one way or both ways.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Unidirectional,
    Bidirectional,
}

/// Coarse strength band of a relationship.
///
/// Drives the edge-weight multiplier when the graph model is built; see
/// [`Strength::multiplier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    /// Derive a band from a confidence score.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Strength::Strong
        } else if confidence >= 0.6 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }

    /// Edge-weight multiplier.
    ///
    /// `pattern_mode` applies the small upward adjustment used when the
    /// graph is built for structural pattern detection:
    /// strong 1.0 → 1.2, moderate 0.7 → 1.0, weak 0.4 → 0.8.
    pub fn multiplier(&self, pattern_mode: bool) -> f64 {
        match (self, pattern_mode) {
            (Strength::Strong, false) => 1.0,
            (Strength::Strong, true) => 1.2,
            (Strength::Moderate, false) => 0.7,
            (Strength::Moderate, true) => 1.0,
            (Strength::Weak, false) => 0.4,
            (Strength::Weak, true) => 0.8,
        }
    }
}

/// Temporal flavour of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalAspect {
    Past,
    Present,
    Future,
    Ongoing,
}

/// Key identifying a relationship for deduplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub source: EntityId,
    pub target: EntityId,
    pub kind: RelationshipKind,
    pub direction: Direction,
}

/// A typed, directed-or-bidirectional, scored edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier (UUID v4, engine-generated).
    pub id: RelationshipId,
    /// Source entity id.
    pub source: EntityId,
    /// Target entity id.
    pub target: EntityId,
    /// What this edge means.
    pub kind: RelationshipKind,
    /// One-way or both ways.
    pub direction: Direction,
    /// Coarse strength band.
    pub strength: Strength,
    /// Confidence in [0.0, 1.0]. Clamped at construction.
    pub confidence: f64,
    /// Ordered human-readable justification strings.
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Optional temporal flavour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_aspect: Option<TemporalAspect>,
    /// For multi-hop relationships: the node sequence after the source
    /// (intermediates, then the target), so its length equals the hop
    /// count. `None` for direct relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<EntityId>>,
}

impl Relationship {
    /// Create a relationship; strength is derived from confidence and
    /// confidence is clamped into [0, 1].
    pub fn new(
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
        kind: RelationshipKind,
        direction: Direction,
        confidence: f64,
    ) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            target: target.into(),
            kind,
            direction,
            strength: Strength::from_confidence(confidence),
            confidence,
            evidence: Vec::new(),
            temporal_aspect: None,
            path: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    pub fn with_temporal_aspect(mut self, aspect: TemporalAspect) -> Self {
        self.temporal_aspect = Some(aspect);
        self
    }

    pub fn with_path(mut self, path: Vec<EntityId>) -> Self {
        self.path = Some(path);
        self
    }

    /// Hop count of a multi-hop relationship; 0 for direct ones.
    pub fn path_length(&self) -> usize {
        self.path.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Deduplication key: (source, target, kind, direction).
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            source: self.source.clone(),
            target: self.target.clone(),
            kind: self.kind,
            direction: self.direction,
        }
    }
}
