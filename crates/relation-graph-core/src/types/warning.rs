//! Data-quality warnings: reportable, never fatal.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::relationship::RelationshipKind;

/// A non-fatal data-quality finding surfaced during discovery.
///
/// Warnings are collected into the discovery report and logged; they
/// never abort a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// A required rule matched but its target id resolved to nothing.
    UnresolvedRuleTarget {
        entity: EntityId,
        field: String,
        target_id: String,
    },
    /// A bidirectional rule uses a kind with no defined reverse.
    MissingReverseKind { kind: RelationshipKind },
    /// An entity had too few events for temporal analysis.
    InsufficientEvents {
        entity: EntityId,
        events: usize,
        required: usize,
    },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityWarning::UnresolvedRuleTarget {
                entity,
                field,
                target_id,
            } => write!(
                f,
                "unresolved rule target: {entity} field '{field}' references unknown '{target_id}'"
            ),
            DataQualityWarning::MissingReverseKind { kind } => {
                write!(f, "no reverse defined for kind '{kind}'")
            }
            DataQualityWarning::InsufficientEvents {
                entity,
                events,
                required,
            } => write!(
                f,
                "entity {entity} has {events} events, {required} required for temporal analysis"
            ),
        }
    }
}
