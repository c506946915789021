//! Error types for graph construction and traversal.

use relation_graph_core::types::{EntityId, RelationshipId};
use thiserror::Error;

/// Errors raised while building or querying the graph model.
///
/// A relationship referencing an entity the graph does not contain is the
/// one fatal case: letting it through would make every downstream result
/// silently wrong. "No path found" and similar empty outcomes are valid
/// results, not errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A relationship references an entity id absent from the input set.
    #[error("Relationship {relationship} references unknown entity: {entity}")]
    UnknownEntity {
        /// The dangling entity id.
        entity: EntityId,
        /// The offending relationship.
        relationship: RelationshipId,
    },
}

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
