//! In-memory weighted graph built from entities and relationships.
//!
//! Rebuilt per discovery run in O(entities + relationships); inputs are
//! never mutated. Adjacency is stored in ordered maps so traversal and
//! pattern detection iterate deterministically.

use std::collections::BTreeMap;

use relation_graph_core::types::{
    Direction, Entity, EntityId, EntityType, Relationship, RelationshipKind,
};

use crate::error::{GraphError, GraphResult};

/// Which strength-multiplier set edge weights use.
///
/// `Pattern` applies the small upward adjustment that keeps moderate and
/// weak edges visible to structural motif detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightMode {
    #[default]
    Standard,
    Pattern,
}

/// Weight and kind of a (deduplicated) edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo {
    /// `confidence × strength multiplier`, clamped to [0, 1].
    pub weight: f64,
    pub kind: RelationshipKind,
}

type Adjacency = BTreeMap<EntityId, BTreeMap<EntityId, EdgeInfo>>;

/// Weighted directed graph with an undirected projection.
///
/// Parallel edges between the same ordered pair collapse to the
/// heaviest one.
#[derive(Debug, Clone)]
pub struct EntityGraph {
    types: BTreeMap<EntityId, EntityType>,
    out: Adjacency,
    undirected: Adjacency,
    arc_count: usize,
}

impl EntityGraph {
    /// Build the graph.
    ///
    /// Fails with [`GraphError::UnknownEntity`] if any relationship
    /// references an entity id absent from `entities`; that invariant
    /// breach must reach the caller rather than corrupt downstream
    /// results.
    pub fn build(
        entities: &[Entity],
        relationships: &[Relationship],
        mode: WeightMode,
    ) -> GraphResult<Self> {
        let mut types = BTreeMap::new();
        let mut out: Adjacency = BTreeMap::new();
        let mut undirected: Adjacency = BTreeMap::new();

        for entity in entities {
            types.insert(entity.id.clone(), entity.entity_type);
            out.entry(entity.id.clone()).or_default();
            undirected.entry(entity.id.clone()).or_default();
        }

        let pattern_mode = mode == WeightMode::Pattern;
        let mut arc_count = 0;

        for rel in relationships {
            for endpoint in [&rel.source, &rel.target] {
                if !types.contains_key(endpoint) {
                    return Err(GraphError::UnknownEntity {
                        entity: endpoint.clone(),
                        relationship: rel.id,
                    });
                }
            }

            let weight = (rel.confidence * rel.strength.multiplier(pattern_mode)).clamp(0.0, 1.0);
            let info = EdgeInfo {
                weight,
                kind: rel.kind,
            };

            arc_count += insert_arc(&mut out, &rel.source, &rel.target, info);
            if rel.direction == Direction::Bidirectional {
                arc_count += insert_arc(&mut out, &rel.target, &rel.source, info);
            }

            insert_arc(&mut undirected, &rel.source, &rel.target, info);
            insert_arc(&mut undirected, &rel.target, &rel.source, info);
        }

        Ok(Self {
            types,
            out,
            undirected,
            arc_count,
        })
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.types.contains_key(id)
    }

    pub fn node_type(&self, id: &EntityId) -> Option<EntityType> {
        self.types.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.types.len()
    }

    /// Number of directed arcs (after parallel-edge collapsing).
    pub fn arc_count(&self) -> usize {
        self.arc_count
    }

    /// Node ids in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &EntityId> {
        self.types.keys()
    }

    /// Outgoing arcs, sorted by target id.
    pub fn out_neighbors(&self, id: &EntityId) -> impl Iterator<Item = (&EntityId, &EdgeInfo)> {
        self.out.get(id).into_iter().flatten()
    }

    /// Undirected neighborhood, sorted by neighbor id.
    pub fn neighbors(&self, id: &EntityId) -> impl Iterator<Item = (&EntityId, &EdgeInfo)> {
        self.undirected.get(id).into_iter().flatten()
    }

    /// Undirected degree.
    pub fn degree(&self, id: &EntityId) -> usize {
        self.undirected.get(id).map(BTreeMap::len).unwrap_or(0)
    }

    /// Weight of the directed arc `a -> b`, if present.
    pub fn arc_weight(&self, a: &EntityId, b: &EntityId) -> Option<f64> {
        self.out.get(a).and_then(|m| m.get(b)).map(|e| e.weight)
    }

    /// Undirected edge info between `a` and `b`, if connected.
    pub fn edge_between(&self, a: &EntityId, b: &EntityId) -> Option<&EdgeInfo> {
        self.undirected.get(a).and_then(|m| m.get(b))
    }

    /// Whether `a` and `b` share an edge in either direction.
    pub fn is_directly_connected(&self, a: &EntityId, b: &EntityId) -> bool {
        self.edge_between(a, b).is_some()
    }
}

/// Insert an arc, collapsing parallels to the heaviest. Returns 1 when a
/// new arc was created.
fn insert_arc(adj: &mut Adjacency, from: &EntityId, to: &EntityId, info: EdgeInfo) -> usize {
    let slot = adj.entry(from.clone()).or_default();
    match slot.get_mut(to) {
        Some(existing) => {
            if info.weight > existing.weight {
                *existing = info;
            }
            0
        }
        None => {
            slot.insert(to.clone(), info);
            1
        }
    }
}
