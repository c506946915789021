//! Small structural motifs: triangles, chains, stars.

use std::collections::BTreeSet;

use relation_graph_core::types::{EntityId, RelationshipKind};

use crate::model::EntityGraph;

/// A 3-clique with its edge weights and kinds.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Members sorted by id.
    pub members: [EntityId; 3],
    /// Mean edge weight.
    pub strength: f64,
    /// Kind of each edge, in (ab, ac, bc) order.
    pub edge_kinds: [RelationshipKind; 3],
}

/// Enumerate all triangles whose mean edge weight is at least
/// `min_strength`.
///
/// Standard ordered enumeration (`a < b < c`), so each clique is
/// reported once and output order is deterministic.
pub fn triangles(graph: &EntityGraph, min_strength: f64) -> Vec<Triangle> {
    let nodes: Vec<EntityId> = graph.nodes().cloned().collect();
    let mut found = Vec::new();

    for a in &nodes {
        let a_neighbors: Vec<EntityId> = graph
            .neighbors(a)
            .filter(|(id, _)| *id > a)
            .map(|(id, _)| id.clone())
            .collect();
        for (i, b) in a_neighbors.iter().enumerate() {
            for c in &a_neighbors[i + 1..] {
                let Some(bc) = graph.edge_between(b, c) else {
                    continue;
                };
                // unwraps cannot fire: b and c came from a's neighborhood
                let ab = graph.edge_between(a, b).map(|e| *e).unwrap_or(*bc);
                let ac = graph.edge_between(a, c).map(|e| *e).unwrap_or(*bc);
                let strength = (ab.weight + ac.weight + bc.weight) / 3.0;
                if strength >= min_strength {
                    found.push(Triangle {
                        members: [a.clone(), b.clone(), c.clone()],
                        strength,
                        edge_kinds: [ab.kind, ac.kind, bc.kind],
                    });
                }
            }
        }
    }
    found
}

impl Triangle {
    /// Kind-weighted collaboration score, normalized by the pair count.
    pub fn collaboration_strength(&self) -> f64 {
        let total: f64 = self
            .edge_kinds
            .iter()
            .map(|k| k.collaboration_weight())
            .sum();
        total / self.edge_kinds.len() as f64
    }

    /// Label of the highest-weighted kind among the edges.
    pub fn collaboration_type(&self) -> &'static str {
        self.edge_kinds
            .iter()
            .max_by(|a, b| {
                a.collaboration_weight()
                    .partial_cmp(&b.collaboration_weight())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|k| k.label())
            .unwrap_or("related-to")
    }
}

/// Maximal degree-≤2 chains of at least `min_length` nodes.
///
/// Walks outward from degree-2 seeds in both directions while the next
/// node is unvisited and has degree ≤ 2, bounded by `max_length`. Each
/// node lands in at most one chain.
pub fn chains(graph: &EntityGraph, min_length: usize, max_length: usize) -> Vec<Vec<EntityId>> {
    let mut visited: BTreeSet<EntityId> = BTreeSet::new();
    let mut found = Vec::new();

    for seed in graph.nodes() {
        if visited.contains(seed) || graph.degree(seed) != 2 {
            continue;
        }

        let mut chain = vec![seed.clone()];
        visited.insert(seed.clone());

        // Walk both directions from the seed.
        for direction in 0..2 {
            let mut extendable = true;
            while extendable && chain.len() < max_length {
                let end = if direction == 0 {
                    chain.last()
                } else {
                    chain.first()
                };
                let end = end.cloned().unwrap_or_else(|| seed.clone());
                let next = graph
                    .neighbors(&end)
                    .map(|(id, _)| id.clone())
                    .find(|id| !visited.contains(id) && graph.degree(id) <= 2);
                match next {
                    Some(node) => {
                        visited.insert(node.clone());
                        if direction == 0 {
                            chain.push(node);
                        } else {
                            chain.insert(0, node);
                        }
                    }
                    None => extendable = false,
                }
            }
        }

        if chain.len() >= min_length {
            found.push(chain);
        }
    }
    found
}

/// A star: a center whose neighborhood is mostly leaves.
#[derive(Debug, Clone)]
pub struct Star {
    pub center: EntityId,
    /// Spokes sorted by id.
    pub spokes: Vec<EntityId>,
}

/// Detect stars: nodes with at least `min_spokes` neighbors of which at
/// least `leaf_ratio` are leaves (degree 1).
pub fn stars(graph: &EntityGraph, min_spokes: usize, leaf_ratio: f64) -> Vec<Star> {
    let mut found = Vec::new();
    for center in graph.nodes() {
        let spokes: Vec<EntityId> = graph
            .neighbors(center)
            .map(|(id, _)| id.clone())
            .collect();
        if spokes.len() < min_spokes {
            continue;
        }
        let leaves = spokes.iter().filter(|s| graph.degree(s) == 1).count();
        if (leaves as f64) / (spokes.len() as f64) >= leaf_ratio {
            found.push(Star {
                center: center.clone(),
                spokes,
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeightMode;
    use relation_graph_core::types::{Direction, Entity, EntityType, Relationship};

    fn graph_from(edges: &[(&str, &str, RelationshipKind, f64)]) -> EntityGraph {
        let mut seen = std::collections::BTreeSet::new();
        for (a, b, _, _) in edges {
            seen.insert(*a);
            seen.insert(*b);
        }
        let entities: Vec<Entity> = seen
            .into_iter()
            .map(|id| Entity::new(id, EntityType::Team))
            .collect();
        let rels: Vec<Relationship> = edges
            .iter()
            .map(|(a, b, kind, c)| {
                Relationship::new(*a, *b, *kind, Direction::Bidirectional, *c)
            })
            .collect();
        EntityGraph::build(&entities, &rels, WeightMode::Standard).unwrap()
    }

    #[test]
    fn test_triangle_enumeration_counts_k4() {
        use RelationshipKind::WorksWith;
        let names = ["a", "b", "c", "d"];
        let mut edges = Vec::new();
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.push((names[i], names[j], WorksWith, 0.9));
            }
        }
        let g = graph_from(&edges);
        let tris = triangles(&g, 0.5);
        // K4 contains exactly C(4,3) = 4 triangles
        assert_eq!(tris.len(), 4);
        for t in &tris {
            assert!((t.strength - 0.9).abs() < 1e-9);
        }
    }

    #[test]
    fn test_triangle_strength_threshold() {
        use RelationshipKind::WorksWith;
        // weak edges: confidence 0.4 -> weak -> weight 0.16
        let g = graph_from(&[
            ("a", "b", WorksWith, 0.4),
            ("b", "c", WorksWith, 0.4),
            ("a", "c", WorksWith, 0.4),
        ]);
        assert!(triangles(&g, 0.5).is_empty());
        assert_eq!(triangles(&g, 0.1).len(), 1);
    }

    #[test]
    fn test_collaboration_scoring() {
        use RelationshipKind::{AssignedTo, CollaboratesWith, WorksWith};
        let g = graph_from(&[
            ("a", "b", CollaboratesWith, 0.9),
            ("a", "c", WorksWith, 0.9),
            ("b", "c", AssignedTo, 0.9),
        ]);
        let tris = triangles(&g, 0.1);
        assert_eq!(tris.len(), 1);
        let t = &tris[0];
        // (1.0 + 0.9 + 0.7) / 3
        assert!((t.collaboration_strength() - 0.8667).abs() < 1e-3);
        assert_eq!(t.collaboration_type(), "collaborates-with");
    }

    #[test]
    fn test_chain_detection() {
        use RelationshipKind::RelatedTo;
        // a - b - c - d - e, plus an unrelated hub to keep degrees honest
        let g = graph_from(&[
            ("a", "b", RelatedTo, 0.9),
            ("b", "c", RelatedTo, 0.9),
            ("c", "d", RelatedTo, 0.9),
            ("d", "e", RelatedTo, 0.9),
        ]);
        let found = chains(&g, 3, 10);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].len(), 5);
        // walk covers the whole path, in order
        let ids: Vec<&str> = found[0].iter().map(|id| id.as_str()).collect();
        assert!(ids == ["a", "b", "c", "d", "e"] || ids == ["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn test_chain_bounded_by_max_length() {
        use RelationshipKind::RelatedTo;
        let g = graph_from(&[
            ("a", "b", RelatedTo, 0.9),
            ("b", "c", RelatedTo, 0.9),
            ("c", "d", RelatedTo, 0.9),
            ("d", "e", RelatedTo, 0.9),
        ]);
        let found = chains(&g, 3, 4);
        assert_eq!(found.len(), 1);
        assert!(found[0].len() <= 4);
    }

    #[test]
    fn test_star_detection() {
        use RelationshipKind::RelatedTo;
        let g = graph_from(&[
            ("hub", "s1", RelatedTo, 0.9),
            ("hub", "s2", RelatedTo, 0.9),
            ("hub", "s3", RelatedTo, 0.9),
            ("hub", "s4", RelatedTo, 0.9),
        ]);
        let found = stars(&g, 4, 0.7);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].center.as_str(), "hub");
        assert_eq!(found[0].spokes.len(), 4);
    }

    #[test]
    fn test_star_leaf_ratio_rejects_meshy_neighborhoods() {
        use RelationshipKind::RelatedTo;
        // spokes connected to each other are not leaves
        let g = graph_from(&[
            ("hub", "s1", RelatedTo, 0.9),
            ("hub", "s2", RelatedTo, 0.9),
            ("hub", "s3", RelatedTo, 0.9),
            ("hub", "s4", RelatedTo, 0.9),
            ("s1", "s2", RelatedTo, 0.9),
            ("s3", "s4", RelatedTo, 0.9),
        ]);
        assert!(stars(&g, 4, 0.7).is_empty());
    }
}
