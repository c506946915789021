//! Traversal primitives: bounded simple-path enumeration and shortest
//! weighted paths.
//!
//! "No path found" is an empty result, never an error. Enumeration order
//! is deterministic because adjacency maps iterate in id order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use relation_graph_core::types::EntityId;

use crate::model::EntityGraph;

/// Enumerate up to `max_paths` simple directed paths from `source` to
/// `target` with at most `max_hops` edges.
///
/// Paths are returned as full node sequences (source first) in DFS
/// order. The hop cutoff and path cap are the backpressure mechanism for
/// large graphs; there is no time-based cancellation.
pub fn simple_paths(
    graph: &EntityGraph,
    source: &EntityId,
    target: &EntityId,
    max_hops: usize,
    max_paths: usize,
) -> Vec<Vec<EntityId>> {
    if max_paths == 0 || max_hops == 0 || !graph.contains(source) || !graph.contains(target) {
        return Vec::new();
    }

    let mut results = Vec::new();
    let mut current = vec![source.clone()];
    let mut visited: HashSet<EntityId> = HashSet::from([source.clone()]);
    dfs(
        graph,
        target,
        max_hops,
        max_paths,
        &mut current,
        &mut visited,
        &mut results,
    );
    results
}

fn dfs(
    graph: &EntityGraph,
    target: &EntityId,
    max_hops: usize,
    max_paths: usize,
    current: &mut Vec<EntityId>,
    visited: &mut HashSet<EntityId>,
    results: &mut Vec<Vec<EntityId>>,
) {
    if results.len() >= max_paths {
        return;
    }
    let here = current
        .last()
        .cloned()
        .unwrap_or_else(|| target.clone());
    if current.len() > max_hops {
        // current holds hops+1 nodes; stop expanding at the cutoff
        return;
    }
    let neighbors: Vec<EntityId> = graph
        .out_neighbors(&here)
        .map(|(id, _)| id.clone())
        .collect();
    for next in neighbors {
        if results.len() >= max_paths {
            return;
        }
        if next == *target {
            let mut path = current.clone();
            path.push(next.clone());
            results.push(path);
            continue;
        }
        if visited.contains(&next) {
            continue;
        }
        visited.insert(next.clone());
        current.push(next.clone());
        dfs(graph, target, max_hops, max_paths, current, visited, results);
        current.pop();
        visited.remove(&next);
    }
}

/// Directed arc weights along a node sequence.
///
/// Returns `None` if any consecutive pair has no arc.
pub fn path_weights(graph: &EntityGraph, path: &[EntityId]) -> Option<Vec<f64>> {
    path.windows(2)
        .map(|pair| graph.arc_weight(&pair[0], &pair[1]))
        .collect()
}

#[derive(Debug, Clone)]
struct HeapEntry {
    cost: f64,
    node: EntityId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost via reversed comparison; tie-break on id so
        // exploration order is deterministic.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hop cost under Dijkstra: heavy edges are cheap, but every hop costs
/// a little so shorter paths win among equals.
fn hop_cost(weight: f64) -> f64 {
    (1.0 - weight).max(0.0) + 0.05
}

/// Shortest weighted path from `source` to `target`.
///
/// Returns the node sequence and the mean edge weight along it, or
/// `None` when the target is unreachable.
pub fn shortest_weighted_path(
    graph: &EntityGraph,
    source: &EntityId,
    target: &EntityId,
) -> Option<(Vec<EntityId>, f64)> {
    if !graph.contains(source) || !graph.contains(target) {
        return None;
    }
    if source == target {
        return Some((vec![source.clone()], 0.0));
    }

    let mut dist: HashMap<EntityId, f64> = HashMap::from([(source.clone(), 0.0)]);
    let mut prev: HashMap<EntityId, EntityId> = HashMap::new();
    let mut heap = BinaryHeap::from([HeapEntry {
        cost: 0.0,
        node: source.clone(),
    }]);

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if node == *target {
            break;
        }
        if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        for (next, edge) in graph.out_neighbors(&node) {
            let next_cost = cost + hop_cost(edge.weight);
            if next_cost < dist.get(next).copied().unwrap_or(f64::INFINITY) {
                dist.insert(next.clone(), next_cost);
                prev.insert(next.clone(), node.clone());
                heap.push(HeapEntry {
                    cost: next_cost,
                    node: next.clone(),
                });
            }
        }
    }

    if !dist.contains_key(target) {
        return None;
    }

    let mut path = vec![target.clone()];
    let mut cursor = target.clone();
    while let Some(p) = prev.get(&cursor) {
        path.push(p.clone());
        cursor = p.clone();
    }
    path.reverse();

    let weights = path_weights(graph, &path)?;
    let mean = weights.iter().sum::<f64>() / weights.len().max(1) as f64;
    Some((path, mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeightMode;
    use relation_graph_core::types::{Direction, Entity, EntityType, Relationship, RelationshipKind};

    fn chain_graph(edges: &[(&str, &str, f64)]) -> EntityGraph {
        let mut seen = std::collections::BTreeSet::new();
        for (a, b, _) in edges {
            seen.insert(*a);
            seen.insert(*b);
        }
        let entities: Vec<Entity> = seen
            .into_iter()
            .map(|id| Entity::new(id, EntityType::Team))
            .collect();
        let rels: Vec<Relationship> = edges
            .iter()
            .map(|(a, b, c)| {
                Relationship::new(
                    *a,
                    *b,
                    RelationshipKind::RelatedTo,
                    Direction::Unidirectional,
                    *c,
                )
            })
            .collect();
        EntityGraph::build(&entities, &rels, WeightMode::Standard).unwrap()
    }

    #[test]
    fn test_simple_paths_finds_all_within_cutoff() {
        // a -> b -> d and a -> c -> d, plus a long detour a -> b -> c -> d
        let g = chain_graph(&[
            ("a", "b", 0.9),
            ("b", "d", 0.9),
            ("a", "c", 0.9),
            ("c", "d", 0.9),
            ("b", "c", 0.9),
        ]);
        let paths = simple_paths(&g, &"a".into(), &"d".into(), 3, 10);
        assert_eq!(paths.len(), 3);
        // hop bound respected
        assert!(paths.iter().all(|p| p.len() - 1 <= 3));
        // deterministic order: lexicographic by adjacency
        let expected: Vec<EntityId> = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert_eq!(paths[0], expected);
    }

    #[test]
    fn test_simple_paths_respects_max_paths() {
        let g = chain_graph(&[
            ("a", "b", 0.9),
            ("b", "d", 0.9),
            ("a", "c", 0.9),
            ("c", "d", 0.9),
        ]);
        let paths = simple_paths(&g, &"a".into(), &"d".into(), 3, 1);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_no_path_is_empty_not_error() {
        let g = chain_graph(&[("a", "b", 0.9)]);
        // directed: nothing goes b -> a
        assert!(simple_paths(&g, &"b".into(), &"a".into(), 3, 10).is_empty());
    }

    #[test]
    fn test_hop_cutoff_excludes_long_paths() {
        let g = chain_graph(&[
            ("a", "b", 0.9),
            ("b", "c", 0.9),
            ("c", "d", 0.9),
            ("d", "e", 0.9),
        ]);
        assert!(simple_paths(&g, &"a".into(), &"e".into(), 3, 10).is_empty());
        assert_eq!(simple_paths(&g, &"a".into(), &"e".into(), 4, 10).len(), 1);
    }

    #[test]
    fn test_shortest_weighted_path_prefers_heavy_edges() {
        // Two 2-hop routes a->x->z (weight 0.9) and a->y->z (weight 0.3)
        let g = chain_graph(&[
            ("a", "x", 0.9),
            ("x", "z", 0.9),
            ("a", "y", 0.3),
            ("y", "z", 0.3),
        ]);
        let (path, mean) = shortest_weighted_path(&g, &"a".into(), &"z".into()).unwrap();
        let expected: Vec<EntityId> = vec!["a".into(), "x".into(), "z".into()];
        assert_eq!(path, expected);
        assert!((mean - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_shortest_path_unreachable() {
        let g = chain_graph(&[("a", "b", 0.9), ("c", "d", 0.9)]);
        assert!(shortest_weighted_path(&g, &"a".into(), &"d".into()).is_none());
    }

    #[test]
    fn test_path_weights() {
        let g = chain_graph(&[("a", "b", 0.9), ("b", "c", 0.9)]);
        let w = path_weights(&g, &["a".into(), "b".into(), "c".into()]).unwrap();
        assert_eq!(w.len(), 2);
        assert!(path_weights(&g, &["a".into(), "c".into()]).is_none());
    }
}
