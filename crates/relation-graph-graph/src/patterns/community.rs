//! Community detection over the undirected projection.
//!
//! A deterministic greedy modularity pass: every node starts in its own
//! community and the merge with the largest positive modularity gain is
//! applied until no merge improves modularity. Candidate pairs are
//! scanned in sorted order so repeated runs partition identically.

use std::collections::{BTreeMap, HashMap};

use relation_graph_core::types::EntityId;

use crate::model::EntityGraph;

/// Partition the graph into communities of at least `min_size` nodes.
///
/// Returns member lists sorted by id; communities themselves are sorted
/// by their smallest member. Nodes left in undersized groups are dropped.
pub fn detect_communities(graph: &EntityGraph, min_size: usize) -> Vec<Vec<EntityId>> {
    let nodes: Vec<EntityId> = graph.nodes().cloned().collect();
    if nodes.is_empty() {
        return Vec::new();
    }
    let index: HashMap<&EntityId, usize> = nodes.iter().zip(0..).collect();

    // Total edge weight (each undirected edge counted once).
    let mut total_weight = 0.0;
    // Inter-community weights, keyed (i, j) with i < j.
    let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    // Weighted degree per community.
    let mut degree = vec![0.0; nodes.len()];

    for (i, node) in nodes.iter().enumerate() {
        for (neighbor, edge) in graph.neighbors(node) {
            let j = index[neighbor];
            degree[i] += edge.weight;
            if i < j {
                total_weight += edge.weight;
                between.insert((i, j), edge.weight);
            }
        }
    }
    if total_weight <= f64::EPSILON {
        return Vec::new();
    }

    let mut members: Vec<Option<Vec<EntityId>>> =
        nodes.iter().map(|n| Some(vec![n.clone()])).collect();

    loop {
        // Best positive-gain merge; first candidate wins ties.
        let mut best: Option<((usize, usize), f64)> = None;
        for (&pair, &weight) in &between {
            let (i, j) = pair;
            let gain = weight / total_weight
                - degree[i] * degree[j] / (2.0 * total_weight * total_weight);
            if gain > best.map(|(_, g)| g).unwrap_or(0.0) {
                best = Some((pair, gain));
            }
        }
        let Some(((i, j), _)) = best else {
            break;
        };

        // Merge j into i.
        let absorbed = members[j].take().unwrap_or_default();
        if let Some(target) = members[i].as_mut() {
            target.extend(absorbed);
        }
        degree[i] += degree[j];
        degree[j] = 0.0;

        let old: Vec<((usize, usize), f64)> = between
            .iter()
            .filter(|((a, b), _)| *a == j || *b == j)
            .map(|(&k, &v)| (k, v))
            .collect();
        for ((a, b), weight) in old {
            between.remove(&(a, b));
            let other = if a == j { b } else { a };
            if other == i {
                continue; // the merged pair's weight becomes internal
            }
            let key = if other < i { (other, i) } else { (i, other) };
            *between.entry(key).or_insert(0.0) += weight;
        }
    }

    let mut communities: Vec<Vec<EntityId>> = members
        .into_iter()
        .flatten()
        .filter(|m| m.len() >= min_size)
        .map(|mut m| {
            m.sort();
            m
        })
        .collect();
    communities.sort();
    communities
}

/// Internal edge density of a member set: `edges / (n·(n-1)/2)`.
pub fn density(graph: &EntityGraph, members: &[EntityId]) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }
    let possible = members.len() * (members.len() - 1) / 2;
    let mut edges = 0;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            if graph.is_directly_connected(a, b) {
                edges += 1;
            }
        }
    }
    edges as f64 / possible as f64
}

/// Mean internal edge weight of a member set.
pub fn cohesion(graph: &EntityGraph, members: &[EntityId]) -> f64 {
    let mut total = 0.0;
    let mut count = 0;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            if let Some(edge) = graph.edge_between(a, b) {
                total += edge.weight;
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
