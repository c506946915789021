//! Centrality measures over the undirected projection.
//!
//! Degree, betweenness (Brandes), and closeness, plus the combined score
//! used for hub classification:
//! `0.4·degree + 0.4·betweenness + 0.2·closeness`.

use std::collections::{BTreeMap, HashMap, VecDeque};

use relation_graph_core::types::EntityId;

use crate::model::EntityGraph;

/// Degree centrality: `degree / (n - 1)`.
pub fn degree_centrality(graph: &EntityGraph) -> BTreeMap<EntityId, f64> {
    let n = graph.node_count();
    let denom = (n.saturating_sub(1)).max(1) as f64;
    graph
        .nodes()
        .map(|id| (id.clone(), graph.degree(id) as f64 / denom))
        .collect()
}

/// Betweenness centrality via Brandes' algorithm (unweighted),
/// normalized by `(n-1)(n-2)/2`.
pub fn betweenness_centrality(graph: &EntityGraph) -> BTreeMap<EntityId, f64> {
    let nodes: Vec<EntityId> = graph.nodes().cloned().collect();
    let mut centrality: BTreeMap<EntityId, f64> =
        nodes.iter().map(|id| (id.clone(), 0.0)).collect();

    for s in &nodes {
        // Single-source shortest-path counts
        let mut stack: Vec<EntityId> = Vec::new();
        let mut preds: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        let mut sigma: HashMap<EntityId, f64> = HashMap::from([(s.clone(), 1.0)]);
        let mut dist: HashMap<EntityId, i64> = HashMap::from([(s.clone(), 0)]);
        let mut queue: VecDeque<EntityId> = VecDeque::from([s.clone()]);

        while let Some(v) = queue.pop_front() {
            stack.push(v.clone());
            let d_v = dist[&v];
            let sigma_v = sigma[&v];
            for (w, _) in graph.neighbors(&v) {
                match dist.get(w) {
                    None => {
                        dist.insert(w.clone(), d_v + 1);
                        queue.push_back(w.clone());
                        sigma.insert(w.clone(), sigma_v);
                        preds.entry(w.clone()).or_default().push(v.clone());
                    }
                    Some(&d_w) if d_w == d_v + 1 => {
                        *sigma.entry(w.clone()).or_insert(0.0) += sigma_v;
                        preds.entry(w.clone()).or_default().push(v.clone());
                    }
                    Some(_) => {}
                }
            }
        }

        // Accumulate dependencies in reverse BFS order
        let mut delta: HashMap<EntityId, f64> = HashMap::new();
        while let Some(w) = stack.pop() {
            let coeff = (1.0 + delta.get(&w).copied().unwrap_or(0.0)) / sigma[&w];
            if let Some(parents) = preds.get(&w) {
                for v in parents {
                    *delta.entry(v.clone()).or_insert(0.0) += sigma[v] * coeff;
                }
            }
            if w != *s {
                if let Some(c) = centrality.get_mut(&w) {
                    *c += delta.get(&w).copied().unwrap_or(0.0);
                }
            }
        }
    }

    // Undirected: every pair counted twice; normalize to [0, 1].
    let n = nodes.len();
    if n > 2 {
        let scale = 1.0 / (((n - 1) * (n - 2)) as f64);
        for value in centrality.values_mut() {
            *value *= scale;
        }
    }
    centrality
}

/// Closeness centrality: `(n-1) / Σ d(v, u)` over reachable nodes,
/// scaled by the reachable fraction so fragmented graphs do not inflate.
pub fn closeness_centrality(graph: &EntityGraph) -> BTreeMap<EntityId, f64> {
    let n = graph.node_count();
    let mut centrality = BTreeMap::new();

    for v in graph.nodes() {
        let mut dist: HashMap<EntityId, usize> = HashMap::from([(v.clone(), 0)]);
        let mut queue: VecDeque<EntityId> = VecDeque::from([v.clone()]);
        let mut total = 0usize;

        while let Some(u) = queue.pop_front() {
            let d_u = dist[&u];
            for (w, _) in graph.neighbors(&u) {
                if !dist.contains_key(w) {
                    dist.insert(w.clone(), d_u + 1);
                    total += d_u + 1;
                    queue.push_back(w.clone());
                }
            }
        }

        let reachable = dist.len() - 1;
        let score = if reachable == 0 || total == 0 {
            0.0
        } else {
            // Wasserman-Faust correction for disconnected graphs
            let base = reachable as f64 / total as f64;
            base * (reachable as f64 / (n.saturating_sub(1)).max(1) as f64)
        };
        centrality.insert(v.clone(), score);
    }
    centrality
}

/// Combined centrality per node:
/// `0.4·degree + 0.4·betweenness + 0.2·closeness`.
pub fn combined_centrality(graph: &EntityGraph) -> BTreeMap<EntityId, f64> {
    let degree = degree_centrality(graph);
    let betweenness = betweenness_centrality(graph);
    let closeness = closeness_centrality(graph);

    graph
        .nodes()
        .map(|id| {
            let score = 0.4 * degree.get(id).copied().unwrap_or(0.0)
                + 0.4 * betweenness.get(id).copied().unwrap_or(0.0)
                + 0.2 * closeness.get(id).copied().unwrap_or(0.0);
            (id.clone(), score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeightMode;
    use relation_graph_core::types::{Direction, Entity, EntityType, Relationship, RelationshipKind};

    fn star(center: &str, leaves: &[&str]) -> EntityGraph {
        let mut entities = vec![Entity::new(center, EntityType::Team)];
        let mut rels = Vec::new();
        for leaf in leaves {
            entities.push(Entity::new(*leaf, EntityType::Team));
            rels.push(Relationship::new(
                center,
                *leaf,
                RelationshipKind::WorksWith,
                Direction::Bidirectional,
                0.9,
            ));
        }
        EntityGraph::build(&entities, &rels, WeightMode::Standard).unwrap()
    }

    #[test]
    fn test_star_center_dominates_all_measures() {
        let g = star("hub", &["a", "b", "c", "d", "e"]);
        let center: EntityId = "hub".into();

        let degree = degree_centrality(&g);
        assert!((degree[&center] - 1.0).abs() < 1e-9);
        assert!((degree[&"a".into()] - 0.2).abs() < 1e-9);

        let betweenness = betweenness_centrality(&g);
        // center lies on every leaf-pair shortest path
        assert!((betweenness[&center] - 1.0).abs() < 1e-9);
        assert!(betweenness[&"a".into()].abs() < 1e-9);

        let closeness = closeness_centrality(&g);
        assert!((closeness[&center] - 1.0).abs() < 1e-9);

        let combined = combined_centrality(&g);
        assert!(combined[&center] > 0.9);
        assert!(combined[&"a".into()] < 0.3);
    }

    #[test]
    fn test_complete_graph_has_zero_betweenness() {
        // K4: all direct, nothing is "between"
        let names = ["a", "b", "c", "d"];
        let entities: Vec<Entity> = names
            .iter()
            .map(|n| Entity::new(*n, EntityType::Team))
            .collect();
        let mut rels = Vec::new();
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                rels.push(Relationship::new(
                    names[i],
                    names[j],
                    RelationshipKind::WorksWith,
                    Direction::Bidirectional,
                    0.9,
                ));
            }
        }
        let g = EntityGraph::build(&entities, &rels, WeightMode::Standard).unwrap();
        for (_, score) in betweenness_centrality(&g) {
            assert!(score.abs() < 1e-9);
        }
        for (_, score) in degree_centrality(&g) {
            assert!((score - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_graph() {
        let g = EntityGraph::build(&[], &[], WeightMode::Standard).unwrap();
        assert!(combined_centrality(&g).is_empty());
    }
}
