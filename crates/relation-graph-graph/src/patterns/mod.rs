//! Structural pattern recognition.
//!
//! Runs the hub/community/triangle/chain/star detectors independently
//! over the undirected projection, scores each finding with a composite
//! importance, and returns everything sorted by importance descending.
//!
//! Importance = `type_base + 0.4·centrality + 0.3·density +
//! 0.3·collaboration`, with type base scores hub 0.9, community 0.8,
//! triangle/star 0.7, chain 0.6.

mod community;
mod motifs;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use relation_graph_core::config::PatternConfig;
use relation_graph_core::types::{
    CollaborationPattern, EntityId, GraphPattern, PatternMetadata, PatternType,
};

use crate::centrality;
use crate::model::EntityGraph;

pub use community::{cohesion, density, detect_communities};
pub use motifs::{chains, stars, triangles, Star, Triangle};

/// Everything one recognition pass produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedPatterns {
    /// All patterns, sorted by importance descending.
    pub patterns: Vec<GraphPattern>,
    /// Collaboration-scored triangles, same order as their triangles
    /// appear in `patterns`.
    pub collaborations: Vec<CollaborationPattern>,
}

/// Detects structural motifs across the whole graph.
pub struct PatternRecognizer {
    config: PatternConfig,
}

impl PatternRecognizer {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Run all detectors. The graph should be built with
    /// [`crate::model::WeightMode::Pattern`] so moderate and weak edges
    /// stay visible to motif detection.
    pub fn detect(&self, graph: &EntityGraph) -> DetectedPatterns {
        let combined = centrality::combined_centrality(graph);

        let mut patterns = Vec::new();
        let mut collaborations = Vec::new();

        patterns.extend(self.detect_hubs(graph, &combined));
        patterns.extend(self.detect_communities(graph, &combined));
        let (triangle_patterns, triangle_collaborations) =
            self.detect_triangles(graph, &combined);
        patterns.extend(triangle_patterns);
        collaborations.extend(triangle_collaborations);
        patterns.extend(self.detect_chains(graph, &combined));
        patterns.extend(self.detect_stars(graph, &combined));

        // Sort by importance descending; ties break on type and members
        // so repeated runs return identical orderings.
        patterns.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.pattern_type.base_score().total_cmp(&b.pattern_type.base_score()))
                .then_with(|| a.entities.cmp(&b.entities))
        });

        info!(
            pattern_count = patterns.len(),
            collaboration_count = collaborations.len(),
            "Pattern recognition complete"
        );

        DetectedPatterns {
            patterns,
            collaborations,
        }
    }

    fn detect_hubs(
        &self,
        graph: &EntityGraph,
        combined: &BTreeMap<EntityId, f64>,
    ) -> Vec<GraphPattern> {
        let mut hubs = Vec::new();
        for node in graph.nodes() {
            let degree = graph.degree(node);
            let score = combined.get(node).copied().unwrap_or(0.0);
            if degree < self.config.min_connections || score < self.config.centrality_threshold {
                continue;
            }

            let mut entities: Vec<EntityId> = graph
                .neighbors(node)
                .map(|(id, _)| id.clone())
                .collect();
            entities.push(node.clone());
            entities.sort();

            debug!(hub = %node, degree, score, "Hub detected");
            hubs.push(self.finish_pattern(
                graph,
                PatternType::Hub,
                entities,
                combined,
                0.0,
            ));
        }
        hubs
    }

    fn detect_communities(
        &self,
        graph: &EntityGraph,
        combined: &BTreeMap<EntityId, f64>,
    ) -> Vec<GraphPattern> {
        community::detect_communities(graph, self.config.min_community_size)
            .into_iter()
            .map(|members| {
                self.finish_pattern(graph, PatternType::Community, members, combined, 0.0)
            })
            .collect()
    }

    fn detect_triangles(
        &self,
        graph: &EntityGraph,
        combined: &BTreeMap<EntityId, f64>,
    ) -> (Vec<GraphPattern>, Vec<CollaborationPattern>) {
        let mut patterns = Vec::new();
        let mut collaborations = Vec::new();

        for triangle in motifs::triangles(graph, self.config.min_triangle_strength) {
            let collaboration_strength = triangle.collaboration_strength();
            let pattern = self.finish_pattern(
                graph,
                PatternType::Triangle,
                triangle.members.to_vec(),
                combined,
                collaboration_strength,
            );
            collaborations.push(CollaborationPattern {
                pattern: pattern.clone(),
                collaboration_strength,
                collaboration_type: triangle.collaboration_type().to_string(),
            });
            patterns.push(pattern);
        }
        (patterns, collaborations)
    }

    fn detect_chains(
        &self,
        graph: &EntityGraph,
        combined: &BTreeMap<EntityId, f64>,
    ) -> Vec<GraphPattern> {
        motifs::chains(
            graph,
            self.config.min_chain_length,
            self.config.max_chain_length,
        )
        .into_iter()
        .map(|members| self.finish_pattern(graph, PatternType::Chain, members, combined, 0.0))
        .collect()
    }

    fn detect_stars(
        &self,
        graph: &EntityGraph,
        combined: &BTreeMap<EntityId, f64>,
    ) -> Vec<GraphPattern> {
        motifs::stars(graph, self.config.min_spokes, self.config.leaf_ratio)
            .into_iter()
            .map(|star| {
                let mut entities = star.spokes;
                entities.push(star.center);
                entities.sort();
                self.finish_pattern(graph, PatternType::Star, entities, combined, 0.0)
            })
            .collect()
    }

    /// Assemble metadata, centrality map, and the composite importance.
    fn finish_pattern(
        &self,
        graph: &EntityGraph,
        pattern_type: PatternType,
        entities: Vec<EntityId>,
        combined: &BTreeMap<EntityId, f64>,
        collaboration_component: f64,
    ) -> GraphPattern {
        let centrality_scores: BTreeMap<EntityId, f64> = entities
            .iter()
            .map(|id| (id.clone(), combined.get(id).copied().unwrap_or(0.0)))
            .collect();

        let mut entity_type_counts: BTreeMap<String, usize> = BTreeMap::new();
        for id in &entities {
            if let Some(entity_type) = graph.node_type(id) {
                *entity_type_counts
                    .entry(entity_type.label().to_string())
                    .or_insert(0) += 1;
            }
        }

        let metadata = PatternMetadata {
            density: community::density(graph, &entities),
            cohesion: community::cohesion(graph, &entities),
            entity_type_counts,
        };

        let centrality_component = if centrality_scores.is_empty() {
            0.0
        } else {
            centrality_scores.values().sum::<f64>() / centrality_scores.len() as f64
        };

        let importance = pattern_type.base_score()
            + 0.4 * centrality_component
            + 0.3 * metadata.density
            + 0.3 * collaboration_component;

        GraphPattern {
            pattern_type,
            entities,
            centrality_scores,
            metadata,
            importance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeightMode;
    use relation_graph_core::types::{Direction, Entity, EntityType, Relationship, RelationshipKind};

    fn pattern_graph(edges: &[(&str, &str)], confidence: f64) -> EntityGraph {
        let mut seen = std::collections::BTreeSet::new();
        for (a, b) in edges {
            seen.insert(*a);
            seen.insert(*b);
        }
        let entities: Vec<Entity> = seen
            .into_iter()
            .map(|id| Entity::new(id, EntityType::Team))
            .collect();
        let rels: Vec<Relationship> = edges
            .iter()
            .map(|(a, b)| {
                Relationship::new(
                    *a,
                    *b,
                    RelationshipKind::WorksWith,
                    Direction::Bidirectional,
                    confidence,
                )
            })
            .collect();
        EntityGraph::build(&entities, &rels, WeightMode::Pattern).unwrap()
    }

    #[test]
    fn test_hub_classification_boundary() {
        // star with 5 spokes: degree 5, combined centrality 1.0
        let g = pattern_graph(
            &[
                ("hub", "s1"),
                ("hub", "s2"),
                ("hub", "s3"),
                ("hub", "s4"),
                ("hub", "s5"),
            ],
            0.9,
        );
        let recognizer = PatternRecognizer::new(PatternConfig::default());
        let detected = recognizer.detect(&g);
        let hubs: Vec<_> = detected
            .patterns
            .iter()
            .filter(|p| p.pattern_type == PatternType::Hub)
            .collect();
        assert_eq!(hubs.len(), 1);
        assert!(hubs[0].entities.contains(&"hub".into()));

        // raise min_connections above the degree: no hub
        let strict = PatternRecognizer::new(PatternConfig {
            min_connections: 6,
            ..Default::default()
        });
        let detected = strict.detect(&g);
        assert!(detected
            .patterns
            .iter()
            .all(|p| p.pattern_type != PatternType::Hub));
    }

    #[test]
    fn test_patterns_sorted_by_importance() {
        // K4 produces triangles and a community; order must be
        // importance-descending
        let g = pattern_graph(
            &[
                ("a", "b"),
                ("a", "c"),
                ("a", "d"),
                ("b", "c"),
                ("b", "d"),
                ("c", "d"),
            ],
            0.9,
        );
        let recognizer = PatternRecognizer::new(PatternConfig {
            min_community_size: 3,
            ..Default::default()
        });
        let detected = recognizer.detect(&g);
        assert!(!detected.patterns.is_empty());
        for pair in detected.patterns.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
    }

    #[test]
    fn test_metadata_entity_type_histogram() {
        let entities = vec![
            Entity::new("t1", EntityType::Team),
            Entity::new("t2", EntityType::Team),
            Entity::new("p1", EntityType::Project),
        ];
        let rels = vec![
            Relationship::new("t1", "t2", RelationshipKind::WorksWith, Direction::Bidirectional, 0.9),
            Relationship::new("t1", "p1", RelationshipKind::WorksWith, Direction::Bidirectional, 0.9),
            Relationship::new("t2", "p1", RelationshipKind::WorksWith, Direction::Bidirectional, 0.9),
        ];
        let g = EntityGraph::build(&entities, &rels, WeightMode::Pattern).unwrap();
        let recognizer = PatternRecognizer::new(PatternConfig::default());
        let detected = recognizer.detect(&g);
        let triangle = detected
            .patterns
            .iter()
            .find(|p| p.pattern_type == PatternType::Triangle)
            .expect("triangle expected");
        assert_eq!(triangle.metadata.entity_type_counts["team"], 2);
        assert_eq!(triangle.metadata.entity_type_counts["project"], 1);
        assert!((triangle.metadata.density - 1.0).abs() < 1e-9);
    }
}
