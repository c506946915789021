//! Multi-hop relationship discovery.
//!
//! For every candidate entity pair not already directly connected,
//! enumerate bounded simple paths over the weighted graph, score them,
//! and synthesize a higher-order relationship per surviving path. Path
//! results are cached per (source, target) until the input set changes.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info};

use relation_graph_core::config::MultiHopConfig;
use relation_graph_core::types::{
    Direction, Entity, EntityId, EntityType, PathAnalysis, Relationship, RelationshipKind,
};
use relation_graph_graph::{model::WeightMode, traversal, EntityGraph, GraphResult};

use crate::interpret::rule_based_narrative;

/// Attributes considered business-relevant when picking candidate pairs.
const BUSINESS_ATTRIBUTES: [&str; 3] = ["industry", "region", "team"];

/// A path that survived scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPath {
    /// Full node sequence, source first.
    pub nodes: Vec<EntityId>,
    /// Composite score in [0, 1].
    pub score: f64,
    /// Arc weight per hop.
    pub edge_weights: Vec<f64>,
    /// Arcs whose weight falls below 0.7 × the path average.
    pub bottlenecks: Vec<(EntityId, EntityId)>,
}

impl ScoredPath {
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Run-scoped cache of scored paths per (source, target) pair.
///
/// Owned by the orchestrator's cache object; invalidated whenever the
/// input entity/relationship set changes.
#[derive(Debug, Default)]
pub struct PathCache {
    inner: RwLock<HashMap<(EntityId, EntityId), Vec<ScoredPath>>>,
}

impl PathCache {
    pub fn get(&self, source: &EntityId, target: &EntityId) -> Option<Vec<ScoredPath>> {
        self.inner
            .read()
            .get(&(source.clone(), target.clone()))
            .cloned()
    }

    pub fn insert(&self, source: EntityId, target: EntityId, paths: Vec<ScoredPath>) {
        self.inner.write().insert((source, target), paths);
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Finds and scores indirect paths between entities.
pub struct MultiHopDiscoverer {
    config: MultiHopConfig,
}

impl MultiHopDiscoverer {
    pub fn new(config: MultiHopConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MultiHopConfig {
        &self.config
    }

    /// Discover multi-hop relationships across all candidate pairs.
    ///
    /// Fails only if the graph cannot be built from the inputs.
    pub fn discover(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
        cache: &PathCache,
    ) -> GraphResult<Vec<Relationship>> {
        self.discover_from(entities, entities, relationships, cache)
    }

    /// Discover relationships originating from a batch of source
    /// entities.
    ///
    /// The orchestrator shards the entity space into batches and runs
    /// one of these per batch; partial results are concatenated and
    /// carry no ordering guarantee.
    pub fn discover_from(
        &self,
        sources: &[Entity],
        entities: &[Entity],
        relationships: &[Relationship],
        cache: &PathCache,
    ) -> GraphResult<Vec<Relationship>> {
        let graph = EntityGraph::build(entities, relationships, WeightMode::Standard)?;
        let mut discovered = Vec::new();

        for (source, target) in self.candidate_pairs(sources, entities, &graph) {
            let scored = self.scored_paths_cached(&graph, &source.id, &target.id, cache);
            for path in scored {
                discovered.push(self.synthesize(source, target, &path, &graph));
            }
        }

        info!(
            source_count = sources.len(),
            relationship_count = discovered.len(),
            cached_pairs = cache.len(),
            "Multi-hop discovery batch complete"
        );
        Ok(discovered)
    }

    /// Produce full path analyses (with interpretations) instead of
    /// relationships; used for reporting and the interpretation hook.
    pub fn analyze_paths(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
        cache: &PathCache,
    ) -> GraphResult<Vec<PathAnalysis>> {
        let graph = EntityGraph::build(entities, relationships, WeightMode::Standard)?;
        let mut analyses = Vec::new();

        for (source, target) in self.candidate_pairs(entities, entities, &graph) {
            for path in self.scored_paths_cached(&graph, &source.id, &target.id, cache) {
                let types: Vec<EntityType> = path
                    .nodes
                    .iter()
                    .filter_map(|id| graph.node_type(id))
                    .collect();
                let narrative = rule_based_narrative(&types, &path.nodes);
                analyses.push(PathAnalysis {
                    path: path.nodes.clone(),
                    score: path.score,
                    interpretation: narrative.interpretation,
                    actionable_insight: narrative.actionable_insight,
                    edge_strengths: path.edge_weights.clone(),
                    bottlenecks: path.bottlenecks.clone(),
                });
            }
        }
        Ok(analyses)
    }

    /// Candidate pairs: distinct entities of different type or sharing a
    /// business-relevant attribute, not already directly connected.
    fn candidate_pairs<'a>(
        &self,
        sources: &'a [Entity],
        entities: &'a [Entity],
        graph: &'a EntityGraph,
    ) -> impl Iterator<Item = (&'a Entity, &'a Entity)> {
        sources.iter().flat_map(move |source| {
            entities
                .iter()
                .filter(move |target| {
                    source.id != target.id
                        && (source.entity_type != target.entity_type
                            || shares_business_attribute(source, target))
                        && !graph.is_directly_connected(&source.id, &target.id)
                })
                .map(move |target| (source, target))
        })
    }

    fn scored_paths_cached(
        &self,
        graph: &EntityGraph,
        source: &EntityId,
        target: &EntityId,
        cache: &PathCache,
    ) -> Vec<ScoredPath> {
        if let Some(hit) = cache.get(source, target) {
            return hit;
        }
        let scored = self.score_paths(graph, source, target);
        cache.insert(source.clone(), target.clone(), scored.clone());
        scored
    }

    /// Enumerate and score paths for one pair.
    ///
    /// Paths of two hops or fewer are the explicit builder's territory
    /// and are discarded here.
    fn score_paths(
        &self,
        graph: &EntityGraph,
        source: &EntityId,
        target: &EntityId,
    ) -> Vec<ScoredPath> {
        let paths = traversal::simple_paths(
            graph,
            source,
            target,
            self.config.max_hops,
            self.config.max_paths_per_pair,
        );

        let mut scored = Vec::new();
        for nodes in paths {
            let hops = nodes.len().saturating_sub(1);
            if hops <= 2 {
                continue;
            }
            let Some(weights) = traversal::path_weights(graph, &nodes) else {
                continue;
            };
            let avg = weights.iter().sum::<f64>() / weights.len() as f64;
            let score = (avg * 0.7 - self.config.length_penalty * (hops as f64 - 2.0))
                .clamp(0.0, 1.0);
            if score < self.config.min_path_strength {
                debug!(source = %source, target = %target, score, "Path below strength floor");
                continue;
            }

            let bottlenecks = nodes
                .windows(2)
                .zip(&weights)
                .filter(|(_, &w)| w < 0.7 * avg)
                .map(|(pair, _)| (pair[0].clone(), pair[1].clone()))
                .collect();

            scored.push(ScoredPath {
                nodes,
                score,
                edge_weights: weights,
                bottlenecks,
            });
        }
        scored
    }

    /// Turn a surviving path into a synthesized relationship.
    fn synthesize(
        &self,
        source: &Entity,
        target: &Entity,
        path: &ScoredPath,
        graph: &EntityGraph,
    ) -> Relationship {
        let via: Vec<EntityType> = path.nodes[1..path.nodes.len().saturating_sub(1)]
            .iter()
            .filter_map(|id| graph.node_type(id))
            .collect();
        let kind = multi_hop_kind(source.entity_type, target.entity_type, &via);

        let hop_sequence = path
            .nodes
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ");
        let mut relationship = Relationship::new(
            source.id.clone(),
            target.id.clone(),
            kind,
            Direction::Unidirectional,
            path.score,
        )
        .with_evidence(format!("indirect path: {hop_sequence}"))
        .with_path(path.nodes[1..].to_vec());

        for (a, b) in &path.bottlenecks {
            let weight = graph.arc_weight(a, b).unwrap_or(0.0);
            relationship = relationship
                .with_evidence(format!("bottleneck: {a} -> {b} (weight {weight:.2})"));
        }
        relationship
    }
}

/// Whether two entities agree on any business-relevant attribute.
fn shares_business_attribute(a: &Entity, b: &Entity) -> bool {
    BUSINESS_ATTRIBUTES.iter().any(|key| {
        matches!((a.attribute(key), b.attribute(key)), (Some(x), Some(y)) if x == y)
    })
}

/// Map endpoint and intervening types to a synthesized kind.
///
/// A small closed table; anything unmatched falls back to the generic
/// "connected via" kind.
fn multi_hop_kind(
    source: EntityType,
    target: EntityType,
    via: &[EntityType],
) -> RelationshipKind {
    use EntityType::*;
    match (source, target) {
        (Customer, Objective) => RelationshipKind::IndirectlyImpacts,
        (Team, Objective) | (Project, Objective) => RelationshipKind::IndirectlySupports,
        _ if via.contains(&Risk) => RelationshipKind::SharesRiskWith,
        _ => RelationshipKind::ConnectedVia,
    }
}
