//! The discovery engine: orchestration, fan-out/fan-in, merge, filter.
//!
//! Rules and configuration are loaded once at construction and immutable
//! thereafter. Each discovery request runs the explicit builder
//! synchronously, fans out the enabled discoverers as independent tasks
//! over shared read-only inputs, joins them tolerating partial failure,
//! then merges, deduplicates, and filters through the request's
//! [`DiscoveryContext`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use relation_graph_core::config::{DedupStrategy, EngineConfig};
use relation_graph_core::types::{
    DataQualityWarning, DedupKey, DiscoveryContext, Entity, EntityType, Event, PathAnalysis,
    Relationship, RuleSet, Strength,
};
use relation_graph_graph::{model::WeightMode, DetectedPatterns, EntityGraph, PatternRecognizer};

use crate::cache::{input_signature, DiscoveryCache};
use crate::error::DiscoveryResult;
use crate::explicit::ExplicitRelationshipBuilder;
use crate::interpret::{PathInterpreter, RuleBasedInterpreter};
use crate::multihop::MultiHopDiscoverer;
use crate::semantic::SemanticMiner;
use crate::temporal::TemporalAnalyzer;

/// A task that failed during fan-in; siblings proceed regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub task: &'static str,
    pub message: String,
}

/// Per-run counters, in the spirit of a cycle-metrics record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryMetrics {
    pub explicit_count: usize,
    pub multi_hop_count: usize,
    pub temporal_count: usize,
    pub semantic_count: usize,
    /// Distinct relationships after deduplication.
    pub merged_count: usize,
    /// Relationships surviving the context filter.
    pub returned_count: usize,
    pub duration: Duration,
}

/// Everything one discovery request produced.
#[derive(Debug, Default, Serialize)]
pub struct DiscoveryReport {
    /// Merged, deduplicated, context-filtered relationships. Order is
    /// deterministic but not semantically meaningful.
    pub relationships: Vec<Relationship>,
    pub warnings: Vec<DataQualityWarning>,
    pub task_failures: Vec<TaskFailure>,
    pub metrics: DiscoveryMetrics,
}

/// Orchestrates relationship discovery.
pub struct DiscoveryEngine {
    config: EngineConfig,
    explicit: ExplicitRelationshipBuilder,
    multi_hop: Arc<MultiHopDiscoverer>,
    temporal: Arc<TemporalAnalyzer>,
    recognizer: PatternRecognizer,
    semantic: Option<Arc<dyn SemanticMiner>>,
    interpreter: Arc<dyn PathInterpreter>,
    cache: DiscoveryCache,
}

impl DiscoveryEngine {
    /// Build an engine from validated configuration and a rule set.
    pub fn new(config: EngineConfig, rules: RuleSet) -> DiscoveryResult<Self> {
        config.validate()?;
        Ok(Self {
            explicit: ExplicitRelationshipBuilder::new(rules),
            multi_hop: Arc::new(MultiHopDiscoverer::new(config.multi_hop.clone())),
            temporal: Arc::new(TemporalAnalyzer::new(config.temporal.clone())),
            recognizer: PatternRecognizer::new(config.patterns.clone()),
            semantic: None,
            interpreter: Arc::new(RuleBasedInterpreter),
            cache: DiscoveryCache::new(),
            config,
        })
    }

    /// Register an external semantic miner (used only when
    /// `orchestrator.enable_semantic` is set).
    pub fn with_semantic_miner(mut self, miner: Arc<dyn SemanticMiner>) -> Self {
        self.semantic = Some(miner);
        self
    }

    /// Replace the path interpreter (defaults to the rule-based one).
    pub fn with_interpreter(mut self, interpreter: Arc<dyn PathInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop all cached state.
    pub fn clear_caches(&self) {
        self.cache.clear();
    }

    /// Run one discovery request.
    ///
    /// Fatal only when the inputs break graph construction invariants
    /// (a relationship referencing a nonexistent entity). Discovery task
    /// failures are collected into the report instead.
    pub async fn discover(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
        events: &[Event],
        context: &DiscoveryContext,
    ) -> DiscoveryResult<DiscoveryReport> {
        let start = Instant::now();

        // Validate referential integrity up front; this is the one fatal
        // error class.
        EntityGraph::build(entities, relationships, WeightMode::Standard)?;

        self.cache
            .ensure_current(input_signature(entities, relationships));

        let mut report = DiscoveryReport::default();

        // Synchronous explicit pass; its output joins the seed set the
        // fan-out tasks traverse.
        let explicit = self.explicit.build(entities);
        report.metrics.explicit_count = explicit.relationships.len();
        report.warnings.extend(explicit.warnings);

        let mut known: Vec<Relationship> = relationships.to_vec();
        known.extend(explicit.relationships.iter().cloned());

        let entities_shared: Arc<Vec<Entity>> = Arc::new(entities.to_vec());
        let known_shared: Arc<Vec<Relationship>> = Arc::new(known);

        let orchestrator = &self.config.orchestrator;

        // The entity space is sharded into batches; each batch runs as
        // its own blocking task producing an independent partial result.
        let multi_hop_tasks: Vec<JoinHandle<DiscoveryResult<Vec<Relationship>>>> =
            if orchestrator.enable_multi_hop {
                entities
                    .chunks(orchestrator.batch_size)
                    .map(|batch| {
                        let batch = batch.to_vec();
                        let discoverer = Arc::clone(&self.multi_hop);
                        let entities = Arc::clone(&entities_shared);
                        let relationships = Arc::clone(&known_shared);
                        let paths = self.cache.paths();
                        tokio::task::spawn_blocking(move || {
                            discoverer
                                .discover_from(&batch, &entities, &relationships, &paths)
                                .map_err(Into::into)
                        })
                    })
                    .collect()
            } else {
                Vec::new()
            };

        let temporal_task = orchestrator.enable_temporal.then(|| {
            let analyzer = Arc::clone(&self.temporal);
            let entities = Arc::clone(&entities_shared);
            let events: Vec<Event> = match context.time_range {
                Some(range) => events
                    .iter()
                    .filter(|e| range.contains(e.timestamp))
                    .cloned()
                    .collect(),
                None => events.to_vec(),
            };
            tokio::task::spawn_blocking(move || analyzer.analyze(&entities, &events))
        });

        let semantic_task = match &self.semantic {
            Some(miner) if orchestrator.enable_semantic => {
                let miner = Arc::clone(miner);
                let entities = Arc::clone(&entities_shared);
                Some(tokio::spawn(async move { miner.mine(&entities).await }))
            }
            _ => None,
        };

        let mut merged: Vec<Relationship> = explicit.relationships;

        for task in multi_hop_tasks {
            match task.await {
                Ok(Ok(found)) => {
                    report.metrics.multi_hop_count += found.len();
                    merged.extend(found);
                }
                Ok(Err(e)) => record_failure(&mut report, "multi_hop", e.to_string()),
                Err(e) => record_failure(&mut report, "multi_hop", format!("task panicked: {e}")),
            }
        }

        if let Some(task) = temporal_task {
            match task.await {
                Ok(result) => {
                    report.metrics.temporal_count = result.relationships.len();
                    report.warnings.extend(result.warnings);
                    merged.extend(result.relationships);
                }
                Err(e) => record_failure(&mut report, "temporal", format!("task panicked: {e}")),
            }
        }

        if let Some(task) = semantic_task {
            match task.await {
                Ok(Ok(found)) => {
                    report.metrics.semantic_count = found.len();
                    merged.extend(found);
                }
                Ok(Err(e)) => record_failure(&mut report, "semantic", e.to_string()),
                Err(e) => record_failure(&mut report, "semantic", format!("task panicked: {e}")),
            }
        }

        let deduplicated = deduplicate(merged, orchestrator.dedup_strategy);
        report.metrics.merged_count = deduplicated.len();

        report.relationships = deduplicated
            .into_iter()
            .filter(|r| context.allows(r))
            .collect();
        report.metrics.returned_count = report.relationships.len();
        report.metrics.duration = start.elapsed();

        info!(
            explicit = report.metrics.explicit_count,
            multi_hop = report.metrics.multi_hop_count,
            temporal = report.metrics.temporal_count,
            semantic = report.metrics.semantic_count,
            returned = report.metrics.returned_count,
            failures = report.task_failures.len(),
            duration_ms = report.metrics.duration.as_millis() as u64,
            "Discovery complete"
        );
        Ok(report)
    }

    /// Run structural pattern recognition over the given inputs.
    ///
    /// Results are cached per input signature alongside the path cache.
    pub fn discover_patterns(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
    ) -> DiscoveryResult<DetectedPatterns> {
        self.cache
            .ensure_current(input_signature(entities, relationships));
        if let Some(cached) = self.cache.cached_patterns() {
            return Ok(cached);
        }

        let graph = EntityGraph::build(entities, relationships, WeightMode::Pattern)?;
        let detected = self.recognizer.detect(&graph);
        self.cache.store_patterns(detected.clone());
        Ok(detected)
    }

    /// Analyze multi-hop paths and attach interpretations.
    ///
    /// When the context enables semantic interpretation, the registered
    /// interpreter is consulted; its failures fall back to the
    /// deterministic rule-based narrative with a warning.
    pub async fn analyze_paths(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
        context: &DiscoveryContext,
    ) -> DiscoveryResult<Vec<PathAnalysis>> {
        self.cache
            .ensure_current(input_signature(entities, relationships));

        let mut analyses =
            self.multi_hop
                .analyze_paths(entities, relationships, &self.cache.paths())?;

        if context.enable_semantic_interpretation {
            let types_by_id: BTreeMap<&str, EntityType> = entities
                .iter()
                .map(|e| (e.id.as_str(), e.entity_type))
                .collect();
            for analysis in &mut analyses {
                let types: Vec<EntityType> = analysis
                    .path
                    .iter()
                    .filter_map(|id| types_by_id.get(id.as_str()).copied())
                    .collect();
                match self.interpreter.interpret(&types, &analysis.path).await {
                    Ok(narrative) => {
                        analysis.interpretation = narrative.interpretation;
                        analysis.actionable_insight = narrative.actionable_insight;
                    }
                    Err(e) => {
                        warn!(error = %e, "External interpretation failed, keeping rule-based");
                    }
                }
            }
        }
        Ok(analyses)
    }
}

fn record_failure(report: &mut DiscoveryReport, task: &'static str, message: String) {
    warn!(task, error = %message, "Discovery task failed");
    report.task_failures.push(TaskFailure { task, message });
}

/// Deduplicate by (source, target, kind, direction).
///
/// Candidates are sorted first so ties resolve identically across runs;
/// the fold then applies the configured collision strategy. Running this
/// over an already-deduplicated list is a no-op.
pub fn deduplicate(
    mut relationships: Vec<Relationship>,
    strategy: DedupStrategy,
) -> Vec<Relationship> {
    relationships.sort_by(|a, b| {
        a.dedup_key()
            .cmp(&b.dedup_key())
            .then_with(|| b.confidence.total_cmp(&a.confidence))
            .then_with(|| a.evidence.cmp(&b.evidence))
    });

    let mut merged: BTreeMap<DedupKey, Relationship> = BTreeMap::new();
    for candidate in relationships {
        match merged.entry(candidate.dedup_key()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => match strategy {
                // Sorted input means the incumbent already has the
                // highest confidence for this key.
                DedupStrategy::KeepHighestConfidence => {}
                DedupStrategy::MergeEvidence => {
                    let kept = slot.get_mut();
                    kept.confidence = kept.confidence.max(candidate.confidence);
                    kept.strength = Strength::from_confidence(kept.confidence);
                    for line in candidate.evidence {
                        if !kept.evidence.contains(&line) {
                            kept.evidence.push(line);
                        }
                    }
                    if kept.temporal_aspect.is_none() {
                        kept.temporal_aspect = candidate.temporal_aspect;
                    }
                    if kept.path.is_none() {
                        kept.path = candidate.path;
                    }
                }
            },
        }
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relation_graph_core::types::{Direction, RelationshipKind};

    fn rel(source: &str, target: &str, kind: RelationshipKind, confidence: f64) -> Relationship {
        Relationship::new(source, target, kind, Direction::Unidirectional, confidence)
    }

    #[test]
    fn test_dedup_keeps_highest_confidence() {
        let input = vec![
            rel("a", "b", RelationshipKind::Owns, 0.4).with_evidence("low"),
            rel("a", "b", RelationshipKind::Owns, 0.9).with_evidence("high"),
        ];
        let out = deduplicate(input, DedupStrategy::KeepHighestConfidence);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence, 0.9);
        assert_eq!(out[0].evidence, vec!["high".to_string()]);
    }

    #[test]
    fn test_dedup_merge_evidence() {
        let input = vec![
            rel("a", "b", RelationshipKind::Owns, 0.4).with_evidence("first"),
            rel("a", "b", RelationshipKind::Owns, 0.9).with_evidence("second"),
        ];
        let out = deduplicate(input, DedupStrategy::MergeEvidence);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence, 0.9);
        assert_eq!(out[0].strength, Strength::Strong);
        // evidence union, highest-confidence first after sorting
        assert_eq!(
            out[0].evidence,
            vec!["second".to_string(), "first".to_string()]
        );
    }

    #[test]
    fn test_dedup_distinguishes_kind_and_direction() {
        let input = vec![
            rel("a", "b", RelationshipKind::Owns, 0.9),
            rel("a", "b", RelationshipKind::RelatedTo, 0.9),
            Relationship::new("a", "b", RelationshipKind::Owns, Direction::Bidirectional, 0.9),
        ];
        let out = deduplicate(input, DedupStrategy::MergeEvidence);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_dedup_idempotent() {
        let input = vec![
            rel("a", "b", RelationshipKind::Owns, 0.4).with_evidence("x"),
            rel("a", "b", RelationshipKind::Owns, 0.9).with_evidence("y"),
            rel("b", "c", RelationshipKind::DependsOn, 0.7),
        ];
        let once = deduplicate(input, DedupStrategy::MergeEvidence);
        let twice = deduplicate(once.clone(), DedupStrategy::MergeEvidence);
        assert_eq!(once, twice);
    }
}
