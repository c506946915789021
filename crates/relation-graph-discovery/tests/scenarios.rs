//! End-to-end discovery scenarios through the full engine.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use relation_graph_core::config::{EngineConfig, TemporalConfig};
use relation_graph_core::types::{
    Direction, DiscoveryContext, Entity, EntityId, EntityType, Event, Relationship,
    RelationshipKind, RuleSet,
};
use relation_graph_discovery::{DiscoveryEngine, DiscoveryError, SemanticMiner};

fn engine() -> DiscoveryEngine {
    DiscoveryEngine::new(EngineConfig::default(), RuleSet::builtin()).unwrap()
}

/// Customer -> Risk -> Project -> Objective with no direct
/// customer/objective edge: discovery must synthesize the 3-hop link.
fn risk_chain_entities() -> Vec<Entity> {
    vec![
        Entity::new("acme", EntityType::Customer),
        Entity::new("outage", EntityType::Risk),
        Entity::new("mitigation", EntityType::Project),
        Entity::new("growth", EntityType::Objective),
    ]
}

fn risk_chain_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new(
            "acme",
            "outage",
            RelationshipKind::HasRisk,
            Direction::Unidirectional,
            1.0,
        ),
        Relationship::new(
            "outage",
            "mitigation",
            RelationshipKind::RelatedTo,
            Direction::Unidirectional,
            1.0,
        ),
        Relationship::new(
            "mitigation",
            "growth",
            RelationshipKind::Supports,
            Direction::Unidirectional,
            1.0,
        ),
    ]
}

#[tokio::test]
async fn scenario_multi_hop_risk_chain() {
    let report = engine()
        .discover(
            &risk_chain_entities(),
            &risk_chain_relationships(),
            &[],
            &DiscoveryContext::default(),
        )
        .await
        .unwrap();

    let synthesized = report
        .relationships
        .iter()
        .find(|r| r.source.as_str() == "acme" && r.target.as_str() == "growth")
        .expect("3-hop acme -> growth relationship expected");
    assert_eq!(synthesized.path_length(), 3);
    assert!(!synthesized.evidence.is_empty());
    assert_eq!(synthesized.kind, RelationshipKind::IndirectlyImpacts);
}

#[tokio::test]
async fn scenario_temporal_lagged_streams() {
    let base = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
    let entities = vec![
        Entity::new("alpha", EntityType::Product),
        Entity::new("beta", EntityType::Product),
    ];
    let mut events = Vec::new();
    for week in 0..12i64 {
        events.push(
            Event::new("alpha", "signup", base + Duration::weeks(week)).with_value(100.0),
        );
        events.push(
            Event::new("beta", "signup", base + Duration::weeks(week + 2)).with_value(100.0),
        );
    }

    let config = EngineConfig {
        temporal: TemporalConfig {
            period_days: 7,
            correlation_window_days: 365,
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = DiscoveryEngine::new(config, RuleSet::builtin()).unwrap();
    let report = engine
        .discover(&entities, &[], &events, &DiscoveryContext::default())
        .await
        .unwrap();

    let precedes = report
        .relationships
        .iter()
        .find(|r| r.kind == RelationshipKind::Precedes)
        .expect("precedes relationship expected");
    assert_eq!(precedes.source.as_str(), "alpha");
    assert_eq!(precedes.target.as_str(), "beta");
}

/// Identical inputs with cleared caches must yield the identical
/// relationship set, order ignored.
#[tokio::test]
async fn scenario_repeat_runs_are_deterministic() {
    let entities = risk_chain_entities();
    let relationships = risk_chain_relationships();
    let engine = engine();
    let context = DiscoveryContext::default();

    let fingerprint = |report: &relation_graph_discovery::DiscoveryReport| {
        let mut keys: Vec<(String, String, RelationshipKind, Direction, String)> = report
            .relationships
            .iter()
            .map(|r| {
                (
                    r.source.to_string(),
                    r.target.to_string(),
                    r.kind,
                    r.direction,
                    format!("{:.6}", r.confidence),
                )
            })
            .collect();
        keys.sort();
        keys
    };

    let first = engine
        .discover(&entities, &relationships, &[], &context)
        .await
        .unwrap();
    engine.clear_caches();
    let second = engine
        .discover(&entities, &relationships, &[], &context)
        .await
        .unwrap();

    assert_eq!(fingerprint(&first), fingerprint(&second));
}

#[tokio::test]
async fn all_confidences_within_unit_interval() {
    let report = engine()
        .discover(
            &risk_chain_entities(),
            &risk_chain_relationships(),
            &[],
            &DiscoveryContext::default(),
        )
        .await
        .unwrap();
    assert!(!report.relationships.is_empty());
    for rel in &report.relationships {
        assert!((0.0..=1.0).contains(&rel.confidence), "{rel:?}");
    }
}

#[tokio::test]
async fn no_duplicate_dedup_keys_in_output() {
    let report = engine()
        .discover(
            &risk_chain_entities(),
            &risk_chain_relationships(),
            &[],
            &DiscoveryContext::default(),
        )
        .await
        .unwrap();
    let mut keys: Vec<_> = report.relationships.iter().map(|r| r.dedup_key()).collect();
    let before = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(before, keys.len());
}

#[tokio::test]
async fn context_filters_output() {
    let entities = risk_chain_entities();
    let relationships = risk_chain_relationships();

    // confidence floor above everything: nothing returned
    let strict = DiscoveryContext::new().with_min_confidence(0.99);
    let report = engine()
        .discover(&entities, &relationships, &[], &strict)
        .await
        .unwrap();
    assert!(report
        .relationships
        .iter()
        .all(|r| r.confidence >= 0.99));

    // focus on an entity nothing touches: empty output
    let elsewhere = DiscoveryContext::new().with_focus_entities([EntityId::from("nobody")]);
    let report = engine()
        .discover(&entities, &relationships, &[], &elsewhere)
        .await
        .unwrap();
    assert!(report.relationships.is_empty());

    // exclude the synthesized kind: it disappears
    let excluded = DiscoveryContext::new()
        .with_excluded_kind(RelationshipKind::IndirectlyImpacts);
    let report = engine()
        .discover(&entities, &relationships, &[], &excluded)
        .await
        .unwrap();
    assert!(report
        .relationships
        .iter()
        .all(|r| r.kind != RelationshipKind::IndirectlyImpacts));
}

#[tokio::test]
async fn dangling_relationship_reference_is_fatal() {
    let entities = vec![Entity::new("acme", EntityType::Customer)];
    let relationships = vec![Relationship::new(
        "acme",
        "ghost",
        RelationshipKind::Owns,
        Direction::Unidirectional,
        1.0,
    )];
    let err = engine()
        .discover(&entities, &relationships, &[], &DiscoveryContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Graph(_)));
}

struct FailingMiner;

#[async_trait]
impl SemanticMiner for FailingMiner {
    async fn mine(
        &self,
        _entities: &[Entity],
    ) -> relation_graph_discovery::DiscoveryResult<Vec<Relationship>> {
        Err(DiscoveryError::External("model unavailable".into()))
    }
}

/// A failing task must not abort its siblings.
#[tokio::test]
async fn failing_semantic_task_is_isolated() {
    let mut config = EngineConfig::default();
    config.orchestrator.enable_semantic = true;

    let engine = DiscoveryEngine::new(config, RuleSet::builtin())
        .unwrap()
        .with_semantic_miner(Arc::new(FailingMiner));

    let report = engine
        .discover(
            &risk_chain_entities(),
            &risk_chain_relationships(),
            &[],
            &DiscoveryContext::default(),
        )
        .await
        .unwrap();

    // semantic failed and was recorded; multi-hop output still present
    assert_eq!(report.task_failures.len(), 1);
    assert_eq!(report.task_failures[0].task, "semantic");
    assert!(report
        .relationships
        .iter()
        .any(|r| r.kind == RelationshipKind::IndirectlyImpacts));
}

/// Explicit rules materialize from attributes, and warnings surface.
#[tokio::test]
async fn explicit_rules_and_data_quality_warnings() {
    let entities = vec![
        Entity::new("widget", EntityType::Product).with_attribute("owner_team", "platform"),
        Entity::new("platform", EntityType::Team),
        // required rule target missing
        Entity::new("gadget", EntityType::Product).with_attribute("owner_team", "ghost-team"),
    ];

    let report = engine()
        .discover(&entities, &[], &[], &DiscoveryContext::default())
        .await
        .unwrap();

    assert!(report
        .relationships
        .iter()
        .any(|r| r.source.as_str() == "widget"
            && r.target.as_str() == "platform"
            && r.kind == RelationshipKind::OwnedBy));
    // mirror of the bidirectional ownership rule
    assert!(report
        .relationships
        .iter()
        .any(|r| r.source.as_str() == "platform" && r.kind == RelationshipKind::Owns));
    assert!(!report.warnings.is_empty());
}

#[tokio::test]
async fn pattern_discovery_is_cached_until_inputs_change() {
    let names = ["a", "b", "c", "d"];
    let entities: Vec<Entity> = names
        .iter()
        .map(|n| Entity::new(*n, EntityType::Team))
        .collect();
    let mut relationships = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            relationships.push(Relationship::new(
                names[i],
                names[j],
                RelationshipKind::WorksWith,
                Direction::Bidirectional,
                0.9,
            ));
        }
    }

    let engine = engine();
    let first = engine.discover_patterns(&entities, &relationships).unwrap();
    let second = engine.discover_patterns(&entities, &relationships).unwrap();
    assert_eq!(first.patterns.len(), second.patterns.len());
    assert!(!first.patterns.is_empty());

    // changed inputs invalidate the cached detection
    let fewer = &relationships[..3];
    let third = engine.discover_patterns(&entities, fewer).unwrap();
    assert_ne!(first.patterns.len(), third.patterns.len());
}
