//! Run the discovery engine over a small organizational graph.
//!
//! ```bash
//! cargo run --example discover -p relation-graph-discovery
//! ```

use chrono::{Duration, TimeZone, Utc};

use relation_graph_core::config::EngineConfig;
use relation_graph_core::types::{
    Direction, DiscoveryContext, Entity, EntityType, Event, Relationship, RelationshipKind,
    RuleSet,
};
use relation_graph_discovery::DiscoveryEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let entities = vec![
        Entity::new("acme", EntityType::Customer).with_attribute("industry", "logistics"),
        Entity::new("globex", EntityType::Customer).with_attribute("industry", "logistics"),
        Entity::new("routing-api", EntityType::Product).with_attribute("owner_team", "platform"),
        Entity::new("platform", EntityType::Team),
        Entity::new("outage-risk", EntityType::Risk),
        Entity::new("q3-growth", EntityType::Objective),
        Entity::new("resilience", EntityType::Project)
            .with_attribute("objective", "q3-growth")
            .with_attribute("team", "platform"),
    ];

    let relationships = vec![
        Relationship::new(
            "acme",
            "outage-risk",
            RelationshipKind::HasRisk,
            Direction::Unidirectional,
            1.0,
        ),
        Relationship::new(
            "outage-risk",
            "resilience",
            RelationshipKind::RelatedTo,
            Direction::Unidirectional,
            0.9,
        ),
        Relationship::new(
            "globex",
            "routing-api",
            RelationshipKind::DependsOn,
            Direction::Unidirectional,
            1.0,
        ),
    ];

    let base = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
    let mut events = Vec::new();
    for week in 0..12i64 {
        events.push(
            Event::new("acme", "order", base + Duration::weeks(week)).with_value(120.0),
        );
        events.push(
            Event::new("globex", "order", base + Duration::weeks(week + 2)).with_value(120.0),
        );
    }

    let mut config = EngineConfig::load();
    config.temporal.period_days = 7;
    config.temporal.correlation_window_days = 365;

    let engine = DiscoveryEngine::new(config, RuleSet::builtin())?;
    let report = engine
        .discover(&entities, &relationships, &events, &DiscoveryContext::default())
        .await?;

    println!("discovered {} relationships:", report.relationships.len());
    for rel in &report.relationships {
        println!(
            "  {} -[{}]-> {} (confidence {:.2})",
            rel.source, rel.kind, rel.target, rel.confidence
        );
        for line in &rel.evidence {
            println!("      {line}");
        }
    }

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for failure in &report.task_failures {
        println!("task failure: {} - {}", failure.task, failure.message);
    }

    let patterns = engine.discover_patterns(&entities, &report.relationships)?;
    println!("\ndetected {} patterns:", patterns.patterns.len());
    for pattern in &patterns.patterns {
        println!(
            "  {:?} over {} entities (importance {:.2})",
            pattern.pattern_type,
            pattern.entities.len(),
            pattern.importance
        );
    }

    Ok(())
}
