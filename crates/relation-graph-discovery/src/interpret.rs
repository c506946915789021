//! Path interpretation: turning a hop sequence into a sentence.
//!
//! The default interpreter is deterministic and rule-based, keyed by the
//! sequence of entity types along the path. An external text-generation
//! service can be plugged in behind [`PathInterpreter`]; when it is
//! disabled or absent, the rule-based interpretation is used.

use async_trait::async_trait;

use relation_graph_core::types::{EntityId, EntityType};

use crate::error::DiscoveryResult;

/// Interpretation output for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNarrative {
    pub interpretation: String,
    pub actionable_insight: String,
}

/// Hook for delegating interpretation to an external service.
#[async_trait]
pub trait PathInterpreter: Send + Sync {
    /// Interpret a path given its entity types and ids, source first.
    async fn interpret(
        &self,
        types: &[EntityType],
        ids: &[EntityId],
    ) -> DiscoveryResult<PathNarrative>;
}

/// Deterministic rule-based interpreter keyed by the type sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedInterpreter;

#[async_trait]
impl PathInterpreter for RuleBasedInterpreter {
    async fn interpret(
        &self,
        types: &[EntityType],
        ids: &[EntityId],
    ) -> DiscoveryResult<PathNarrative> {
        Ok(rule_based_narrative(types, ids))
    }
}

/// The deterministic interpretation table.
///
/// Key shapes are matched on (first, last, Risk-on-path); unmatched
/// sequences get a generic connection sentence.
pub fn rule_based_narrative(types: &[EntityType], ids: &[EntityId]) -> PathNarrative {
    let hops = ids.len().saturating_sub(1);
    let route = ids
        .iter()
        .map(EntityId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ");

    let (interpretation, actionable_insight) = match (types.first(), types.last()) {
        (Some(EntityType::Customer), Some(EntityType::Objective)) => (
            format!("customer {} is indirectly exposed to objective {} over {} hops ({})",
                first(ids), last(ids), hops, route),
            format!("review whether objective '{}' accounts for customer '{}'", last(ids), first(ids)),
        ),
        (Some(EntityType::Team), Some(EntityType::Objective))
        | (Some(EntityType::Project), Some(EntityType::Objective)) => (
            format!("{} contributes to objective {} through intermediaries ({})",
                first(ids), last(ids), route),
            format!("confirm the contribution of '{}' is tracked against '{}'", first(ids), last(ids)),
        ),
        _ if types.contains(&EntityType::Risk) => (
            format!("{} and {} are linked through a risk along {}", first(ids), last(ids), route),
            format!("assess shared risk exposure between '{}' and '{}'", first(ids), last(ids)),
        ),
        _ => (
            format!("{} connects to {} over {} hops ({})", first(ids), last(ids), hops, route),
            format!("investigate the indirect connection between '{}' and '{}'", first(ids), last(ids)),
        ),
    };

    PathNarrative {
        interpretation,
        actionable_insight,
    }
}

fn first(ids: &[EntityId]) -> &str {
    ids.first().map(EntityId::as_str).unwrap_or("?")
}

fn last(ids: &[EntityId]) -> &str {
    ids.last().map(EntityId::as_str).unwrap_or("?")
}
