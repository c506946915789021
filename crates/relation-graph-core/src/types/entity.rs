//! Entities and events: the caller-owned inputs of discovery.
//!
//! The engine only ever reads these. Relationships reference entities by
//! id; no entity owns a relationship.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, caller-supplied entity identifier.
///
/// Ordered and hashable so it can key adjacency maps and give
/// deterministic iteration order across discovery runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Closed set of entity categories known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Customer,
    Product,
    Team,
    Risk,
    Project,
    Objective,
}

impl EntityType {
    /// Lowercase label used in evidence strings and histograms.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Customer => "customer",
            EntityType::Product => "product",
            EntityType::Team => "team",
            EntityType::Risk => "risk",
            EntityType::Project => "project",
            EntityType::Objective => "objective",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed, identified node in the knowledge graph.
///
/// `attributes` is an ordered map; rule matching reads attribute values
/// to resolve explicit references (e.g. an `owner_team` field holding a
/// team's entity id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Opaque unique identifier.
    pub id: EntityId,
    /// Entity category.
    pub entity_type: EntityType,
    /// Ordered key/value attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            entity_type,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A timestamped occurrence attached to an entity.
///
/// Supplied by an upstream change-detection pipeline; the temporal
/// analyzer converts per-entity event streams into time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Entity this event belongs to.
    pub entity_id: EntityId,
    /// Free-form event category (not interpreted by the engine).
    pub event_type: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Optional magnitude; events without a value count as 1.0 under
    /// sum/mean aggregation.
    pub value: Option<f64>,
}

impl Event {
    pub fn new(
        entity_id: impl Into<EntityId>,
        event_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            event_type: event_type.into(),
            timestamp,
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_ordering() {
        let a = EntityId::from("alpha");
        let b = EntityId::from("beta");
        assert!(a < b);
        assert_eq!(a.as_str(), "alpha");
    }

    #[test]
    fn test_entity_attributes() {
        let e = Entity::new("team-1", EntityType::Team)
            .with_attribute("region", "emea")
            .with_attribute("industry", "retail");
        assert_eq!(e.attribute("region"), Some("emea"));
        assert_eq!(e.attribute("missing"), None);
        // BTreeMap keeps keys ordered
        let keys: Vec<_> = e.attributes.keys().cloned().collect();
        assert_eq!(keys, vec!["industry".to_string(), "region".to_string()]);
    }

    #[test]
    fn test_entity_type_label() {
        assert_eq!(EntityType::Objective.label(), "objective");
        assert_eq!(EntityType::Risk.to_string(), "risk");
    }
}
