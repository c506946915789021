//! Declarative relationship rules.
//!
//! A rule says: entities of `source_type` carrying attribute `field`
//! reference an entity of `target_type`, and that reference means `kind`.
//! Rules are loaded once at startup and immutable at runtime. A missing
//! rules file falls back to the built-in set, never a hard failure.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreResult;

use super::entity::EntityType;
use super::relationship::RelationshipKind;

/// One declarative rule mapping an entity attribute to a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRule {
    /// Entity type the rule applies to.
    pub source_type: EntityType,
    /// Attribute holding the target entity id.
    pub field: String,
    /// Expected type of the resolved target.
    pub target_type: EntityType,
    /// Relationship kind to materialize.
    pub kind: RelationshipKind,
    /// Whether to also emit the reverse relationship.
    #[serde(default)]
    pub bidirectional: bool,
    /// Whether an unresolved target is a data-quality warning.
    #[serde(default)]
    pub required: bool,
}

/// Immutable collection of relationship rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuleSet {
    #[serde(default, rename = "rule")]
    pub rules: Vec<RelationshipRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RelationshipRule>) -> Self {
        Self { rules }
    }

    /// Built-in default rules covering the common organizational schema.
    pub fn builtin() -> Self {
        use EntityType::*;
        use RelationshipKind::*;
        Self::new(vec![
            RelationshipRule {
                source_type: Customer,
                field: "primary_risk".into(),
                target_type: Risk,
                kind: HasRisk,
                bidirectional: true,
                required: false,
            },
            RelationshipRule {
                source_type: Product,
                field: "owner_team".into(),
                target_type: Team,
                kind: OwnedBy,
                bidirectional: true,
                required: true,
            },
            RelationshipRule {
                source_type: Project,
                field: "objective".into(),
                target_type: Objective,
                kind: Supports,
                bidirectional: true,
                required: false,
            },
            RelationshipRule {
                source_type: Project,
                field: "team".into(),
                target_type: Team,
                kind: AssignedTo,
                bidirectional: false,
                required: false,
            },
            RelationshipRule {
                source_type: Risk,
                field: "threatens".into(),
                target_type: Objective,
                kind: Endangers,
                bidirectional: true,
                required: false,
            },
            RelationshipRule {
                source_type: Team,
                field: "parent_team".into(),
                target_type: Team,
                kind: ChildOf,
                bidirectional: true,
                required: false,
            },
        ])
    }

    /// Load rules from a TOML file; a missing file yields the built-in
    /// set with a warning, a malformed file is an error.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Rules file not found, using built-in rules");
            return Ok(Self::builtin());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::CoreError::RuleError(format!(
                "Failed to read rules file {}: {}",
                path.display(),
                e
            )))?;
        let rules: RuleSet = toml::from_str(&content)?;
        Ok(rules)
    }

    /// Rules applicable to a given source entity type.
    pub fn for_source_type(&self, source_type: EntityType) -> impl Iterator<Item = &RelationshipRule> {
        self.rules.iter().filter(move |r| r.source_type == source_type)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_nonempty() {
        let rules = RuleSet::builtin();
        assert!(!rules.is_empty());
        assert!(rules
            .for_source_type(EntityType::Product)
            .any(|r| r.field == "owner_team"));
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let rules = RuleSet::load(Path::new("/nonexistent/rules.toml")).unwrap();
        assert_eq!(rules, RuleSet::builtin());
    }

    #[test]
    fn test_load_from_toml() {
        let toml_src = r#"
            [[rule]]
            source_type = "customer"
            field = "primary_risk"
            target_type = "risk"
            kind = "has_risk"
            bidirectional = true
            required = false
        "#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, toml_src).unwrap();

        let rules = RuleSet::load(&path).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules[0].kind, RelationshipKind::HasRisk);
        assert!(rules.rules[0].bidirectional);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "[[rule]]\nsource_type = 42").unwrap();
        assert!(RuleSet::load(&path).is_err());
    }
}
