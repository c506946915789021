//! Explicit relationship building from declarative rules.
//!
//! For each entity, every rule whose source type and field match is
//! applied: the field value is resolved to a target entity and a
//! confidence-1.0 relationship is materialized. Unresolvable required
//! targets and missing reverse kinds are reportable data-quality
//! warnings, never errors.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use relation_graph_core::types::{
    DataQualityWarning, DedupKey, Direction, Entity, Relationship, RuleSet,
};

/// Output of one explicit build pass.
#[derive(Debug, Clone, Default)]
pub struct ExplicitBuildResult {
    pub relationships: Vec<Relationship>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Applies the configured rule set to an entity list.
pub struct ExplicitRelationshipBuilder {
    rules: RuleSet,
}

impl ExplicitRelationshipBuilder {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Materialize direct relationships from entity attributes.
    ///
    /// Emits at most one relationship per (source, target, kind,
    /// direction); bidirectional rules additionally emit the reverse
    /// relationship via the fixed reverse-kind table.
    pub fn build(&self, entities: &[Entity]) -> ExplicitBuildResult {
        let index: HashMap<&str, &Entity> =
            entities.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut result = ExplicitBuildResult::default();
        let mut seen: HashSet<DedupKey> = HashSet::new();

        for entity in entities {
            for rule in self.rules.for_source_type(entity.entity_type) {
                let Some(target_id) = entity.attribute(&rule.field) else {
                    continue;
                };

                let target = index
                    .get(target_id)
                    .filter(|t| t.entity_type == rule.target_type);
                let Some(target) = target else {
                    if rule.required {
                        warn!(
                            entity = %entity.id,
                            field = %rule.field,
                            target_id,
                            "Required rule target did not resolve"
                        );
                        result.warnings.push(DataQualityWarning::UnresolvedRuleTarget {
                            entity: entity.id.clone(),
                            field: rule.field.clone(),
                            target_id: target_id.to_string(),
                        });
                    }
                    continue;
                };

                let forward = Relationship::new(
                    entity.id.clone(),
                    target.id.clone(),
                    rule.kind,
                    Direction::Unidirectional,
                    1.0,
                )
                .with_evidence(format!("explicit reference via field '{}'", rule.field));

                if seen.insert(forward.dedup_key()) {
                    debug!(
                        source = %forward.source,
                        target = %forward.target,
                        kind = %forward.kind,
                        "Explicit relationship"
                    );
                    result.relationships.push(forward);
                }

                if rule.bidirectional {
                    match rule.kind.reverse() {
                        Some(reverse_kind) => {
                            let reverse = Relationship::new(
                                target.id.clone(),
                                entity.id.clone(),
                                reverse_kind,
                                Direction::Unidirectional,
                                1.0,
                            )
                            .with_evidence(format!(
                                "mirror of explicit reference via field '{}'",
                                rule.field
                            ));
                            if seen.insert(reverse.dedup_key()) {
                                result.relationships.push(reverse);
                            }
                        }
                        None => {
                            warn!(kind = %rule.kind, "Bidirectional rule has no reverse kind");
                            let warning =
                                DataQualityWarning::MissingReverseKind { kind: rule.kind };
                            if !result.warnings.contains(&warning) {
                                result.warnings.push(warning);
                            }
                        }
                    }
                }
            }
        }

        info!(
            relationship_count = result.relationships.len(),
            warning_count = result.warnings.len(),
            "Explicit rule pass complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relation_graph_core::types::{EntityType, RelationshipKind, RelationshipRule};

    fn rule(
        source_type: EntityType,
        field: &str,
        target_type: EntityType,
        kind: RelationshipKind,
        bidirectional: bool,
        required: bool,
    ) -> RelationshipRule {
        RelationshipRule {
            source_type,
            field: field.to_string(),
            target_type,
            kind,
            bidirectional,
            required,
        }
    }

    #[test]
    fn test_resolves_and_mirrors() {
        let rules = RuleSet::new(vec![rule(
            EntityType::Product,
            "owner_team",
            EntityType::Team,
            RelationshipKind::OwnedBy,
            true,
            true,
        )]);
        let entities = vec![
            Entity::new("widget", EntityType::Product).with_attribute("owner_team", "platform"),
            Entity::new("platform", EntityType::Team),
        ];

        let result = ExplicitRelationshipBuilder::new(rules).build(&entities);
        assert_eq!(result.relationships.len(), 2);
        assert!(result.warnings.is_empty());

        let forward = &result.relationships[0];
        assert_eq!(forward.kind, RelationshipKind::OwnedBy);
        assert_eq!(forward.confidence, 1.0);
        assert!(forward.evidence[0].contains("owner_team"));

        let reverse = &result.relationships[1];
        assert_eq!(reverse.kind, RelationshipKind::Owns);
        assert_eq!(reverse.source.as_str(), "platform");
    }

    #[test]
    fn test_required_unresolved_is_warning_not_error() {
        let rules = RuleSet::new(vec![rule(
            EntityType::Product,
            "owner_team",
            EntityType::Team,
            RelationshipKind::OwnedBy,
            false,
            true,
        )]);
        let entities =
            vec![Entity::new("widget", EntityType::Product).with_attribute("owner_team", "ghost")];

        let result = ExplicitRelationshipBuilder::new(rules).build(&entities);
        assert!(result.relationships.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            &result.warnings[0],
            DataQualityWarning::UnresolvedRuleTarget { target_id, .. } if target_id == "ghost"
        ));
    }

    #[test]
    fn test_optional_unresolved_is_silent() {
        let rules = RuleSet::new(vec![rule(
            EntityType::Product,
            "owner_team",
            EntityType::Team,
            RelationshipKind::OwnedBy,
            false,
            false,
        )]);
        let entities =
            vec![Entity::new("widget", EntityType::Product).with_attribute("owner_team", "ghost")];

        let result = ExplicitRelationshipBuilder::new(rules).build(&entities);
        assert!(result.relationships.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_type_mismatch_does_not_resolve() {
        let rules = RuleSet::new(vec![rule(
            EntityType::Product,
            "owner_team",
            EntityType::Team,
            RelationshipKind::OwnedBy,
            false,
            true,
        )]);
        // target id exists but is a Customer, not a Team
        let entities = vec![
            Entity::new("widget", EntityType::Product).with_attribute("owner_team", "acme"),
            Entity::new("acme", EntityType::Customer),
        ];

        let result = ExplicitRelationshipBuilder::new(rules).build(&entities);
        assert!(result.relationships.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_reverse_kind_flagged() {
        let rules = RuleSet::new(vec![rule(
            EntityType::Project,
            "team",
            EntityType::Team,
            RelationshipKind::AssignedTo,
            true, // bidirectional, but AssignedTo has no reverse
            false,
        )]);
        let entities = vec![
            Entity::new("apollo", EntityType::Project).with_attribute("team", "platform"),
            Entity::new("platform", EntityType::Team),
        ];

        let result = ExplicitRelationshipBuilder::new(rules).build(&entities);
        // forward edge still emitted
        assert_eq!(result.relationships.len(), 1);
        assert!(matches!(
            result.warnings[0],
            DataQualityWarning::MissingReverseKind {
                kind: RelationshipKind::AssignedTo
            }
        ));
    }

    #[test]
    fn test_deduplicates_identical_matches() {
        // two rules yielding the same (source, target, kind, direction)
        let rules = RuleSet::new(vec![
            rule(
                EntityType::Product,
                "owner_team",
                EntityType::Team,
                RelationshipKind::OwnedBy,
                false,
                false,
            ),
            rule(
                EntityType::Product,
                "maintainer_team",
                EntityType::Team,
                RelationshipKind::OwnedBy,
                false,
                false,
            ),
        ]);
        let entities = vec![
            Entity::new("widget", EntityType::Product)
                .with_attribute("owner_team", "platform")
                .with_attribute("maintainer_team", "platform"),
            Entity::new("platform", EntityType::Team),
        ];

        let result = ExplicitRelationshipBuilder::new(rules).build(&entities);
        assert_eq!(result.relationships.len(), 1);
    }
}
