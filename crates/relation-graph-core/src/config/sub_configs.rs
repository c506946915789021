//! Sub-configuration structures for the discovery components.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

fn check_unit_interval(field: &str, value: f64) -> CoreResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::ValidationError {
            field: field.to_string(),
            message: format!("must be within [0, 1], got {value}"),
        });
    }
    Ok(())
}

fn check_nonzero(field: &str, value: usize) -> CoreResult<()> {
    if value == 0 {
        return Err(CoreError::ValidationError {
            field: field.to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// MULTI-HOP
// ============================================================================

/// Multi-hop path discovery parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiHopConfig {
    /// Maximum hop count for enumerated paths.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Maximum simple paths enumerated per (source, candidate) pair.
    #[serde(default = "default_max_paths_per_pair")]
    pub max_paths_per_pair: usize,

    /// Paths scoring below this are dropped.
    #[serde(default = "default_min_path_strength")]
    pub min_path_strength: f64,

    /// Score deduction per hop beyond the second.
    #[serde(default = "default_length_penalty")]
    pub length_penalty: f64,
}

fn default_max_hops() -> usize {
    3
}

fn default_max_paths_per_pair() -> usize {
    5
}

fn default_min_path_strength() -> f64 {
    0.5
}

fn default_length_penalty() -> f64 {
    0.1
}

impl Default for MultiHopConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            max_paths_per_pair: default_max_paths_per_pair(),
            min_path_strength: default_min_path_strength(),
            length_penalty: default_length_penalty(),
        }
    }
}

impl MultiHopConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_nonzero("multi_hop.max_hops", self.max_hops)?;
        check_nonzero("multi_hop.max_paths_per_pair", self.max_paths_per_pair)?;
        check_unit_interval("multi_hop.min_path_strength", self.min_path_strength)?;
        check_unit_interval("multi_hop.length_penalty", self.length_penalty)?;
        Ok(())
    }
}

// ============================================================================
// TEMPORAL
// ============================================================================

/// How events in one period are collapsed into a series value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Sum of event values (valueless events count as 1.0).
    #[default]
    Sum,
    /// Mean of event values.
    Mean,
    /// Number of events.
    Count,
}

/// How empty periods between events are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GapFillPolicy {
    /// Empty periods become 0.0.
    #[default]
    ZeroFill,
    /// Empty periods repeat the previous value.
    ForwardFill,
    /// Empty periods are linearly interpolated between neighbors.
    Interpolate,
}

/// Temporal correlation/causality parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemporalConfig {
    /// Entities with fewer events than this are excluded.
    #[serde(default = "default_min_events_required")]
    pub min_events_required: usize,

    /// Length of one aggregation period, in days.
    #[serde(default = "default_period_days")]
    pub period_days: u32,

    /// Cap on the aligned window, in days (most recent kept).
    #[serde(default = "default_correlation_window_days")]
    pub correlation_window_days: u32,

    /// Maximum |lag| scanned, in periods.
    #[serde(default = "default_max_lag")]
    pub max_lag: i64,

    /// Lag scan step, in periods.
    #[serde(default = "default_lag_step")]
    pub lag_step: i64,

    /// `is_causal` threshold on the causality score.
    #[serde(default = "default_causality_threshold")]
    pub causality_threshold: f64,

    /// `is_significant` threshold on |correlation|.
    #[serde(default = "default_significance_threshold")]
    pub significance_threshold: f64,

    /// Causality score above which an additional influence relationship
    /// is emitted.
    #[serde(default = "default_influence_threshold")]
    pub influence_threshold: f64,

    /// Minimum aligned samples for the statistical causality test;
    /// below this the lag-correlation heuristic is used.
    #[serde(default = "default_min_samples_for_statistical")]
    pub min_samples_for_statistical: usize,

    #[serde(default)]
    pub aggregation: AggregationMethod,

    #[serde(default)]
    pub gap_fill: GapFillPolicy,
}

fn default_min_events_required() -> usize {
    10
}

fn default_period_days() -> u32 {
    1
}

fn default_correlation_window_days() -> u32 {
    90
}

fn default_max_lag() -> i64 {
    30
}

fn default_lag_step() -> i64 {
    1
}

fn default_causality_threshold() -> f64 {
    0.7
}

fn default_significance_threshold() -> f64 {
    0.6
}

fn default_influence_threshold() -> f64 {
    0.8
}

fn default_min_samples_for_statistical() -> usize {
    20
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            min_events_required: default_min_events_required(),
            period_days: default_period_days(),
            correlation_window_days: default_correlation_window_days(),
            max_lag: default_max_lag(),
            lag_step: default_lag_step(),
            causality_threshold: default_causality_threshold(),
            significance_threshold: default_significance_threshold(),
            influence_threshold: default_influence_threshold(),
            min_samples_for_statistical: default_min_samples_for_statistical(),
            aggregation: AggregationMethod::default(),
            gap_fill: GapFillPolicy::default(),
        }
    }
}

impl TemporalConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_nonzero("temporal.period_days", self.period_days as usize)?;
        check_nonzero(
            "temporal.correlation_window_days",
            self.correlation_window_days as usize,
        )?;
        if self.max_lag < 0 {
            return Err(CoreError::ValidationError {
                field: "temporal.max_lag".into(),
                message: "must be non-negative".into(),
            });
        }
        if self.lag_step <= 0 {
            return Err(CoreError::ValidationError {
                field: "temporal.lag_step".into(),
                message: "must be positive".into(),
            });
        }
        check_unit_interval("temporal.causality_threshold", self.causality_threshold)?;
        check_unit_interval("temporal.significance_threshold", self.significance_threshold)?;
        check_unit_interval("temporal.influence_threshold", self.influence_threshold)?;
        Ok(())
    }

    /// Aligned window cap in periods.
    pub fn window_periods(&self) -> usize {
        (self.correlation_window_days / self.period_days).max(1) as usize
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

/// Structural pattern detection parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PatternConfig {
    /// Minimum degree for hub classification.
    #[serde(default = "default_min_connections")]
    pub min_connections: usize,

    /// Minimum combined centrality for hub classification.
    #[serde(default = "default_centrality_threshold")]
    pub centrality_threshold: f64,

    /// Communities smaller than this are discarded.
    #[serde(default = "default_min_community_size")]
    pub min_community_size: usize,

    /// Minimum mean edge weight for a triangle to qualify.
    #[serde(default = "default_min_triangle_strength")]
    pub min_triangle_strength: f64,

    /// Minimum node count for a chain to qualify.
    #[serde(default = "default_min_chain_length")]
    pub min_chain_length: usize,

    /// Upper bound on chain walks.
    #[serde(default = "default_max_chain_length")]
    pub max_chain_length: usize,

    /// Minimum neighbor count for star classification.
    #[serde(default = "default_min_spokes")]
    pub min_spokes: usize,

    /// Fraction of neighbors that must be leaves for a star.
    #[serde(default = "default_leaf_ratio")]
    pub leaf_ratio: f64,
}

fn default_min_connections() -> usize {
    5
}

fn default_centrality_threshold() -> f64 {
    0.7
}

fn default_min_community_size() -> usize {
    3
}

fn default_min_triangle_strength() -> f64 {
    0.5
}

fn default_min_chain_length() -> usize {
    3
}

fn default_max_chain_length() -> usize {
    10
}

fn default_min_spokes() -> usize {
    4
}

fn default_leaf_ratio() -> f64 {
    0.7
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            centrality_threshold: default_centrality_threshold(),
            min_community_size: default_min_community_size(),
            min_triangle_strength: default_min_triangle_strength(),
            min_chain_length: default_min_chain_length(),
            max_chain_length: default_max_chain_length(),
            min_spokes: default_min_spokes(),
            leaf_ratio: default_leaf_ratio(),
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_nonzero("patterns.min_connections", self.min_connections)?;
        check_nonzero("patterns.min_community_size", self.min_community_size)?;
        check_nonzero("patterns.min_chain_length", self.min_chain_length)?;
        check_nonzero("patterns.min_spokes", self.min_spokes)?;
        if self.max_chain_length < self.min_chain_length {
            return Err(CoreError::ValidationError {
                field: "patterns.max_chain_length".into(),
                message: "must be >= min_chain_length".into(),
            });
        }
        check_unit_interval("patterns.centrality_threshold", self.centrality_threshold)?;
        check_unit_interval("patterns.min_triangle_strength", self.min_triangle_strength)?;
        check_unit_interval("patterns.leaf_ratio", self.leaf_ratio)?;
        Ok(())
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// What to do when two relationships share a dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Merge evidence lists and keep the maximum confidence.
    #[default]
    MergeEvidence,
    /// Keep only the highest-confidence relationship.
    KeepHighestConfidence,
}

/// Fan-out and merge behavior of the discovery engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub dedup_strategy: DedupStrategy,

    /// Entity batch size for internal sharding of CPU-bound passes.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_true")]
    pub enable_multi_hop: bool,

    #[serde(default = "default_true")]
    pub enable_temporal: bool,

    /// Off by default; requires a registered semantic miner.
    #[serde(default)]
    pub enable_semantic: bool,
}

fn default_batch_size() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            dedup_strategy: DedupStrategy::default(),
            batch_size: default_batch_size(),
            enable_multi_hop: true,
            enable_temporal: true,
            enable_semantic: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_nonzero("orchestrator.batch_size", self.batch_size)
    }

    /// Apply environment-variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("RELATION_GRAPH_MULTI_HOP_ENABLED") {
            self.enable_multi_hop = val == "true" || val == "1";
        }
        if let Ok(val) = std::env::var("RELATION_GRAPH_TEMPORAL_ENABLED") {
            self.enable_temporal = val == "true" || val == "1";
        }
        if let Ok(val) = std::env::var("RELATION_GRAPH_SEMANTIC_ENABLED") {
            self.enable_semantic = val == "true" || val == "1";
        }
        if let Ok(val) = std::env::var("RELATION_GRAPH_BATCH_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                self.batch_size = size;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_periods() {
        let config = TemporalConfig {
            period_days: 7,
            correlation_window_days: 90,
            ..Default::default()
        };
        assert_eq!(config.window_periods(), 12);
    }

    #[test]
    fn test_chain_bounds_validation() {
        let config = PatternConfig {
            min_chain_length: 5,
            max_chain_length: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("RELATION_GRAPH_TEMPORAL_ENABLED", "false");
        std::env::set_var("RELATION_GRAPH_BATCH_SIZE", "25");

        let config = OrchestratorConfig::default().with_env_overrides();
        assert!(!config.enable_temporal);
        assert_eq!(config.batch_size, 25);

        std::env::remove_var("RELATION_GRAPH_TEMPORAL_ENABLED");
        std::env::remove_var("RELATION_GRAPH_BATCH_SIZE");
    }

    #[test]
    fn test_negative_lag_step_rejected() {
        let config = TemporalConfig {
            lag_step: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
