//! Ephemeral analysis results: scored paths and temporal correlations.
//!
//! These are created fresh per discovery invocation and discarded once
//! the merged relationship set has been returned; they are never
//! persisted.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// A scored multi-hop path between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathAnalysis {
    /// Full node sequence, source first.
    pub path: Vec<EntityId>,
    /// Composite path score in [0, 1].
    pub score: f64,
    /// Human-readable reading of the path.
    pub interpretation: String,
    /// What a consumer could do about it.
    pub actionable_insight: String,
    /// Weight of each traversed edge, in path order.
    pub edge_strengths: Vec<f64>,
    /// Weakest links: edge endpoints whose weight falls notably below
    /// the path average.
    pub bottlenecks: Vec<(EntityId, EntityId)>,
}

impl PathAnalysis {
    /// Hop count.
    pub fn length(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Which procedure produced a causality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalityMethod {
    /// Lag-predictability test over an autoregression (preferred when
    /// enough aligned samples exist).
    Statistical,
    /// Simple lag-correlation heuristic (fallback).
    LagHeuristic,
}

/// Correlation/lag/causality measurement between two entities' series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalCorrelation {
    /// First entity of the measured pair.
    pub source: EntityId,
    /// Second entity of the measured pair.
    pub target: EntityId,
    /// Pearson correlation at the optimal lag, in [-1, 1].
    pub correlation_coefficient: f64,
    /// Signed lag (in aggregation periods) maximizing |correlation|.
    /// Positive means the target trails the source.
    pub optimal_lag: i64,
    /// Causality estimate in [0, 1].
    pub causality_score: f64,
    /// Composite confidence in [0, 1].
    pub confidence: f64,
    /// Aligned window length, in periods.
    pub window_size: usize,
    /// Number of raw events backing the weaker side of the pair.
    pub sample_count: usize,
    /// Which procedure produced `causality_score`.
    pub method: CausalityMethod,
    /// Threshold against which `is_causal` is judged.
    pub causality_threshold: f64,
    /// Threshold against which `is_significant` is judged.
    pub significance_threshold: f64,
}

impl TemporalCorrelation {
    /// True iff the causality score meets the configured threshold.
    pub fn is_causal(&self) -> bool {
        self.causality_score >= self.causality_threshold
    }

    /// True iff |correlation| meets the configured threshold.
    pub fn is_significant(&self) -> bool {
        self.correlation_coefficient.abs() >= self.significance_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlation(causality: f64, corr: f64) -> TemporalCorrelation {
        TemporalCorrelation {
            source: "a".into(),
            target: "b".into(),
            correlation_coefficient: corr,
            optimal_lag: 2,
            causality_score: causality,
            confidence: 0.5,
            window_size: 14,
            sample_count: 12,
            method: CausalityMethod::LagHeuristic,
            causality_threshold: 0.7,
            significance_threshold: 0.6,
        }
    }

    #[test]
    fn test_is_causal_threshold_boundary() {
        assert!(correlation(0.7, 0.0).is_causal());
        assert!(!correlation(0.69, 0.0).is_causal());
    }

    #[test]
    fn test_is_significant_uses_absolute_value() {
        assert!(correlation(0.0, -0.8).is_significant());
        assert!(correlation(0.0, 0.6).is_significant());
        assert!(!correlation(0.0, 0.59).is_significant());
    }

    #[test]
    fn test_path_analysis_length() {
        let analysis = PathAnalysis {
            path: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            score: 0.6,
            interpretation: String::new(),
            actionable_insight: String::new(),
            edge_strengths: vec![1.0, 1.0, 1.0],
            bottlenecks: vec![],
        };
        assert_eq!(analysis.length(), 3);
    }
}
