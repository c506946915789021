//! Temporal correlation and causality analysis.
//!
//! Converts per-entity event streams into fixed-frequency series,
//! measures correlation and optimal lag per entity pair, estimates
//! causality, and synthesizes precedence/influence/correlation
//! relationships. A failing statistical test falls back to the
//! lag-correlation heuristic; the method used is recorded on each
//! result.

mod series;

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use relation_graph_core::config::TemporalConfig;
use relation_graph_core::types::{
    CausalityMethod, DataQualityWarning, Direction, Entity, EntityId, Event, Relationship,
    RelationshipKind, TemporalAspect, TemporalCorrelation,
};

pub use series::{align, build_series, correlation_at_lag, pearson, TimeSeries};

/// Output of one temporal analysis pass.
#[derive(Debug, Clone, Default)]
pub struct TemporalAnalysisResult {
    pub correlations: Vec<TemporalCorrelation>,
    pub relationships: Vec<Relationship>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Measures correlation, lag, and causality between entity event
/// streams.
pub struct TemporalAnalyzer {
    config: TemporalConfig,
}

impl TemporalAnalyzer {
    pub fn new(config: TemporalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }

    /// Full pass: correlations plus synthesized relationships.
    pub fn analyze(&self, entities: &[Entity], events: &[Event]) -> TemporalAnalysisResult {
        let mut result = TemporalAnalysisResult::default();

        let grouped = self.group_events(entities, events, &mut result.warnings);
        let series: Vec<(TimeSeries, usize)> = grouped
            .iter()
            .filter_map(|(id, entity_events)| {
                series::build_series(id, entity_events, &self.config)
                    .map(|s| (s, entity_events.len()))
            })
            .collect();

        for i in 0..series.len() {
            for j in (i + 1)..series.len() {
                let (a, a_events) = &series[i];
                let (b, b_events) = &series[j];
                if let Some(correlation) =
                    self.analyze_pair(a, b, (*a_events).min(*b_events))
                {
                    result.correlations.push(correlation);
                }
            }
        }

        for correlation in &result.correlations {
            result
                .relationships
                .extend(self.synthesize(correlation));
        }

        info!(
            series_count = series.len(),
            correlation_count = result.correlations.len(),
            relationship_count = result.relationships.len(),
            "Temporal analysis complete"
        );
        result
    }

    /// Group events by entity, dropping entities below the event floor.
    fn group_events<'a>(
        &self,
        entities: &[Entity],
        events: &'a [Event],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> BTreeMap<EntityId, Vec<&'a Event>> {
        let known: std::collections::HashSet<&str> =
            entities.iter().map(|e| e.id.as_str()).collect();

        let mut grouped: BTreeMap<EntityId, Vec<&Event>> = BTreeMap::new();
        for event in events {
            if known.contains(event.entity_id.as_str()) {
                grouped.entry(event.entity_id.clone()).or_default().push(event);
            }
        }

        grouped.retain(|id, entity_events| {
            entity_events.sort_by_key(|e| e.timestamp);
            if entity_events.len() < self.config.min_events_required {
                warn!(
                    entity = %id,
                    events = entity_events.len(),
                    required = self.config.min_events_required,
                    "Too few events for temporal analysis"
                );
                warnings.push(DataQualityWarning::InsufficientEvents {
                    entity: id.clone(),
                    events: entity_events.len(),
                    required: self.config.min_events_required,
                });
                false
            } else {
                true
            }
        });
        grouped
    }

    /// Correlate one pair of series.
    fn analyze_pair(
        &self,
        a: &TimeSeries,
        b: &TimeSeries,
        sample_count: usize,
    ) -> Option<TemporalCorrelation> {
        let (left, right) = series::align(a, b, self.config.window_periods());
        let n = left.len();
        if n < 2 {
            return None;
        }

        let correlation_at_zero = series::pearson(&left, &right);

        // Scan lags outward from zero so the smallest |lag| wins ties.
        let mut optimal_lag = 0i64;
        let mut best = correlation_at_zero;
        let mut lag = self.config.lag_step;
        while lag <= self.config.max_lag {
            for candidate in [lag, -lag] {
                let c = series::correlation_at_lag(&left, &right, candidate);
                if c.abs() > best.abs() {
                    best = c;
                    optimal_lag = candidate;
                }
            }
            lag += self.config.lag_step;
        }

        let (causality_score, method) = self.causality(&left, &right, optimal_lag, correlation_at_zero, best, n);

        let causality_factor = (0.5 + 0.5 * causality_score).clamp(0.0, 1.0);
        let sample_factor = (n as f64 / 30.0).min(1.0);
        let confidence = (best.abs() * causality_factor * sample_factor).clamp(0.0, 1.0);

        debug!(
            a = %a.entity,
            b = %b.entity,
            correlation = best,
            lag = optimal_lag,
            causality = causality_score,
            ?method,
            "Pair analyzed"
        );

        Some(TemporalCorrelation {
            source: a.entity.clone(),
            target: b.entity.clone(),
            correlation_coefficient: best,
            optimal_lag,
            causality_score,
            confidence,
            window_size: n,
            sample_count,
            method,
            causality_threshold: self.config.causality_threshold,
            significance_threshold: self.config.significance_threshold,
        })
    }

    /// Causality estimation with fallback.
    ///
    /// The statistical lag-predictability test needs enough aligned
    /// samples; when it is unavailable or numerically fails, the
    /// lag-correlation heuristic is used and recorded.
    fn causality(
        &self,
        a: &[f64],
        b: &[f64],
        lag: i64,
        correlation_at_zero: f64,
        correlation_at_lag: f64,
        n: usize,
    ) -> (f64, CausalityMethod) {
        if n >= self.config.min_samples_for_statistical {
            match lag_predictability(a, b, lag) {
                Some(score) => return (score, CausalityMethod::Statistical),
                None => {
                    warn!(lag, "Statistical causality test unavailable, using lag heuristic");
                }
            }
        }
        (
            lag_heuristic(correlation_at_zero, correlation_at_lag, lag),
            CausalityMethod::LagHeuristic,
        )
    }

    /// Relationship synthesis per §temporal rules: causal lagged pairs
    /// precede (and possibly influence); otherwise significant pairs
    /// correlate bidirectionally.
    fn synthesize(&self, correlation: &TemporalCorrelation) -> Vec<Relationship> {
        let mut out = Vec::new();

        if correlation.is_causal() && correlation.optimal_lag != 0 {
            // Positive lag: the target trails the source.
            let (leader, follower) = if correlation.optimal_lag > 0 {
                (&correlation.source, &correlation.target)
            } else {
                (&correlation.target, &correlation.source)
            };
            let evidence = format!(
                "optimal lag {} periods, correlation {:.2}, causality {:.2} ({})",
                correlation.optimal_lag.abs(),
                correlation.correlation_coefficient,
                correlation.causality_score,
                match correlation.method {
                    CausalityMethod::Statistical => "statistical",
                    CausalityMethod::LagHeuristic => "lag heuristic",
                },
            );

            out.push(
                Relationship::new(
                    leader.clone(),
                    follower.clone(),
                    RelationshipKind::Precedes,
                    Direction::Unidirectional,
                    correlation.confidence,
                )
                .with_evidence(evidence.clone())
                .with_temporal_aspect(TemporalAspect::Ongoing),
            );

            if correlation.causality_score > self.config.influence_threshold {
                out.push(
                    Relationship::new(
                        leader.clone(),
                        follower.clone(),
                        RelationshipKind::Influences,
                        Direction::Unidirectional,
                        correlation.confidence,
                    )
                    .with_evidence(evidence)
                    .with_temporal_aspect(TemporalAspect::Ongoing),
                );
            }
        } else if correlation.is_significant() {
            out.push(
                Relationship::new(
                    correlation.source.clone(),
                    correlation.target.clone(),
                    RelationshipKind::CorrelatesWith,
                    Direction::Bidirectional,
                    correlation.confidence,
                )
                .with_evidence(format!(
                    "correlation {:.2} over {} periods",
                    correlation.correlation_coefficient, correlation.window_size
                ))
                .with_temporal_aspect(TemporalAspect::Ongoing),
            );
        }
        out
    }
}

/// Statistical lag-predictability test.
///
/// Compares a restricted autoregression `b[t] ~ b[t-1]` against one
/// augmented with the lagged driver `a[t-lag]`; the causality score is
/// the variance-reduction ratio, clamped to [0, 1]. Returns `None` when
/// the regression is degenerate (too few points, singular system).
fn lag_predictability(a: &[f64], b: &[f64], lag: i64) -> Option<f64> {
    let n = b.len();
    if n < 4 {
        return None;
    }

    let padded = |idx: i64| -> f64 {
        if idx >= 0 && (idx as usize) < a.len() {
            a[idx as usize]
        } else {
            0.0
        }
    };

    // Rows: t in 1..n, y = b[t], x1 = b[t-1], x2 = a[t-lag]
    let mut rows = Vec::with_capacity(n - 1);
    for t in 1..n {
        rows.push((b[t], b[t - 1], padded(t as i64 - lag)));
    }

    let rss_restricted = ols_rss(&rows, false)?;
    let rss_augmented = ols_rss(&rows, true)?;

    if rss_restricted < 1e-12 {
        // The restricted model already explains everything.
        return Some(0.0);
    }
    Some(((rss_restricted - rss_augmented) / rss_restricted).clamp(0.0, 1.0))
}

/// Least-squares residual sum of squares for `y ~ 1 + x1 [+ x2]`.
fn ols_rss(rows: &[(f64, f64, f64)], include_x2: bool) -> Option<f64> {
    let k = if include_x2 { 3 } else { 2 };
    // Normal equations X'X beta = X'y with X = [1, x1, (x2)]
    let mut xtx = [[0.0f64; 3]; 3];
    let mut xty = [0.0f64; 3];
    for &(y, x1, x2) in rows {
        let x = [1.0, x1, x2];
        for i in 0..k {
            for j in 0..k {
                xtx[i][j] += x[i] * x[j];
            }
            xty[i] += x[i] * y;
        }
    }

    let beta = solve(&mut xtx, &mut xty, k)?;

    let mut rss = 0.0;
    for &(y, x1, x2) in rows {
        let prediction = beta[0] + beta[1] * x1 + if include_x2 { beta[2] * x2 } else { 0.0 };
        let residual = y - prediction;
        rss += residual * residual;
    }
    Some(rss)
}

/// Gaussian elimination with partial pivoting on a k×k system.
fn solve(matrix: &mut [[f64; 3]; 3], rhs: &mut [f64; 3], k: usize) -> Option<[f64; 3]> {
    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&i, &j| {
                matrix[i][col]
                    .abs()
                    .partial_cmp(&matrix[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        if matrix[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..k {
            let factor = matrix[row][col] / matrix[col][col];
            for c in col..k {
                matrix[row][c] -= factor * matrix[col][c];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut beta = [0.0f64; 3];
    for row in (0..k).rev() {
        let mut sum = rhs[row];
        for c in (row + 1)..k {
            sum -= matrix[row][c] * beta[c];
        }
        beta[row] = sum / matrix[row][row];
    }
    Some(beta)
}

/// Fallback heuristic: how much better the optimal lag explains the pair
/// than no lag at all.
fn lag_heuristic(correlation_at_zero: f64, correlation_at_lag: f64, lag: i64) -> f64 {
    if lag == 0 {
        return 0.0;
    }
    let improvement = (correlation_at_lag.abs() - correlation_at_zero.abs()).max(0.0);
    (correlation_at_lag.abs() * improvement).clamp(0.0, 1.0)
}
