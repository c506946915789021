//! Fixed-frequency time series built from sparse event streams.
//!
//! Events are bucketed into periods of `period_days`, aggregated, and
//! gap-filled. Lag-shifted comparisons use zero padding outside a
//! series' observed range: absence of events reads as no activity, which
//! keeps lagged duplicates of sparse constant streams detectable
//! (overlap-only alignment would leave them with zero variance).

use std::collections::BTreeMap;

use relation_graph_core::config::{AggregationMethod, GapFillPolicy, TemporalConfig};
use relation_graph_core::types::{EntityId, Event};

/// One entity's fixed-frequency series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub entity: EntityId,
    /// Period index of the first value (days since epoch / period_days).
    pub start_period: i64,
    pub values: Vec<f64>,
}

impl TimeSeries {
    /// One past the last period index.
    pub fn end_period(&self) -> i64 {
        self.start_period + self.values.len() as i64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at an absolute period index; 0.0 outside the range.
    pub fn value_at(&self, period: i64) -> f64 {
        if period < self.start_period || period >= self.end_period() {
            return 0.0;
        }
        self.values[(period - self.start_period) as usize]
    }
}

/// Period index for a timestamp.
fn period_index(event: &Event, period_days: u32) -> i64 {
    let day = event.timestamp.timestamp().div_euclid(86_400);
    day.div_euclid(period_days as i64)
}

/// Build one entity's series from its (already grouped) events.
///
/// Returns `None` when there are no events.
pub fn build_series(
    entity: &EntityId,
    events: &[&Event],
    config: &TemporalConfig,
) -> Option<TimeSeries> {
    if events.is_empty() {
        return None;
    }

    let mut buckets: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for event in events {
        buckets
            .entry(period_index(event, config.period_days))
            .or_default()
            .push(event.value.unwrap_or(1.0));
    }

    let first = *buckets.keys().next()?;
    let last = *buckets.keys().last()?;

    let mut values: Vec<Option<f64>> = Vec::with_capacity((last - first + 1) as usize);
    for period in first..=last {
        values.push(buckets.get(&period).map(|vs| aggregate(vs, config.aggregation)));
    }

    Some(TimeSeries {
        entity: entity.clone(),
        start_period: first,
        values: fill_gaps(values, config.gap_fill),
    })
}

fn aggregate(values: &[f64], method: AggregationMethod) -> f64 {
    match method {
        AggregationMethod::Sum => values.iter().sum(),
        AggregationMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregationMethod::Count => values.len() as f64,
    }
}

fn fill_gaps(values: Vec<Option<f64>>, policy: GapFillPolicy) -> Vec<f64> {
    match policy {
        GapFillPolicy::ZeroFill => values.into_iter().map(|v| v.unwrap_or(0.0)).collect(),
        GapFillPolicy::ForwardFill => {
            let mut previous = 0.0;
            values
                .into_iter()
                .map(|v| {
                    if let Some(v) = v {
                        previous = v;
                    }
                    previous
                })
                .collect()
        }
        GapFillPolicy::Interpolate => interpolate(values),
    }
}

/// Linear interpolation between known neighbors; edges clamp to the
/// nearest known value.
fn interpolate(values: Vec<Option<f64>>) -> Vec<f64> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    if known.is_empty() {
        return vec![0.0; values.len()];
    }

    let mut filled = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let value = match known.binary_search_by_key(&i, |(idx, _)| *idx) {
            Ok(pos) => known[pos].1,
            Err(pos) => {
                if pos == 0 {
                    known[0].1
                } else if pos == known.len() {
                    known[known.len() - 1].1
                } else {
                    let (left_i, left_v) = known[pos - 1];
                    let (right_i, right_v) = known[pos];
                    let t = (i - left_i) as f64 / (right_i - left_i) as f64;
                    left_v + t * (right_v - left_v)
                }
            }
        };
        filled.push(value);
    }
    filled
}

/// Align two series over their combined window, capped at
/// `window_periods` (most recent kept). Values outside a series' own
/// range read as 0.0.
pub fn align(a: &TimeSeries, b: &TimeSeries, window_periods: usize) -> (Vec<f64>, Vec<f64>) {
    let mut start = a.start_period.min(b.start_period);
    let end = a.end_period().max(b.end_period());
    if (end - start) as usize > window_periods {
        start = end - window_periods as i64;
    }

    let mut left = Vec::with_capacity((end - start) as usize);
    let mut right = Vec::with_capacity((end - start) as usize);
    for period in start..end {
        left.push(a.value_at(period));
        right.push(b.value_at(period));
    }
    (left, right)
}

/// Pearson correlation; 0.0 when either side has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let mean_x = x[..n].iter().sum::<f64>() / n_f;
    let mean_y = y[..n].iter().sum::<f64>() / n_f;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x < f64::EPSILON || var_y < f64::EPSILON {
        return 0.0;
    }
    (covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Pearson correlation of `a[t]` against `b[t + lag]` over the full
/// window, zero-padding `b` outside its range.
pub fn correlation_at_lag(a: &[f64], b: &[f64], lag: i64) -> f64 {
    let n = a.len();
    let shifted: Vec<f64> = (0..n as i64)
        .map(|t| {
            let idx = t + lag;
            if idx >= 0 && (idx as usize) < b.len() {
                b[idx as usize]
            } else {
                0.0
            }
        })
        .collect();
    pearson(a, &shifted)
}
