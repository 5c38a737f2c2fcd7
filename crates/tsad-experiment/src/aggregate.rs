// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use tsad_core::{METRIC_COUNT, MetricTuple, TsadError};

/// Metrics and timing of one detector run on one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunRecord {
    pub run: usize,
    pub seed: u64,
    pub metrics: MetricTuple,
    /// Wall-clock seconds, rounded to 0.1.
    pub elapsed_secs: f64,
}

/// Per-entity aggregate written as one results line.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySummary {
    pub entity: String,
    pub mean: MetricTuple,
    pub std: MetricTuple,
    pub mean_elapsed_secs: f64,
    pub runs: Vec<RunRecord>,
}

impl EntitySummary {
    pub fn from_runs(entity: impl Into<String>, runs: Vec<RunRecord>) -> Result<Self, TsadError> {
        let metrics = runs.iter().map(|record| record.metrics).collect::<Vec<_>>();
        let (mean, std) = aggregate(&metrics)?;
        let elapsed = runs
            .iter()
            .map(|record| record.elapsed_secs)
            .collect::<Vec<_>>();
        Ok(Self {
            entity: entity.into(),
            mean,
            std,
            mean_elapsed_secs: mean_of(&elapsed),
            runs,
        })
    }
}

/// Element-wise mean and population standard deviation (ddof 0).
///
/// A `NaN` in any run makes that metric's mean and std `NaN`.
pub fn aggregate(entries: &[MetricTuple]) -> Result<(MetricTuple, MetricTuple), TsadError> {
    if entries.is_empty() {
        return Err(TsadError::invalid_input(
            "cannot aggregate an empty set of runs",
        ));
    }

    let mut mean = [0.0; METRIC_COUNT];
    let mut std = [0.0; METRIC_COUNT];
    for metric in 0..METRIC_COUNT {
        let column = entries
            .iter()
            .map(|entry| entry.as_array()[metric])
            .collect::<Vec<_>>();
        mean[metric] = mean_of(&column);
        std[metric] = population_std(&column, mean[metric]);
    }
    Ok((MetricTuple::from_array(mean), MetricTuple::from_array(std)))
}

fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn round_to_tenth(secs: f64) -> f64 {
    (secs * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::{EntitySummary, RunRecord, aggregate, round_to_tenth};
    use tsad_core::MetricTuple;

    fn assert_approx_eq(actual: f64, expected: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= 1e-12,
            "expected {expected}, got {actual} (delta={delta})"
        );
    }

    #[test]
    fn aggregate_uses_population_std() {
        let entries = [
            MetricTuple::from_array([0.8, 0.5, 1.0, 1.0, 1.0]),
            MetricTuple::from_array([0.6, 0.5, 0.5, 0.25, 1.0]),
        ];
        let (mean, std) = aggregate(&entries).expect("aggregate");
        assert_approx_eq(mean.auroc, 0.7);
        assert_approx_eq(std.auroc, 0.1);
        assert_approx_eq(std.average_precision, 0.0);
        assert_approx_eq(mean.precision, 0.625);
        assert_approx_eq(std.precision, 0.375);
    }

    #[test]
    fn single_run_has_zero_std() {
        let entry = MetricTuple::from_array([0.9, 0.8, 0.7, 0.6, 0.5]);
        let (mean, std) = aggregate(&[entry]).expect("aggregate");
        assert_eq!(mean, entry);
        assert_eq!(std.as_array(), [0.0; 5]);
    }

    #[test]
    fn nan_propagates_per_metric() {
        let entries = [
            MetricTuple::from_array([f64::NAN, 0.5, 0.5, 0.5, 0.5]),
            MetricTuple::from_array([0.5, 0.5, 0.5, 0.5, 0.5]),
        ];
        let (mean, std) = aggregate(&entries).expect("aggregate");
        assert!(mean.auroc.is_nan());
        assert!(std.auroc.is_nan());
        assert_approx_eq(mean.f1, 0.5);
    }

    #[test]
    fn empty_runs_are_rejected() {
        let err = aggregate(&[]).expect_err("empty");
        assert!(err.to_string().contains("empty set of runs"));
    }

    #[test]
    fn summary_averages_elapsed_time() {
        let metrics = MetricTuple::from_array([0.5; 5]);
        let runs = vec![
            RunRecord {
                run: 0,
                seed: 42,
                metrics,
                elapsed_secs: 1.2,
            },
            RunRecord {
                run: 1,
                seed: 43,
                metrics,
                elapsed_secs: 1.4,
            },
        ];
        let summary = EntitySummary::from_runs("P-15", runs).expect("summary");
        assert_approx_eq(summary.mean_elapsed_secs, 1.3);
        assert_eq!(summary.runs.len(), 2);
    }

    #[test]
    fn elapsed_rounds_to_one_decimal() {
        assert_approx_eq(round_to_tenth(1.26), 1.3);
        assert_approx_eq(round_to_tenth(0.04), 0.0);
    }
}
