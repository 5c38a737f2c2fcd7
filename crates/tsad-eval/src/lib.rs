// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod adjust;
pub mod driver;
pub mod ranking;
pub mod sweep;

pub use adjust::{adjust_scores, anomaly_segments, point_adjust};
pub use driver::{PadPolicy, ScoreAlignment, align_scores, evaluate_run, evaluate_run_with};
pub use ranking::{CurvePoint, average_precision, ranking_curve, roc_auc};
pub use sweep::{
    ThresholdPoint, adjusted_f1_sweep, adjusted_metrics_at, best_adjusted_f1,
    candidate_thresholds,
};

use std::cmp::Ordering;
use tsad_core::{MetricTuple, TsadError};

/// Scores that AUROC and average precision are ranked on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RankingBasis {
    /// Raw detector scores.
    #[default]
    Raw,
    /// Scores with every ground-truth segment raised to its maximum.
    SegmentAdjusted,
}

impl RankingBasis {
    pub fn parse(raw: &str) -> Result<Self, TsadError> {
        match raw.to_ascii_lowercase().replace('_', "-").as_str() {
            "raw" => Ok(Self::Raw),
            "segment-adjusted" | "adjusted" => Ok(Self::SegmentAdjusted),
            _ => Err(TsadError::configuration(format!(
                "invalid ranking basis '{raw}'; expected one of: raw, segment-adjusted"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalConfig {
    pub ranking: RankingBasis,
}

/// Metric tuple plus the operating point it was selected at.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalReport {
    pub metrics: MetricTuple,
    /// Best-F1 threshold; `None` when the labels contain no positives.
    pub best: Option<ThresholdPoint>,
    pub n: usize,
    pub n_positive: usize,
    pub n_segments: usize,
}

/// Computes the metric tuple for aligned `scores` and `labels`.
///
/// AUROC and average precision use the raw scores; F1, precision and recall
/// are point-adjusted at the threshold maximizing adjusted F1. Labels without
/// positives produce `NaN` metrics rather than an error.
pub fn evaluate(scores: &[f64], labels: &[bool]) -> Result<MetricTuple, TsadError> {
    evaluate_with(scores, labels, &EvalConfig::default())
}

pub fn evaluate_with(
    scores: &[f64],
    labels: &[bool],
    config: &EvalConfig,
) -> Result<MetricTuple, TsadError> {
    Ok(evaluate_detailed(scores, labels, config)?.metrics)
}

pub fn evaluate_detailed(
    scores: &[f64],
    labels: &[bool],
    config: &EvalConfig,
) -> Result<EvalReport, TsadError> {
    validate_scores_and_labels(scores, labels)?;

    let (auroc, ap) = match config.ranking {
        RankingBasis::Raw => (roc_auc(scores, labels)?, average_precision(scores, labels)?),
        RankingBasis::SegmentAdjusted => {
            let adjusted = adjust_scores(scores, labels)?;
            (
                roc_auc(&adjusted, labels)?,
                average_precision(&adjusted, labels)?,
            )
        }
    };

    let best = best_adjusted_f1(scores, labels)?;
    let (f1, precision, recall) =
        best.map_or((f64::NAN, f64::NAN, f64::NAN), |point| {
            (point.f1, point.precision, point.recall)
        });

    Ok(EvalReport {
        metrics: MetricTuple {
            auroc,
            average_precision: ap,
            f1,
            precision,
            recall,
        },
        best,
        n: scores.len(),
        n_positive: labels.iter().filter(|&&l| l).count(),
        n_segments: anomaly_segments(labels).len(),
    })
}

/// Total order on scores with `-0.0` and `0.0` ranked as equal.
pub(crate) fn cmp_scores(left: f64, right: f64) -> Ordering {
    (left + 0.0).total_cmp(&(right + 0.0))
}

pub(crate) fn validate_scores_and_labels(scores: &[f64], labels: &[bool]) -> Result<(), TsadError> {
    if scores.is_empty() {
        return Err(TsadError::invalid_input("scores must be non-empty"));
    }
    if scores.len() != labels.len() {
        return Err(TsadError::invalid_input(format!(
            "scores and labels must have equal length; got {} and {}",
            scores.len(),
            labels.len()
        )));
    }
    if let Some((index, score)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(TsadError::invalid_input(format!(
            "scores must be finite; scores[{index}]={score}"
        )));
    }
    Ok(())
}
