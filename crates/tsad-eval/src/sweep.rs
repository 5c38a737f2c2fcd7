// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::adjust::{anomaly_segments, point_adjust, segment_max};
use crate::{cmp_scores, validate_scores_and_labels};
use tsad_core::TsadError;

/// Point-adjusted confusion counts and derived metrics at one threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdPoint {
    pub threshold: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ThresholdPoint {
    fn from_counts(threshold: f64, tp: usize, fp: usize, positives: usize) -> Self {
        let false_negatives = positives - tp;
        if positives == 0 {
            return Self {
                threshold,
                true_positives: tp,
                false_positives: fp,
                false_negatives,
                precision: f64::NAN,
                recall: f64::NAN,
                f1: f64::NAN,
            };
        }

        let precision = if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        };
        let recall = tp as f64 / positives as f64;
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            threshold,
            true_positives: tp,
            false_positives: fp,
            false_negatives,
            precision,
            recall,
            f1,
        }
    }
}

/// Sorted, de-duplicated score values in ascending order; `-0.0` folds into `0.0`.
pub fn candidate_thresholds(scores: &[f64]) -> Vec<f64> {
    let mut thresholds = scores.iter().map(|&score| score + 0.0).collect::<Vec<_>>();
    thresholds.sort_by(f64::total_cmp);
    thresholds.dedup_by(|left, right| left.total_cmp(right).is_eq());
    thresholds
}

/// Point-adjusted precision/recall/F1 for every distinct score threshold, ascending.
///
/// At threshold `t` a timestep is predicted when `score >= t`; a ground-truth
/// segment counts as fully detected when its maximum score reaches `t`.
/// When the labels contain no positives every point carries `NaN` metrics.
pub fn adjusted_f1_sweep(
    scores: &[f64],
    labels: &[bool],
) -> Result<Vec<ThresholdPoint>, TsadError> {
    validate_scores_and_labels(scores, labels)?;

    let segments = anomaly_segments(labels);
    let positives = labels.iter().filter(|&&l| l).count();

    let mut segment_peaks = segments
        .iter()
        .map(|&(start, end)| (segment_max(&scores[start..end]), end - start))
        .collect::<Vec<_>>();
    segment_peaks.sort_by(|a, b| cmp_scores(a.0, b.0));
    // covered_from[i] = anomalous timesteps in segments whose peak ranks >= i.
    let mut covered_from = vec![0usize; segment_peaks.len() + 1];
    for idx in (0..segment_peaks.len()).rev() {
        covered_from[idx] = covered_from[idx + 1] + segment_peaks[idx].1;
    }

    let mut normal_scores = scores
        .iter()
        .zip(labels)
        .filter(|&(_, &label)| !label)
        .map(|(&score, _)| score)
        .collect::<Vec<_>>();
    normal_scores.sort_by(|&a, &b| cmp_scores(a, b));

    let points = candidate_thresholds(scores)
        .into_iter()
        .map(|threshold| {
            let first_hit_segment =
                segment_peaks.partition_point(|&(peak, _)| cmp_scores(peak, threshold).is_lt());
            let tp = covered_from[first_hit_segment];
            let first_flagged_normal =
                normal_scores.partition_point(|&score| cmp_scores(score, threshold).is_lt());
            let fp = normal_scores.len() - first_flagged_normal;
            ThresholdPoint::from_counts(threshold, tp, fp, positives)
        })
        .collect();

    Ok(points)
}

/// Threshold with the highest point-adjusted F1; ties keep the smallest threshold.
///
/// Returns `None` when the labels contain no positives.
pub fn best_adjusted_f1(
    scores: &[f64],
    labels: &[bool],
) -> Result<Option<ThresholdPoint>, TsadError> {
    let sweep = adjusted_f1_sweep(scores, labels)?;
    if !labels.iter().any(|&l| l) {
        return Ok(None);
    }

    let mut best: Option<ThresholdPoint> = None;
    for point in sweep {
        if best.is_none_or(|current| point.f1 > current.f1) {
            best = Some(point);
        }
    }
    Ok(best)
}

/// Point-adjusted metrics at a single explicit threshold.
///
/// Materializes the adjusted prediction sequence; [`adjusted_f1_sweep`] gives
/// identical counts for every threshold without doing so.
pub fn adjusted_metrics_at(
    scores: &[f64],
    labels: &[bool],
    threshold: f64,
) -> Result<ThresholdPoint, TsadError> {
    validate_scores_and_labels(scores, labels)?;
    if !threshold.is_finite() {
        return Err(TsadError::invalid_input(format!(
            "threshold must be finite; got {threshold}"
        )));
    }

    let predicted = scores.iter().map(|&s| s >= threshold).collect::<Vec<_>>();
    let adjusted = point_adjust(&predicted, labels)?;

    let mut tp = 0usize;
    let mut fp = 0usize;
    for (&pred, &label) in adjusted.iter().zip(labels) {
        match (pred, label) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            _ => {}
        }
    }
    let positives = labels.iter().filter(|&&l| l).count();
    Ok(ThresholdPoint::from_counts(threshold, tp, fp, positives))
}
