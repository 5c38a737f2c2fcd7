// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{cmp_scores, validate_scores_and_labels};
use tsad_core::TsadError;

/// Cumulative confusion counts after admitting every score `>= threshold`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub threshold: f64,
    pub true_positives: usize,
    pub false_positives: usize,
}

/// Walks distinct score values in descending order, grouping tied scores.
///
/// The returned points are the operating points of a ranking classifier;
/// the last point admits every sample.
pub fn ranking_curve(scores: &[f64], labels: &[bool]) -> Result<Vec<CurvePoint>, TsadError> {
    validate_scores_and_labels(scores, labels)?;

    let mut order = (0..scores.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| cmp_scores(scores[b], scores[a]));

    let mut points = Vec::new();
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut idx = 0usize;
    while idx < order.len() {
        let threshold = scores[order[idx]] + 0.0;
        while idx < order.len() && cmp_scores(scores[order[idx]], threshold).is_eq() {
            if labels[order[idx]] {
                tp += 1;
            } else {
                fp += 1;
            }
            idx += 1;
        }
        points.push(CurvePoint {
            threshold,
            true_positives: tp,
            false_positives: fp,
        });
    }

    Ok(points)
}

/// Area under the ROC curve from raw scores (trapezoidal over distinct thresholds).
///
/// Returns `NaN` when the labels contain no positives or no negatives.
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> Result<f64, TsadError> {
    let curve = ranking_curve(scores, labels)?;
    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Ok(f64::NAN);
    }

    let p = positives as f64;
    let n = negatives as f64;
    let mut area = 0.0;
    let mut prev_tp = 0usize;
    let mut prev_fp = 0usize;
    for point in &curve {
        let d_fpr = (point.false_positives - prev_fp) as f64 / n;
        let tpr_sum = (point.true_positives + prev_tp) as f64 / p;
        area += d_fpr * tpr_sum / 2.0;
        prev_tp = point.true_positives;
        prev_fp = point.false_positives;
    }
    Ok(area)
}

/// Step-wise average precision: `sum_k (R_k - R_{k-1}) * P_k` over distinct thresholds.
///
/// Returns `NaN` when the labels contain no positives.
pub fn average_precision(scores: &[f64], labels: &[bool]) -> Result<f64, TsadError> {
    let curve = ranking_curve(scores, labels)?;
    let positives = labels.iter().filter(|&&l| l).count();
    if positives == 0 {
        return Ok(f64::NAN);
    }

    let p = positives as f64;
    let mut ap = 0.0;
    let mut prev_recall = 0.0;
    for point in &curve {
        let admitted = point.true_positives + point.false_positives;
        let precision = point.true_positives as f64 / admitted as f64;
        let recall = point.true_positives as f64 / p;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
    }
    Ok(ap)
}
