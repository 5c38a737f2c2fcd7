// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use tsad_core::TsadError;

/// Returns the `[start, end)` ranges of contiguous anomalous timesteps.
pub fn anomaly_segments(labels: &[bool]) -> Vec<(usize, usize)> {
    let mut segments = Vec::new();
    let mut open: Option<usize> = None;
    for (idx, &label) in labels.iter().enumerate() {
        match (label, open) {
            (true, None) => open = Some(idx),
            (false, Some(start)) => {
                segments.push((start, idx));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        segments.push((start, labels.len()));
    }
    segments
}

/// Segment point-adjustment of binary predictions.
///
/// Every ground-truth segment containing at least one predicted timestep
/// becomes fully predicted. Timesteps outside anomalous segments are copied
/// unchanged, so adjustment never removes a prediction.
pub fn point_adjust(predicted: &[bool], labels: &[bool]) -> Result<Vec<bool>, TsadError> {
    if predicted.len() != labels.len() {
        return Err(TsadError::invalid_input(format!(
            "predictions and labels must have equal length; got {} and {}",
            predicted.len(),
            labels.len()
        )));
    }

    let mut adjusted = predicted.to_vec();
    for (start, end) in anomaly_segments(labels) {
        if predicted[start..end].iter().any(|&p| p) {
            adjusted[start..end].fill(true);
        }
    }
    Ok(adjusted)
}

/// Replaces every score inside a ground-truth segment with the segment maximum.
///
/// Thresholding the adjusted scores at `t` gives the same predictions as
/// thresholding the raw scores at `t` and then applying [`point_adjust`].
pub fn adjust_scores(scores: &[f64], labels: &[bool]) -> Result<Vec<f64>, TsadError> {
    if scores.len() != labels.len() {
        return Err(TsadError::invalid_input(format!(
            "scores and labels must have equal length; got {} and {}",
            scores.len(),
            labels.len()
        )));
    }

    let mut adjusted = scores.to_vec();
    for (start, end) in anomaly_segments(labels) {
        let segment_max = segment_max(&scores[start..end]);
        adjusted[start..end].fill(segment_max);
    }
    Ok(adjusted)
}

pub(crate) fn segment_max(scores: &[f64]) -> f64 {
    scores
        .iter()
        .copied()
        .max_by(f64::total_cmp)
        .unwrap_or(f64::NEG_INFINITY)
}
