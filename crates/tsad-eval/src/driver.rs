// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{EvalConfig, EvalReport, evaluate_detailed};
use tsad_core::{MetricTuple, TsadError};

/// How raw detector output lines up with the evaluated series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreAlignment {
    /// One score per timestep; passed through unchanged.
    PointWise,
    /// One score per window ending at each timestep `>= window_length - 1`.
    Windowed { window_length: usize },
}

/// Value used for the `window_length - 1` leading positions no window ends at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PadPolicy {
    #[default]
    Zero,
    MinScore,
    MaxScore,
}

impl PadPolicy {
    pub fn parse(raw: &str) -> Result<Self, TsadError> {
        match raw.to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "min" | "min_score" => Ok(Self::MinScore),
            "max" | "max_score" => Ok(Self::MaxScore),
            _ => Err(TsadError::configuration(format!(
                "invalid pad policy '{raw}'; expected one of: zero, min, max"
            ))),
        }
    }

    fn pad_value(self, raw_scores: &[f64]) -> f64 {
        let extreme = match self {
            Self::Zero => return 0.0,
            Self::MinScore => raw_scores.iter().copied().min_by(f64::total_cmp),
            Self::MaxScore => raw_scores.iter().copied().max_by(f64::total_cmp),
        };
        extreme.unwrap_or(0.0)
    }
}

/// Left-pads windowed scores so they index the same timesteps as the labels.
pub fn align_scores(
    raw_scores: &[f64],
    alignment: ScoreAlignment,
    pad: PadPolicy,
) -> Result<Vec<f64>, TsadError> {
    match alignment {
        ScoreAlignment::PointWise => Ok(raw_scores.to_vec()),
        ScoreAlignment::Windowed { window_length } => {
            if window_length == 0 {
                return Err(TsadError::invalid_input("window_length must be >= 1; got 0"));
            }
            let padding = window_length - 1;
            let mut aligned = Vec::with_capacity(raw_scores.len() + padding);
            aligned.resize(padding, pad.pad_value(raw_scores));
            aligned.extend_from_slice(raw_scores);
            Ok(aligned)
        }
    }
}

/// Aligns raw detector scores with the labels, then evaluates them.
///
/// Windowed scores must have length `labels.len() - window_length + 1`; any
/// other length is reported as [`TsadError::Alignment`].
pub fn evaluate_run(
    raw_scores: &[f64],
    alignment: ScoreAlignment,
    labels: &[bool],
) -> Result<MetricTuple, TsadError> {
    Ok(evaluate_run_with(
        raw_scores,
        alignment,
        labels,
        PadPolicy::default(),
        &EvalConfig::default(),
    )?
    .metrics)
}

/// [`evaluate_run`] with an explicit padding policy and evaluation config.
pub fn evaluate_run_with(
    raw_scores: &[f64],
    alignment: ScoreAlignment,
    labels: &[bool],
    pad: PadPolicy,
    config: &EvalConfig,
) -> Result<EvalReport, TsadError> {
    let aligned = align_scores(raw_scores, alignment, pad)?;
    if aligned.len() != labels.len() {
        return Err(TsadError::Alignment {
            scores: aligned.len(),
            labels: labels.len(),
        });
    }
    evaluate_detailed(&aligned, labels, config)
}
