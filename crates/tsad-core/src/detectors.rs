// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{ModelConfig, SeriesView, SubSequence, TsadError};

/// Shape of input a detector consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// One score per timestep of the full series.
    PointWise,
    /// One score per sub-sequence window.
    Windowed,
}

/// Input handed to [`Detector::fit`] and [`Detector::decision_function`].
#[derive(Clone, Copy, Debug)]
pub enum DetectorInput<'a> {
    Series(SeriesView<'a>),
    Windows(&'a [SubSequence<'a>]),
}

impl DetectorInput<'_> {
    /// Number of scorable items: timesteps for a series, windows otherwise.
    pub fn len(&self) -> usize {
        match self {
            Self::Series(view) => view.n(),
            Self::Windows(windows) => windows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Series(_) => InputKind::PointWise,
            Self::Windows(_) => InputKind::Windowed,
        }
    }
}

/// Unsupervised anomaly detector contract: fit on unlabelled data, then score.
///
/// Higher scores mean more anomalous. `decision_function` returns exactly one
/// score per timestep (point-wise input) or per window (windowed input).
pub trait Detector {
    fn input_kind(&self) -> InputKind;

    fn fit(&mut self, x: &DetectorInput<'_>) -> Result<(), TsadError>;

    fn decision_function(&self, x: &DetectorInput<'_>) -> Result<Vec<f64>, TsadError>;
}

/// Builds a fresh detector per run from a validated config and a seed.
pub trait DetectorFactory {
    fn build(
        &self,
        config: &ModelConfig,
        seed: u64,
    ) -> Result<Box<dyn Detector + Send>, TsadError>;

    /// Builds the detector for one run on the named entity.
    ///
    /// Defaults to [`DetectorFactory::build`]; factories serving precomputed
    /// per-entity output override it.
    fn build_for_entity(
        &self,
        entity: &str,
        config: &ModelConfig,
        seed: u64,
    ) -> Result<Box<dyn Detector + Send>, TsadError> {
        let _ = entity;
        self.build(config, seed)
    }
}

/// Rejects inputs whose shape does not match what the detector consumes.
pub fn check_input_kind(detector: &dyn Detector, x: &DetectorInput<'_>) -> Result<(), TsadError> {
    if detector.input_kind() != x.kind() {
        return Err(TsadError::invalid_input(format!(
            "detector expects {:?} input but received {:?}",
            detector.input_kind(),
            x.kind()
        )));
    }
    Ok(())
}
