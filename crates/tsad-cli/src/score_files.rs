// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::input::load_scores;
use std::path::{Path, PathBuf};
use tracing::debug;
use tsad_core::{Detector, DetectorFactory, DetectorInput, InputKind, ModelConfig, TsadError};

const SCORE_EXTENSIONS: [&str; 2] = ["npy", "csv"];

/// Serves scores an external detector wrote to disk.
///
/// `fit` is a no-op; `decision_function` returns the stored scores after
/// checking they cover every input item.
#[derive(Clone, Debug)]
pub struct ScoreFileDetector {
    path: PathBuf,
    kind: InputKind,
    scores: Vec<f64>,
}

impl ScoreFileDetector {
    pub fn open(path: &Path, kind: InputKind) -> Result<Self, TsadError> {
        let scores = load_scores(path).map_err(|err| TsadError::detector(err.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            scores,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Detector for ScoreFileDetector {
    fn input_kind(&self) -> InputKind {
        self.kind
    }

    fn fit(&mut self, _x: &DetectorInput<'_>) -> Result<(), TsadError> {
        Ok(())
    }

    fn decision_function(&self, x: &DetectorInput<'_>) -> Result<Vec<f64>, TsadError> {
        if self.scores.len() != x.len() {
            return Err(TsadError::detector(format!(
                "score file '{}' holds {} scores but the input has {} {}",
                self.path.display(),
                self.scores.len(),
                x.len(),
                match x.kind() {
                    InputKind::PointWise => "timesteps",
                    InputKind::Windowed => "windows",
                }
            )));
        }
        Ok(self.scores.clone())
    }
}

/// Resolves `<root>/<model>/<entity>/run_<i>.{npy,csv}` where `i = seed - seed_base`.
#[derive(Clone, Debug)]
pub struct ScoreFileFactory {
    root: PathBuf,
    seed_base: u64,
}

impl ScoreFileFactory {
    pub fn new(root: impl Into<PathBuf>, seed_base: u64) -> Self {
        Self {
            root: root.into(),
            seed_base,
        }
    }

    pub fn score_path(
        &self,
        entity: &str,
        config: &ModelConfig,
        seed: u64,
    ) -> Result<PathBuf, TsadError> {
        let run = seed.checked_sub(self.seed_base).ok_or_else(|| {
            TsadError::configuration(format!(
                "seed {seed} is below the seed base {}",
                self.seed_base
            ))
        })?;
        let stem = self
            .root
            .join(config.kind().as_str())
            .join(entity)
            .join(format!("run_{run}"));

        SCORE_EXTENSIONS
            .iter()
            .map(|ext| stem.with_extension(ext))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                TsadError::detector(format!(
                    "no score file for entity '{entity}' run {run}; expected '{}.npy' or '{}.csv'",
                    stem.display(),
                    stem.display()
                ))
            })
    }
}

impl DetectorFactory for ScoreFileFactory {
    fn build(
        &self,
        _config: &ModelConfig,
        _seed: u64,
    ) -> Result<Box<dyn Detector + Send>, TsadError> {
        Err(TsadError::not_supported(
            "score files are keyed by entity; use build_for_entity",
        ))
    }

    fn build_for_entity(
        &self,
        entity: &str,
        config: &ModelConfig,
        seed: u64,
    ) -> Result<Box<dyn Detector + Send>, TsadError> {
        let path = self.score_path(entity, config, seed)?;
        let kind = if config.kind().uses_windows() {
            InputKind::Windowed
        } else {
            InputKind::PointWise
        };
        debug!(path = %path.display(), ?kind, "loading precomputed scores");
        Ok(Box::new(ScoreFileDetector::open(&path, kind)?))
    }
}
