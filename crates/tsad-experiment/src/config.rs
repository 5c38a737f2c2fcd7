// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::dataset::{DatasetId, EntitySelector};
use std::path::PathBuf;
use tsad_core::{ModelConfig, TsadError};

pub const DEFAULT_RUNS: usize = 1;
pub const DEFAULT_SEQ_LEN: usize = 100;
pub const DEFAULT_STRIDE: usize = 1;
pub const DEFAULT_SEED_BASE: u64 = 42;
pub const DEFAULT_DATA_ROOT: &str = "data/";
pub const DEFAULT_INPUT_DIR: &str = "time-series/";
pub const DEFAULT_OUTPUT_DIR: &str = "&ts_record/";
pub const DEFAULT_ENTITIES: &str = "P-15";

/// Everything one benchmark invocation needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperimentConfig {
    pub model: ModelConfig,
    pub runs: usize,
    pub data_root: PathBuf,
    /// Directory under `data_root` holding one folder per dataset.
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dataset: DatasetId,
    pub entities: EntitySelector,
    pub seq_len: usize,
    pub stride: usize,
    pub note: String,
    /// Run `i` is seeded with `seed_base + i`.
    pub seed_base: u64,
    /// Execute the runs of one entity concurrently (requires the `rayon` feature).
    pub parallel_runs: bool,
}

impl ExperimentConfig {
    pub fn new(model: ModelConfig, dataset: DatasetId) -> Self {
        Self {
            model,
            runs: DEFAULT_RUNS,
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dataset,
            entities: EntitySelector::Named(vec![DEFAULT_ENTITIES.to_string()]),
            seq_len: DEFAULT_SEQ_LEN,
            stride: DEFAULT_STRIDE,
            note: String::new(),
            seed_base: DEFAULT_SEED_BASE,
            parallel_runs: false,
        }
    }

    pub fn validate(&self) -> Result<(), TsadError> {
        if self.runs == 0 {
            return Err(TsadError::configuration("runs must be >= 1; got 0"));
        }
        if self.seq_len == 0 {
            return Err(TsadError::configuration("seq_len must be >= 1; got 0"));
        }
        if self.stride == 0 {
            return Err(TsadError::configuration("stride must be >= 1; got 0"));
        }
        self.model.validate()
    }

    pub fn dataset_root(&self) -> PathBuf {
        self.data_root.join(&self.input_dir)
    }

    pub fn seed_for_run(&self, run: usize) -> u64 {
        self.seed_base.wrapping_add(run as u64)
    }

    /// `<output_dir>/<model>_<DATASET>_results.csv`
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}_results.csv",
            self.model.kind().as_str(),
            self.dataset.as_str()
        ))
    }
}
