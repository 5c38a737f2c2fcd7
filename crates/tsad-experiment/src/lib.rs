// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod experiment;
pub mod results;
pub mod table;

pub use aggregate::{EntitySummary, RunRecord, aggregate, round_to_tenth};
pub use config::{DEFAULT_SEED_BASE, ExperimentConfig};
pub use dataset::{CsvDatasetLoader, DatasetId, DatasetLoader, EntityData, EntitySelector};
pub use error::ExperimentError;
pub use experiment::{ExperimentReport, run_entity, run_experiment, run_experiment_with_writer};
pub use results::{
    ResultsWriter, column_line, format_header, format_summary_line, local_timestamp,
};
pub use table::{NumericTable, parse_numeric_table};
