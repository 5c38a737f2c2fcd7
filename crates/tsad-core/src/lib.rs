// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod detectors;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod model_config;
pub mod time_series;

pub use detectors::{Detector, DetectorFactory, DetectorInput, InputKind, check_input_kind};
pub use error::TsadError;
pub use labels::LabelSequence;
pub use metrics::{METRIC_COUNT, METRIC_NAMES, MetricTuple};
pub use model_config::{
    DataType, DifConfig, EifConfig, IForestConfig, LesinnConfig, ModelConfig, ModelKind,
    NetworkKind,
};
pub use time_series::{Series, SeriesView, SubSequence};
