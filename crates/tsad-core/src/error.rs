// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Error taxonomy shared by every tsad crate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TsadError {
    /// Malformed series, labels, scores or windowing parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unrecognized model/dataset identifier or invalid hyperparameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Aligned score length differs from the label length.
    #[error("alignment error: aligned scores have length {scores}, labels have length {labels}")]
    Alignment { scores: usize, labels: usize },

    #[error("not supported: {0}")]
    NotSupported(String),

    /// Failure reported by a detector during fit or scoring.
    #[error("detector error: {0}")]
    Detector(String),
}

impl TsadError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector(msg.into())
    }

    /// Stable machine-readable code, used by structured error output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Configuration(_) => "configuration_error",
            Self::Alignment { .. } => "alignment_error",
            Self::NotSupported(_) => "not_supported",
            Self::Detector(_) => "detector_error",
        }
    }
}
