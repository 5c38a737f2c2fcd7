// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;
use tsad_core::TsadError;
use tsad_experiment::ExperimentError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Tsad(#[from] TsadError),

    #[error(transparent)]
    Experiment(#[from] ExperimentError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotSupported(String),

    #[error("failed to install logger: {0}")]
    Logging(String),
}

impl CliError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Stable code carried in the JSON error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Tsad(err) => err.code(),
            Self::Experiment(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotSupported(_) => "not_supported",
            Self::Logging(_) => "logging_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use tsad_core::TsadError;
    use tsad_experiment::ExperimentError;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            CliError::from(TsadError::configuration("bad")).code(),
            "configuration_error"
        );
        assert_eq!(
            CliError::from(ExperimentError::csv("x.csv", "bad")).code(),
            "csv_error"
        );
        assert_eq!(CliError::invalid_input("bad").code(), "invalid_input");
        assert_eq!(CliError::not_supported("bad").code(), "not_supported");
    }

    #[test]
    fn transparent_variants_keep_inner_message() {
        let err = CliError::from(TsadError::Alignment {
            scores: 5,
            labels: 6,
        });
        assert_eq!(
            err.to_string(),
            "alignment error: aligned scores have length 5, labels have length 6"
        );
    }
}
