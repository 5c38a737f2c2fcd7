// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;
use tsad_core::TsadError;

/// Failures of an experiment invocation.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Tsad(#[from] TsadError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed dataset file.
    #[error("failed to parse '{}': {message}", .path.display())]
    Csv { path: PathBuf, message: String },
}

impl ExperimentError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Csv {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Tsad(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Csv { .. } => "csv_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExperimentError;
    use tsad_core::TsadError;

    #[test]
    fn codes_delegate_to_wrapped_errors() {
        let err = ExperimentError::from(TsadError::Alignment {
            scores: 3,
            labels: 4,
        });
        assert_eq!(err.code(), "alignment_error");
        assert!(err.to_string().contains("aligned scores have length 3"));

        let err = ExperimentError::io(
            "failed to read 'x.csv'",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.code(), "io_error");
        assert_eq!(err.to_string(), "failed to read 'x.csv': missing");
    }

    #[test]
    fn csv_error_names_the_file() {
        let err = ExperimentError::csv("data/MSL/P-15_test.csv", "missing 'label' column");
        assert_eq!(err.code(), "csv_error");
        assert_eq!(
            err.to_string(),
            "failed to parse 'data/MSL/P-15_test.csv': missing 'label' column"
        );
    }
}
