// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::CliError;
use crate::npy::parse_npy_bytes;
use std::fs;
use std::path::{Path, PathBuf};
use tsad_core::LabelSequence;
use tsad_experiment::parse_numeric_table;

/// Numeric table read from a `.csv` or `.npy` file, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedValues {
    pub path: PathBuf,
    pub format: &'static str,
    pub values: Vec<f64>,
    pub n: usize,
    pub d: usize,
}

impl LoadedValues {
    /// Values of a single-column table.
    pub fn into_column(self) -> Result<Vec<f64>, CliError> {
        if self.d != 1 {
            return Err(CliError::invalid_input(format!(
                "'{}' has {} columns; expected a single column",
                self.path.display(),
                self.d
            )));
        }
        Ok(self.values)
    }
}

pub fn load_values(path: &Path) -> Result<LoadedValues, CliError> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| {
            CliError::not_supported(format!(
                "unable to infer input format for '{}'; expected .csv or .npy",
                path.display()
            ))
        })?;

    let (format, (values, n, d)) = match extension.as_str() {
        "csv" => {
            let raw = fs::read_to_string(path).map_err(|source| {
                CliError::io(format!("failed to read '{}'", path.display()), source)
            })?;
            ("csv", parse_csv_data(raw.as_str())?)
        }
        "npy" => {
            let bytes = fs::read(path).map_err(|source| {
                CliError::io(format!("failed to read '{}'", path.display()), source)
            })?;
            ("npy", parse_npy_bytes(bytes.as_slice())?)
        }
        _ => {
            return Err(CliError::not_supported(format!(
                "unsupported input format '{extension}'; expected .csv or .npy"
            )));
        }
    };

    Ok(LoadedValues {
        path: path.to_path_buf(),
        format,
        values,
        n,
        d,
    })
}

/// One score per row.
pub fn load_scores(path: &Path) -> Result<Vec<f64>, CliError> {
    load_values(path)?.into_column()
}

/// One 0/1 label per row.
pub fn load_labels(path: &Path) -> Result<LabelSequence, CliError> {
    let values = load_values(path)?.into_column()?;
    Ok(LabelSequence::from_f64(&values)?)
}

pub(crate) fn parse_csv_data(raw: &str) -> Result<(Vec<f64>, usize, usize), CliError> {
    let table = parse_numeric_table(raw).map_err(CliError::invalid_input)?;
    Ok((table.values, table.n, table.d))
}
