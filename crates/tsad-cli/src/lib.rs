// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod error;
pub mod input;
pub mod logging;
mod npy;
pub mod score_files;

pub use error::CliError;
pub use input::{LoadedValues, load_labels, load_scores, load_values};
pub use logging::{DEFAULT_LOG_LEVEL, init_logging, log_filter};
pub use score_files::{ScoreFileDetector, ScoreFileFactory};

use std::fs;
use std::path::Path;
use tsad_core::{ModelConfig, ModelKind, TsadError};

/// Hyperparameters for `kind`: the JSON file if given, otherwise the kind's defaults.
///
/// The file is a tagged [`ModelConfig`] (`{"model": "dif", ...}`) and must name
/// the same model as `kind`.
pub fn resolve_model_config(
    kind: ModelKind,
    config_path: Option<&Path>,
) -> Result<ModelConfig, CliError> {
    let Some(path) = config_path else {
        return Ok(kind.default_config());
    };

    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    let config = parse_model_config(&raw).map_err(|source| {
        CliError::json(format!("invalid model config '{}'", path.display()), source)
    })?;
    if config.kind() != kind {
        return Err(TsadError::configuration(format!(
            "model config '{}' describes '{}' but --model is '{}'",
            path.display(),
            config.kind(),
            kind
        ))
        .into());
    }
    config.validate()?;
    Ok(config)
}

pub fn parse_model_config(raw: &str) -> Result<ModelConfig, serde_json::Error> {
    serde_json::from_str(raw)
}
