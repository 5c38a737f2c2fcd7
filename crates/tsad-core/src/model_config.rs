// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::TsadError;
use std::fmt;

const DEFAULT_MAX_SAMPLES: usize = 256;
const DEFAULT_FOREST_ESTIMATORS: usize = 100;

/// Detector families the benchmark driver knows about.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Dif,
    Eif,
    Lesinn,
    IForest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [Self::Dif, Self::Eif, Self::Lesinn, Self::IForest];

    pub fn parse(raw: &str) -> Result<Self, TsadError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dif" => Ok(Self::Dif),
            "eif" => Ok(Self::Eif),
            "lesinn" => Ok(Self::Lesinn),
            "iforest" => Ok(Self::IForest),
            _ => Err(TsadError::configuration(format!(
                "unknown model '{raw}'; expected one of: dif, eif, lesinn, iforest"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dif => "dif",
            Self::Eif => "eif",
            Self::Lesinn => "lesinn",
            Self::IForest => "iforest",
        }
    }

    /// Windowed models consume sub-sequences and emit `n - seq_len + 1` scores.
    pub fn uses_windows(self) -> bool {
        matches!(self, Self::Dif)
    }

    /// Default configuration used when no hyperparameter file is supplied.
    pub fn default_config(self) -> ModelConfig {
        match self {
            Self::Dif => ModelConfig::Dif(DifConfig::for_time_series()),
            Self::Eif => ModelConfig::Eif(EifConfig::default()),
            Self::Lesinn => ModelConfig::Lesinn(LesinnConfig::default()),
            Self::IForest => ModelConfig::IForest(IForestConfig::default()),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representation network used by deep isolation forests.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetworkKind {
    #[default]
    Mlp,
    Gru,
    Lstm,
}

impl NetworkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mlp => "mlp",
            Self::Gru => "gru",
            Self::Lstm => "lstm",
        }
    }
}

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataType {
    #[default]
    Tabular,
    Ts,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Ts => "ts",
        }
    }
}

/// Deep isolation forest hyperparameters.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct DifConfig {
    pub n_ensemble: usize,
    pub n_estimators: usize,
    pub max_samples: usize,
    pub hidden_dims: Vec<usize>,
    pub rep_dim: usize,
    pub layers: usize,
    pub batch_size: usize,
    pub network: NetworkKind,
    pub data_type: DataType,
}

impl Default for DifConfig {
    fn default() -> Self {
        Self {
            n_ensemble: 50,
            n_estimators: 6,
            max_samples: DEFAULT_MAX_SAMPLES,
            hidden_dims: vec![500, 100],
            rep_dim: 20,
            layers: 2,
            batch_size: 64,
            network: NetworkKind::Mlp,
            data_type: DataType::Tabular,
        }
    }
}

impl DifConfig {
    /// Tabular defaults with the recurrent time-series overrides applied.
    pub fn for_time_series() -> Self {
        Self {
            batch_size: 10_000,
            layers: 1,
            hidden_dims: vec![20],
            data_type: DataType::Ts,
            network: NetworkKind::Gru,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), TsadError> {
        positive("dif.n_ensemble", self.n_ensemble)?;
        positive("dif.n_estimators", self.n_estimators)?;
        positive("dif.max_samples", self.max_samples)?;
        positive("dif.rep_dim", self.rep_dim)?;
        positive("dif.layers", self.layers)?;
        positive("dif.batch_size", self.batch_size)?;
        if self.hidden_dims.is_empty() || self.hidden_dims.contains(&0) {
            return Err(TsadError::configuration(format!(
                "dif.hidden_dims must be a non-empty list of positive sizes; got {:?}",
                self.hidden_dims
            )));
        }
        Ok(())
    }
}

/// Extended isolation forest hyperparameters.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct EifConfig {
    pub n_estimators: usize,
    pub max_samples: usize,
    /// Hyperplane extension level; `None` means fully extended (`d - 1`).
    pub extension_level: Option<usize>,
}

impl Default for EifConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_FOREST_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            extension_level: None,
        }
    }
}

/// LeSiNN (nearest-neighbour ensemble) hyperparameters.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct LesinnConfig {
    pub ensemble_size: usize,
    pub subsample_size: usize,
}

impl Default for LesinnConfig {
    fn default() -> Self {
        Self {
            ensemble_size: 50,
            subsample_size: 8,
        }
    }
}

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct IForestConfig {
    pub n_estimators: usize,
    pub max_samples: usize,
}

impl Default for IForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_FOREST_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

/// Hyperparameters for one detector kind.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "model", rename_all = "lowercase")
)]
#[derive(Clone, Debug, PartialEq)]
pub enum ModelConfig {
    Dif(DifConfig),
    Eif(EifConfig),
    Lesinn(LesinnConfig),
    IForest(IForestConfig),
}

impl ModelConfig {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Dif(_) => ModelKind::Dif,
            Self::Eif(_) => ModelKind::Eif,
            Self::Lesinn(_) => ModelKind::Lesinn,
            Self::IForest(_) => ModelKind::IForest,
        }
    }

    pub fn validate(&self) -> Result<(), TsadError> {
        match self {
            Self::Dif(config) => config.validate(),
            Self::Eif(config) => {
                positive("eif.n_estimators", config.n_estimators)?;
                positive("eif.max_samples", config.max_samples)
            }
            Self::Lesinn(config) => {
                positive("lesinn.ensemble_size", config.ensemble_size)?;
                positive("lesinn.subsample_size", config.subsample_size)
            }
            Self::IForest(config) => {
                positive("iforest.n_estimators", config.n_estimators)?;
                positive("iforest.max_samples", config.max_samples)
            }
        }
    }

    /// Hyperparameters as `(name, value)` pairs in declaration order.
    pub fn parameters(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Dif(c) => vec![
                ("n_ensemble", c.n_ensemble.to_string()),
                ("n_estimators", c.n_estimators.to_string()),
                ("max_samples", c.max_samples.to_string()),
                ("hidden_dims", format!("{:?}", c.hidden_dims)),
                ("rep_dim", c.rep_dim.to_string()),
                ("layers", c.layers.to_string()),
                ("batch_size", c.batch_size.to_string()),
                ("network_name", c.network.as_str().to_string()),
                ("data_type", c.data_type.as_str().to_string()),
            ],
            Self::Eif(c) => vec![
                ("n_estimators", c.n_estimators.to_string()),
                ("max_samples", c.max_samples.to_string()),
                (
                    "extension_level",
                    c.extension_level
                        .map_or_else(|| "full".to_string(), |level| level.to_string()),
                ),
            ],
            Self::Lesinn(c) => vec![
                ("ensemble_size", c.ensemble_size.to_string()),
                ("subsample_size", c.subsample_size.to_string()),
            ],
            Self::IForest(c) => vec![
                ("n_estimators", c.n_estimators.to_string()),
                ("max_samples", c.max_samples.to_string()),
            ],
        }
    }
}

fn positive(name: &str, value: usize) -> Result<(), TsadError> {
    if value == 0 {
        return Err(TsadError::configuration(format!("{name} must be >= 1; got 0")));
    }
    Ok(())
}
