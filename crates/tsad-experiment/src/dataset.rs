// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::ExperimentError;
use crate::table::{check_width, data_rows, parse_cell, split_cells};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tsad_core::{LabelSequence, Series, TsadError};

const TRAIN_SUFFIX: &str = "_train.csv";
const TEST_SUFFIX: &str = "_test.csv";
const LABEL_COLUMN: &str = "label";
const TIMESTAMP_COLUMN: &str = "timestamp";

/// Benchmark dataset collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetId {
    Msl,
    Smap,
    Smd,
    Swat,
}

impl DatasetId {
    pub const ALL: [DatasetId; 4] = [Self::Msl, Self::Smap, Self::Smd, Self::Swat];

    pub fn parse(raw: &str) -> Result<Self, TsadError> {
        let normalized = raw.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                TsadError::configuration(format!(
                    "unknown dataset '{raw}'; expected one of: MSL, SMAP, SMD, SWaT"
                ))
            })
    }

    /// Directory name under the data root, also used in the results file name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Msl => "MSL",
            Self::Smap => "SMAP",
            Self::Smd => "SMD",
            Self::Swat => "SWaT",
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which entities of a dataset to evaluate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntitySelector {
    /// Every entity found on disk.
    Full,
    Named(Vec<String>),
}

impl EntitySelector {
    /// Parses `FULL` or a comma-separated list of entity names.
    ///
    /// Repeated names are kept once, at their first position.
    pub fn parse(raw: &str) -> Result<Self, TsadError> {
        let trimmed = raw.trim();
        if trimmed == "FULL" {
            return Ok(Self::Full);
        }

        let names = trimmed
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(idx, name)| {
                if name.is_empty() {
                    Err(TsadError::configuration(format!(
                        "entity list '{raw}' has an empty item at position {}",
                        idx + 1
                    )))
                } else {
                    Ok(name.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut unique = Vec::<String>::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Ok(Self::Named(unique))
    }
}

impl fmt::Display for EntitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("FULL"),
            Self::Named(names) => f.write_str(&names.join(",")),
        }
    }
}

/// One entity's train split, test split and test labels.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityData {
    pub name: String,
    pub train: Series,
    pub test: Series,
    pub labels: LabelSequence,
}

impl EntityData {
    /// Checks that both splits share a channel count and labels cover the test split.
    pub fn validate(&self) -> Result<(), TsadError> {
        if self.train.d() != self.test.d() {
            return Err(TsadError::invalid_input(format!(
                "entity '{}' train split has {} channels but test split has {}",
                self.name,
                self.train.d(),
                self.test.d()
            )));
        }
        if self.labels.len() != self.test.n() {
            return Err(TsadError::invalid_input(format!(
                "entity '{}' has {} labels for {} test rows",
                self.name,
                self.labels.len(),
                self.test.n()
            )));
        }
        Ok(())
    }
}

/// Source of benchmark entities.
pub trait DatasetLoader {
    fn load(
        &self,
        dataset: DatasetId,
        selector: &EntitySelector,
    ) -> Result<Vec<EntityData>, ExperimentError>;
}

/// Reads `<root>/<DATASET>/<entity>_train.csv` and `<entity>_test.csv`.
///
/// Files need a header row. The test file must carry a `label` column; the
/// train file's `label` column, if any, is dropped. A `timestamp` column is
/// ignored in both.
#[derive(Clone, Debug)]
pub struct CsvDatasetLoader {
    root: PathBuf,
}

impl CsvDatasetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entity names with a train file under `dir`, sorted.
    fn discover_entities(dir: &Path) -> Result<Vec<String>, ExperimentError> {
        let entries = fs::read_dir(dir).map_err(|source| {
            ExperimentError::io(format!("failed to list '{}'", dir.display()), source)
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| {
                ExperimentError::io(format!("failed to list '{}'", dir.display()), source)
            })?;
            let file_name = entry.file_name();
            if let Some(name) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(TRAIN_SUFFIX))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load_entity(dir: &Path, name: &str) -> Result<EntityData, ExperimentError> {
        let train_path = dir.join(format!("{name}{TRAIN_SUFFIX}"));
        let test_path = dir.join(format!("{name}{TEST_SUFFIX}"));

        let (train, _) = read_table(&train_path, LabelColumn::Drop)?;
        let (test, labels) = read_table(&test_path, LabelColumn::Required)?;
        let labels = labels.ok_or_else(|| {
            ExperimentError::csv(&test_path, format!("missing '{LABEL_COLUMN}' column"))
        })?;

        let entity = EntityData {
            name: name.to_string(),
            train,
            test,
            labels,
        };
        entity
            .validate()
            .map_err(|err| ExperimentError::csv(&test_path, err.to_string()))?;

        debug!(
            entity = name,
            train_rows = entity.train.n(),
            test_rows = entity.test.n(),
            channels = entity.test.d(),
            anomalies = entity.labels.n_positive(),
            "loaded entity"
        );
        Ok(entity)
    }
}

impl DatasetLoader for CsvDatasetLoader {
    fn load(
        &self,
        dataset: DatasetId,
        selector: &EntitySelector,
    ) -> Result<Vec<EntityData>, ExperimentError> {
        let dir = self.root.join(dataset.as_str());
        let names = match selector {
            EntitySelector::Full => Self::discover_entities(&dir)?,
            EntitySelector::Named(names) => {
                let mut names = names.clone();
                names.sort();
                names.dedup();
                names
            }
        };
        if names.is_empty() {
            return Err(ExperimentError::Tsad(TsadError::invalid_input(format!(
                "no entities with a '*{TRAIN_SUFFIX}' file in '{}'",
                dir.display()
            ))));
        }

        names
            .iter()
            .map(|name| Self::load_entity(&dir, name))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LabelColumn {
    Required,
    Drop,
}

fn read_table(
    path: &Path,
    label_column: LabelColumn,
) -> Result<(Series, Option<LabelSequence>), ExperimentError> {
    let raw = fs::read_to_string(path).map_err(|source| {
        ExperimentError::io(format!("failed to read '{}'", path.display()), source)
    })?;
    parse_table(&raw, label_column).map_err(|message| ExperimentError::csv(path, message))
}

/// Splits a headed CSV into channel values and an optional label column.
fn parse_table(
    raw: &str,
    label_column: LabelColumn,
) -> Result<(Series, Option<LabelSequence>), String> {
    let mut rows = data_rows(raw);
    let header = split_cells(rows.next().ok_or_else(|| "CSV input is empty".to_string())?);

    let label_idx = header
        .iter()
        .position(|name| name.eq_ignore_ascii_case(LABEL_COLUMN));
    if label_column == LabelColumn::Required && label_idx.is_none() {
        return Err(format!("missing '{LABEL_COLUMN}' column"));
    }
    let channel_idx = header
        .iter()
        .enumerate()
        .filter(|(idx, name)| {
            Some(*idx) != label_idx && !name.eq_ignore_ascii_case(TIMESTAMP_COLUMN)
        })
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    if channel_idx.is_empty() {
        return Err("header has no channel columns".to_string());
    }

    let mut values = Vec::<f64>::new();
    let mut labels = Vec::<f64>::new();
    let mut n = 0usize;
    for (row_idx, row) in rows.enumerate() {
        // header is line 1
        let line = row_idx + 2;
        let cells = split_cells(row);
        check_width(&cells, header.len(), line)?;

        for &col in &channel_idx {
            values.push(parse_cell(cells[col], line, col + 1)?);
        }
        if let (Some(col), LabelColumn::Required) = (label_idx, label_column) {
            labels.push(parse_cell(cells[col], line, col + 1)?);
        }
        n += 1;
    }
    if n == 0 {
        return Err("CSV input has a header but no data rows".to_string());
    }

    let series = Series::new(values, n, channel_idx.len()).map_err(|err| err.to_string())?;
    let labels = match label_column {
        LabelColumn::Required => {
            Some(LabelSequence::from_f64(&labels).map_err(|err| err.to_string())?)
        }
        LabelColumn::Drop => None,
    };
    Ok((series, labels))
}
