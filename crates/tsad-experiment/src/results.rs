// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::ExperimentError;
use crate::aggregate::EntitySummary;
use crate::config::ExperimentConfig;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tsad_core::{METRIC_NAMES, ModelKind};

const RULE: &str = "---------------------------------------------------------";
const TIMESTAMP_FORMAT: &str = "%m-%d %H.%M.%S";

/// Column row that closes every header block.
pub fn column_line() -> String {
    let mut columns = vec!["data".to_string()];
    for name in METRIC_NAMES {
        columns.push(name.to_string());
        columns.push("std".to_string());
    }
    columns.push("time".to_string());
    columns.push("model".to_string());
    columns.join(", ")
}

/// Current local time in the results-file timestamp format.
pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Header block describing one invocation.
pub fn format_header(config: &ExperimentConfig, timestamp: &str) -> String {
    let mut out = String::new();
    out.push_str(timestamp);
    out.push_str("\n\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "model: {}, data dir: {}, dataset: {}, {}runs, \n",
        config.model.kind().as_str(),
        config.input_dir.display(),
        config.dataset.as_str(),
        config.runs
    ));
    for (name, value) in config.model.parameters() {
        out.push_str(&format!("Parameters,\t [{name}], \t\t  {value}\n"));
    }
    out.push_str(&format!("args,\t [seq_len], \t\t  {}\n", config.seq_len));
    out.push_str(&format!("args,\t [stride], \t\t  {}\n", config.stride));
    out.push_str(&format!("Note: {}\n", config.note));
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&column_line());
    out.push('\n');
    out
}

/// One data line: entity, mean/std pairs, mean elapsed seconds, model name.
pub fn format_summary_line(summary: &EntitySummary, model: ModelKind) -> String {
    let mut cells = vec![summary.entity.clone()];
    for (mean, std) in summary
        .mean
        .as_array()
        .into_iter()
        .zip(summary.std.as_array())
    {
        cells.push(format_metric(mean));
        cells.push(format_metric(std));
    }
    cells.push(format_seconds(summary.mean_elapsed_secs));
    // trailing space after the model name is part of the line format
    format!("{}, {} \n", cells.join(", "), model.as_str())
}

fn format_metric(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.4}")
    }
}

fn format_seconds(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.1}")
    }
}

/// Append-only results sink; every record is flushed as soon as it is written.
#[derive(Debug)]
pub struct ResultsWriter<W: Write> {
    inner: W,
}

impl ResultsWriter<File> {
    /// Opens `path` for appending, creating its parent directory if needed.
    pub fn open_append(path: &Path) -> Result<Self, ExperimentError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| {
                ExperimentError::io(
                    format!("failed to create '{}'", parent.display()),
                    source,
                )
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| {
                ExperimentError::io(format!("failed to open '{}'", path.display()), source)
            })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> ResultsWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_header(
        &mut self,
        config: &ExperimentConfig,
        timestamp: &str,
    ) -> Result<(), ExperimentError> {
        self.write_record(&format_header(config, timestamp))
    }

    pub fn write_summary(
        &mut self,
        summary: &EntitySummary,
        model: ModelKind,
    ) -> Result<(), ExperimentError> {
        self.write_record(&format_summary_line(summary, model))
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, ExperimentError> {
        self.inner
            .flush()
            .map_err(|source| ExperimentError::io("failed to flush results", source))?;
        Ok(self.inner)
    }

    fn write_record(&mut self, record: &str) -> Result<(), ExperimentError> {
        self.inner
            .write_all(record.as_bytes())
            .and_then(|()| self.inner.flush())
            .map_err(|source| ExperimentError::io("failed to write results", source))
    }
}
