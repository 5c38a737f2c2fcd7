// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::ExperimentError;
use crate::aggregate::{EntitySummary, RunRecord, round_to_tenth};
use crate::config::ExperimentConfig;
use crate::dataset::{DatasetLoader, EntityData};
use crate::results::{ResultsWriter, local_timestamp};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use tsad_core::{DetectorFactory, DetectorInput, Series, TsadError, check_input_kind};
use tsad_eval::{ScoreAlignment, evaluate_run};
use tsad_preprocess::make_windows;

/// Outcome of a completed invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperimentReport {
    pub results_path: PathBuf,
    pub entities: Vec<EntitySummary>,
}

/// Runs the benchmark and appends its results to [`ExperimentConfig::results_path`].
///
/// The header block is written before any data is loaded. Each entity's line
/// is flushed as soon as its runs finish, so an error on a later entity
/// leaves earlier lines in place.
pub fn run_experiment<L, F>(
    config: &ExperimentConfig,
    loader: &L,
    factory: &F,
) -> Result<ExperimentReport, ExperimentError>
where
    L: DatasetLoader + ?Sized,
    F: DetectorFactory + Sync + ?Sized,
{
    config.validate()?;
    let results_path = config.results_path();
    let mut writer = ResultsWriter::open_append(&results_path)?;
    info!(path = %results_path.display(), "appending results");

    let entities = run_experiment_with_writer(config, loader, factory, &mut writer)?;
    writer.finish()?;
    Ok(ExperimentReport {
        results_path,
        entities,
    })
}

/// [`run_experiment`] against an explicit results sink.
pub fn run_experiment_with_writer<L, F, W>(
    config: &ExperimentConfig,
    loader: &L,
    factory: &F,
    writer: &mut ResultsWriter<W>,
) -> Result<Vec<EntitySummary>, ExperimentError>
where
    L: DatasetLoader + ?Sized,
    F: DetectorFactory + Sync + ?Sized,
    W: Write,
{
    config.validate()?;
    writer.write_header(config, &local_timestamp())?;

    let entities = loader.load(config.dataset, &config.entities)?;
    info!(
        dataset = %config.dataset,
        entities = entities.len(),
        model = %config.model.kind(),
        runs = config.runs,
        "starting experiment"
    );

    let mut summaries = Vec::with_capacity(entities.len());
    for entity in &entities {
        let summary = run_entity(config, factory, entity)?;
        if summary.mean.has_nan() {
            warn!(
                entity = %summary.entity,
                "metrics contain NaN; labels may lack anomalies"
            );
        }
        writer.write_summary(&summary, config.model.kind())?;
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Runs every repetition on one entity and aggregates them.
pub fn run_entity<F>(
    config: &ExperimentConfig,
    factory: &F,
    entity: &EntityData,
) -> Result<EntitySummary, ExperimentError>
where
    F: DetectorFactory + Sync + ?Sized,
{
    entity.validate()?;
    let combined = entity.train.concat(&entity.test)?;

    let records = if can_run_parallel(config) {
        run_all_parallel(config, factory, entity, &combined)?
    } else {
        run_all_sequential(config, factory, entity, &combined)?
    };

    Ok(EntitySummary::from_runs(entity.name.clone(), records)?)
}

#[cfg(feature = "rayon")]
fn can_run_parallel(config: &ExperimentConfig) -> bool {
    config.parallel_runs && config.runs > 1
}

#[cfg(not(feature = "rayon"))]
fn can_run_parallel(config: &ExperimentConfig) -> bool {
    if config.parallel_runs {
        debug!("parallel_runs requested without the rayon feature; running sequentially");
    }
    false
}

#[cfg(feature = "rayon")]
fn run_all_parallel<F>(
    config: &ExperimentConfig,
    factory: &F,
    entity: &EntityData,
    combined: &Series,
) -> Result<Vec<RunRecord>, ExperimentError>
where
    F: DetectorFactory + Sync + ?Sized,
{
    (0..config.runs)
        .into_par_iter()
        .map(|run| run_once(config, factory, entity, combined, run))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn run_all_parallel<F>(
    config: &ExperimentConfig,
    factory: &F,
    entity: &EntityData,
    combined: &Series,
) -> Result<Vec<RunRecord>, ExperimentError>
where
    F: DetectorFactory + Sync + ?Sized,
{
    run_all_sequential(config, factory, entity, combined)
}

fn run_all_sequential<F>(
    config: &ExperimentConfig,
    factory: &F,
    entity: &EntityData,
    combined: &Series,
) -> Result<Vec<RunRecord>, ExperimentError>
where
    F: DetectorFactory + Sync + ?Sized,
{
    (0..config.runs)
        .map(|run| run_once(config, factory, entity, combined, run))
        .collect()
}

fn run_once<F>(
    config: &ExperimentConfig,
    factory: &F,
    entity: &EntityData,
    combined: &Series,
    run: usize,
) -> Result<RunRecord, ExperimentError>
where
    F: DetectorFactory + Sync + ?Sized,
{
    let started = Instant::now();
    let kind = config.model.kind();
    let seed = config.seed_for_run(run);
    info!(
        entity = %entity.name,
        model = %kind,
        "running [{}/{}]",
        run + 1,
        config.runs
    );

    let mut detector = factory.build_for_entity(&entity.name, &config.model, seed)?;
    let labels = entity.labels.as_slice();

    let metrics = if kind.uses_windows() {
        if entity.test.n() < config.seq_len {
            return Err(TsadError::invalid_input(format!(
                "entity '{}' has {} test rows, fewer than seq_len={}",
                entity.name,
                entity.test.n(),
                config.seq_len
            ))
            .into());
        }
        let fit_windows = make_windows(&combined.view(), config.seq_len, config.stride)?;
        let test_view = entity.test.view();
        let score_windows = make_windows(&test_view, config.seq_len, 1)?;
        debug!(
            fit_windows = fit_windows.len(),
            score_windows = score_windows.len(),
            seq_len = config.seq_len,
            channels = test_view.d(),
            "built windows"
        );

        let fit_input = DetectorInput::Windows(&fit_windows);
        check_input_kind(&*detector, &fit_input)?;
        detector.fit(&fit_input)?;
        let score_input = DetectorInput::Windows(&score_windows);
        check_input_kind(&*detector, &score_input)?;
        let scores = detector.decision_function(&score_input)?;
        evaluate_run(
            &scores,
            ScoreAlignment::Windowed {
                window_length: config.seq_len,
            },
            labels,
        )?
    } else {
        let fit_input = DetectorInput::Series(combined.view());
        check_input_kind(&*detector, &fit_input)?;
        detector.fit(&fit_input)?;
        let score_input = DetectorInput::Series(entity.test.view());
        check_input_kind(&*detector, &score_input)?;
        let scores = detector.decision_function(&score_input)?;
        debug!(
            fit_rows = combined.n(),
            scored_rows = scores.len(),
            "scored series"
        );
        evaluate_run(&scores, ScoreAlignment::PointWise, labels)?
    };

    let elapsed_secs = round_to_tenth(started.elapsed().as_secs_f64());
    info!(
        entity = %entity.name,
        run = run + 1,
        adj_auroc = metrics.auroc,
        adj_ap = metrics.average_precision,
        adj_f1 = metrics.f1,
        adj_p = metrics.precision,
        adj_r = metrics.recall,
        elapsed_secs,
        "run complete"
    );

    Ok(RunRecord {
        run,
        seed,
        metrics,
        elapsed_secs,
    })
}
