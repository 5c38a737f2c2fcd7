// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tsad_cli::{
    CliError, ScoreFileFactory, init_logging, load_labels, load_values, resolve_model_config,
};
use tsad_core::{MetricTuple, ModelKind};
use tsad_eval::{EvalConfig, PadPolicy, RankingBasis, ScoreAlignment, evaluate_run_with};
use tsad_experiment::config::{
    DEFAULT_DATA_ROOT, DEFAULT_ENTITIES, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_RUNS,
    DEFAULT_SEQ_LEN, DEFAULT_STRIDE,
};
use tsad_experiment::{
    CsvDatasetLoader, DEFAULT_SEED_BASE, DatasetId, EntitySelector, EntitySummary,
    ExperimentConfig, run_experiment,
};

#[derive(Debug, Parser)]
#[command(name = "tsad")]
#[command(about = "Point-adjusted anomaly detection benchmark harness")]
#[command(version)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the benchmark over a dataset using precomputed detector scores
    Run(RunArgs),
    /// Evaluate one score file against one label file
    Eval(EvalArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// dif, eif, lesinn or iforest
    #[arg(long, default_value = "eif")]
    model: String,

    #[arg(long, default_value_t = DEFAULT_RUNS)]
    runs: usize,

    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    data_root: PathBuf,

    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// MSL, SMAP, SMD or SWaT
    #[arg(long, default_value = "MSL")]
    dataset: String,

    /// FULL or a comma-separated list of entity names
    #[arg(long, default_value = DEFAULT_ENTITIES)]
    entities: String,

    #[arg(long, default_value_t = DEFAULT_SEQ_LEN)]
    seq_len: usize,

    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    stride: usize,

    #[arg(long, default_value = "")]
    note: String,

    /// JSON hyperparameters, e.g. {"model": "dif", "layers": 1}
    #[arg(long, value_name = "FILE")]
    model_config: Option<PathBuf>,

    /// Directory holding <model>/<entity>/run_<i>.{npy,csv}
    #[arg(long, value_name = "DIR")]
    scores_dir: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SEED_BASE)]
    seed_base: u64,

    /// Run repetitions of one entity in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the JSON summary here instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct EvalArgs {
    #[arg(long, value_name = "FILE")]
    scores: PathBuf,

    #[arg(long, value_name = "FILE")]
    labels: PathBuf,

    /// Treat scores as one per window of this length and left-pad them
    #[arg(long)]
    window_length: Option<usize>,

    /// zero, min or max
    #[arg(long, default_value = "zero")]
    pad: String,

    /// raw or segment-adjusted
    #[arg(long, default_value = "raw")]
    ranking: String,

    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize, PartialEq)]
struct MetricsOutput {
    adj_auroc: f64,
    adj_ap: f64,
    adj_f1: f64,
    adj_p: f64,
    adj_r: f64,
}

impl From<MetricTuple> for MetricsOutput {
    fn from(value: MetricTuple) -> Self {
        Self {
            adj_auroc: value.auroc,
            adj_ap: value.average_precision,
            adj_f1: value.f1,
            adj_p: value.precision,
            adj_r: value.recall,
        }
    }
}

#[derive(Serialize)]
struct ThresholdOutput {
    threshold: f64,
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
}

#[derive(Serialize)]
struct EvalOutput {
    command: &'static str,
    scores_format: &'static str,
    n: usize,
    n_positive: usize,
    n_segments: usize,
    window_length: Option<usize>,
    ranking: &'static str,
    metrics: MetricsOutput,
    best: Option<ThresholdOutput>,
}

#[derive(Serialize)]
struct RunEntityOutput {
    entity: String,
    mean: MetricsOutput,
    std: MetricsOutput,
    mean_elapsed_secs: f64,
    runs: Vec<MetricsOutput>,
}

impl From<&EntitySummary> for RunEntityOutput {
    fn from(summary: &EntitySummary) -> Self {
        Self {
            entity: summary.entity.clone(),
            mean: summary.mean.into(),
            std: summary.std.into(),
            mean_elapsed_secs: summary.mean_elapsed_secs,
            runs: summary.runs.iter().map(|run| run.metrics.into()).collect(),
        }
    }
}

#[derive(Serialize)]
struct RunOutput {
    command: &'static str,
    model: &'static str,
    dataset: &'static str,
    results_path: String,
    entities: Vec<RunEntityOutput>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => return Err(CliError::invalid_input(err.to_string().trim_end())),
    };
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Eval(args) => handle_eval(args),
    }
}

fn experiment_config(args: &RunArgs) -> Result<ExperimentConfig, CliError> {
    let kind = ModelKind::parse(&args.model)?;
    let model = resolve_model_config(kind, args.model_config.as_deref())?;
    let dataset = DatasetId::parse(&args.dataset)?;

    let mut config = ExperimentConfig::new(model, dataset);
    config.runs = args.runs;
    config.data_root = args.data_root.clone();
    config.input_dir = args.input_dir.clone();
    config.output_dir = args.output_dir.clone();
    config.entities = EntitySelector::parse(&args.entities)?;
    config.seq_len = args.seq_len;
    config.stride = args.stride;
    config.note = args.note.clone();
    config.seed_base = args.seed_base;
    config.parallel_runs = args.parallel;
    config.validate()?;
    Ok(config)
}

fn handle_run(args: RunArgs) -> Result<(), CliError> {
    let config = experiment_config(&args)?;
    let loader = CsvDatasetLoader::new(config.dataset_root());
    let factory = ScoreFileFactory::new(&args.scores_dir, config.seed_base);
    info!(
        model = %config.model.kind(),
        dataset = %config.dataset,
        entities = %config.entities,
        scores_dir = %args.scores_dir.display(),
        "starting run"
    );

    let report = run_experiment(&config, &loader, &factory)?;
    write_json_output(
        &RunOutput {
            command: "run",
            model: config.model.kind().as_str(),
            dataset: config.dataset.as_str(),
            results_path: report.results_path.display().to_string(),
            entities: report.entities.iter().map(RunEntityOutput::from).collect(),
        },
        args.output.as_deref(),
    )
}

fn handle_eval(args: EvalArgs) -> Result<(), CliError> {
    let scores = load_values(&args.scores)?;
    let scores_format = scores.format;
    let scores = scores.into_column()?;
    let labels = load_labels(&args.labels)?;

    let alignment = match args.window_length {
        Some(window_length) => ScoreAlignment::Windowed { window_length },
        None => ScoreAlignment::PointWise,
    };
    let pad = PadPolicy::parse(&args.pad)?;
    let ranking = RankingBasis::parse(&args.ranking)?;

    let report = evaluate_run_with(
        &scores,
        alignment,
        labels.as_slice(),
        pad,
        &EvalConfig { ranking },
    )?;

    write_json_output(
        &EvalOutput {
            command: "eval",
            scores_format,
            n: report.n,
            n_positive: report.n_positive,
            n_segments: report.n_segments,
            window_length: args.window_length,
            ranking: match ranking {
                RankingBasis::Raw => "raw",
                RankingBasis::SegmentAdjusted => "segment-adjusted",
            },
            metrics: report.metrics.into(),
            best: report.best.map(|point| ThresholdOutput {
                threshold: point.threshold,
                true_positives: point.true_positives,
                false_positives: point.false_positives,
                false_negatives: point.false_negatives,
            }),
        },
        args.output.as_deref(),
    )
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, MetricsOutput, experiment_config, handle_eval};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tsad_core::{MetricTuple, ModelKind};
    use tsad_experiment::{DatasetId, EntitySelector};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).expect("arguments should parse")
    }

    #[test]
    fn run_defaults_follow_the_benchmark_driver() {
        let cli = parse(&["tsad", "run", "--scores-dir", "scores"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.model, "eif");
        assert_eq!(args.runs, 1);
        assert_eq!(args.data_root, PathBuf::from("data/"));
        assert_eq!(args.input_dir, PathBuf::from("time-series/"));
        assert_eq!(args.output_dir, PathBuf::from("&ts_record/"));
        assert_eq!(args.entities, "P-15");
        assert_eq!((args.seq_len, args.stride), (100, 1));
        assert_eq!(args.seed_base, 42);

        let config = experiment_config(&args).expect("config");
        assert_eq!(config.model.kind(), ModelKind::Eif);
        assert_eq!(config.dataset, DatasetId::Msl);
    }

    #[test]
    fn run_parses_overrides() {
        let cli = parse(&[
            "tsad",
            "-v",
            "run",
            "--model",
            "DIF",
            "--dataset",
            "smd",
            "--entities",
            "FULL",
            "--runs",
            "5",
            "--seq-len",
            "30",
            "--parallel",
            "--scores-dir",
            "scores",
        ]);
        assert!(cli.verbose);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = experiment_config(&args).expect("config");
        assert_eq!(config.model.kind(), ModelKind::Dif);
        assert_eq!(config.dataset, DatasetId::Smd);
        assert_eq!(config.entities, EntitySelector::Full);
        assert_eq!((config.runs, config.seq_len), (5, 30));
        assert!(config.parallel_runs);
    }

    #[test]
    fn unknown_model_and_dataset_are_configuration_errors() {
        let cli = parse(&["tsad", "run", "--model", "knn", "--scores-dir", "s"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let err = experiment_config(&args).expect_err("knn");
        assert_eq!(err.code(), "configuration_error");

        let cli = parse(&["tsad", "run", "--dataset", "UCR", "--scores-dir", "s"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let err = experiment_config(&args).expect_err("UCR");
        assert!(err.to_string().contains("unknown dataset 'UCR'"));
    }

    #[test]
    fn zero_runs_fail_validation() {
        let cli = parse(&["tsad", "run", "--runs", "0", "--scores-dir", "s"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(experiment_config(&args).is_err());
    }

    #[test]
    fn run_requires_scores_dir() {
        assert!(Cli::try_parse_from(["tsad", "run"]).is_err());
    }

    #[test]
    fn eval_writes_windowed_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scores = dir.path().join("scores.csv");
        let labels = dir.path().join("labels.csv");
        let output = dir.path().join("report.json");
        // window_length 3 over 6 timesteps -> 4 scores
        fs::write(&scores, "score\n0.1\n0.9\n0.2\n0.1\n").expect("scores");
        fs::write(&labels, "0\n0\n0\n1\n0\n0\n").expect("labels");

        let cli = parse(&[
            "tsad",
            "eval",
            "--scores",
            scores.to_str().expect("utf8"),
            "--labels",
            labels.to_str().expect("utf8"),
            "--window-length",
            "3",
            "--output",
            output.to_str().expect("utf8"),
        ]);
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        handle_eval(args).expect("eval");

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).expect("read")).expect("json");
        assert_eq!(report["command"], "eval");
        assert_eq!(report["n"], 6);
        assert_eq!(report["n_segments"], 1);
        assert_eq!(report["metrics"]["adj_f1"], 1.0);
        assert_eq!(report["metrics"]["adj_auroc"], 1.0);
        assert_eq!(report["best"]["threshold"], 0.9);
    }

    #[test]
    fn eval_reports_alignment_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scores = dir.path().join("scores.csv");
        let labels = dir.path().join("labels.csv");
        fs::write(&scores, "0.1\n0.9\n").expect("scores");
        fs::write(&labels, "0\n1\n0\n").expect("labels");

        let cli = parse(&[
            "tsad",
            "eval",
            "--scores",
            scores.to_str().expect("utf8"),
            "--labels",
            labels.to_str().expect("utf8"),
        ]);
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        let err = handle_eval(args).expect_err("2 scores for 3 labels");
        assert_eq!(err.code(), "alignment_error");
    }

    #[test]
    fn nan_metrics_serialize_as_null() {
        let encoded = serde_json::to_value(MetricsOutput::from(MetricTuple::nan())).expect("json");
        assert!(encoded["adj_auroc"].is_null());
    }
}
