// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn tsad(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsad"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("tsad binary should start")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are utf-8")
}

#[test]
fn eval_prints_metrics_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scores = dir.path().join("scores.csv");
    let labels = dir.path().join("labels.csv");
    fs::write(&scores, "0.1\n0.2\n0.8\n0.3\n0.1\n").expect("scores");
    fs::write(&labels, "0\n0\n1\n1\n0\n").expect("labels");

    let output = tsad(&[
        "eval",
        "--scores",
        path_arg(&scores),
        "--labels",
        path_arg(&labels),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["n"], 5);
    assert_eq!(report["n_positive"], 2);
    assert_eq!(report["metrics"]["adj_f1"], 1.0);
    assert_eq!(report["metrics"]["adj_r"], 1.0);
    assert_eq!(report["ranking"], "raw");
}

#[test]
fn run_appends_results_for_precomputed_scores() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data = dir.path().join("data").join("time-series").join("SMAP");
    fs::create_dir_all(&data).expect("data dir");
    fs::write(data.join("E-1_train.csv"), "c0\n0.1\n0.2\n0.1\n").expect("train");
    fs::write(
        data.join("E-1_test.csv"),
        "c0,label\n0.1,0\n0.1,0\n4.0,1\n0.2,0\n",
    )
    .expect("test");

    let scores = dir.path().join("scores").join("iforest").join("E-1");
    fs::create_dir_all(&scores).expect("scores dir");
    fs::write(scores.join("run_0.csv"), "0.1\n0.2\n0.9\n0.3\n").expect("run 0");
    fs::write(scores.join("run_1.csv"), "0.3\n0.2\n0.1\n0.4\n").expect("run 1");

    let records = dir.path().join("records");
    let output = tsad(&[
        "run",
        "--model",
        "iforest",
        "--dataset",
        "SMAP",
        "--entities",
        "FULL",
        "--runs",
        "2",
        "--data-root",
        path_arg(&dir.path().join("data")),
        "--output-dir",
        path_arg(&records),
        "--scores-dir",
        path_arg(&dir.path().join("scores")),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["model"], "iforest");
    assert_eq!(report["entities"][0]["entity"], "E-1");
    assert_eq!(report["entities"][0]["runs"][0]["adj_f1"], 1.0);

    let text = fs::read_to_string(records.join("iforest_SMAP_results.csv")).expect("results");
    let last = text.lines().last().expect("data line");
    assert!(last.starts_with("E-1, "), "{last}");
    assert!(last.ends_with(", iforest "), "{last}");
}

#[test]
fn unknown_model_exits_with_error_envelope() {
    let output = tsad(&["run", "--model", "knn", "--scores-dir", "scores"]);
    assert_eq!(output.status.code(), Some(1));

    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stderr).expect("json envelope on stderr");
    assert_eq!(envelope["error"]["code"], "configuration_error");
    assert!(
        envelope["error"]["message"]
            .as_str()
            .expect("message")
            .contains("knn")
    );
}

#[test]
fn parse_errors_are_invalid_input() {
    let output = tsad(&["eval", "--scores", "only.csv"]);
    assert_eq!(output.status.code(), Some(1));

    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stderr).expect("json envelope on stderr");
    assert_eq!(envelope["error"]["code"], "invalid_input");
}
