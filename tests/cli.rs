// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! End-to-end tests for the deda binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FPGA_FLOW: &str = r#"
id: fpga-flow
name: FPGA flow
status: active
stages:
  - id: synth
    tool_name: yosys
    image: hdlc/yosys:latest
    command: yosys -p "synth_ice40 -json top.json" top.v
    depends_on: [lint]
  - id: lint
    tool_name: ghdl
    image: ghdl/ghdl:latest
    command: ghdl -s top.vhd
  - id: place-route
    tool_name: nextpnr
    image: hdlc/nextpnr:latest
    command: nextpnr-ice40 --json top.json
    depends_on: [synth]
"#;

const CYCLIC: &str = r#"
id: loop
name: loop
stages:
  - id: a
    image: alpine:3
    command: 'true'
    depends_on: [b]
  - id: b
    image: alpine:3
    command: 'true'
    depends_on: [a]
"#;

/// A workspace with a pipeline store and no settings file
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("pipelines");
    std::fs::create_dir_all(&store).unwrap();
    std::fs::write(store.join("fpga-flow.yaml"), FPGA_FLOW).unwrap();
    std::fs::write(store.join("loop.yaml"), CYCLIC).unwrap();
    dir
}

fn deda(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("deda").unwrap();
    cmd.arg("-C")
        .arg(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("DEDA_CONFIG")
        .env_remove("DEDA_DAG_OUTPUT_DIR")
        .env_remove("DEDA_STORE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn compile_writes_dag_file() {
    let dir = workspace();

    deda(&dir)
        .args(["compile", "fpga-flow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DAG generated successfully at"))
        .stdout(predicate::str::contains("deda_pipeline_fpga-flow"));

    let dag = std::fs::read_to_string(dir.path().join("dags/deda_pipeline_fpga-flow.py")).unwrap();
    assert!(dag.contains("task_place_route = DockerOperator("));
    assert!(dag.contains(r#"command="yosys -p \"synth_ice40 -json top.json\" top.v","#));
    assert!(dag.contains("task_synth.set_upstream(task_lint)"));
    assert!(dag.contains("task_place_route.set_upstream(task_synth)"));
}

#[test]
fn compile_dry_run_prints_without_writing() {
    let dir = workspace();

    deda(&dir)
        .args(["compile", "fpga-flow", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "# Generated by deda for workflow deda_pipeline_fpga-flow. Do not edit.",
        ))
        .stdout(predicate::str::contains("schedule=None"));

    assert!(!dir.path().join("dags").exists());
}

#[test]
fn compile_json_output() {
    let dir = workspace();

    let output = deda(&dir)
        .args(["--output-dir", "out", "compile", "fpga-flow", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["dag_id"], "deda_pipeline_fpga-flow");
    assert_eq!(json["success"], true);
    assert!(json["file_path"]
        .as_str()
        .unwrap()
        .ends_with("deda_pipeline_fpga-flow.py"));
    assert!(dir.path().join("out/deda_pipeline_fpga-flow.py").exists());
}

#[test]
fn run_reports_dag_id() {
    let dir = workspace();

    deda(&dir)
        .args(["run", "fpga-flow"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "DAG deda_pipeline_fpga-flow generated. Use Airflow UI to trigger execution.",
        ));
}

#[test]
fn cycle_fails_without_writing() {
    let dir = workspace();

    deda(&dir)
        .args(["compile", "loop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency cycle detected at stage 'a'"));

    assert!(!dir.path().join("dags/deda_pipeline_loop.py").exists());
}

#[test]
fn unknown_pipeline_fails() {
    let dir = workspace();

    deda(&dir)
        .args(["compile", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pipeline 'missing' not found"));
}

#[test]
fn validate_reports_problems() {
    let dir = workspace();

    deda(&dir)
        .args(["validate", "fpga-flow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline is valid!"));

    deda(&dir)
        .args(["validate", "loop"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Circular dependency: a → b"));
}

#[test]
fn graph_formats() {
    let dir = workspace();

    deda(&dir)
        .args(["graph", "fpga-flow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. lint (ghdl)"))
        .stdout(predicate::str::contains("3. place-route (nextpnr) [depends: synth]"));

    deda(&dir)
        .args(["graph", "fpga-flow", "--format", "mermaid"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph TD"));
}

#[test]
fn settings_file_sets_output_dir() {
    let dir = workspace();
    std::fs::write(dir.path().join("deda.yaml"), "output_dir: airflow/dags\n").unwrap();

    deda(&dir).args(["compile", "fpga-flow"]).assert().success();

    assert!(dir
        .path()
        .join("airflow/dags/deda_pipeline_fpga-flow.py")
        .exists());
}
