// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! # deda - EDA pipeline compiler
//!
//! `deda` compiles pipelines of containerized EDA tools (GHDL, Yosys,
//! nextpnr, ...) into Airflow DAG files. Execution is left to Airflow.
//!
//! ## Features
//!
//! - **Checked graphs** - Dangling references, cycles and task-name clashes are rejected
//! - **Deterministic output** - The same pipeline always yields the same bytes
//! - **Atomic writes** - The scheduler never sees a half-written DAG
//! - **Pluggable storage** - Pipelines come from any [`StageRepository`]
//!
//! ## Quick Start
//!
//! ```bash
//! # Check a pipeline
//! deda validate fpga-flow
//!
//! # Preview the DAG
//! deda compile fpga-flow --dry-run
//!
//! # Write it where Airflow picks it up
//! deda --output-dir /opt/airflow/dags compile fpga-flow
//! ```

pub mod cli;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod output;
pub mod pipeline;
pub mod repository;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use compiler::{CompilationResult, RunTicket, WorkflowCompiler};
pub use config::Settings;
pub use errors::{DedaError, ErrorKind};
pub use output::{ArtifactWriter, FilesystemWriter};
pub use pipeline::{PipelineRecord, StageGraph, StageRecord};
pub use repository::{FileRepository, InMemoryRepository, StageRepository};
pub use workflow::WorkflowEmitter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
