// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for deda.

pub mod compile;
pub mod graph;
pub mod run;
pub mod validate;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use crate::compiler::WorkflowCompiler;
use crate::config::Settings;
use crate::errors::DedaError;
use crate::output::FilesystemWriter;
use crate::repository::FileRepository;
use crate::workflow::WorkflowEmitter;

/// EDA pipeline compiler
///
/// Turns stored EDA tool pipelines into Airflow DAG files.
#[derive(Parser, Debug)]
#[clap(
    name = "deda",
    version,
    about = "Compile EDA tool pipelines into Airflow DAG definitions",
    long_about = None,
    after_help = "Examples:\n\
        deda validate fpga-flow                 Check a pipeline for mistakes\n\
        deda graph fpga-flow --format mermaid   Show the stage graph\n\
        deda compile fpga-flow --dry-run        Print the DAG without writing it\n\
        deda compile fpga-flow                  Write the DAG for the scheduler\n\n\
        See 'deda <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Settings file (defaults to ./deda.yaml when present)
    #[clap(long, global = true, value_name = "FILE", env = "DEDA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding pipeline documents
    #[clap(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Directory the scheduler loads DAG files from
    #[clap(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a pipeline into a DAG file
    Compile {
        /// Pipeline id
        pipeline: String,

        /// Print the DAG instead of writing it
        #[clap(long)]
        dry_run: bool,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compile a pipeline and hand it to the scheduler
    Run {
        /// Pipeline id
        pipeline: String,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check a pipeline for authoring mistakes
    Validate {
        /// Pipeline id
        pipeline: String,
    },

    /// Show a pipeline's stage graph
    Graph {
        /// Pipeline id
        pipeline: String,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },
}

/// Output format for compile and run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl Cli {
    /// Resolve settings: file, then environment, then flags
    pub fn settings(&self) -> Result<Settings, DedaError> {
        let mut settings = Settings::load(self.config.as_deref())?;

        if let Some(store) = &self.store {
            settings.store_dir = store.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }

        Ok(settings)
    }
}

/// Build a compiler over the configured store and output directory
pub fn compiler(settings: &Settings) -> WorkflowCompiler {
    WorkflowCompiler::new(
        Arc::new(FileRepository::new(&settings.store_dir)),
        Arc::new(FilesystemWriter::new(&settings.output_dir)),
        WorkflowEmitter::new(settings.airflow.clone()),
    )
}

/// Print the recovery suggestion for an error, if it has one
pub(crate) fn print_recovery(error: &DedaError) {
    if let Some(suggestion) = error.recovery() {
        eprintln!();
        eprint!("{}", suggestion);
    }
}
