// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! deda - EDA pipeline compiler
//!
//! Compiles stored EDA tool pipelines into Airflow DAG files.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deda::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let default_filter = if cli.verbose { "deda=debug" } else { "deda=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    let settings = cli.settings()?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Compile {
            pipeline,
            dry_run,
            format,
        } => deda::cli::compile::run(&settings, pipeline, dry_run, format, cli.verbose).await,
        Commands::Run { pipeline, format } => {
            deda::cli::run::run(&settings, pipeline, format).await
        }
        Commands::Validate { pipeline } => {
            deda::cli::validate::run(&settings, pipeline, cli.verbose).await
        }
        Commands::Graph { pipeline, format } => {
            deda::cli::graph::run(&settings, pipeline, format).await
        }
    }
}
