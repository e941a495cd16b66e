// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Compile command - write a pipeline's DAG file

use colored::Colorize;
use miette::Result;

use super::{compiler, print_recovery, OutputFormat};
use crate::config::Settings;
use crate::utils::print_success;

/// Run the compile command
pub async fn run(
    settings: &Settings,
    pipeline_id: String,
    dry_run: bool,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let compiler = compiler(settings);

    if dry_run {
        let text = compiler.preview(&pipeline_id).await.map_err(|e| {
            print_recovery(&e);
            e
        })?;
        print!("{}", text);
        return Ok(());
    }

    let result = compiler.compile(&pipeline_id).await.map_err(|e| {
        print_recovery(&e);
        e
    })?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| miette::miette!("Failed to serialize result: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_success(&result.message);
            println!("  DAG id: {}", result.workflow_id.cyan());
            if verbose {
                println!("  Store:  {}", settings.store_dir.display().to_string().dimmed());
            }
        }
    }

    Ok(())
}
