// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Run command - compile a pipeline so the scheduler can execute it

use colored::Colorize;
use miette::Result;

use super::{compiler, print_recovery, OutputFormat};
use crate::config::Settings;
use crate::utils::print_success;

/// Run the run command
pub async fn run(settings: &Settings, pipeline_id: String, format: OutputFormat) -> Result<()> {
    let ticket = compiler(settings).run(&pipeline_id).await.map_err(|e| {
        print_recovery(&e);
        e
    })?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&ticket)
                .map_err(|e| miette::miette!("Failed to serialize result: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_success(&ticket.message);
            println!();
            println!("Trigger it with:");
            println!("  {}", format!("airflow dags trigger {}", ticket.airflow_dag_id).cyan());
        }
    }

    Ok(())
}
