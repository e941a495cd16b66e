// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Validate command - lint a stored pipeline

use colored::Colorize;
use miette::Result;

use super::{compiler, print_recovery};
use crate::config::Settings;
use crate::pipeline::PipelineValidator;
use crate::utils::{
    error_heading, plain_heading, print_error, print_section, print_success, print_warning,
    warning_heading,
};
use crate::workflow::task_name;

/// Run the validate command
pub async fn run(settings: &Settings, pipeline_id: String, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    let (pipeline, stages) = compiler(settings).fetch(&pipeline_id).await.map_err(|e| {
        print_recovery(&e);
        e
    })?;

    print_success(&format!("Loaded '{}' with {} stage(s)", pipeline.id, stages.len()));

    let validation = PipelineValidator::validate(&pipeline, &stages);

    if !validation.errors.is_empty() {
        print_section("Errors", error_heading);
        for error in &validation.errors {
            print_error(error);
        }
    }

    if !validation.warnings.is_empty() {
        print_section("Warnings", warning_heading);
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        print_section("Pipeline summary", plain_heading);
        println!("  Name:   {}", pipeline.name);
        println!("  Status: {}", pipeline.status);
        println!("  Stages: {}", stages.len());
        for stage in &stages {
            let deps = if stage.depends_on.is_empty() {
                String::new()
            } else {
                format!(" [depends: {}]", stage.depends_on.join(", "))
            };
            println!(
                "    - {} → {} ({}){}",
                stage.id,
                task_name(&stage.id),
                stage.image,
                deps.dimmed()
            );
        }
    }

    println!();

    if !validation.is_valid() {
        return Err(miette::miette!(
            "Pipeline '{}' has {} error(s)",
            pipeline.id,
            validation.errors.len()
        ));
    }

    if validation.has_warnings() {
        println!("{}", "Pipeline is valid but has warnings.".yellow().bold());
    } else {
        println!("{}", "Pipeline is valid!".green().bold());
    }

    Ok(())
}
