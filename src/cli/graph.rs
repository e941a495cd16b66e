// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Graph command - visualize a pipeline's stage graph

use miette::Result;

use super::{compiler, print_recovery, GraphFormat};
use crate::config::Settings;

/// Run the graph command
pub async fn run(settings: &Settings, pipeline_id: String, format: GraphFormat) -> Result<()> {
    let dag = compiler(settings).build_graph(&pipeline_id).await.map_err(|e| {
        print_recovery(&e);
        e
    })?;

    // Output in requested format
    let output = match format {
        GraphFormat::Text => dag.to_text(),
        GraphFormat::Dot => dag.to_dot(),
        GraphFormat::Mermaid => dag.to_mermaid(),
    };

    print!("{}", output);

    Ok(())
}
