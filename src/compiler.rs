// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Workflow compiler
//!
//! Reads a pipeline through the repository, builds and checks its stage
//! graph, emits the Airflow DAG and hands it to the artifact writer. Nothing
//! is written unless every check passes.

use serde::Serialize;
use std::sync::Arc;

use crate::errors::DedaError;
use crate::output::ArtifactWriter;
use crate::pipeline::{check_pipeline_id, PipelineRecord, StageGraph, StageRecord};
use crate::repository::StageRepository;
use crate::workflow::{workflow_id, WorkflowEmitter};

/// Outcome of a successful compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilationResult {
    /// Workflow (Airflow dag) id
    #[serde(rename = "dag_id")]
    pub workflow_id: String,
    /// Where the workflow file was written
    pub file_path: String,
    pub success: bool,
    pub message: String,
}

/// Outcome of a run request: the DAG is in place for the scheduler to trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunTicket {
    pub success: bool,
    pub message: String,
    pub airflow_dag_id: String,
}

/// Compiles stored pipelines into workflow files
pub struct WorkflowCompiler {
    repository: Arc<dyn StageRepository>,
    writer: Arc<dyn ArtifactWriter>,
    emitter: WorkflowEmitter,
}

impl WorkflowCompiler {
    pub fn new(
        repository: Arc<dyn StageRepository>,
        writer: Arc<dyn ArtifactWriter>,
        emitter: WorkflowEmitter,
    ) -> Self {
        Self {
            repository,
            writer,
            emitter,
        }
    }

    /// Load a pipeline record and its stages
    pub async fn fetch(&self, pipeline_id: &str) -> Result<(PipelineRecord, Vec<StageRecord>), DedaError> {
        check_pipeline_id(pipeline_id)?;

        let pipeline = self
            .repository
            .get_pipeline(pipeline_id)
            .await?
            .ok_or_else(|| DedaError::PipelineNotFound {
                pipeline_id: pipeline_id.to_string(),
            })?;
        let stages = self.repository.list_stages(pipeline_id).await?;

        tracing::debug!(pipeline = %pipeline_id, stages = stages.len(), "pipeline loaded");
        Ok((pipeline, stages))
    }

    /// Load a pipeline and build its checked stage graph
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn build_graph(&self, pipeline_id: &str) -> Result<StageGraph, DedaError> {
        let (_, stages) = self.fetch(pipeline_id).await?;
        StageGraph::build(pipeline_id, stages)
    }

    /// Emit the workflow text without writing it
    pub async fn preview(&self, pipeline_id: &str) -> Result<String, DedaError> {
        let graph = self.build_graph(pipeline_id).await?;
        self.emitter.emit(pipeline_id, &graph)
    }

    /// Compile a pipeline and write its workflow file
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn compile(&self, pipeline_id: &str) -> Result<CompilationResult, DedaError> {
        let text = self.preview(pipeline_id).await?;

        let workflow_id = workflow_id(pipeline_id);
        let location = self.writer.location(&workflow_id);
        self.writer
            .write(&location, &text)
            .await
            .map_err(|e| DedaError::compilation_failed(pipeline_id, e))?;

        let file_path = location.display().to_string();
        tracing::info!(pipeline = %pipeline_id, dag_id = %workflow_id, path = %file_path, "DAG generated");

        Ok(CompilationResult {
            message: format!("DAG generated successfully at {}", file_path),
            workflow_id,
            file_path,
            success: true,
        })
    }

    /// Compile a pipeline so the scheduler can run it
    ///
    /// The scheduler is never called; the caller triggers the returned dag id.
    pub async fn run(&self, pipeline_id: &str) -> Result<RunTicket, DedaError> {
        let result = self.compile(pipeline_id).await?;

        Ok(RunTicket {
            success: true,
            message: format!(
                "DAG {} generated. Use Airflow UI to trigger execution.",
                result.workflow_id
            ),
            airflow_dag_id: result.workflow_id,
        })
    }
}
