// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! In-memory repository
//!
//! Backs tests and embedders that already hold the records.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::StageRepository;
use crate::errors::DedaError;
use crate::pipeline::{PipelineDocument, PipelineRecord, StageRecord};

#[derive(Debug, Clone)]
struct Entry {
    pipeline: PipelineRecord,
    stages: Vec<StageRecord>,
}

/// Repository holding pipelines in memory
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    pipelines: RwLock<HashMap<String, Entry>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from pipeline documents
    pub fn from_documents(documents: impl IntoIterator<Item = PipelineDocument>) -> Self {
        let pipelines = documents
            .into_iter()
            .map(|doc| {
                (
                    doc.pipeline.id.clone(),
                    Entry {
                        pipeline: doc.pipeline,
                        stages: doc.stages,
                    },
                )
            })
            .collect();

        Self {
            pipelines: RwLock::new(pipelines),
        }
    }

    /// Insert or replace a pipeline, keeping its stages
    pub async fn insert_pipeline(&self, pipeline: PipelineRecord) {
        let mut pipelines = self.pipelines.write().await;
        match pipelines.get_mut(&pipeline.id) {
            Some(entry) => entry.pipeline = pipeline,
            None => {
                pipelines.insert(
                    pipeline.id.clone(),
                    Entry {
                        pipeline,
                        stages: Vec::new(),
                    },
                );
            }
        }
    }

    /// Add a stage, or replace the stage with the same id
    pub async fn upsert_stage(&self, pipeline_id: &str, mut stage: StageRecord) -> Result<(), DedaError> {
        let mut pipelines = self.pipelines.write().await;
        let entry = pipelines
            .get_mut(pipeline_id)
            .ok_or_else(|| DedaError::PipelineNotFound {
                pipeline_id: pipeline_id.to_string(),
            })?;

        stage.pipeline_id = Some(pipeline_id.to_string());
        match entry.stages.iter_mut().find(|s| s.id == stage.id) {
            Some(existing) => *existing = stage,
            None => entry.stages.push(stage),
        }
        Ok(())
    }

    /// Remove a pipeline together with its stages
    pub async fn remove_pipeline(&self, pipeline_id: &str) -> bool {
        self.pipelines.write().await.remove(pipeline_id).is_some()
    }
}

#[async_trait]
impl StageRepository for InMemoryRepository {
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Option<PipelineRecord>, DedaError> {
        let pipelines = self.pipelines.read().await;
        Ok(pipelines.get(pipeline_id).map(|e| e.pipeline.clone()))
    }

    async fn list_stages(&self, pipeline_id: &str) -> Result<Vec<StageRecord>, DedaError> {
        let pipelines = self.pipelines.read().await;
        Ok(pipelines
            .get(pipeline_id)
            .map(|e| e.stages.clone())
            .unwrap_or_default())
    }
}
