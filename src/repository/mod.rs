// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Read access to stored pipelines
//!
//! The compiler never owns pipeline storage; it is handed a repository and
//! only reads through it.

mod filesystem;
mod memory;

pub use filesystem::FileRepository;
pub use memory::InMemoryRepository;

use async_trait::async_trait;

use crate::errors::DedaError;
use crate::pipeline::{PipelineRecord, StageRecord};

/// Source of pipeline and stage records
#[async_trait]
pub trait StageRepository: Send + Sync {
    /// Get a pipeline record, `None` if it does not exist
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Option<PipelineRecord>, DedaError>;

    /// List the stages of a pipeline, in no particular order
    async fn list_stages(&self, pipeline_id: &str) -> Result<Vec<StageRecord>, DedaError>;
}
