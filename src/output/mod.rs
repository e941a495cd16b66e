// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Workflow artifact output
//!
//! Writers persist emitted workflow text where the scheduler picks it up.
//! A reader of the location sees either the previous file or the new one,
//! never a partial write.

mod filesystem;

pub use filesystem::FilesystemWriter;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::errors::DedaError;

/// Destination for compiled workflow files
#[async_trait]
pub trait ArtifactWriter: Send + Sync {
    /// Location of the workflow file for a workflow id
    fn location(&self, workflow_id: &str) -> PathBuf;

    /// Replace whatever is at `location` with `text`
    async fn write(&self, location: &Path, text: &str) -> Result<(), DedaError>;
}
