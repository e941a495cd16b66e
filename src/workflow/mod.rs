// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Workflow emission
//!
//! Turns a validated stage graph into the scheduler's native DAG file.

mod emitter;
mod model;
pub mod python;

pub use emitter::WorkflowEmitter;
pub use model::{task_name, workflow_id, CompiledWorkflow, TaskDeclaration, TASK_PREFIX, WORKFLOW_PREFIX};

/// File extension of emitted workflow files
pub const WORKFLOW_EXTENSION: &str = "py";
