// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Lowered workflow: task declarations ready to render

use serde::Serialize;

/// Prefix of every workflow (Airflow dag) id
pub const WORKFLOW_PREFIX: &str = "deda_pipeline_";

/// Prefix of every task name
pub const TASK_PREFIX: &str = "task_";

/// Workflow id for a pipeline
pub fn workflow_id(pipeline_id: &str) -> String {
    format!("{}{}", WORKFLOW_PREFIX, pipeline_id)
}

/// Task name for a stage: `task_` plus the id with every character outside
/// `[A-Za-z0-9_]` replaced by `_`
///
/// The result is a valid Python identifier and Airflow task id. Distinct
/// stage ids can map to the same name; the emitter rejects that.
pub fn task_name(stage_id: &str) -> String {
    let mut name = String::with_capacity(TASK_PREFIX.len() + stage_id.len());
    name.push_str(TASK_PREFIX);
    name.extend(stage_id.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));
    name
}

/// A compiled workflow, tasks in execution order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledWorkflow {
    pub workflow_id: String,
    pub tasks: Vec<TaskDeclaration>,
}

impl CompiledWorkflow {
    /// Number of dependency edges across all tasks
    pub fn edge_count(&self) -> usize {
        self.tasks.iter().map(|t| t.upstream.len()).sum()
    }
}

/// One containerized task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDeclaration {
    pub task_name: String,
    /// Stage the task was derived from
    pub stage_id: String,
    pub image: String,
    pub command: String,
    /// Upstream task names, in the stage's declared order
    pub upstream: Vec<String>,
}
