// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Pipeline validation
//!
//! Reports every problem in an authored pipeline at once, instead of
//! stopping at the first one like compilation does. A pipeline with no
//! errors here compiles.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::DedaError;
use crate::pipeline::{check_pipeline_id, PipelineRecord, StageGraph, StageRecord};
use crate::workflow::task_name;

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline and its stages
    pub fn validate(pipeline: &PipelineRecord, stages: &[StageRecord]) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Err(e) = check_pipeline_id(&pipeline.id) {
            result.add_error(&e.to_string());
        }

        if stages.is_empty() {
            result.add_warning("Pipeline has no stages; the workflow will contain no tasks");
        }

        // Check for duplicate stage ids
        let mut seen_ids = HashSet::new();
        for stage in stages {
            if !seen_ids.insert(stage.id.as_str()) {
                result.add_error(&format!("Duplicate stage id: '{}'", stage.id));
            }
        }

        let order_by_id: HashMap<&str, i64> = stages
            .iter()
            .map(|s| (s.id.as_str(), s.order_index))
            .collect();

        for stage in stages {
            Self::validate_stage(stage, &order_by_id, &mut result);
        }

        // Cycles are only visible once ids and references resolve
        if let Err(DedaError::CycleDetected { cycle, .. }) =
            StageGraph::build(&pipeline.id, stages.to_vec())
        {
            result.add_error(&format!("Circular dependency: {}", cycle.join(" → ")));
        }

        Self::validate_task_names(&seen_ids, &mut result);

        tracing::debug!(
            pipeline = %pipeline.id,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "pipeline validated"
        );

        result
    }

    /// Validate a single stage
    fn validate_stage(
        stage: &StageRecord,
        order_by_id: &HashMap<&str, i64>,
        result: &mut ValidationResult,
    ) {
        if stage.id.trim().is_empty() {
            result.add_error("A stage has an empty id");
        }

        if stage.image.trim().is_empty() {
            result.add_error(&format!("Stage '{}': Container image is empty", stage.id));
        } else if !has_tag_or_digest(&stage.image) {
            result.add_warning(&format!(
                "Stage '{}': Image '{}' has no tag; the scheduler will pull 'latest'",
                stage.id, stage.image
            ));
        }

        if stage.command.trim().is_empty() {
            result.add_error(&format!("Stage '{}': Command is empty", stage.id));
        }

        let mut seen_deps = HashSet::new();
        for dep in &stage.depends_on {
            if !seen_deps.insert(dep.as_str()) {
                result.add_warning(&format!(
                    "Stage '{}': '{}' is listed twice in depends_on",
                    stage.id, dep
                ));
                continue;
            }

            match order_by_id.get(dep.as_str()) {
                None => result.add_error(&format!(
                    "Stage '{}' depends on unknown stage '{}'",
                    stage.id, dep
                )),
                Some(dep_order) if *dep_order > stage.order_index && dep != &stage.id => {
                    result.add_warning(&format!(
                        "Stage '{}': order_index {} is lower than its dependency '{}' ({}). \
                         Dependencies decide the order.",
                        stage.id, stage.order_index, dep, dep_order
                    ));
                }
                Some(_) => {}
            }
        }
    }

    /// Report distinct stage ids that share a task name
    fn validate_task_names(ids: &HashSet<&str>, result: &mut ValidationResult) {
        let mut by_task: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for id in ids {
            by_task.entry(task_name(id)).or_default().push(*id);
        }

        for (task, mut ids) in by_task {
            if ids.len() > 1 {
                ids.sort_unstable();
                result.add_error(&format!(
                    "Stages {} all map to task name '{}'",
                    ids.iter().map(|id| format!("'{}'", id)).collect::<Vec<_>>().join(", "),
                    task
                ));
            }
        }
    }
}

/// Whether an image reference pins a tag or digest
fn has_tag_or_digest(image: &str) -> bool {
    if image.contains('@') {
        return true;
    }
    // A ':' before the last '/' is a registry port, not a tag
    let name = image.rsplit('/').next().unwrap_or(image);
    name.contains(':')
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
