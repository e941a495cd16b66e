// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Airflow DAG emitter
//!
//! Lowers a [`StageGraph`] into task declarations, then renders them as an
//! Airflow DAG module through the [`python`](super::python) syntax tree.
//! Output is a pure function of the graph and the settings.

use chrono::Datelike;
use std::collections::HashMap;

use super::model::{task_name, workflow_id, CompiledWorkflow, TaskDeclaration};
use super::python::{Expr, Module};
use crate::config::AirflowSettings;
use crate::errors::DedaError;
use crate::pipeline::StageGraph;

/// Variable the DAG object is bound to in the emitted module
const DAG_VAR: &str = "dag";

/// Renders stage graphs as Airflow DAG files
#[derive(Debug, Clone, Default)]
pub struct WorkflowEmitter {
    settings: AirflowSettings,
}

impl WorkflowEmitter {
    /// Create an emitter with the given header and operator settings
    pub fn new(settings: AirflowSettings) -> Self {
        Self { settings }
    }

    /// Lower and render in one go
    #[tracing::instrument(level = "debug", skip(self, graph), fields(stages = graph.len()))]
    pub fn emit(&self, pipeline_id: &str, graph: &StageGraph) -> Result<String, DedaError> {
        let workflow = self.lower(pipeline_id, graph)?;
        Ok(self.render(&workflow))
    }

    /// Derive task names and upstream lists, in the graph's execution order
    ///
    /// Fails with `NameCollision` when two stage ids map to one task name.
    pub fn lower(&self, pipeline_id: &str, graph: &StageGraph) -> Result<CompiledWorkflow, DedaError> {
        let mut owners: HashMap<String, &str> = HashMap::with_capacity(graph.len());
        let mut tasks = Vec::with_capacity(graph.len());

        for stage in graph.ordered() {
            let name = task_name(&stage.record.id);
            if let Some(first) = owners.insert(name.clone(), &stage.record.id) {
                return Err(DedaError::NameCollision {
                    task: name,
                    first: first.to_string(),
                    second: stage.record.id.clone(),
                });
            }

            tasks.push(TaskDeclaration {
                task_name: name,
                stage_id: stage.record.id.clone(),
                image: stage.record.image.clone(),
                command: stage.record.command.clone(),
                upstream: stage.dependencies.iter().map(|dep| task_name(dep)).collect(),
            });
        }

        Ok(CompiledWorkflow {
            workflow_id: workflow_id(pipeline_id),
            tasks,
        })
    }

    /// Render a lowered workflow as Python source
    pub fn render(&self, workflow: &CompiledWorkflow) -> String {
        let mut module = Module::new();

        module.comment(format!(
            "Generated by deda for workflow {}. Do not edit.",
            workflow.workflow_id
        ));
        module.from_import("datetime", &["datetime"]);
        module.blank();
        module.from_import("airflow", &["DAG"]);
        module.from_import("airflow.providers.docker.operators.docker", &["DockerOperator"]);
        module.from_import("docker.types", &["Mount"]);
        module.blank();
        module.assign(DAG_VAR, self.dag_header(&workflow.workflow_id));

        for task in &workflow.tasks {
            module.blank();
            module.assign(task.task_name.clone(), self.task_operator(task));
        }

        if workflow.edge_count() > 0 {
            module.blank();
            for task in &workflow.tasks {
                for upstream in &task.upstream {
                    module.expr(Expr::call(
                        Expr::name(task.task_name.clone()).attr("set_upstream"),
                        vec![Expr::name(upstream.clone())],
                    ));
                }
            }
        }

        module.render()
    }

    fn dag_header(&self, workflow_id: &str) -> Expr {
        let date = self.settings.start_date;

        Expr::call_kw(
            Expr::name("DAG"),
            vec![
                ("dag_id", Expr::str(workflow_id)),
                (
                    "start_date",
                    Expr::call(
                        Expr::name("datetime"),
                        vec![
                            Expr::Int(i64::from(date.year())),
                            Expr::Int(i64::from(date.month())),
                            Expr::Int(i64::from(date.day())),
                        ],
                    ),
                ),
                ("schedule", Expr::None),
                ("catchup", Expr::Bool(false)),
                (
                    "default_args",
                    Expr::Dict(vec![
                        (Expr::str("owner"), Expr::str(self.settings.owner.clone())),
                        (Expr::str("depends_on_past"), Expr::Bool(false)),
                    ]),
                ),
                (
                    "tags",
                    Expr::List(self.settings.tags.iter().map(|t| Expr::str(t.clone())).collect()),
                ),
            ],
        )
    }

    fn task_operator(&self, task: &TaskDeclaration) -> Expr {
        let workspace = &self.settings.workspace;

        Expr::call_kw(
            Expr::name("DockerOperator"),
            vec![
                ("task_id", Expr::str(task.task_name.clone())),
                ("image", Expr::str(task.image.clone())),
                ("command", Expr::str(task.command.clone())),
                ("docker_url", Expr::str(self.settings.docker_url.clone())),
                ("network_mode", Expr::str(self.settings.network_mode.clone())),
                (
                    "mounts",
                    Expr::List(vec![Expr::call_kw(
                        Expr::name("Mount"),
                        vec![
                            ("source", Expr::str(workspace.source.clone())),
                            ("target", Expr::str(workspace.target.clone())),
                            ("type", Expr::str("bind")),
                        ],
                    )]),
                ),
                ("auto_remove", Expr::str("success")),
                ("dag", Expr::name(DAG_VAR)),
            ],
        )
    }
}
