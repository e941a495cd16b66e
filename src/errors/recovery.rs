// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for fixing an authored pipeline.

use std::path::Path;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest breaking a dependency cycle
    pub fn fix_cycle(stages: &[String]) -> Self {
        let steps = if stages.len() == 1 {
            vec![
                format!("Stage '{}' lists itself in depends_on", stages[0]),
                "Remove the self reference".into(),
            ]
        } else {
            vec![
                format!("These stages depend on each other: {}", stages.join(" → ")),
                "Remove one depends_on entry so the stages form a DAG".into(),
            ]
        };

        Self {
            action: "Remove the dependency cycle".into(),
            steps,
            commands: vec![
                "# Visualize the stage graph:".into(),
                "deda graph <pipeline-id> --format mermaid".into(),
            ],
        }
    }

    /// Suggest fixing a reference to a stage that does not exist
    pub fn fix_dangling_dependency(stage: &str, dependency: &str) -> Self {
        Self {
            action: format!("Fix the depends_on entry '{}'", dependency),
            steps: vec![
                format!(
                    "Stage '{}' waits for '{}', which is not a stage of this pipeline",
                    stage, dependency
                ),
                "The stage may have been deleted, or the id mistyped".into(),
                "Remove the entry or point it at an existing stage id".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest renaming stages whose task names clash
    pub fn fix_name_collision(task: &str, first: &str, second: &str) -> Self {
        Self {
            action: format!("Give '{}' and '{}' distinct ids", first, second),
            steps: vec![
                format!("Both stages would become task '{}'", task),
                "Characters other than letters, digits and '_' are replaced by '_'".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest removing a repeated stage id
    pub fn fix_duplicate_stage(stage: &str) -> Self {
        Self {
            action: format!("Make stage id '{}' unique", stage),
            steps: vec!["Each stage of a pipeline needs its own id".into()],
            commands: vec![],
        }
    }

    /// Suggest creating the pipeline that was asked for
    pub fn create_pipeline(pipeline_id: &str) -> Self {
        Self {
            action: format!("Create pipeline '{}'", pipeline_id),
            steps: vec![
                "No pipeline with this id exists in the store".into(),
                format!("Add {}.yaml to the store directory", pipeline_id),
            ],
            commands: vec![
                "# Point deda at another store:".into(),
                format!("deda --store <dir> compile {}", pipeline_id),
            ],
        }
    }

    /// Suggest checking the output directory
    pub fn fix_output_dir(path: &Path) -> Self {
        let dir = path.parent().unwrap_or(path);
        Self {
            action: "Check the workflow output directory".into(),
            steps: vec![
                format!("'{}' must be writable and on a disk with free space", dir.display()),
                "Nothing was overwritten; rerun once the directory is fixed".into(),
            ],
            commands: vec![
                "# Write somewhere else:".into(),
                "deda --output-dir <dir> compile <pipeline-id>".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_cycle_suggestion() {
        let suggestion = RecoverySuggestion::fix_cycle(&["C".to_string()]);
        let text = suggestion.to_string();
        assert!(text.contains("Stage 'C' lists itself"));
        assert!(text.contains("deda graph"));
    }

    #[test]
    fn test_display_without_commands() {
        let suggestion = RecoverySuggestion::fix_duplicate_stage("a");
        assert_eq!(
            suggestion.to_string(),
            "→ Make stage id 'a' unique\n  Each stage of a pipeline needs its own id\n"
        );
    }
}
