// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Error types for pipeline compilation
//!
//! Every failure names the stage, reference or path involved so the author
//! can fix the pipeline without reading the compiler's internals.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// How an error should be surfaced to whoever asked for the compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed pipeline does not exist
    NotFound,
    /// The authored pipeline is malformed; the author can fix it
    BadRequest,
    /// The environment failed; retry once the cause is fixed
    Internal,
}

/// Main error type for deda
#[derive(Error, Debug, Diagnostic)]
pub enum DedaError {
    // ─────────────────────────────────────────────────────────────────────────
    // Lookup Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline '{pipeline_id}' not found")]
    #[diagnostic(
        code(deda::pipeline_not_found),
        help("Check the pipeline id, or the --store directory it is loaded from")
    )]
    PipelineNotFound { pipeline_id: String },

    #[error("Invalid pipeline id '{pipeline_id}': {reason}")]
    #[diagnostic(
        code(deda::invalid_pipeline_id),
        help("Pipeline ids may only contain letters, digits, '.', '_' and '-'")
    )]
    InvalidPipelineId { pipeline_id: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Validation Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Stage id '{stage}' is used by more than one stage")]
    #[diagnostic(
        code(deda::duplicate_stage),
        help("Stage ids must be unique within a pipeline")
    )]
    DuplicateStage { stage: String },

    #[error("Stage '{stage}' is incomplete: {reason}")]
    #[diagnostic(
        code(deda::invalid_stage),
        help("Every stage needs an id, a container image and a command")
    )]
    InvalidStage { stage: String, reason: String },

    #[error("Stage '{stage}' depends on unknown stage '{dependency}'")]
    #[diagnostic(
        code(deda::dangling_dependency),
        help("Check that '{dependency}' is a stage of the same pipeline")
    )]
    DanglingDependency { stage: String, dependency: String },

    #[error("Dependency cycle detected at stage '{stage}' (cycle: {})", .cycle.join(" → "))]
    #[diagnostic(
        code(deda::cycle_detected),
        help("Review the depends_on lists of these stages to remove the cycle")
    )]
    CycleDetected { stage: String, cycle: Vec<String> },

    #[error("Stages '{first}' and '{second}' both map to task name '{task}'")]
    #[diagnostic(
        code(deda::name_collision),
        help("Rename one of the stages; '-' and other symbols become '_' in task names")
    )]
    NameCollision {
        task: String,
        first: String,
        second: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Output Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to write workflow '{path}': {error}")]
    #[diagnostic(code(deda::write_failure))]
    WriteFailure { path: PathBuf, error: String },

    #[error("Compilation of pipeline '{pipeline_id}' failed")]
    #[diagnostic(
        code(deda::compilation_failed),
        help("The pipeline itself is valid; fix the underlying cause and retry")
    )]
    CompilationFailed {
        pipeline_id: String,
        #[source]
        source: Box<DedaError>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Collaborator / Environment Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Repository error: {message}")]
    #[diagnostic(code(deda::repository_error))]
    Repository { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(deda::config_error))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(deda::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(deda::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(deda::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for DedaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for DedaError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for DedaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl DedaError {
    /// Classify the error the way an API surface would report it
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PipelineNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidPipelineId { .. }
            | Self::DuplicateStage { .. }
            | Self::InvalidStage { .. }
            | Self::DanglingDependency { .. }
            | Self::CycleDetected { .. }
            | Self::NameCollision { .. } => ErrorKind::BadRequest,
            Self::WriteFailure { .. }
            | Self::CompilationFailed { .. }
            | Self::Repository { .. }
            | Self::Config { .. }
            | Self::Io { .. }
            | Self::Yaml { .. }
            | Self::Json { .. } => ErrorKind::Internal,
        }
    }

    /// Wrap an artifact write failure as a compilation failure
    pub fn compilation_failed(pipeline_id: &str, source: DedaError) -> Self {
        Self::CompilationFailed {
            pipeline_id: pipeline_id.to_string(),
            source: Box::new(source),
        }
    }

    /// Create a repository error from any displayable cause
    pub fn repository(message: impl std::fmt::Display) -> Self {
        Self::Repository {
            message: message.to_string(),
        }
    }

    /// Suggested fix for errors the pipeline author can correct
    pub fn recovery(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::CycleDetected { cycle, .. } => {
                Some(RecoverySuggestion::fix_cycle(cycle))
            }
            Self::DanglingDependency { stage, dependency } => {
                Some(RecoverySuggestion::fix_dangling_dependency(stage, dependency))
            }
            Self::NameCollision {
                task,
                first,
                second,
            } => Some(RecoverySuggestion::fix_name_collision(task, first, second)),
            Self::DuplicateStage { stage } => Some(RecoverySuggestion::fix_duplicate_stage(stage)),
            Self::PipelineNotFound { pipeline_id } => {
                Some(RecoverySuggestion::create_pipeline(pipeline_id))
            }
            Self::CompilationFailed { source, .. } => source.recovery(),
            Self::WriteFailure { path, .. } => Some(RecoverySuggestion::fix_output_dir(path)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let not_found = DedaError::PipelineNotFound {
            pipeline_id: "p1".into(),
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let cycle = DedaError::CycleDetected {
            stage: "C".into(),
            cycle: vec!["C".into()],
        };
        assert_eq!(cycle.kind(), ErrorKind::BadRequest);

        let incomplete = DedaError::InvalidStage {
            stage: "synth".into(),
            reason: "image is empty".into(),
        };
        assert_eq!(incomplete.kind(), ErrorKind::BadRequest);

        let failed = DedaError::compilation_failed(
            "p1",
            DedaError::WriteFailure {
                path: PathBuf::from("/dags/x.py"),
                error: "permission denied".into(),
            },
        );
        assert_eq!(failed.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_compilation_failed_keeps_cause() {
        let failed = DedaError::compilation_failed(
            "p1",
            DedaError::WriteFailure {
                path: PathBuf::from("/dags/x.py"),
                error: "disk full".into(),
            },
        );

        let source = std::error::Error::source(&failed).unwrap();
        assert!(source.to_string().contains("disk full"));
        assert!(failed.recovery().is_some());
    }

    #[test]
    fn test_cycle_message_lists_members() {
        let err = DedaError::CycleDetected {
            stage: "a".into(),
            cycle: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "Dependency cycle detected at stage 'a' (cycle: a → b)"
        );
    }
}
