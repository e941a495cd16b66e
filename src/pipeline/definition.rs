// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Pipeline and stage records
//!
//! These mirror the rows the pipeline-authoring surface stores. The compiler
//! only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DedaError;

/// A pipeline record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRecord {
    /// Pipeline identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: PipelineStatus,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Author, if known
    #[serde(default)]
    pub created_by: Option<String>,
}

impl PipelineRecord {
    /// Create a draft pipeline record with no timestamps
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            status: PipelineStatus::Draft,
            created_at: None,
            updated_at: None,
            created_by: None,
        }
    }
}

/// Pipeline lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

/// A single containerized tool invocation within a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage identifier (unique within the pipeline)
    pub id: String,

    /// Owning pipeline
    #[serde(default)]
    pub pipeline_id: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// EDA tool this stage runs (ghdl, yosys, nextpnr, ...)
    #[serde(default)]
    pub tool_name: String,

    /// Container image reference
    pub image: String,

    /// Command run inside the container
    pub command: String,

    /// Ids of stages that must finish first
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Author's ordering hint; dependencies take precedence
    #[serde(default)]
    pub order_index: i64,

    /// Tool-specific settings, not read by the compiler
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub position_x: f64,

    #[serde(default)]
    pub position_y: f64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl StageRecord {
    /// Create a stage with the fields the compiler reads; the rest default
    pub fn new(id: impl Into<String>, image: impl Into<String>, command: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            pipeline_id: None,
            tool_name: String::new(),
            image: image.into(),
            command: command.into(),
            depends_on: Vec::new(),
            order_index: 0,
            config: serde_json::Map::new(),
            position_x: 0.0,
            position_y: 0.0,
            created_at: None,
        }
    }

    /// Set the dependencies
    pub fn with_depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the ordering hint
    pub fn with_order_index(mut self, order_index: i64) -> Self {
        self.order_index = order_index;
        self
    }

    /// Dependencies with repeats removed, first occurrence kept
    pub fn dependencies(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.depends_on
            .iter()
            .map(String::as_str)
            .filter(|dep| seen.insert(*dep))
            .collect()
    }
}

/// A pipeline with its stages inlined, as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDocument {
    #[serde(flatten)]
    pub pipeline: PipelineRecord,

    #[serde(default)]
    pub stages: Vec<StageRecord>,
}

impl PipelineDocument {
    /// Parse a document from YAML (JSON is accepted too)
    pub fn from_yaml(yaml: &str) -> Result<Self, DedaError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize the document to YAML
    pub fn to_yaml(&self) -> Result<String, DedaError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }
}

/// Check that a pipeline id can be used in a dag id and a file name
pub fn check_pipeline_id(pipeline_id: &str) -> Result<(), DedaError> {
    let invalid = |reason: &str| DedaError::InvalidPipelineId {
        pipeline_id: pipeline_id.to_string(),
        reason: reason.to_string(),
    };

    if pipeline_id.is_empty() {
        return Err(invalid("id is empty"));
    }
    if pipeline_id.starts_with('.') {
        return Err(invalid("id starts with '.'"));
    }
    if let Some(c) = pipeline_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(invalid(&format!("character {:?} is not allowed", c)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipeline_document() {
        let yaml = r#"
id: "7f3c"
name: "counter"
status: active
stages:
  - id: "analyze"
    name: "Analyze VHDL"
    tool_name: ghdl
    image: "ghdl/ghdl:latest"
    command: "ghdl -a counter.vhd"
    order_index: 0
  - id: "simulate"
    tool_name: ghdl
    image: "ghdl/ghdl:latest"
    command: "ghdl -r counter --vcd=counter.vcd"
    depends_on: ["analyze"]
    order_index: 1
    config:
      stop_time: "100ns"
    position_x: 250.0
"#;

        let doc = PipelineDocument::from_yaml(yaml).unwrap();
        assert_eq!(doc.pipeline.id, "7f3c");
        assert_eq!(doc.pipeline.status, PipelineStatus::Active);
        assert_eq!(doc.stages.len(), 2);
        assert_eq!(doc.stages[1].depends_on, vec!["analyze"]);
        assert_eq!(doc.stages[1].config["stop_time"], "100ns");
        assert_eq!(doc.stages[1].name, "");
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{"id": "p1", "name": "p", "stages": [
            {"id": "a", "image": "alpine", "command": "true"}
        ]}"#;

        let doc = PipelineDocument::from_yaml(json).unwrap();
        assert_eq!(doc.pipeline.status, PipelineStatus::Draft);
        assert_eq!(doc.stages[0].order_index, 0);
        assert!(doc.stages[0].depends_on.is_empty());
    }

    #[test]
    fn test_dependencies_dedup() {
        let stage = StageRecord::new("c", "alpine", "true").with_depends_on(["a", "b", "a"]);
        assert_eq!(stage.dependencies(), vec!["a", "b"]);
    }

    #[test]
    fn test_check_pipeline_id() {
        assert!(check_pipeline_id("0b6c3f0e-9d5b-4c1e-8f43-2a7e3c9d1f00").is_ok());
        assert!(check_pipeline_id("P1").is_ok());
        assert!(check_pipeline_id("").is_err());
        assert!(check_pipeline_id("../etc").is_err());
        assert!(check_pipeline_id("a/b").is_err());
        assert!(check_pipeline_id("a b").is_err());
    }
}
