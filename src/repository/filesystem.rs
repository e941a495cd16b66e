// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Filesystem-based repository
//!
//! Stores one document per pipeline at `<store>/<pipeline-id>.yaml`
//! (`.yml` and `.json` are read too). A document holds the pipeline record
//! with its stages inlined.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::StageRepository;
use crate::errors::DedaError;
use crate::pipeline::{check_pipeline_id, PipelineDocument, PipelineRecord, StageRecord};

/// Extensions tried, in order, when looking up a pipeline
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Filesystem-based repository
#[derive(Debug, Clone)]
pub struct FileRepository {
    /// Store directory
    root: PathBuf,
}

impl FileRepository {
    /// Create a repository over a store directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the document file for a pipeline
    async fn document_path(&self, pipeline_id: &str) -> Result<Option<PathBuf>, DedaError> {
        // Ids become file names, so they must not escape the store
        check_pipeline_id(pipeline_id)?;

        for ext in EXTENSIONS {
            let path = self.root.join(format!("{}.{}", pipeline_id, ext));
            if tokio::fs::try_exists(&path).await.map_err(|e| {
                DedaError::repository(format!("Failed to access {}: {}", path.display(), e))
            })? {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Load and check the document for a pipeline
    async fn load(&self, pipeline_id: &str) -> Result<Option<PipelineDocument>, DedaError> {
        let Some(path) = self.document_path(pipeline_id).await? else {
            tracing::debug!(pipeline = %pipeline_id, root = %self.root.display(), "no pipeline document");
            return Ok(None);
        };

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            DedaError::repository(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let document = parse_document(&path, &content)?;
        if document.pipeline.id != pipeline_id {
            return Err(DedaError::repository(format!(
                "{} declares pipeline '{}', expected '{}'",
                path.display(),
                document.pipeline.id,
                pipeline_id
            )));
        }

        tracing::debug!(
            pipeline = %pipeline_id,
            path = %path.display(),
            stages = document.stages.len(),
            "loaded pipeline document"
        );

        Ok(Some(document))
    }

    /// Write a pipeline document into the store
    pub async fn save(&self, document: &PipelineDocument) -> Result<PathBuf, DedaError> {
        check_pipeline_id(&document.pipeline.id)?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            DedaError::repository(format!(
                "Failed to create store directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let path = self.root.join(format!("{}.yaml", document.pipeline.id));
        let yaml = document.to_yaml()?;
        tokio::fs::write(&path, yaml).await.map_err(|e| {
            DedaError::repository(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(path)
    }
}

fn parse_document(path: &Path, content: &str) -> Result<PipelineDocument, DedaError> {
    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        PipelineDocument::from_yaml(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| DedaError::repository(format!("Invalid pipeline document {}: {}", path.display(), e)))
}

#[async_trait]
impl StageRepository for FileRepository {
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Option<PipelineRecord>, DedaError> {
        Ok(self.load(pipeline_id).await?.map(|doc| doc.pipeline))
    }

    async fn list_stages(&self, pipeline_id: &str) -> Result<Vec<StageRecord>, DedaError> {
        let Some(document) = self.load(pipeline_id).await? else {
            return Ok(Vec::new());
        };

        let mut stages = Vec::with_capacity(document.stages.len());
        for mut stage in document.stages {
            match stage.pipeline_id.as_deref() {
                None => stage.pipeline_id = Some(pipeline_id.to_string()),
                Some(owner) if owner == pipeline_id => {}
                Some(owner) => {
                    return Err(DedaError::repository(format!(
                        "Stage '{}' in pipeline '{}' belongs to pipeline '{}'",
                        stage.id, pipeline_id, owner
                    )));
                }
            }
            stages.push(stage);
        }

        Ok(stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"
id: p1
name: fpga flow
stages:
  - id: lint
    image: ghdl/ghdl:latest
    command: ghdl -s top.vhd
  - id: synth
    image: hdlc/yosys:latest
    command: yosys -p synth top.v
    depends_on: [lint]
"#;

    #[tokio::test]
    async fn test_reads_yaml_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("p1.yaml"), DOCUMENT).unwrap();
        let repo = FileRepository::new(dir.path());

        let pipeline = repo.get_pipeline("p1").await.unwrap().unwrap();
        assert_eq!(pipeline.name, "fpga flow");

        let stages = repo.list_stages("p1").await.unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[1].depends_on, vec!["lint".to_string()]);
        assert!(stages.iter().all(|s| s.pipeline_id.as_deref() == Some("p1")));
    }

    #[tokio::test]
    async fn test_reads_json_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("p2.json"),
            r#"{"id": "p2", "name": "json", "stages": [{"id": "a", "image": "alpine:3", "command": "true"}]}"#,
        )
        .unwrap();
        let repo = FileRepository::new(dir.path());

        assert!(repo.get_pipeline("p2").await.unwrap().is_some());
        assert_eq!(repo.list_stages("p2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_pipeline() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path());

        assert!(repo.get_pipeline("absent").await.unwrap().is_none());
        assert!(repo.list_stages("absent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path());

        assert!(matches!(
            repo.get_pipeline("../etc/passwd").await,
            Err(DedaError::InvalidPipelineId { .. })
        ));
    }

    #[tokio::test]
    async fn test_id_mismatch_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("other.yaml"), DOCUMENT).unwrap();
        let repo = FileRepository::new(dir.path());

        let err = repo.get_pipeline("other").await.unwrap_err();
        assert!(matches!(err, DedaError::Repository { .. }));
        assert!(err.to_string().contains("declares pipeline 'p1'"));
    }

    #[tokio::test]
    async fn test_foreign_stage_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("p3.yaml"),
            "id: p3\nname: x\nstages:\n  - id: a\n    pipeline_id: p9\n    image: alpine:3\n    command: 'true'\n",
        )
        .unwrap();
        let repo = FileRepository::new(dir.path());

        assert!(repo.list_stages("p3").await.is_err());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path().join("store"));
        let document = PipelineDocument {
            pipeline: PipelineRecord::new("saved", "saved pipeline"),
            stages: vec![StageRecord::new("a", "alpine:3", "echo hi")],
        };

        let path = repo.save(&document).await.unwrap();
        assert!(path.ends_with("saved.yaml"));

        let stages = repo.list_stages("saved").await.unwrap();
        assert_eq!(stages[0].command, "echo hi");
    }
}
