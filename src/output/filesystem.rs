// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Filesystem-based artifact writer
//!
//! Writes `<root>/<workflow-id>.py` through a temporary file in the same
//! directory and renames it into place.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::ArtifactWriter;
use crate::errors::DedaError;
use crate::workflow::WORKFLOW_EXTENSION;

/// Artifact writer backed by a directory the scheduler scans
#[derive(Debug, Clone)]
pub struct FilesystemWriter {
    /// Output directory
    root: PathBuf,
}

impl FilesystemWriter {
    /// Create a writer for an output directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactWriter for FilesystemWriter {
    fn location(&self, workflow_id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", workflow_id, WORKFLOW_EXTENSION))
    }

    async fn write(&self, location: &Path, text: &str) -> Result<(), DedaError> {
        let location = location.to_path_buf();
        let bytes = text.as_bytes().to_vec();

        let written = tokio::task::spawn_blocking({
            let location = location.clone();
            move || write_atomic(&location, &bytes)
        })
        .await
        .map_err(|e| DedaError::WriteFailure {
            path: location.clone(),
            error: format!("write task failed: {}", e),
        })??;

        if written {
            tracing::debug!(path = %location.display(), "workflow file written");
        } else {
            tracing::debug!(path = %location.display(), "workflow file unchanged");
        }

        Ok(())
    }
}

/// Write `bytes` to `location` atomically; `false` if the file already held them
fn write_atomic(location: &Path, bytes: &[u8]) -> Result<bool, DedaError> {
    let failure = |error: String| DedaError::WriteFailure {
        path: location.to_path_buf(),
        error,
    };

    let dir = location
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir)
        .map_err(|e| failure(format!("cannot create {}: {}", dir.display(), e)))?;

    // Leave identical files alone so the scheduler does not reparse them
    if let Ok(existing) = std::fs::read(location) {
        if existing == bytes {
            return Ok(false);
        }
    }

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| failure(format!("cannot create temporary file: {}", e)))?;
    // Temp files are private; the scheduler usually runs as another user
    #[cfg(unix)]
    tmp.as_file()
        .set_permissions(artifact_permissions(location))
        .map_err(|e| failure(format!("cannot set permissions: {}", e)))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| failure(e.to_string()))?;
    tmp.persist(location)
        .map_err(|e| failure(e.error.to_string()))?;

    Ok(true)
}

/// Mode of the file being replaced, or 0644 for a new one
#[cfg(unix)]
fn artifact_permissions(location: &Path) -> std::fs::Permissions {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(location)
        .map(|meta| meta.permissions())
        .unwrap_or_else(|_| std::fs::Permissions::from_mode(0o644))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_location() {
        let writer = FilesystemWriter::new("/app/dags");
        assert_eq!(
            writer.location("deda_pipeline_P1"),
            PathBuf::from("/app/dags/deda_pipeline_P1.py")
        );
    }

    #[tokio::test]
    async fn test_write_and_replace() {
        let dir = TempDir::new().unwrap();
        let writer = FilesystemWriter::new(dir.path().join("dags"));
        let location = writer.location("deda_pipeline_P1");

        writer.write(&location, "first\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&location).unwrap(), "first\n");

        writer.write(&location, "second\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&location).unwrap(), "second\n");

        // Only the workflow file is left behind
        let entries = std::fs::read_dir(dir.path().join("dags")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_identical_write_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let writer = FilesystemWriter::new(dir.path());
        let location = writer.location("deda_pipeline_P1");

        writer.write(&location, "same\n").await.unwrap();
        let before = std::fs::metadata(&location).unwrap().modified().unwrap();

        assert!(!write_atomic(&location, b"same\n").unwrap());
        writer.write(&location, "same\n").await.unwrap();

        let after = std::fs::metadata(&location).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let writer = FilesystemWriter::new(dir.path());
        let location = writer.location("deda_pipeline_P1");

        writer.write(&location, "first\n").await.unwrap();
        let mode = std::fs::metadata(&location).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);

        // A mode set by an operator survives a rewrite
        std::fs::set_permissions(&location, std::fs::Permissions::from_mode(0o640)).unwrap();
        writer.write(&location, "second\n").await.unwrap();
        let mode = std::fs::metadata(&location).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[tokio::test]
    async fn test_unwritable_root() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let writer = FilesystemWriter::new(&blocker);
        let location = writer.location("deda_pipeline_P1");
        let err = writer.write(&location, "text").await.unwrap_err();

        match err {
            DedaError::WriteFailure { path, .. } => assert_eq!(path, location),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
