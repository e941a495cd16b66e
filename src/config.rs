// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Settings loading
//!
//! Defaults, then `deda.yaml`, then `DEDA_*` environment variables. CLI
//! flags are applied last by the binary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::DedaError;

/// Default settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "deda.yaml";

/// Environment variable overriding `output_dir`
pub const ENV_OUTPUT_DIR: &str = "DEDA_DAG_OUTPUT_DIR";

/// Environment variable overriding `store_dir`
pub const ENV_STORE_DIR: &str = "DEDA_STORE_DIR";

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory the scheduler watches for DAG files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding `<pipeline-id>.yaml` pipeline documents
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// What goes into the emitted DAG header and operators
    #[serde(default)]
    pub airflow: AirflowSettings,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dags")
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("pipelines")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            store_dir: default_store_dir(),
            airflow: AirflowSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from an explicit file, or `deda.yaml` if present
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, DedaError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Read settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, DedaError> {
        let content = std::fs::read_to_string(path).map_err(|e| DedaError::Config {
            message: format!("cannot read '{}': {}", path.display(), e),
            help: Some("Pass an existing file to --config, or drop the flag".into()),
        })?;

        Self::from_yaml(&content).map_err(|e| DedaError::Config {
            message: format!("invalid settings in '{}': {}", path.display(), e),
            help: None,
        })
    }

    /// Parse settings from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, DedaError> {
        // An empty file deserializes to unit, not a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Apply environment overrides; blank values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.trim().is_empty()) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_STORE_DIR).filter(|v| !v.trim().is_empty()) {
            self.store_dir = PathBuf::from(v);
        }
    }
}

/// Fixed metadata and container wiring for emitted DAGs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirflowSettings {
    /// `owner` in the DAG's default_args
    pub owner: String,

    /// Nominal start date; with no schedule and no catchup it only anchors runs
    pub start_date: NaiveDate,

    /// Docker daemon the operators talk to
    pub docker_url: String,

    /// Container network mode
    pub network_mode: String,

    /// Shared workspace bind-mounted into every stage container
    pub workspace: MountSettings,

    /// DAG tags shown in the scheduler UI
    pub tags: Vec<String>,
}

impl Default for AirflowSettings {
    fn default() -> Self {
        Self {
            owner: "deda".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
            docker_url: "unix://var/run/docker.sock".into(),
            network_mode: "bridge".into(),
            workspace: MountSettings::default(),
            tags: vec!["deda".into()],
        }
    }
}

/// A host directory mounted into stage containers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountSettings {
    pub source: String,
    pub target: String,
}

impl Default for MountSettings {
    fn default() -> Self {
        Self {
            source: "/tmp/deda-workspace".into(),
            target: "/workspace".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir, PathBuf::from("dags"));
        assert_eq!(settings.airflow.owner, "deda");
        assert_eq!(
            settings.airflow.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
output_dir: /opt/airflow/dags
airflow:
  owner: asic-team
  start_date: 2025-03-01
  workspace:
    source: /srv/eda
"#;

        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("/opt/airflow/dags"));
        assert_eq!(settings.store_dir, PathBuf::from("pipelines"));
        assert_eq!(settings.airflow.owner, "asic-team");
        assert_eq!(settings.airflow.network_mode, "bridge");
        assert_eq!(settings.airflow.workspace.source, "/srv/eda");
        assert_eq!(settings.airflow.workspace.target, "/workspace");
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_OUTPUT_DIR, "/app/dags"), (ENV_STORE_DIR, "  ")]);

        let mut settings = Settings::default();
        settings.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.output_dir, PathBuf::from("/app/dags"));
        assert_eq!(settings.store_dir, PathBuf::from("pipelines"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let result = Settings::load(Some(&dir.path().join("nope.yaml")));

        assert!(matches!(result, Err(DedaError::Config { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deda.yaml");
        std::fs::write(&path, "store_dir: stages\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.store_dir, PathBuf::from("stages"));
    }
}
