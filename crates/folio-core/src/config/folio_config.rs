//! Configuration types for folio

use crate::discovery::DEFAULT_SOURCE_PATTERNS;
use crate::error::FolioError;
use crate::opus::ordering::SortMethod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FolioConfig {
    pub assembly: AssemblyConfiguration,
    pub tags: TagsConfiguration,
}

/// How opus directives get evaluated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblyConfiguration {
    /// Size of the worker pool parsing directory inserts; available parallelism when
    /// absent
    pub worker_threads: Option<usize>,

    /// Sort method of directory inserts without an explicit ordering
    pub default_ordering: SortMethod,

    /// File name globs selecting sources in directory inserts
    pub source_extensions: Vec<String>,

    /// Directory relative insert targets resolve against; the opus directory when
    /// absent
    pub content_root: Option<PathBuf>,
}

impl Default for AssemblyConfiguration {
    fn default() -> Self {
        Self {
            worker_threads: None,
            default_ordering: SortMethod::default(),
            source_extensions: DEFAULT_SOURCE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            content_root: None,
        }
    }
}

impl AssemblyConfiguration {
    /// Pool size to use, never zero.
    pub fn effective_worker_threads(&self) -> usize {
        self.worker_threads
            .filter(|threads| *threads > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
    }
}

/// Tag filtering applied to assembled documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TagsConfiguration {
    /// Tags to keep; empty keeps everything
    pub restrict: Vec<String>,
}

impl FolioConfig {
    /// Reads a configuration file, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self, FolioError> {
        let content = std::fs::read_to_string(path).map_err(|e| FolioError::io_error(path, e))?;
        let failure = |e: &dyn std::fmt::Display| {
            FolioError::config_error(format!("Invalid configuration '{}': {e}", path.display()))
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| failure(&e)),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| failure(&e)),
            Some("json") => serde_json::from_str(&content).map_err(|e| failure(&e)),
            _ => Err(FolioError::config_error(format!(
                "Unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    /// Checks values serde cannot check.
    pub fn validate(&self) -> Result<(), FolioError> {
        if self.assembly.worker_threads == Some(0) {
            return Err(FolioError::config_error(
                "assembly.workerThreads must be at least 1",
            ));
        }
        if self.assembly.source_extensions.is_empty() {
            return Err(FolioError::config_error(
                "assembly.sourceExtensions must not be empty",
            ));
        }
        crate::discovery::SourcePatterns::new(&self.assembly.source_extensions)?;
        Ok(())
    }
}
