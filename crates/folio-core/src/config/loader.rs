//! Configuration file discovery and loading

use super::folio_config::FolioConfig;
use crate::error::FolioError;
use std::path::{Path, PathBuf};

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, FolioError>;

/// File names looked up in each directory, in priority order
pub const CONFIG_FILE_NAMES: [&str; 5] = [
    ".foliorc.toml",
    ".foliorc.json",
    "folio.yaml",
    "folio.yml",
    "folio.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    ///
    /// Each directory is searched for [`CONFIG_FILE_NAMES`] in order, until a config is
    /// found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| FolioError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load and validate configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<FolioConfig> {
        let config = FolioConfig::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from path or auto-discover
    ///
    /// A custom path must exist. Without one, discovery starts at `start_dir` (or the
    /// current directory) and fails when nothing is found.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<FolioConfig> {
        let config_path = if let Some(path) = custom_path {
            if !path.exists() {
                return Err(FolioError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        } else {
            let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
            Self::auto_discover(search_dir)?.ok_or_else(|| {
                FolioError::config_error(format!(
                    "No config file found ({})",
                    CONFIG_FILE_NAMES.join(", ")
                ))
            })?
        };

        Self::load_from_file(&config_path)
    }

    /// Like [`ConfigLoader::load`], but falls back to defaults when discovery finds nothing
    pub fn load_or_default(
        custom_path: Option<&Path>,
        start_dir: Option<&Path>,
    ) -> Result<FolioConfig> {
        if custom_path.is_some() {
            return Self::load(custom_path, start_dir);
        }
        match Self::auto_discover(start_dir.unwrap_or_else(|| Path::new(".")))? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(FolioConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opus::ordering::SortMethod;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            ".foliorc.toml",
            "[assembly]\nworkerThreads = 2\ndefaultOrdering = \"version\"\n",
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.assembly.worker_threads, Some(2));
        assert_eq!(config.assembly.default_ordering, SortMethod::Version);
    }

    #[test]
    fn test_load_from_file_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "folio.json",
            r#"{ "tags": { "restrict": ["a", "b"] } }"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.tags.restrict, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "folio.yaml",
            "assembly:\n  workerThreads: 0\n",
        );
        assert!(ConfigLoader::load_from_file(&config_path).is_err());

        let config_path = create_temp_config(
            temp_dir.path(),
            "folio.json",
            r#"{ "assembly": { "defaultOrdering": "size" } }"#,
        );
        assert!(ConfigLoader::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_auto_discover() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/nested");
        fs::create_dir_all(&nested).unwrap();

        create_temp_config(temp_dir.path(), "folio.yml", "tags:\n  restrict: []\n");

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "folio.yml");
    }

    #[test]
    fn test_discovery_priority() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "folio.json", "{}");
        create_temp_config(temp_dir.path(), ".foliorc.toml", "");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".foliorc.toml");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Some(Path::new("nonexistent.json")), None);
        assert!(result.is_err());
        let result = ConfigLoader::load_from_file(Path::new("nonexistent.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_or_default(None, Some(temp_dir.path()));
        // A config further up the real filesystem may exist, so only check it loads
        assert!(config.is_ok());
    }
}
