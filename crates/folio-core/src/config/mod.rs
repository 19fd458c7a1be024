//! Configuration system for folio
//!
//! Configuration lives in TOML, YAML or JSON files, the format following the
//! extension. Without an explicit path the loader searches the opus directory and
//! its ancestors for one of [`CONFIG_FILE_NAMES`].
//!
//! ## Example Configuration
//!
//! ```toml
//! [assembly]
//! workerThreads = 4
//! defaultOrdering = "version"
//! sourceExtensions = ["*.nlp"]
//!
//! [tags]
//! restrict = ["published"]
//! ```

mod folio_config;
mod loader;

pub use folio_config::{AssemblyConfiguration, FolioConfig, TagsConfiguration};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader, Result};
