//! Error types for assembly operations

use crate::opus::factory::CommandParameterError;
use crate::opus::ordering::CriteriaError;
use crate::tree::{FilterError, TreeError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type of the folio crates
#[derive(Debug, Error)]
pub enum FolioError {
    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The front end could not build a tree at all
    #[error("Parse error in '{source_name}': {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    /// A directive is malformed
    #[error(transparent)]
    CommandParameter(#[from] CommandParameterError),

    /// One or more files could not be ordered
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    /// A treepath addressed a node that does not exist
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A robust path could not be created
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Config,
    Parse,
    CommandParameter,
    Criteria,
    Tree,
    Filter,
    Internal,
}

impl FolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::IoError { .. } => ErrorKind::Io,
            FolioError::ConfigError { .. } => ErrorKind::Config,
            FolioError::ParseError { .. } => ErrorKind::Parse,
            FolioError::CommandParameter(_) => ErrorKind::CommandParameter,
            FolioError::Criteria(_) => ErrorKind::Criteria,
            FolioError::Tree(_) => ErrorKind::Tree,
            FolioError::Filter(_) => ErrorKind::Filter,
            FolioError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Whether the caller can skip the failed input and carry on with the rest
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Io | ErrorKind::Parse | ErrorKind::CommandParameter | ErrorKind::Criteria
        )
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn parse_error(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
