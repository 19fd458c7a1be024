//! Sorting the files of a directory insert

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version marker sorting after every numbered version.
const SNAPSHOT: &str = "SNAPSHOT";

/// What files get compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMethod {
    /// Lexicographic order of absolute paths
    #[default]
    Path,
    /// Semantic version read from the file's base name
    Version,
}

impl SortMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "path" => Some(Self::Path),
            "version" => Some(Self::Version),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Version => "version",
        }
    }
}

/// A sort method, possibly inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileOrdering {
    method: SortMethod,
    inverted: bool,
}

impl FileOrdering {
    pub const BY_ABSOLUTE_PATH: Self = Self::new(SortMethod::Path);
    pub const BY_VERSION_NUMBER: Self = Self::new(SortMethod::Version);

    pub const fn new(method: SortMethod) -> Self {
        Self {
            method,
            inverted: false,
        }
    }

    pub fn method(&self) -> SortMethod {
        self.method
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Same criterion, opposite direction.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            method: self.method,
            inverted: !self.inverted,
        }
    }

    /// Sorts `files`, keeping the input order of files with equal criteria.
    ///
    /// Every file whose criterion cannot be built is reported in one error, in input
    /// order.
    pub fn sort(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>, CriteriaError> {
        let mut exceptions = Vec::new();
        let mut keyed = Vec::with_capacity(files.len());
        for file in files {
            match Criterion::create(self.method, file) {
                Ok(criterion) => keyed.push((criterion, file)),
                Err(exception) => exceptions.push(exception),
            }
        }
        if !exceptions.is_empty() {
            return Err(CriteriaError { exceptions });
        }

        keyed.sort_by(|(a, _), (b, _)| {
            if self.inverted {
                b.cmp(a)
            } else {
                a.cmp(b)
            }
        });
        Ok(keyed.into_iter().map(|(_, file)| file.clone()).collect())
    }
}

impl fmt::Display for FileOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.inverted { '-' } else { '+' };
        write!(f, "{}{direction}", self.method.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Criterion {
    Path(String),
    Version(VersionKey),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum VersionKey {
    Numbered(semver::Version),
    Snapshot,
}

impl Criterion {
    fn create(method: SortMethod, file: &Path) -> Result<Self, CriterionCreationError> {
        match method {
            SortMethod::Path => std::path::absolute(file)
                .map(|absolute| Criterion::Path(absolute.to_string_lossy().into_owned()))
                .map_err(|e| CriterionCreationError::new(file, e.to_string())),
            SortMethod::Version => {
                let radix = file
                    .file_stem()
                    .map(|stem| stem.to_string_lossy())
                    .unwrap_or_default();
                if radix == SNAPSHOT {
                    return Ok(Criterion::Version(VersionKey::Snapshot));
                }
                semver::Version::parse(&radix)
                    .map(|version| Criterion::Version(VersionKey::Numbered(version)))
                    .map_err(|e| {
                        CriterionCreationError::new(file, format!("Bad version '{radix}': {e}"))
                    })
            }
        }
    }
}

/// One file whose sort criterion could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: '{}'", file.display())]
pub struct CriterionCreationError {
    pub file: PathBuf,
    pub reason: String,
}

impl CriterionCreationError {
    pub fn new(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Every failure of one sort attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct CriteriaError {
    exceptions: Vec<CriterionCreationError>,
}

impl CriteriaError {
    pub fn exceptions(&self) -> &[CriterionCreationError] {
        &self.exceptions
    }
}

impl fmt::Display for CriteriaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Could not create file sort criteria for:")?;
        for exception in &self.exceptions {
            write!(f, "\n  {exception}")?;
        }
        Ok(())
    }
}
