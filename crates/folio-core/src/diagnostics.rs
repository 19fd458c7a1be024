//! Source coordinates and recoverable problems
//!
//! A [`Problem`] is a defect that does not stop processing. Passes collect them and
//! hand them on; deciding whether a document with problems gets rendered is left to
//! the caller.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Position of a node in its source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub source: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(source: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// A recoverable defect found while parsing, resolving, or assembling.
///
/// Problems order by location first (problems without one come first), then by
/// message, so a sorted list reads like a compiler report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Problem {
    message: String,
    location: Option<Location>,
}

impl Problem {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Creates a problem located where it is known, unlocated otherwise.
    pub fn maybe_at(message: impl Into<String>, location: Option<&Location>) -> Self {
        Self {
            message: message.into(),
            location: location.cloned(),
        }
    }

    pub fn from_error(error: &dyn std::error::Error, location: Option<&Location>) -> Self {
        Self::maybe_at(error.to_string(), location)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

impl Ord for Problem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location
            .cmp(&other.location)
            .then_with(|| self.message.cmp(&other.message))
    }
}

impl PartialOrd for Problem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
