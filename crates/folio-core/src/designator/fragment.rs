//! Hierarchical fragment identifiers

use super::DesignatorError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An ordered, non-empty sequence of non-blank segments.
///
/// The textual form prefixes every segment with a backslash (`\a\b`); the absolute form
/// adds one more (`\\a\b`). Parsing accepts both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentIdentifier {
    segments: Vec<String>,
}

impl FragmentIdentifier {
    pub fn new<I, S>(segments: I) -> Result<Self, DesignatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(DesignatorError::EmptyIdentifier);
        }
        if let Some(position) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(DesignatorError::BlankSegment { position });
        }
        Ok(Self { segments })
    }

    /// Identifier made of one segment.
    pub fn single(segment: impl Into<String>) -> Result<Self, DesignatorError> {
        Self::new([segment.into()])
    }

    /// Appends `segment` below this identifier.
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, DesignatorError> {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Same segments minus the last one, `None` for a single-segment identifier.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() > 1 {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        } else {
            None
        }
    }

    /// True when the segments of `self` start the segments of `other`. An identifier is
    /// its own parent in that sense.
    pub fn is_parent_of(&self, other: &FragmentIdentifier) -> bool {
        other.segments.starts_with(&self.segments)
    }

    pub fn absolute_representation(&self) -> String {
        format!("\\{self}")
    }
}

impl fmt::Display for FragmentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "\\{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FragmentIdentifier {
    type Err = DesignatorError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim().trim_start_matches('\\');
        if trimmed.is_empty() {
            return Err(DesignatorError::EmptyIdentifier);
        }
        Self::new(trimmed.split('\\'))
    }
}

impl Serialize for FragmentIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
