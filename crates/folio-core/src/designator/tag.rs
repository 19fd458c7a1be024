//! Labels for conditional inclusion

use super::DesignatorError;
use crate::tree::{NodeKind, SyntacticTree};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A non-blank label, ordered lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Result<Self, DesignatorError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DesignatorError::BlankTag);
        }
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Builds a tag set, silently skipping blank names.
    pub fn to_tag_set<I, S>(names: I) -> BTreeSet<Tag>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| Tag::new(name.as_ref()).ok())
            .collect()
    }

    pub fn contains(tags: &BTreeSet<Tag>, name: &str) -> bool {
        tags.iter().any(|tag| tag.0 == name)
    }

    /// A `kind` node holding the tag name.
    pub fn as_tree(&self, kind: NodeKind) -> SyntacticTree {
        SyntacticTree::token(kind, self.0.as_str())
    }

    /// One `kind` node per tag, in tag order.
    pub fn to_trees(kind: NodeKind, tags: &BTreeSet<Tag>) -> Vec<SyntacticTree> {
        tags.iter().map(|tag| tag.as_tree(kind)).collect()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
