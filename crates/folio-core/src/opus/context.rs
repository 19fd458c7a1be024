//! State threaded through command evaluation

use crate::diagnostics::{Location, Problem};
use crate::discovery::SourcePatterns;
use crate::opus::ordering::FileOrdering;
use crate::parser::DocumentParser;
use crate::tree::SyntacticTree;
use indexmap::IndexMap;
use rayon::ThreadPool;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// A stylesheet mapping that would replace one made by an earlier directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Stylesheet for '{mime}' already mapped to '{existing}', ignoring '{rejected}'")]
pub struct DuplicateStylesheetMapping {
    pub mime: String,
    pub existing: String,
    pub rejected: String,
}

/// Immutable evaluation state: each command consumes a context and returns the next one.
///
/// The worker pool, the front end and the source patterns are shared by every
/// context derived from the same root.
#[derive(Clone)]
pub struct CommandExecutionContext {
    content_root: PathBuf,
    pool: Arc<ThreadPool>,
    parser: Arc<dyn DocumentParser>,
    patterns: Arc<SourcePatterns>,
    default_ordering: FileOrdering,
    stylesheets: IndexMap<String, String>,
    tree: Option<SyntacticTree>,
    problems: Vec<Problem>,
}

impl CommandExecutionContext {
    pub fn new(
        content_root: impl Into<PathBuf>,
        pool: Arc<ThreadPool>,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        Self {
            content_root: content_root.into(),
            pool,
            parser,
            patterns: Arc::new(SourcePatterns::default()),
            default_ordering: FileOrdering::default(),
            stylesheets: IndexMap::new(),
            tree: None,
            problems: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: SourcePatterns) -> Self {
        self.patterns = Arc::new(patterns);
        self
    }

    #[must_use]
    pub fn with_default_ordering(mut self, ordering: FileOrdering) -> Self {
        self.default_ordering = ordering;
        self
    }

    /// Directory against which relative insert targets resolve.
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    pub fn parser(&self) -> &dyn DocumentParser {
        self.parser.as_ref()
    }

    pub fn patterns(&self) -> &SourcePatterns {
        &self.patterns
    }

    /// Ordering for directory inserts that do not name one.
    pub fn default_ordering(&self) -> FileOrdering {
        self.default_ordering
    }

    pub fn document_tree(&self) -> Option<&SyntacticTree> {
        self.tree.as_ref()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn stylesheets(&self) -> &IndexMap<String, String> {
        &self.stylesheets
    }

    /// Stylesheet mapped to a mime type name, such as `html`.
    pub fn stylesheet(&self, mime: &str) -> Option<&str> {
        self.stylesheets.get(mime).map(String::as_str)
    }

    #[must_use]
    pub fn update(mut self, tree: SyntacticTree) -> Self {
        self.tree = Some(tree);
        self
    }

    #[must_use]
    pub fn add_problems(mut self, problems: impl IntoIterator<Item = Problem>) -> Self {
        self.problems.extend(problems);
        self
    }

    /// Adds mappings; each one colliding with an existing mapping becomes a problem and
    /// leaves the existing mapping in place.
    #[must_use]
    pub fn add_mappings(
        mut self,
        mappings: &IndexMap<String, String>,
        location: Option<&Location>,
    ) -> Self {
        for (mime, stylesheet) in mappings {
            match self.stylesheets.get(mime) {
                Some(existing) => {
                    let error = DuplicateStylesheetMapping {
                        mime: mime.clone(),
                        existing: existing.clone(),
                        rejected: stylesheet.clone(),
                    };
                    self.problems.push(Problem::from_error(&error, location));
                }
                None => {
                    self.stylesheets.insert(mime.clone(), stylesheet.clone());
                }
            }
        }
        self
    }

    /// Gives back the parts worth keeping once evaluation is over.
    pub fn into_parts(self) -> (Option<SyntacticTree>, Vec<Problem>, IndexMap<String, String>) {
        (self.tree, self.problems, self.stylesheets)
    }
}

impl fmt::Debug for CommandExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutionContext")
            .field("content_root", &self.content_root)
            .field("default_ordering", &self.default_ordering)
            .field("stylesheets", &self.stylesheets)
            .field("tree", &self.tree)
            .field("problems", &self.problems)
            .finish_non_exhaustive()
    }
}
