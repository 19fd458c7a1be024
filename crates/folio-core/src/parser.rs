//! Front end seam
//!
//! The markup grammar lives outside this crate. Anything able to turn source text
//! into a [`SyntacticTree`] plugs in through [`DocumentParser`]; the assembler calls it
//! from worker threads, hence the `Send + Sync` bound.

use crate::diagnostics::Problem;
use crate::error::FolioError;
use crate::tree::SyntacticTree;
use std::path::Path;

/// Outcome of parsing one source unit.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Absent when the source was too broken to yield a root.
    pub tree: Option<SyntacticTree>,
    pub problems: Vec<Problem>,
}

impl ParsedDocument {
    pub fn new(tree: Option<SyntacticTree>, problems: Vec<Problem>) -> Self {
        Self { tree, problems }
    }

    pub fn is_valid(&self) -> bool {
        self.tree.is_some() && self.problems.is_empty()
    }

    pub fn tree(&self) -> Option<&SyntacticTree> {
        self.tree.as_ref()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

pub trait DocumentParser: Send + Sync {
    /// Parses `content`; `source_name` ends up in every [`crate::diagnostics::Location`].
    fn parse(&self, source_name: &str, content: &str) -> ParsedDocument;

    /// Reads and parses a file, naming locations after its path.
    fn parse_file(&self, path: &Path) -> Result<ParsedDocument, FolioError> {
        let content = std::fs::read_to_string(path).map_err(|e| FolioError::io_error(path, e))?;
        Ok(self.parse(&path.display().to_string(), &content))
    }
}
