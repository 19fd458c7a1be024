//! Turning an opus into one document tree
//!
//! The opus source goes through the front end, then each of its top-level directives
//! is built into a [`Command`] and evaluated in order, starting from an empty `OPUS`
//! tree. The assembled tree then gets identifier collisions resolved, lists
//! aggregated, the tag restriction applied and explicit tags promoted.

use super::command::Command;
use super::context::CommandExecutionContext;
use super::factory::create_command;
use super::ordering::FileOrdering;
use crate::config::FolioConfig;
use crate::designator::{IdentifierCollisions, Tag};
use crate::diagnostics::Problem;
use crate::discovery::SourcePatterns;
use crate::error::FolioError;
use crate::mangling::tags::{find_explicit_tags, promote};
use crate::mangling::{aggregate_lists, remove_separators, tag_filter};
use crate::parser::DocumentParser;
use crate::tree::{NodeKind, SyntacticTree};
use indexmap::IndexMap;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of an assembly. Problems never stop it, so the tree may be partial.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    pub tree: Option<SyntacticTree>,
    /// Sorted by location, then message
    pub problems: Vec<Problem>,
    pub stylesheets: IndexMap<String, String>,
}

impl AssembledDocument {
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}

/// Reusable assembly setup: the front end, the worker pool and what the configuration
/// says about directory inserts and tags.
pub struct OpusAssembler {
    parser: Arc<dyn DocumentParser>,
    pool: Arc<ThreadPool>,
    patterns: SourcePatterns,
    default_ordering: FileOrdering,
    content_root: Option<PathBuf>,
    tags: BTreeSet<Tag>,
}

impl OpusAssembler {
    pub fn new(parser: Arc<dyn DocumentParser>, config: &FolioConfig) -> Result<Self, FolioError> {
        config.validate()?;
        let threads = config.assembly.effective_worker_threads();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("folio-worker-{index}"))
            .build()
            .map_err(|e| FolioError::internal_error(format!("Cannot start worker pool: {e}")))?;
        debug!(threads, "Worker pool ready");

        Ok(Self {
            parser,
            pool: Arc::new(pool),
            patterns: SourcePatterns::new(&config.assembly.source_extensions)?,
            default_ordering: FileOrdering::new(config.assembly.default_ordering),
            content_root: config.assembly.content_root.clone(),
            tags: Tag::to_tag_set(&config.tags.restrict),
        })
    }

    /// Replaces the tag restriction coming from the configuration.
    #[must_use]
    pub fn with_tags(mut self, tags: BTreeSet<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Reads the opus at `path`; relative insert targets resolve against its directory
    /// unless the configuration names a content root.
    pub fn assemble_file(&self, path: &Path) -> Result<AssembledDocument, FolioError> {
        let content = std::fs::read_to_string(path).map_err(|e| FolioError::io_error(path, e))?;
        let base_directory = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(self.assemble(&path.display().to_string(), &content, base_directory))
    }

    pub fn assemble(
        &self,
        source_name: &str,
        content: &str,
        base_directory: &Path,
    ) -> AssembledDocument {
        let content_root = match &self.content_root {
            Some(root) => base_directory.join(root),
            None => base_directory.to_path_buf(),
        };
        info!(opus = source_name, root = %content_root.display(), "Assembling");

        let parsed = self.parser.parse(source_name, content);
        let mut context = CommandExecutionContext::new(
            content_root,
            Arc::clone(&self.pool),
            Arc::clone(&self.parser),
        )
        .with_patterns(self.patterns.clone())
        .with_default_ordering(self.default_ordering)
        .add_problems(parsed.problems().iter().cloned());

        if let Some(opus) = parsed.tree() {
            let (commands, problems) = create_commands(&remove_separators(opus));
            context = context
                .add_problems(problems)
                .update(SyntacticTree::leaf(NodeKind::Opus));
            for command in &commands {
                context = command.evaluate(context);
            }
        }

        let (tree, mut problems, stylesheets) = context.into_parts();
        let tree = tree.map(|tree| self.rehierarchize(&tree, problems.is_empty()));
        problems.sort();
        info!(problems = problems.len(), "Assembled");

        AssembledDocument {
            tree,
            problems,
            stylesheets,
        }
    }

    fn rehierarchize(&self, tree: &SyntacticTree, decorate: bool) -> SyntacticTree {
        let tree = IdentifierCollisions::resolve(tree);
        let explicit_tags = find_explicit_tags(&tree);
        let tree = aggregate_lists(&tree);
        let tree = tag_filter::filter(&tree, &self.tags);
        let tree = promote(&tree, &explicit_tags);
        if decorate {
            add_metadata(&tree, &explicit_tags)
        } else {
            tree
        }
    }
}

/// Builds a command from each child of the opus; unusable directives become problems.
fn create_commands(opus: &SyntacticTree) -> (Vec<Command>, Vec<Problem>) {
    let mut commands = Vec::new();
    let mut problems = Vec::new();
    for directive in opus.children() {
        match create_command(directive) {
            Ok(command) => commands.push(command),
            Err(e) => problems.push(Problem::from_error(&e, directive.location())),
        }
    }
    debug!(commands = commands.len(), "Created commands");
    (commands, problems)
}

/// Adds a `_META` first child holding the word count and the explicit tags, if any.
pub fn add_metadata(tree: &SyntacticTree, explicit_tags: &BTreeSet<Tag>) -> SyntacticTree {
    let mut meta = vec![SyntacticTree::token(
        NodeKind::WordCount,
        count_words(tree).to_string(),
    )];
    if !explicit_tags.is_empty() {
        meta.push(SyntacticTree::node(
            NodeKind::Tags,
            Tag::to_trees(NodeKind::ExplicitTag, explicit_tags),
        ));
    }
    tree.add_first(SyntacticTree::node(NodeKind::Meta, meta))
}

fn count_words(tree: &SyntacticTree) -> usize {
    if tree.is(NodeKind::Word) {
        1
    } else {
        tree.children().iter().map(count_words).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::NotationParser;
    use std::fs;
    use tempfile::TempDir;

    fn assembler() -> OpusAssembler {
        let mut config = FolioConfig::default();
        config.assembly.worker_threads = Some(2);
        OpusAssembler::new(Arc::new(NotationParser::new()), &config).unwrap()
    }

    fn messages(document: &AssembledDocument) -> Vec<String> {
        document.problems.iter().map(|p| p.message().to_string()).collect()
    }

    #[test]
    fn test_insert_and_decorate() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.nlp"),
            r#"(NOVELLA (PARAGRAPH_REGULAR (WORD_ "hello") (WORD_ "world")))"#,
        )
        .unwrap();
        let document = assembler().assemble(
            "opus.nlp",
            r#"(OPUS (COMMAND_INSERT_ (URL_LITERAL "file:a.nlp")))"#,
            dir.path(),
        );
        assert!(!document.has_problems(), "{:?}", document.problems);
        insta::assert_snapshot!(document.tree.unwrap().to_notation(), @r#"(OPUS (_META (_WORD_COUNT "2")) (PARAGRAPH_REGULAR (WORD_ "hello") (WORD_ "world")))"#);
    }

    #[test]
    fn test_bad_directive_does_not_stop_assembly() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.nlp"),
            r#"(NOVELLA (PARAGRAPH_REGULAR (WORD_ "w")))"#,
        )
        .unwrap();
        let document = assembler().assemble(
            "opus.nlp",
            "(OPUS\n  (COMMAND_INSERT_ COMMAND_INSERT_RECURSE_)\n  (COMMAND_INSERT_ (URL_LITERAL \"a.nlp\")))",
            dir.path(),
        );
        assert_eq!(document.problems.len(), 1);
        assert!(document.problems[0].message().starts_with("Found no URL"));
        assert_eq!(document.problems[0].location().unwrap().to_string(), "opus.nlp:2:3");
        assert_eq!(
            document.tree.unwrap().to_notation(),
            r#"(OPUS (PARAGRAPH_REGULAR (WORD_ "w")))"#
        );
    }

    #[test]
    fn test_problems_are_sorted() {
        let dir = TempDir::new().unwrap();
        let document = assembler().assemble(
            "opus.nlp",
            "(OPUS\n  (COMMAND_INSERT_ (URL_LITERAL \"z.nlp\"))\n  (COMMAND_INSERT_ (URL_LITERAL \"a.nlp\")))",
            dir.path(),
        );
        assert_eq!(document.problems.len(), 2);
        let lines: Vec<u32> = document
            .problems
            .iter()
            .map(|p| p.location().unwrap().line)
            .collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(
            document.tree.as_ref().unwrap().to_notation(),
            "OPUS",
            "{:?}",
            messages(&document)
        );
    }

    #[test]
    fn test_tag_restriction_and_promotion() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.nlp"),
            concat!(
                r#"(NOVELLA (PARAGRAPH_REGULAR (TAG "keep") (WORD_ "kept"))"#,
                r#" (PARAGRAPH_REGULAR (WORD_ "dropped"))"#,
                r#" (_LEVEL (LEVEL_TITLE (WORD_ "keep")) (PARAGRAPH_REGULAR (WORD_ "inside"))))"#,
            ),
        )
        .unwrap();
        let document = assembler()
            .with_tags(Tag::to_tag_set(["keep"]))
            .assemble(
                "opus.nlp",
                r#"(OPUS (COMMAND_INSERT_ (URL_LITERAL "a.nlp")))"#,
                dir.path(),
            );
        assert!(!document.has_problems(), "{:?}", document.problems);
        insta::assert_snapshot!(document.tree.unwrap().to_notation(), @r#"(OPUS (_META (_WORD_COUNT "3") (_TAGS (_EXPLICIT_TAG "keep"))) (PARAGRAPH_REGULAR (_EXPLICIT_TAG "keep") (WORD_ "kept")) (_LEVEL (_IMPLICIT_IDENTIFIER "\\\\keep") (_PROMOTED_TAG "keep") (LEVEL_TITLE (WORD_ "keep")) (PARAGRAPH_REGULAR (WORD_ "inside"))))"#);
    }

    #[test]
    fn test_stylesheets_collected() {
        let dir = TempDir::new().unwrap();
        let document = assembler().assemble(
            "opus.nlp",
            concat!(
                "(OPUS (COMMAND_MAPSTYLESHEET_",
                r#" (COMMAND_MAPSTYLESHEET_ASSIGNMENT_ "html" "site.xsl")"#,
                r#" (COMMAND_MAPSTYLESHEET_ASSIGNMENT_ "pdf" "print.xsl")))"#,
            ),
            dir.path(),
        );
        assert!(!document.has_problems(), "{:?}", document.problems);
        assert_eq!(document.stylesheets["html"], "site.xsl");
        assert_eq!(document.stylesheets["pdf"], "print.xsl");
    }

    #[test]
    fn test_unparseable_opus() {
        let document = assembler().assemble("opus.nlp", "", Path::new("."));
        assert!(document.tree.is_none());
        assert_eq!(messages(&document), vec!["Empty document"]);
    }

    #[test]
    fn test_missing_opus_file() {
        let dir = TempDir::new().unwrap();
        let result = assembler().assemble_file(&dir.path().join("missing.nlp"));
        assert!(matches!(result, Err(FolioError::IoError { .. })));
    }
}
