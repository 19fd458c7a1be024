//! The `insert` directive
//!
//! A target is either one source file or a directory whose sources get sorted, parsed
//! on the context's worker pool, and spliced in sorted order. Each source goes through
//! novella preparation and identifier enrichment before its content is picked:
//! everything, or only the fragments named by selectors.

use super::command::LevelHead;
use super::context::CommandExecutionContext;
use super::ordering::FileOrdering;
use crate::designator::{BabyInterpreter, FragmentIdentifier};
use crate::diagnostics::{Location, Problem};
use crate::error::FolioError;
use crate::mangling::prepare_novella;
use crate::parser::DocumentParser;
use crate::tree::{NodeKind, SyntacticTree, Treepath};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FILE_PREFIX: &str = "file:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertCommand {
    pub location: Option<Location>,
    /// Path or `file:` URL, relative to the content root unless absolute
    pub target: String,
    pub recurse: bool,
    pub ordering: Option<FileOrdering>,
    pub level_head: Option<LevelHead>,
    /// How many times to go down into the last level before inserting
    pub level_above: usize,
    pub style: Option<String>,
    pub selectors: Vec<FragmentIdentifier>,
}

/// One parsed and enriched source.
struct LoadedSource {
    path: PathBuf,
    tree: Option<SyntacticTree>,
    interpreter: BabyInterpreter,
    problems: Vec<Problem>,
}

impl InsertCommand {
    /// A plain insert of `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            location: None,
            target: target.into(),
            recurse: false,
            ordering: None,
            level_head: None,
            level_above: 0,
            style: None,
            selectors: Vec::new(),
        }
    }

    pub fn evaluate(&self, context: CommandExecutionContext) -> CommandExecutionContext {
        let target = self.resolve_target(context.content_root());
        info!(target = %target.display(), "Inserting");

        let (inclusions, problems) = if target.is_dir() {
            self.evaluate_multiple(&target, &context)
        } else {
            self.evaluate_single(&target, &context)
        };
        let context = context.add_problems(problems);
        if inclusions.is_empty() {
            return context;
        }

        let book = context
            .document_tree()
            .cloned()
            .unwrap_or_else(|| SyntacticTree::leaf(NodeKind::Opus));
        match self.splice(book, inclusions) {
            Ok(book) => context.update(book),
            Err(message) => {
                let problem = Problem::maybe_at(message, self.location.as_ref());
                context.add_problems([problem])
            }
        }
    }

    fn resolve_target(&self, content_root: &Path) -> PathBuf {
        let target = self.target.strip_prefix(FILE_PREFIX).unwrap_or(&self.target);
        let target = Path::new(target);
        if target.is_absolute() {
            target.to_path_buf()
        } else {
            content_root.join(target)
        }
    }

    fn evaluate_single(
        &self,
        path: &Path,
        context: &CommandExecutionContext,
    ) -> (Vec<SyntacticTree>, Vec<Problem>) {
        let loaded = self.load(path, context.parser());
        let mut problems = loaded.problems;
        let Some(tree) = loaded.tree else {
            return (Vec::new(), problems);
        };

        let content = if self.selectors.is_empty() {
            tree.children().to_vec()
        } else {
            let mut selected = Vec::new();
            for selector in &self.selectors {
                match loaded.interpreter.get(selector, &tree) {
                    Some(treepath) => selected.push(treepath.tree_at_end().clone()),
                    None => problems.push(self.problem(format!("Cannot find: '{selector}'"))),
                }
            }
            selected
        };
        (self.shape(&loaded.path, content), problems)
    }

    fn evaluate_multiple(
        &self,
        directory: &Path,
        context: &CommandExecutionContext,
    ) -> (Vec<SyntacticTree>, Vec<Problem>) {
        let files = match context.patterns().scan(directory, self.recurse) {
            Ok(files) => files,
            Err(e) => return (Vec::new(), vec![self.problem_from(&e)]),
        };
        let ordering = self.ordering.unwrap_or(context.default_ordering());
        let files = match ordering.sort(&files) {
            Ok(files) => files,
            Err(e) => {
                let message = format!("Could not sort files: {e}");
                return (Vec::new(), vec![self.problem(message)]);
            }
        };
        debug!(ordering = %ordering, files = files.len(), "Loading sources");

        // Results come back indexed like `files`, whatever order workers finish in.
        let parser = context.parser();
        let loaded: Vec<LoadedSource> = context
            .pool()
            .install(|| files.par_iter().map(|file| self.load(file, parser)).collect());

        // Sources are spliced file by file; selectors only pick what each file holds.
        let mut problems: Vec<Problem> = Vec::new();
        let mut inclusions = Vec::new();
        let mut occurrences: Vec<Vec<&Path>> = vec![Vec::new(); self.selectors.len()];
        for source in &loaded {
            problems.extend(source.problems.iter().cloned());
            let Some(tree) = &source.tree else {
                continue;
            };
            let content = if !source.interpreter.problems().is_empty() {
                debug!(
                    source = %source.path.display(),
                    "Skipping content with identifier problems"
                );
                Vec::new()
            } else if self.selectors.is_empty() {
                tree.children().to_vec()
            } else {
                let mut fragments = Vec::new();
                for (selector, paths) in self.selectors.iter().zip(occurrences.iter_mut()) {
                    if let Some(treepath) = source.interpreter.get(selector, tree) {
                        fragments.push(treepath.tree_at_end().clone());
                        paths.push(source.path.as_path());
                    }
                }
                fragments
            };
            inclusions.extend(self.shape(&source.path, content));
        }

        for (selector, paths) in self.selectors.iter().zip(&occurrences) {
            match paths.as_slice() {
                [] => problems.push(self.problem(format!("Cannot find: '{selector}'"))),
                [_] => {}
                _ => {
                    let paths: Vec<String> =
                        paths.iter().map(|path| path.display().to_string()).collect();
                    problems.push(self.problem(format!(
                        "Identifier {selector} found multiple times in: {}",
                        paths.join(", ")
                    )));
                }
            }
        }
        (inclusions, problems)
    }

    /// Parses, prepares and enriches one source. Never fails: defects become problems.
    fn load(&self, path: &Path, parser: &dyn DocumentParser) -> LoadedSource {
        let parsed = match parser.parse_file(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                return LoadedSource {
                    path: path.to_path_buf(),
                    tree: None,
                    interpreter: BabyInterpreter::default(),
                    problems: vec![self.problem_from(&e)],
                };
            }
        };
        let mut problems = parsed.problems;
        let Some(tree) = parsed.tree else {
            return LoadedSource {
                path: path.to_path_buf(),
                tree: None,
                interpreter: BabyInterpreter::default(),
                problems,
            };
        };

        let prepared = prepare_novella(&tree);
        let interpreter = BabyInterpreter::from_tree(&prepared);
        problems.extend(interpreter.problems().iter().cloned());
        let enriched = interpreter.enrich(&prepared);
        LoadedSource {
            path: path.to_path_buf(),
            tree: Some(enriched),
            interpreter,
            problems,
        }
    }

    /// Applies the level head policy and the style to the content of one source.
    fn shape(&self, source: &Path, content: Vec<SyntacticTree>) -> Vec<SyntacticTree> {
        let content = match self.level_head {
            Some(LevelHead::CreateLevel) => vec![create_level(source, content)],
            Some(LevelHead::NoHead) => remove_head_if_needed(content),
            None => content,
        };
        match &self.style {
            Some(style) => content
                .into_iter()
                .map(|tree| tree.add_first(SyntacticTree::token(NodeKind::Style, style.as_str())))
                .collect(),
            None => content,
        }
    }

    /// Adds `inclusions` as last children of the level `level_above` levels down.
    fn splice(
        &self,
        book: SyntacticTree,
        inclusions: Vec<SyntacticTree>,
    ) -> Result<SyntacticTree, String> {
        let mut treepath = Treepath::create(book);
        for depth in 1..=self.level_above {
            treepath = find_last_level(&treepath, depth)?;
        }
        let target = treepath.tree_at_end();
        let mut children = target.children().to_vec();
        children.extend(inclusions);
        Ok(treepath
            .update_bottom(target.adopt(children))
            .tree_at_start()
            .clone())
    }

    fn problem(&self, message: String) -> Problem {
        Problem::maybe_at(message, self.location.as_ref())
    }

    fn problem_from(&self, error: &FolioError) -> Problem {
        Problem::from_error(error, self.location.as_ref())
    }
}

fn find_last_level(
    treepath: &Treepath<SyntacticTree>,
    depth: usize,
) -> Result<Treepath<SyntacticTree>, String> {
    let tree = treepath.tree_at_end();
    if tree.child_count() == 0 {
        return Err(format!("Found no child tree while seeking level {depth}"));
    }
    let index = tree.child_count() - 1;
    if !tree.children()[index].is(NodeKind::Level) {
        return Err(format!("Found no LEVEL as child tree while seeking level {depth}"));
    }
    treepath.child(index).map_err(|e| e.to_string())
}

/// A `_LEVEL` titled by the base name of `source`, holding `content`.
fn create_level(source: &Path, content: Vec<SyntacticTree>) -> SyntacticTree {
    let title = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut children = Vec::with_capacity(content.len() + 1);
    children.push(SyntacticTree::node(
        NodeKind::LevelTitle,
        vec![SyntacticTree::word(title)],
    ));
    children.extend(content);
    SyntacticTree::node(NodeKind::Level, children)
}

/// Unwraps content made of one level with nothing beside it, dropping the level's
/// title and identifiers.
fn remove_head_if_needed(content: Vec<SyntacticTree>) -> Vec<SyntacticTree> {
    let levels = content.iter().filter(|t| t.is(NodeKind::Level)).count();
    let paragraphoids = content
        .iter()
        .filter(|t| t.kind().is_some_and(NodeKind::is_paragraphoid))
        .count();
    if levels != 1 || paragraphoids > 0 {
        return content;
    }
    content
        .into_iter()
        .flat_map(|tree| {
            if tree.is(NodeKind::Level) {
                tree.children()
                    .iter()
                    .filter(|child| !child.kind().is_some_and(NodeKind::is_level_decoration))
                    .cloned()
                    .collect()
            } else {
                vec![tree]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opus::context::tests::context;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn book(context: &CommandExecutionContext) -> String {
        context.document_tree().unwrap().to_notation()
    }

    fn messages(context: &CommandExecutionContext) -> Vec<String> {
        context.problems().iter().map(|p| p.message().to_string()).collect()
    }

    fn start(dir: &Path) -> CommandExecutionContext {
        context(dir).update(SyntacticTree::leaf(NodeKind::Opus))
    }

    #[test]
    fn test_insert_single_file() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "a.nlp",
            r#"(NOVELLA (PARAGRAPH_REGULAR (WORD_ "hello") WHITESPACE_ (WORD_ "world")))"#,
        );
        let result = InsertCommand::new("file:a.nlp").evaluate(start(dir.path()));
        assert!(result.problems().is_empty(), "{:?}", result.problems());
        insta::assert_snapshot!(book(&result), @r#"(OPUS (PARAGRAPH_REGULAR (WORD_ "hello") (WORD_ "world")))"#);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = InsertCommand::new("missing.nlp").evaluate(start(dir.path()));
        assert_eq!(result.document_tree(), Some(&SyntacticTree::leaf(NodeKind::Opus)));
        assert_eq!(result.problems().len(), 1);
        assert!(messages(&result)[0].starts_with("IO error for path"));
    }

    #[test]
    fn test_selectors_and_style() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "a.nlp",
            r#"(NOVELLA
                 (_LEVEL (ABSOLUTE_IDENTIFIER "one") (LEVEL_TITLE (WORD_ "First")))
                 (_LEVEL (LEVEL_TITLE (WORD_ "Second"))))"#,
        );
        let mut insert = InsertCommand::new("a.nlp");
        insert.style = Some("s".to_string());
        insert.selectors = vec![
            "Second".parse().unwrap(),
            "one".parse().unwrap(),
            "nowhere".parse().unwrap(),
        ];
        let result = insert.evaluate(start(dir.path()));
        insta::assert_snapshot!(book(&result), @r#"(OPUS (_LEVEL (_STYLE "s") (_IMPLICIT_IDENTIFIER "\\\\Second") (_IMPLICIT_TAG "Second") (LEVEL_TITLE (WORD_ "Second"))) (_LEVEL (_STYLE "s") (_EXPLICIT_IDENTIFIER "\\\\one") (_IMPLICIT_TAG "First") (LEVEL_TITLE (WORD_ "First"))))"#);
        assert_eq!(messages(&result), vec!["Cannot find: '\\nowhere'"]);
    }

    #[test]
    fn test_create_level_and_no_head() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "chapter.nlp",
            r#"(NOVELLA (_LEVEL (LEVEL_TITLE (WORD_ "T")) (PARAGRAPH_REGULAR (WORD_ "p"))))"#,
        );
        let mut create = InsertCommand::new("chapter.nlp");
        create.level_head = Some(LevelHead::CreateLevel);
        let result = create.evaluate(start(dir.path()));
        insta::assert_snapshot!(book(&result), @r#"(OPUS (_LEVEL (LEVEL_TITLE (WORD_ "chapter")) (_LEVEL (_IMPLICIT_IDENTIFIER "\\\\T") (_IMPLICIT_TAG "T") (LEVEL_TITLE (WORD_ "T")) (PARAGRAPH_REGULAR (WORD_ "p")))))"#);

        let mut no_head = InsertCommand::new("chapter.nlp");
        no_head.level_head = Some(LevelHead::NoHead);
        let result = no_head.evaluate(start(dir.path()));
        insta::assert_snapshot!(book(&result), @r#"(OPUS (PARAGRAPH_REGULAR (WORD_ "p")))"#);
    }

    #[test]
    fn test_level_above() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "p.nlp", r#"(NOVELLA (PARAGRAPH_REGULAR (WORD_ "p")))"#);
        let book_tree = SyntacticTree::node(
            NodeKind::Opus,
            vec![
                SyntacticTree::node(NodeKind::Level, vec![]),
                SyntacticTree::node(
                    NodeKind::Level,
                    vec![SyntacticTree::node(NodeKind::Level, vec![])],
                ),
            ],
        );
        let mut insert = InsertCommand::new("p.nlp");
        insert.level_above = 2;
        let result = insert.evaluate(context(dir.path()).update(book_tree.clone()));
        insta::assert_snapshot!(book(&result), @r#"(OPUS _LEVEL (_LEVEL (_LEVEL (PARAGRAPH_REGULAR (WORD_ "p")))))"#);

        insert.level_above = 3;
        let result = insert.evaluate(context(dir.path()).update(book_tree.clone()));
        assert_eq!(result.document_tree(), Some(&book_tree));
        assert_eq!(
            messages(&result),
            vec!["Found no child tree while seeking level 3"]
        );
    }

    #[test]
    fn test_directory_in_file_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("parts")).unwrap();
        for (name, word) in [("b.nlp", "b"), ("a.nlp", "a"), ("c.nlp", "c")] {
            write(
                &dir.path().join("parts"),
                name,
                &format!(r#"(NOVELLA (PARAGRAPH_REGULAR (WORD_ "{word}")))"#),
            );
        }
        let mut insert = InsertCommand::new("parts");
        let result = insert.evaluate(start(dir.path()));
        insta::assert_snapshot!(book(&result), @r#"(OPUS (PARAGRAPH_REGULAR (WORD_ "a")) (PARAGRAPH_REGULAR (WORD_ "b")) (PARAGRAPH_REGULAR (WORD_ "c")))"#);

        insert.ordering = Some(FileOrdering::BY_ABSOLUTE_PATH.inverse());
        let result = insert.evaluate(start(dir.path()));
        insta::assert_snapshot!(book(&result), @r#"(OPUS (PARAGRAPH_REGULAR (WORD_ "c")) (PARAGRAPH_REGULAR (WORD_ "b")) (PARAGRAPH_REGULAR (WORD_ "a")))"#);
    }

    #[test]
    fn test_directory_selectors() {
        let dir = TempDir::new().unwrap();
        let level = |id: &str| {
            format!(r#"(_LEVEL (ABSOLUTE_IDENTIFIER "{id}") (LEVEL_TITLE (WORD_ "t{id}")))"#)
        };
        write(dir.path(), "a.nlp", &format!("(NOVELLA {} {})", level("x"), level("dup")));
        write(dir.path(), "b.nlp", &format!("(NOVELLA {})", level("dup")));

        let mut insert = InsertCommand::new(".");
        insert.selectors = vec![
            "x".parse().unwrap(),
            "dup".parse().unwrap(),
            "none".parse().unwrap(),
        ];
        let result = insert.evaluate(start(dir.path()));
        let tree = result.document_tree().unwrap();
        let identifiers: Vec<&str> = tree
            .children()
            .iter()
            .filter_map(|level| level.child(0)?.first_text())
            .collect();
        assert_eq!(identifiers, vec!["\\\\x", "\\\\dup", "\\\\dup"]);

        let messages = messages(&result);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Identifier \\dup found multiple times in: "));
        assert!(messages[0].contains("a.nlp") && messages[0].contains("b.nlp"));
        assert_eq!(messages[1], "Cannot find: '\\none'");
    }

    #[test]
    fn test_bad_versions_are_reported_together() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad1.nlp", "NOVELLA");
        write(dir.path(), "bad2.nlp", "NOVELLA");
        let mut insert = InsertCommand::new(".");
        insert.ordering = Some(FileOrdering::BY_VERSION_NUMBER);
        let result = insert.evaluate(start(dir.path()));
        let messages = messages(&result);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Could not sort files: "));
        assert!(messages[0].contains("bad1") && messages[0].contains("bad2"));
    }

    #[test]
    fn test_directory_skips_sources_with_identifier_problems() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "a.nlp",
            concat!(
                r#"(NOVELLA (_LEVEL (ABSOLUTE_IDENTIFIER "d") (LEVEL_TITLE (WORD_ "A")))"#,
                r#" (_LEVEL (ABSOLUTE_IDENTIFIER "d") (LEVEL_TITLE (WORD_ "B"))))"#,
            ),
        );
        write(dir.path(), "b.nlp", r#"(NOVELLA (PARAGRAPH_REGULAR (WORD_ "b")))"#);
        let result = InsertCommand::new(".").evaluate(start(dir.path()));
        insta::assert_snapshot!(book(&result), @r#"(OPUS (PARAGRAPH_REGULAR (WORD_ "b")))"#);
        assert_eq!(result.problems().len(), 1, "{:?}", messages(&result));
    }

    #[test]
    fn test_level_above_needs_level_as_last_child() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "p.nlp", r#"(NOVELLA (PARAGRAPH_REGULAR (WORD_ "p")))"#);
        let book_tree = SyntacticTree::node(
            NodeKind::Opus,
            vec![
                SyntacticTree::leaf(NodeKind::Level),
                SyntacticTree::leaf(NodeKind::ParagraphRegular),
            ],
        );
        let mut insert = InsertCommand::new("p.nlp");
        insert.level_above = 1;
        let result = insert.evaluate(context(dir.path()).update(book_tree.clone()));
        assert_eq!(result.document_tree(), Some(&book_tree));
        assert_eq!(
            messages(&result),
            vec!["Found no LEVEL as child tree while seeking level 1"]
        );
    }
}
