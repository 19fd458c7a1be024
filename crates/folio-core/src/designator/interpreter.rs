//! Identifier maps built from a document tree
//!
//! The interpreter runs once over a snapshot of the tree. It records a
//! [`RobustPath`] for every identified level, so callers holding a tree that later
//! passes rewrote must go through [`BabyInterpreter::get`] (or resolve the robust path
//! themselves) and handle the fragment having disappeared.

use super::fragment::FragmentIdentifier;
use super::implicit::to_implicit_identifier;
use crate::diagnostics::{Location, Problem};
use crate::tree::{NodeKind, RobustPath, SyntacticTree, Treepath};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

pub type IdentifierMap = IndexMap<FragmentIdentifier, RobustPath<SyntacticTree>>;

/// Nodes that count when addressing an identified level: the levels themselves and
/// the document roots.
pub fn identifier_tree_filter(tree: &SyntacticTree) -> bool {
    tree.is_one_of(&[NodeKind::Level, NodeKind::Novella, NodeKind::Opus])
}

fn is_identifier_bearing(tree: &SyntacticTree) -> bool {
    tree.kind().is_some_and(NodeKind::is_identifier_bearing)
}

enum Definition {
    None,
    Explicit(FragmentIdentifier),
    Implicit(FragmentIdentifier),
}

#[derive(Default)]
struct Collector {
    pure: IdentifierMap,
    derived: IdentifierMap,
    duplicate_derived: IndexSet<FragmentIdentifier>,
    explicit_locations: IndexMap<FragmentIdentifier, Vec<Option<Location>>>,
    problems: Vec<Problem>,
}

/// Pure (explicit) and derived (from unique titles) identifier maps of one tree.
#[derive(Debug, Clone, Default)]
pub struct BabyInterpreter {
    pure: IdentifierMap,
    derived: IdentifierMap,
    problems: Vec<Problem>,
}

impl BabyInterpreter {
    pub fn new(treepath: &Treepath<SyntacticTree>) -> Self {
        let mut collector = Collector::default();
        process(&mut collector, treepath);

        let Collector {
            pure,
            mut derived,
            duplicate_derived,
            explicit_locations,
            mut problems,
        } = collector;

        derived.retain(|identifier, _| !duplicate_derived.contains(identifier));

        for (identifier, locations) in explicit_locations {
            if locations.len() > 1 {
                problems.push(duplicate_problem(&identifier, &locations));
            }
        }

        debug!(
            pure = pure.len(),
            derived = derived.len(),
            problems = problems.len(),
            "Interpreted identifiers"
        );
        Self {
            pure,
            derived,
            problems,
        }
    }

    pub fn from_tree(tree: &SyntacticTree) -> Self {
        Self::new(&Treepath::create(tree.clone()))
    }

    /// Identifiers declared by `ABSOLUTE_IDENTIFIER` nodes.
    pub fn pure_identifiers(&self) -> &IdentifierMap {
        &self.pure
    }

    /// Identifiers derived from titles that are unique in the whole tree.
    pub fn derived_identifiers(&self) -> &IdentifierMap {
        &self.derived
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn has_problem(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Looks pure identifiers up first, then derived ones, and resolves against `root`.
    pub fn get(
        &self,
        identifier: &FragmentIdentifier,
        root: &SyntacticTree,
    ) -> Option<Treepath<SyntacticTree>> {
        self.pure
            .get(identifier)
            .or_else(|| self.derived.get(identifier))
            .and_then(|robust_path| robust_path.resolve(root))
    }

    /// Replaces identifier declarations by the resolved identifiers.
    ///
    /// Every identified level gets an `_EXPLICIT_IDENTIFIER` or `_IMPLICIT_IDENTIFIER`
    /// first child holding the absolute representation. Identifier declarations are
    /// removed from all identifier-bearing nodes, including those that lost a
    /// uniqueness conflict.
    pub fn enrich(&self, root: &SyntacticTree) -> SyntacticTree {
        let mut root = strip_declarations(root);
        for (kind, map) in [
            (NodeKind::ExplicitIdentifier, &self.pure),
            (NodeKind::ImplicitIdentifier, &self.derived),
        ] {
            for (identifier, robust_path) in map {
                let Some(treepath) = robust_path.resolve(&root) else {
                    debug!("Identifier {identifier} no longer resolves, not enriched");
                    continue;
                };
                let decorated = treepath.tree_at_end().add_first(SyntacticTree::token(
                    kind,
                    identifier.absolute_representation(),
                ));
                root = treepath.update_bottom(decorated).tree_at_start().clone();
            }
        }
        root
    }
}

fn process(collector: &mut Collector, treepath: &Treepath<SyntacticTree>) {
    let tree = treepath.tree_at_end();
    if !is_identifier_bearing(tree) {
        return;
    }

    match definition(tree, &mut collector.problems) {
        Definition::None => {}
        Definition::Explicit(identifier) => {
            let locations = collector
                .explicit_locations
                .entry(identifier.clone())
                .or_default();
            locations.push(tree.location().cloned());
            if locations.len() == 1 {
                if let Some(robust_path) = robust_path(treepath, &mut collector.problems) {
                    collector.pure.insert(identifier, robust_path);
                }
            }
        }
        Definition::Implicit(identifier) => {
            if collector.derived.contains_key(&identifier) {
                collector.duplicate_derived.insert(identifier);
            } else if let Some(robust_path) = robust_path(treepath, &mut collector.problems) {
                collector.derived.insert(identifier, robust_path);
            }
        }
    }

    for index in 0..tree.child_count() {
        if let Ok(child) = treepath.child(index) {
            process(collector, &child);
        }
    }
}

fn definition(tree: &SyntacticTree, problems: &mut Vec<Problem>) -> Definition {
    if let Some(declaration) = tree
        .children()
        .iter()
        .find(|child| child.is(NodeKind::AbsoluteIdentifier))
    {
        let text = declaration_text(declaration);
        return match text.parse::<FragmentIdentifier>() {
            Ok(identifier) => Definition::Explicit(identifier),
            Err(error) => {
                problems.push(Problem::maybe_at(
                    format!("Unusable identifier '{text}': {error}"),
                    declaration.location().or(tree.location()),
                ));
                Definition::None
            }
        };
    }

    if tree.is(NodeKind::Level) {
        if let Some(title) = tree.children().iter().find(|c| c.is(NodeKind::LevelTitle)) {
            let text = to_implicit_identifier(title);
            if let Ok(identifier) = FragmentIdentifier::single(text) {
                return Definition::Implicit(identifier);
            }
        }
    }
    Definition::None
}

/// Declarations hold their text directly or inside a word.
fn declaration_text(declaration: &SyntacticTree) -> String {
    let mut text = String::new();
    collect_text(declaration, &mut text);
    text
}

fn collect_text(tree: &SyntacticTree, buffer: &mut String) {
    if tree.kind().is_none() {
        buffer.push_str(tree.text());
    }
    for child in tree.children() {
        collect_text(child, buffer);
    }
}

fn robust_path(
    treepath: &Treepath<SyntacticTree>,
    problems: &mut Vec<Problem>,
) -> Option<RobustPath<SyntacticTree>> {
    match RobustPath::create(treepath, identifier_tree_filter) {
        Ok(robust_path) => Some(robust_path),
        Err(error) => {
            problems.push(Problem::from_error(
                &error,
                treepath.tree_at_end().location(),
            ));
            None
        }
    }
}

fn duplicate_problem(identifier: &FragmentIdentifier, locations: &[Option<Location>]) -> Problem {
    let listed: Vec<String> = locations
        .iter()
        .map(|location| match location {
            Some(location) => location.to_string(),
            None => "<unknown>".to_string(),
        })
        .collect();
    Problem::maybe_at(
        format!(
            "Identifier '{}' not unique, defined at: {}",
            identifier.absolute_representation(),
            listed.join(", ")
        ),
        locations.iter().flatten().next(),
    )
}

fn strip_declarations(tree: &SyntacticTree) -> SyntacticTree {
    if !is_identifier_bearing(tree) {
        return tree.clone();
    }
    tree.adopt(
        tree.children()
            .iter()
            .filter(|child| {
                !child.is_one_of(&[NodeKind::AbsoluteIdentifier, NodeKind::RelativeIdentifier])
            })
            .map(strip_declarations)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(children: Vec<SyntacticTree>) -> SyntacticTree {
        SyntacticTree::node(NodeKind::Level, children)
    }

    fn absolute(name: &str) -> SyntacticTree {
        SyntacticTree::token(NodeKind::AbsoluteIdentifier, name)
    }

    fn title(word: &str) -> SyntacticTree {
        SyntacticTree::node(NodeKind::LevelTitle, vec![SyntacticTree::word(word)])
    }

    fn id(name: &str) -> FragmentIdentifier {
        FragmentIdentifier::single(name).unwrap()
    }

    fn resolve(map: &IdentifierMap, name: &str, root: &SyntacticTree) -> SyntacticTree {
        map.get(&id(name))
            .and_then(|robust_path| robust_path.resolve(root))
            .map(|treepath| treepath.tree_at_end().clone())
            .unwrap()
    }

    #[test]
    fn test_nothing() {
        let interpreter = BabyInterpreter::from_tree(&SyntacticTree::leaf(NodeKind::Novella));
        assert!(interpreter.pure_identifiers().is_empty());
        assert!(interpreter.derived_identifiers().is_empty());
        assert!(!interpreter.has_problem());
    }

    //  novella
    //     |
    // yLevel \\y
    //     |
    // zLevel \\z
    #[test]
    fn test_two_absolute_identifiers() {
        let z_level = level(vec![absolute("z")]);
        let y_level = level(vec![absolute("y"), z_level.clone()]);
        let novella = SyntacticTree::node(NodeKind::Novella, vec![y_level.clone()]);

        let interpreter = BabyInterpreter::from_tree(&novella);

        assert!(!interpreter.has_problem());
        assert!(interpreter.derived_identifiers().is_empty());
        assert_eq!(interpreter.pure_identifiers().len(), 2);
        assert!(resolve(interpreter.pure_identifiers(), "y", &novella).ptr_eq(&y_level));
        assert!(resolve(interpreter.pure_identifiers(), "z", &novella).ptr_eq(&z_level));
    }

    //   novella
    //     |
    // yLevel \\y
    //     |
    // zLevel "z"
    #[test]
    fn test_derived_identifier_under_absolute_identifier() {
        let z_level = level(vec![title("z")]);
        let y_level = level(vec![absolute("y"), z_level.clone()]);
        let novella = SyntacticTree::node(NodeKind::Novella, vec![y_level.clone()]);

        let interpreter = BabyInterpreter::from_tree(&novella);

        assert!(!interpreter.has_problem());
        assert_eq!(interpreter.pure_identifiers().len(), 1);
        assert_eq!(interpreter.derived_identifiers().len(), 1);
        assert!(resolve(interpreter.pure_identifiers(), "y", &novella).ptr_eq(&y_level));
        assert!(resolve(interpreter.derived_identifiers(), "z", &novella).ptr_eq(&z_level));
    }

    #[test]
    fn test_no_derived_identifier_from_duplicate_titles() {
        let tree = SyntacticTree::node(
            NodeKind::Novella,
            vec![level(vec![title("z")]), level(vec![title("z")])],
        );
        let interpreter = BabyInterpreter::from_tree(&tree);

        assert!(!interpreter.has_problem());
        assert!(interpreter.derived_identifiers().is_empty());
        assert!(interpreter.pure_identifiers().is_empty());
    }

    //        LEVEL
    //       /     \
    // zLevel "z"   xLevel \\x
    //             /      \
    //      zLevel "z"    yLevel \\y
    //                       |
    //                    zLevel "z"
    #[test]
    fn test_duplicate_derived_identifiers_under_explicit_identifiers() {
        let z_level = level(vec![title("z")]);
        let y_level = level(vec![absolute("y"), z_level.clone()]);
        let x_level = level(vec![absolute("x"), z_level.clone(), y_level]);
        let root = level(vec![z_level, x_level]);

        let interpreter = BabyInterpreter::from_tree(&root);

        assert!(!interpreter.has_problem());
        assert_eq!(interpreter.pure_identifiers().len(), 2);
        assert!(interpreter.derived_identifiers().is_empty());
    }

    //                     wLevel
    //                   /       \
    //         xLevel "x"         yLevel \\y
    //        /        \             |
    // zLevel "z"    zLevel "z"   zLevel "z"
    #[test]
    fn test_derived_identifier_may_or_may_not_work() {
        let z_level = level(vec![title("z")]);
        let x_level = level(vec![title("x"), z_level.clone(), z_level.clone()]);
        let y_level = level(vec![absolute("y"), z_level]);
        let w_level = level(vec![x_level.clone(), y_level.clone()]);

        let interpreter = BabyInterpreter::from_tree(&w_level);

        assert!(!interpreter.has_problem());
        assert_eq!(interpreter.pure_identifiers().len(), 1);
        assert_eq!(interpreter.derived_identifiers().len(), 1);
        assert!(resolve(interpreter.derived_identifiers(), "x", &w_level).ptr_eq(&x_level));
        assert!(resolve(interpreter.pure_identifiers(), "y", &w_level).ptr_eq(&y_level));
        assert!(interpreter.get(&id("z"), &w_level).is_none());
    }

    #[test]
    fn test_duplicate_explicit_identifier_reports_every_location() {
        let first = level(vec![absolute("dup")]).with_location(Location::new("a.nlp", 1, 1));
        let second = level(vec![absolute("dup")]).with_location(Location::new("a.nlp", 7, 1));
        let third = level(vec![absolute("dup")]).with_location(Location::new("b.nlp", 2, 3));
        let tree = SyntacticTree::node(NodeKind::Novella, vec![first.clone(), second, third]);

        let interpreter = BabyInterpreter::from_tree(&tree);

        assert_eq!(interpreter.problems().len(), 1);
        let problem = &interpreter.problems()[0];
        assert_eq!(
            problem.message(),
            "Identifier '\\\\dup' not unique, defined at: a.nlp:1:1, a.nlp:7:1, b.nlp:2:3"
        );
        assert_eq!(problem.location(), Some(&Location::new("a.nlp", 1, 1)));
        assert!(resolve(interpreter.pure_identifiers(), "dup", &tree).ptr_eq(&first));
    }

    #[test]
    fn test_get_after_tree_rewrite() {
        let target = level(vec![absolute("t")]);
        let tree = SyntacticTree::node(
            NodeKind::Novella,
            vec![
                SyntacticTree::node(NodeKind::ParagraphRegular, vec![SyntacticTree::word("p")]),
                level(vec![title("intro")]),
                target.clone(),
            ],
        );
        let interpreter = BabyInterpreter::from_tree(&tree);

        let without_paragraph = Treepath::create_with(tree.clone(), &[0])
            .and_then(|treepath| treepath.remove_bottom())
            .unwrap();
        let found = interpreter
            .get(&id("t"), without_paragraph.tree_at_start())
            .unwrap();
        assert!(found.tree_at_end().ptr_eq(&target));
        assert_eq!(found.indices_in_parents(), &[1]);

        let without_target = Treepath::create_with(tree, &[2])
            .and_then(|treepath| treepath.remove_bottom())
            .unwrap();
        assert!(interpreter.get(&id("t"), without_target.tree_at_start()).is_none());
        assert!(interpreter.get(&id("intro"), without_target.tree_at_start()).is_some());
    }

    #[test]
    fn test_enrich() {
        let tree = SyntacticTree::node(
            NodeKind::Novella,
            vec![level(vec![absolute("L0")]), level(vec![title("t")])],
        );
        let enriched = BabyInterpreter::from_tree(&tree).enrich(&tree);
        insta::assert_snapshot!(
            enriched.to_notation(),
            @r#"(NOVELLA (_LEVEL (_EXPLICIT_IDENTIFIER "\\\\L0")) (_LEVEL (_IMPLICIT_IDENTIFIER "\\\\t") (LEVEL_TITLE (WORD_ "t"))))"#
        );
    }
}
