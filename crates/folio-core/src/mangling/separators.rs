//! Whitespace and separator normalization

use crate::tree::{NodeKind, SyntacticTree, TagBehavior};
use tracing::debug;

const SEPARATORS: &[NodeKind] = &[NodeKind::Whitespace, NodeKind::LineBreak];

const BLOCKS_OF_LITERAL: &[NodeKind] = &[
    NodeKind::BlockOfLiteralInsideGraveAccents,
    NodeKind::BlockOfLiteralInsideGraveAccentPairs,
];

fn is_traversable(tree: &SyntacticTree) -> bool {
    tree.kind()
        .is_some_and(|kind| kind.tag_behavior() != TagBehavior::NonTraversable)
}

/// Removes every `WHITESPACE_` and `LINE_BREAK_` node, at any depth.
pub fn remove_separators(tree: &SyntacticTree) -> SyntacticTree {
    if tree.child_count() == 0 {
        return tree.clone();
    }
    tree.adopt(
        tree.children()
            .iter()
            .filter(|child| !child.is_one_of(SEPARATORS))
            .map(remove_separators)
            .collect(),
    )
}

/// Inserts a `_ZERO_WIDTH_SPACE` between two adjacent blocks of literal of the same kind.
pub fn insert_zero_width_space_between_blocks_of_literal(tree: &SyntacticTree) -> SyntacticTree {
    debug!("Inserting zero-width spaces between blocks of literal");
    insert_between(tree, NodeKind::ZeroWidthSpace, &|left, right| {
        left.is_one_of(BLOCKS_OF_LITERAL) && left.kind() == right.kind()
    })
}

/// Inserts a `_ZERO_WIDTH_SPACE` between a word and an adjacent block of literal, in
/// either order.
pub fn insert_zero_width_space_between_word_and_literal(tree: &SyntacticTree) -> SyntacticTree {
    debug!("Inserting zero-width spaces between words and blocks of literal");
    insert_between(tree, NodeKind::ZeroWidthSpace, &|left, right| {
        (left.is(NodeKind::Word) && right.is_one_of(BLOCKS_OF_LITERAL))
            || (left.is_one_of(BLOCKS_OF_LITERAL) && right.is(NodeKind::Word))
    })
}

fn insert_between(
    tree: &SyntacticTree,
    inserted: NodeKind,
    between: &dyn Fn(&SyntacticTree, &SyntacticTree) -> bool,
) -> SyntacticTree {
    if !is_traversable(tree) {
        return tree.clone();
    }
    let mut children = Vec::with_capacity(tree.child_count());
    for (index, child) in tree.children().iter().enumerate() {
        if index > 0 && between(&tree.children()[index - 1], child) {
            children.push(SyntacticTree::leaf(inserted));
        }
        children.push(insert_between(child, inserted, between));
    }
    tree.adopt(children)
}

/// Keeps the whitespace between a word and an apostrophe that stands apart from it.
///
/// When whitespace separates an `APOSTROPHE_WORDMATE` from a word, a
/// `_PRESERVED_WHITESPACE` goes on that side of the apostrophe so the separation
/// survives [`remove_separators`].
pub fn insert_mandatory_whitespace_near_apostrophe(tree: &SyntacticTree) -> SyntacticTree {
    if !is_traversable(tree) {
        return tree.clone();
    }
    let siblings = tree.children();
    let mut children = Vec::with_capacity(siblings.len());
    for (index, child) in siblings.iter().enumerate() {
        if child.is(NodeKind::ApostropheWordmate) {
            let before = siblings[..index].iter().rev();
            let after = siblings[index + 1..].iter();
            if word_beyond_whitespace(before) {
                children.push(SyntacticTree::leaf(NodeKind::PreservedWhitespace));
            }
            children.push(child.clone());
            if word_beyond_whitespace(after) {
                children.push(SyntacticTree::leaf(NodeKind::PreservedWhitespace));
            }
        } else {
            children.push(insert_mandatory_whitespace_near_apostrophe(child));
        }
    }
    tree.adopt(children)
}

/// True when the walk meets at least one whitespace, then a word.
fn word_beyond_whitespace<'a>(mut walk: impl Iterator<Item = &'a SyntacticTree>) -> bool {
    let mut found_whitespace = false;
    for sibling in walk.by_ref() {
        if sibling.is(NodeKind::Whitespace) {
            found_whitespace = true;
        } else {
            return found_whitespace && sibling.is(NodeKind::Word);
        }
    }
    false
}
