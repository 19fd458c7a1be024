//! Tag decoration
//!
//! Authored `TAG` nodes become `_EXPLICIT_TAG` decorations on the node they qualify.
//! Untagged levels get `_IMPLICIT_TAG`s built from the words of their title. Once a
//! whole opus is assembled, implicit tags that some author also wrote explicitly are
//! promoted to `_PROMOTED_TAG`.

use crate::designator::{Tag, to_implicit_identifier};
use crate::tree::{NodeKind, Payload, Preorder, SyntacticTree, TagBehavior, Treepath};
use std::collections::BTreeSet;
use tracing::debug;

/// Kinds whose text is never a tag.
const NOT_TAGS: &[NodeKind] = &[
    NodeKind::Word,
    NodeKind::WordAfterCircumflexAccent,
    NodeKind::Style,
    NodeKind::PunctuationSign,
    NodeKind::ImplicitIdentifier,
    NodeKind::ExplicitIdentifier,
    NodeKind::CollidingExplicitIdentifier,
    NodeKind::AbsoluteIdentifier,
];

fn behavior(tree: &SyntacticTree) -> TagBehavior {
    tree.kind()
        .map_or(TagBehavior::NonTraversable, NodeKind::tag_behavior)
}

/// Adds explicit tags, then implicit tags on levels that have none.
pub fn enhance(tree: &SyntacticTree) -> SyntacticTree {
    debug!("Adding explicit and implicit tags");
    add_implicit_tags(&add_explicit_tags(tree))
}

/// Rewrites `TAG` children of `Scope` and `Terminal` nodes as `_EXPLICIT_TAG`.
pub fn add_explicit_tags(root: &SyntacticTree) -> SyntacticTree {
    let preorder = Preorder::new();
    let mut treepath = preorder.first(&Treepath::create(root.clone()));
    loop {
        let next = match behavior(treepath.tree_at_end()) {
            TagBehavior::Scope | TagBehavior::Terminal => {
                treepath = treepath.update_bottom(retag_explicit(treepath.tree_at_end()));
                preorder.next(&treepath)
            }
            TagBehavior::Traversable => preorder.next(&treepath),
            TagBehavior::NonTraversable => Preorder::next_up(&treepath),
        };
        match next {
            Some(next) => treepath = next,
            None => return treepath.tree_at_start().clone(),
        }
    }
}

fn retag_explicit(tree: &SyntacticTree) -> SyntacticTree {
    if !tree.children().iter().any(|child| child.is(NodeKind::Tag)) {
        return tree.clone();
    }
    tree.adopt(
        tree.children()
            .iter()
            .map(|child| {
                if child.is(NodeKind::Tag) {
                    SyntacticTree::new(
                        Payload::Kind(NodeKind::ExplicitTag),
                        child.children().to_vec(),
                        child.location().cloned(),
                    )
                } else {
                    child.clone()
                }
            })
            .collect(),
    )
}

/// Gives every untagged titled `_LEVEL` the words of its implicit identifier as tags.
pub fn add_implicit_tags(tree: &SyntacticTree) -> SyntacticTree {
    if !tree.is_one_of(&[NodeKind::Level, NodeKind::Novella, NodeKind::Opus]) {
        return tree.clone();
    }
    let children: Vec<_> = tree.children().iter().map(add_implicit_tags).collect();
    let tree = tree.adopt(children);
    if !tree.is(NodeKind::Level) || has_explicit_tag(&tree) {
        return tree;
    }
    let Some(title) = tree.children().iter().find(|c| c.is(NodeKind::LevelTitle)) else {
        return tree;
    };
    let identifier = to_implicit_identifier(title);
    let tags = Tag::to_tag_set(identifier.split('_'));
    if tags.is_empty() {
        return tree;
    }
    let mut children = Tag::to_trees(NodeKind::ImplicitTag, &tags);
    children.extend(tree.children().iter().cloned());
    tree.adopt(children)
}

fn has_explicit_tag(tree: &SyntacticTree) -> bool {
    tree.children()
        .iter()
        .any(|child| child.is_one_of(&[NodeKind::Tag, NodeKind::ExplicitTag]))
}

/// Every `_EXPLICIT_TAG` in the tree.
pub fn find_explicit_tags(tree: &SyntacticTree) -> BTreeSet<Tag> {
    let mut tags = BTreeSet::new();
    collect_explicit_tags(tree, &mut tags);
    tags
}

fn collect_explicit_tags(tree: &SyntacticTree, tags: &mut BTreeSet<Tag>) {
    if tree.is_one_of(NOT_TAGS) {
        return;
    }
    if tree.is(NodeKind::ExplicitTag) {
        if let Some(tag) = tree.first_text().and_then(|text| Tag::new(text).ok()) {
            tags.insert(tag);
        }
        return;
    }
    for child in tree.children() {
        collect_explicit_tags(child, tags);
    }
}

/// Turns each `_IMPLICIT_TAG` whose tag is in `explicit_tags` into a `_PROMOTED_TAG`.
pub fn promote(tree: &SyntacticTree, explicit_tags: &BTreeSet<Tag>) -> SyntacticTree {
    if explicit_tags.is_empty() || behavior(tree) == TagBehavior::NonTraversable {
        return tree.clone();
    }
    tree.adopt(
        tree.children()
            .iter()
            .map(|child| {
                let promoted = child.is(NodeKind::ImplicitTag)
                    && child
                        .first_text()
                        .is_some_and(|text| Tag::contains(explicit_tags, text));
                if promoted {
                    SyntacticTree::node(NodeKind::PromotedTag, child.children().to_vec())
                } else {
                    promote(child, explicit_tags)
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(children: Vec<SyntacticTree>) -> SyntacticTree {
        SyntacticTree::node(NodeKind::Level, children)
    }

    fn title(words: &[&str]) -> SyntacticTree {
        SyntacticTree::node(
            NodeKind::LevelTitle,
            words.iter().map(|w| SyntacticTree::word(*w)).collect(),
        )
    }

    #[test]
    fn test_explicit_tags() {
        let tree = SyntacticTree::node(
            NodeKind::Novella,
            vec![level(vec![
                SyntacticTree::token(NodeKind::Tag, "t1"),
                title(&["x"]),
                SyntacticTree::node(
                    NodeKind::ParagraphRegular,
                    vec![
                        SyntacticTree::token(NodeKind::Tag, "t2"),
                        SyntacticTree::word("w"),
                    ],
                ),
            ])],
        );
        let enhanced = enhance(&tree);
        insta::assert_snapshot!(enhanced.to_notation(), @r#"(NOVELLA (_LEVEL (_EXPLICIT_TAG "t1") (LEVEL_TITLE (WORD_ "x")) (PARAGRAPH_REGULAR (_EXPLICIT_TAG "t2") (WORD_ "w"))))"#);

        let names: Vec<_> = find_explicit_tags(&enhanced)
            .iter()
            .map(|tag| tag.name().to_string())
            .collect();
        assert_eq!(names, vec!["t1", "t2"]);
    }

    #[test]
    fn test_implicit_tags_from_title() {
        let tree = SyntacticTree::node(
            NodeKind::Novella,
            vec![level(vec![title(&["Why"]), SyntacticTree::word("w")])],
        );
        insta::assert_snapshot!(enhance(&tree).to_notation(), @r#"(NOVELLA (_LEVEL (_IMPLICIT_TAG "Why") (LEVEL_TITLE (WORD_ "Why")) (WORD_ "w")))"#);
    }

    #[test]
    fn test_promote() {
        let tree = SyntacticTree::node(
            NodeKind::Opus,
            vec![level(vec![
                SyntacticTree::token(NodeKind::ImplicitTag, "a"),
                SyntacticTree::token(NodeKind::ImplicitTag, "b"),
            ])],
        );
        let explicit = Tag::to_tag_set(["b"]);
        let promoted = promote(&tree, &explicit);
        assert_eq!(
            promoted,
            SyntacticTree::node(
                NodeKind::Opus,
                vec![level(vec![
                    SyntacticTree::token(NodeKind::ImplicitTag, "a"),
                    SyntacticTree::token(NodeKind::PromotedTag, "b"),
                ])],
            )
        );
        assert!(promote(&tree, &BTreeSet::new()).ptr_eq(&tree));
    }
}
