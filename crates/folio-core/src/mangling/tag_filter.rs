//! Pruning a tree down to the parts carrying requested tags

use crate::designator::Tag;
use crate::tree::{NodeKind, SyntacticTree, TagBehavior};
use std::collections::BTreeSet;
use tracing::debug;

const TAG_KINDS: &[NodeKind] = &[NodeKind::ExplicitTag, NodeKind::ImplicitTag];

/// Keeps only the parts of `tree` tagged with one of `tags`.
///
/// An empty tag set leaves the tree untouched. The root always survives, possibly
/// emptied of every child but its undecorated content.
pub fn filter(tree: &SyntacticTree, tags: &BTreeSet<Tag>) -> SyntacticTree {
    if tags.is_empty() {
        return tree.clone();
    }
    debug!(tags = ?tags, "Filtering tree by tags");
    match visit(tree, tags) {
        Some(filtered) => filtered.tree,
        None => tree.adopt(Vec::new()),
    }
}

struct Filtered {
    has_tag: bool,
    tree: SyntacticTree,
}

fn visit(tree: &SyntacticTree, tags: &BTreeSet<Tag>) -> Option<Filtered> {
    let behavior = tree
        .kind()
        .map_or(TagBehavior::NonTraversable, NodeKind::tag_behavior);
    match behavior {
        TagBehavior::NonTraversable => Some(Filtered {
            has_tag: false,
            tree: tree.clone(),
        }),
        TagBehavior::Terminal => has_tag(tree, tags).then(|| Filtered {
            has_tag: true,
            tree: tree.clone(),
        }),
        TagBehavior::Scope if has_tag(tree, tags) => Some(Filtered {
            has_tag: true,
            tree: tree.clone(),
        }),
        TagBehavior::Scope | TagBehavior::Traversable => {
            let mut children = Vec::with_capacity(tree.child_count());
            let mut has_tagged_child = false;
            for child in tree.children() {
                let Some(filtered) = visit(child, tags) else {
                    continue;
                };
                if filtered.has_tag {
                    has_tagged_child = true;
                    children.push(filtered.tree);
                } else if is_non_traversable(child) {
                    children.push(filtered.tree);
                }
            }
            has_tagged_child.then(|| Filtered {
                has_tag: true,
                tree: tree.adopt(children),
            })
        }
    }
}

fn is_non_traversable(tree: &SyntacticTree) -> bool {
    tree.kind()
        .is_none_or(|kind| kind.tag_behavior() == TagBehavior::NonTraversable)
}

fn has_tag(tree: &SyntacticTree, tags: &BTreeSet<Tag>) -> bool {
    tree.children().iter().any(|child| {
        child.is_one_of(TAG_KINDS)
            && child
                .first_text()
                .is_some_and(|text| Tag::contains(tags, text))
    })
}
