//! Identifier collisions in assembled documents
//!
//! Once several files are merged, enriched identifiers coming from different files may
//! clash. Colliding implicit identifiers are dropped since they were only a
//! convenience. Colliding explicit identifiers are kept but retagged so a renderer can
//! flag them.

use super::interpreter::identifier_tree_filter;
use crate::tree::{MirroredPostorder, NodeKind, SyntacticTree, Treepath};
use std::collections::HashSet;
use tracing::debug;

/// Identifier texts that appear more than once in a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierCollisions {
    implicit: HashSet<String>,
    explicit: HashSet<String>,
}

impl IdentifierCollisions {
    /// Scans `_IMPLICIT_IDENTIFIER` and `_EXPLICIT_IDENTIFIER` nodes below identified
    /// levels.
    pub fn find(root: &SyntacticTree) -> Self {
        let mut implicit_seen = HashSet::new();
        let mut explicit_seen = HashSet::new();
        let mut collisions = Self::default();

        let traversal = MirroredPostorder::new(identifier_tree_filter);
        let mut current = Some(traversal.first(&Treepath::create(root.clone())));
        while let Some(treepath) = current {
            let tree = treepath.tree_at_end();
            if let Some(text) = tree.first_text() {
                if tree.is(NodeKind::ImplicitIdentifier) && !implicit_seen.insert(text.to_string())
                {
                    collisions.implicit.insert(text.to_string());
                }
                if tree.is(NodeKind::ExplicitIdentifier) && !explicit_seen.insert(text.to_string())
                {
                    collisions.explicit.insert(text.to_string());
                }
            }
            current = traversal.next(&treepath);
        }
        debug!(
            implicit = collisions.implicit.len(),
            explicit = collisions.explicit.len(),
            "Found identifier collisions"
        );
        collisions
    }

    pub fn is_empty(&self) -> bool {
        self.implicit.is_empty() && self.explicit.is_empty()
    }

    pub fn implicit_identifier_collides(&self, tree: &SyntacticTree) -> bool {
        tree.first_text()
            .is_some_and(|text| self.implicit.contains(text))
    }

    pub fn explicit_identifier_collides(&self, tree: &SyntacticTree) -> bool {
        tree.first_text()
            .is_some_and(|text| self.explicit.contains(text))
    }

    pub fn remove_colliding_implicit_identifiers(&self, root: &SyntacticTree) -> SyntacticTree {
        rewrite_identified(root, |tree| {
            let colliding = |child: &SyntacticTree| {
                child.is(NodeKind::ImplicitIdentifier) && self.implicit_identifier_collides(child)
            };
            tree.children()
                .iter()
                .any(colliding)
                .then(|| tree.remove_children(colliding))
        })
    }

    pub fn tag_colliding_explicit_identifiers(&self, root: &SyntacticTree) -> SyntacticTree {
        rewrite_identified(root, |tree| {
            let colliding = |child: &SyntacticTree| {
                child.is(NodeKind::ExplicitIdentifier) && self.explicit_identifier_collides(child)
            };
            tree.children().iter().any(colliding).then(|| {
                tree.adopt(
                    tree.children()
                        .iter()
                        .map(|child| {
                            if colliding(child) {
                                SyntacticTree::node(
                                    NodeKind::CollidingExplicitIdentifier,
                                    child.children().to_vec(),
                                )
                            } else {
                                child.clone()
                            }
                        })
                        .collect(),
                )
            })
        })
    }

    /// Finds collisions in `root` and applies both rewrites.
    pub fn resolve(root: &SyntacticTree) -> SyntacticTree {
        let collisions = Self::find(root);
        if collisions.is_empty() {
            return root.clone();
        }
        let root = collisions.remove_colliding_implicit_identifiers(root);
        collisions.tag_colliding_explicit_identifiers(&root)
    }
}

/// Visits identified nodes children first, replacing those for which `rewrite` returns
/// a new node. Rewrites only touch children of the visited node, so the traversal
/// continues unaffected from the updated treepath.
fn rewrite_identified(
    root: &SyntacticTree,
    rewrite: impl Fn(&SyntacticTree) -> Option<SyntacticTree>,
) -> SyntacticTree {
    let traversal = MirroredPostorder::new(identifier_tree_filter);
    let mut treepath = traversal.first(&Treepath::create(root.clone()));
    loop {
        if let Some(rewritten) = rewrite(treepath.tree_at_end()) {
            treepath = treepath.update_bottom(rewritten);
        }
        match traversal.next(&treepath) {
            Some(next) => treepath = next,
            None => return treepath.tree_at_start().clone(),
        }
    }
}
