//! Treepaths that survive later rewrites of the tree
//!
//! A [`RobustPath`] does not keep raw child indices. For each step below the root it
//! keeps the label of the node taken and its rank among the siblings that pass a
//! filter and carry the same label. Resolving walks a (possibly rewritten) tree and
//! at each level takes the sibling with that label and rank, counting in document
//! order. Inserting or deleting nodes that fail the filter, or that carry another
//! label, does not disturb resolution.

use super::Tree;
use super::treepath::Treepath;
use std::fmt;
use thiserror::Error;

/// Raised when a robust path is requested for a node whose own path goes through a
/// node rejected by the filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Node '{label}' at height {height} does not pass the robust path filter")]
pub struct FilterError {
    pub label: String,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Step {
    label: String,
    rank: usize,
}

pub struct RobustPath<T> {
    steps: Vec<Step>,
    filter: fn(&T) -> bool,
}

fn accept_all<T>(_: &T) -> bool {
    true
}

impl<T: Tree> RobustPath<T> {
    /// Captures the signature of `treepath`, considering only siblings accepted by
    /// `filter`. Every node below the root must itself pass the filter.
    pub fn create(treepath: &Treepath<T>, filter: fn(&T) -> bool) -> Result<Self, FilterError> {
        let indices = treepath.indices_in_parents();
        let mut steps = Vec::with_capacity(indices.len());
        let mut parent = treepath.tree_at_start();
        for (depth, &index) in indices.iter().enumerate() {
            let node = &parent.children()[index];
            if !filter(node) {
                return Err(FilterError {
                    label: node.label().to_string(),
                    height: depth + 1,
                });
            }
            let rank = parent.children()[..index]
                .iter()
                .filter(|sibling| filter(sibling) && sibling.label() == node.label())
                .count();
            steps.push(Step {
                label: node.label().to_string(),
                rank,
            });
            parent = node;
        }
        Ok(Self { steps, filter })
    }

    /// Captures the signature of `treepath` considering every sibling.
    pub fn create_unfiltered(treepath: &Treepath<T>) -> Self {
        let indices = treepath.indices_in_parents();
        let mut steps = Vec::with_capacity(indices.len());
        let mut parent = treepath.tree_at_start();
        for &index in indices {
            let node = &parent.children()[index];
            let rank = parent.children()[..index]
                .iter()
                .filter(|sibling| sibling.label() == node.label())
                .count();
            steps.push(Step {
                label: node.label().to_string(),
                rank,
            });
            parent = node;
        }
        Self {
            steps,
            filter: accept_all::<T>,
        }
    }

    /// Finds the addressed node again in `root`.
    ///
    /// Returns `None` when the node no longer exists, which is the expected outcome
    /// after a pass removed it.
    pub fn resolve(&self, root: &T) -> Option<Treepath<T>> {
        let mut treepath = Treepath::create(root.clone());
        for step in &self.steps {
            let index = treepath
                .tree_at_end()
                .children()
                .iter()
                .enumerate()
                .filter(|(_, child)| (self.filter)(child) && child.label() == step.label)
                .nth(step.rank)
                .map(|(index, _)| index)?;
            treepath = treepath.child(index).ok()?;
        }
        Some(treepath)
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

impl<T> Clone for RobustPath<T> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            filter: self.filter,
        }
    }
}

impl<T> fmt::Debug for RobustPath<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RobustPath[")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{}#{}", step.label, step.rank)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeKind, Payload, SyntacticTree};

    fn tree(label: &str, children: Vec<SyntacticTree>) -> SyntacticTree {
        SyntacticTree::new(Payload::Text(label.into()), children, None)
    }

    fn leaf(label: &str) -> SyntacticTree {
        tree(label, Vec::new())
    }

    fn starts_with_letter(tree: &SyntacticTree) -> bool {
        tree.text().chars().next().is_some_and(char::is_alphabetic)
    }

    fn reject_all(_: &SyntacticTree) -> bool {
        false
    }

    #[test]
    fn test_singleton() {
        let root = leaf("root");
        let robust = RobustPath::create_unfiltered(&Treepath::create(root.clone()));
        let resolved = robust.resolve(&root).unwrap();
        assert!(resolved.tree_at_end().ptr_eq(&root));
    }

    #[test]
    fn test_parent_child() {
        let child = leaf("child");
        let parent = tree("parent", vec![child.clone()]);
        let treepath = Treepath::create_with(parent.clone(), &[0]).unwrap();
        let resolved = RobustPath::create_unfiltered(&treepath)
            .resolve(&parent)
            .unwrap();
        assert!(resolved.tree_at_start().ptr_eq(&parent));
        assert!(resolved.tree_at_end().ptr_eq(&child));
    }

    //       parent
    //     /       \
    // [-x]         child
    #[test]
    fn test_ignored_sibling_removed() {
        let child = leaf("child");
        let parent = tree("parent", vec![leaf("-x"), child.clone()]);
        let treepath = Treepath::create_with(parent, &[1]).unwrap();
        let robust = RobustPath::create(&treepath, starts_with_letter).unwrap();

        let without_ignored = treepath.remove_previous_sibling().unwrap();
        let resolved = robust.resolve(without_ignored.tree_at_start()).unwrap();
        assert!(resolved.tree_at_end().ptr_eq(&child));
    }

    //       a
    //     /   \
    // [-b]     c
    //       /  |  \
    //     d  [-e]  f
    #[test]
    fn test_depth_three() {
        let f = leaf("f");
        let c = tree("c", vec![leaf("d"), leaf("-e"), f.clone()]);
        let a = tree("a", vec![leaf("-b"), c]);
        let treepath = Treepath::create_with(a, &[1, 2]).unwrap();
        let robust = RobustPath::create(&treepath, starts_with_letter).unwrap();

        let rewritten = treepath.remove_previous_sibling().unwrap();
        let resolved = robust.resolve(rewritten.tree_at_start()).unwrap();
        assert!(resolved.tree_at_end().ptr_eq(&f));
    }

    #[test]
    fn test_excessive_filtering_at_creation() {
        let parent = tree("parent", vec![leaf("child")]);
        let treepath = Treepath::create_with(parent, &[0]).unwrap();
        let error = RobustPath::create(&treepath, reject_all).unwrap_err();
        assert_eq!(error.label, "child");
        assert_eq!(error.height, 1);
    }

    #[test]
    fn test_resolution_against_tree_without_match_is_none() {
        let first = tree("parent", vec![leaf("child")]);
        let treepath = Treepath::create_with(first, &[0]).unwrap();
        let robust = RobustPath::create(&treepath, starts_with_letter).unwrap();

        let second = tree("parent", vec![leaf("-child")]);
        assert!(robust.resolve(&second).is_none());
    }

    #[test]
    fn test_same_label_rank_survives_unrelated_insertions() {
        let level = |title: &str| {
            SyntacticTree::node(NodeKind::Level, vec![SyntacticTree::word(title)])
        };
        let root = SyntacticTree::node(NodeKind::Novella, vec![level("a"), level("b")]);
        let treepath = Treepath::create_with(root, &[1]).unwrap();
        let robust = RobustPath::create_unfiltered(&treepath);

        let rewritten = Treepath::create(treepath.tree_at_start().clone())
            .add_child_first(SyntacticTree::leaf(NodeKind::ParagraphRegular))
            .unwrap();
        let resolved = robust.resolve(rewritten.tree_at_start()).unwrap();
        assert_eq!(resolved.tree_at_end(), &level("b"));
        assert_eq!(resolved.index_in_previous(), Some(2));
    }

    #[test]
    fn test_removed_node_resolves_to_none() {
        let root = SyntacticTree::node(
            NodeKind::Novella,
            vec![SyntacticTree::leaf(NodeKind::Level)],
        );
        let treepath = Treepath::create_with(root, &[0]).unwrap();
        let robust = RobustPath::create_unfiltered(&treepath);
        let emptied = treepath.remove_bottom().unwrap();
        assert!(robust.resolve(emptied.tree_at_start()).is_none());
    }
}
