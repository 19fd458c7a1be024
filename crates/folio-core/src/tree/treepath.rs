//! Root-to-node addressing chains
//!
//! A [`Treepath`] records every tree from a root down to one addressed node, along
//! with the child index taken at each step. Trees have no parent pointers, so the
//! treepath is what makes editing a deep node possible: the edit replaces the end of
//! the chain, then every ancestor is rebuilt bottom-up with [`Tree::adopt`]. Only the
//! nodes on the chain are rebuilt, all siblings are shared with the original tree.

use super::Tree;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("No child at index {index}, node has {child_count} children")]
    InvalidIndex { index: usize, child_count: usize },

    #[error("Illegal distance {distance} for a treepath of length {length}")]
    IllegalDistance { distance: usize, length: usize },

    #[error("Treepath must have a length of at least {minimum}, got {length}")]
    TooShort { minimum: usize, length: usize },

    #[error("No previous sibling")]
    NoPreviousSibling,

    #[error("No next sibling")]
    NoNextSibling,
}

type TreeResult<T> = std::result::Result<T, TreeError>;

/// An addressing chain from a root to one of its descendants (or the root itself).
///
/// Invariants: `trees[0]` is the root, `trees[i + 1]` is child `indices[i]` of
/// `trees[i]`, and `indices.len() == trees.len() - 1`.
#[derive(Debug, Clone)]
pub struct Treepath<T> {
    trees: Vec<T>,
    indices: Vec<usize>,
}

impl<T: Tree> Treepath<T> {
    pub fn create(root: T) -> Self {
        Self {
            trees: vec![root],
            indices: Vec::new(),
        }
    }

    /// Descends from `root` through each index in turn.
    pub fn create_with(root: T, indices: &[usize]) -> TreeResult<Self> {
        indices
            .iter()
            .try_fold(Self::create(root), |treepath, &index| treepath.child(index))
    }

    /// Extends this treepath to the child at `index` of its end.
    pub fn child(&self, index: usize) -> TreeResult<Self> {
        let end = self.tree_at_end();
        let child = end
            .children()
            .get(index)
            .cloned()
            .ok_or(TreeError::InvalidIndex {
                index,
                child_count: end.child_count(),
            })?;
        let mut extended = self.clone();
        extended.trees.push(child);
        extended.indices.push(index);
        Ok(extended)
    }

    /// Number of trees in the chain, 1 for a root-only treepath.
    pub fn length(&self) -> usize {
        self.trees.len()
    }

    pub fn tree_at_start(&self) -> &T {
        &self.trees[0]
    }

    pub fn tree_at_end(&self) -> &T {
        &self.trees[self.trees.len() - 1]
    }

    /// Root-only treepath on the same root.
    pub fn start(&self) -> Self {
        Self::create(self.tree_at_start().clone())
    }

    /// Treepath to the parent of the end, `None` on a root-only treepath.
    pub fn previous(&self) -> Option<Self> {
        if self.length() < 2 {
            return None;
        }
        let mut previous = self.clone();
        previous.trees.pop();
        previous.indices.pop();
        Some(previous)
    }

    pub fn index_in_previous(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Index taken at each step from the root, `length() - 1` of them.
    pub fn indices_in_parents(&self) -> &[usize] {
        &self.indices
    }

    /// Tree `distance` steps up from the end: 0 is the addressed node,
    /// `length() - 1` is the root.
    pub fn tree_at_distance(&self, distance: usize) -> TreeResult<&T> {
        let length = self.length();
        if distance >= length {
            return Err(TreeError::IllegalDistance { distance, length });
        }
        Ok(&self.trees[length - 1 - distance])
    }

    /// Tree `height` steps down from the root: 0 is the root.
    pub fn tree_at_height(&self, height: usize) -> TreeResult<&T> {
        self.trees.get(height).ok_or(TreeError::IllegalDistance {
            distance: height,
            length: self.length(),
        })
    }

    /// Truncated treepath whose end is `distance` steps up from this end.
    pub fn treepath_at_distance(&self, distance: usize) -> TreeResult<Self> {
        let length = self.length();
        if distance >= length {
            return Err(TreeError::IllegalDistance { distance, length });
        }
        let keep = length - distance;
        Ok(Self {
            trees: self.trees[..keep].to_vec(),
            indices: self.indices[..keep - 1].to_vec(),
        })
    }

    /// Replaces the addressed node and rebuilds every ancestor.
    pub fn update_bottom(&self, new_end: T) -> Self {
        let mut trees = self.trees.clone();
        let last = trees.len() - 1;
        trees[last] = new_end;
        for level in (0..last).rev() {
            let mut children = trees[level].children().to_vec();
            children[self.indices[level]] = trees[level + 1].clone();
            trees[level] = trees[level].adopt(children);
        }
        Self {
            trees,
            indices: self.indices.clone(),
        }
    }

    /// Inserts `tree` as child at `position` of the end; the result addresses the new
    /// child.
    pub fn add_child_at(&self, tree: T, position: usize) -> TreeResult<Self> {
        let end = self.tree_at_end();
        let child_count = end.child_count();
        if position > child_count {
            return Err(TreeError::InvalidIndex {
                index: position,
                child_count,
            });
        }
        let mut children = end.children().to_vec();
        children.insert(position, tree);
        self.update_bottom(end.adopt(children)).child(position)
    }

    pub fn add_child_first(&self, tree: T) -> TreeResult<Self> {
        self.add_child_at(tree, 0)
    }

    pub fn add_child_last(&self, tree: T) -> TreeResult<Self> {
        self.add_child_at(tree, self.tree_at_end().child_count())
    }

    /// Inserts `tree` right after the addressed node; the result addresses `tree`.
    pub fn add_sibling_at_right(&self, tree: T) -> TreeResult<Self> {
        let (parent, index) = self.split_end(2)?;
        parent.add_child_at(tree, index + 1)
    }

    /// Inserts `tree` right before the addressed node; the result addresses `tree`.
    pub fn add_sibling_at_left(&self, tree: T) -> TreeResult<Self> {
        let (parent, index) = self.split_end(2)?;
        parent.add_child_at(tree, index)
    }

    /// Removes the addressed node; the result addresses its former parent.
    pub fn remove_bottom(&self) -> TreeResult<Self> {
        let (parent, index) = self.split_end(2)?;
        let parent_tree = parent.tree_at_end();
        let mut children = parent_tree.children().to_vec();
        children.remove(index);
        Ok(parent.update_bottom(parent_tree.adopt(children)))
    }

    pub fn has_previous_sibling(&self) -> bool {
        self.index_in_previous().is_some_and(|index| index > 0)
    }

    pub fn has_next_sibling(&self) -> bool {
        match (self.index_in_previous(), self.length()) {
            (Some(index), length) if length >= 2 => {
                index + 1 < self.trees[length - 2].child_count()
            }
            _ => false,
        }
    }

    pub fn previous_sibling(&self) -> TreeResult<Self> {
        let (parent, index) = self.split_end(2)?;
        if index == 0 {
            return Err(TreeError::NoPreviousSibling);
        }
        parent.child(index - 1)
    }

    pub fn next_sibling(&self) -> TreeResult<Self> {
        if !self.has_next_sibling() {
            return Err(TreeError::NoNextSibling);
        }
        let (parent, index) = self.split_end(2)?;
        parent.child(index + 1)
    }

    /// Removes the previous sibling; the result still addresses the same node.
    pub fn remove_previous_sibling(&self) -> TreeResult<Self> {
        let removed = self.previous_sibling()?.remove_bottom()?;
        let index = self.index_in_previous().unwrap_or(0);
        removed.child(index - 1)
    }

    /// Removes the next sibling; the result still addresses the same node.
    pub fn remove_next_sibling(&self) -> TreeResult<Self> {
        let removed = self.next_sibling()?.remove_bottom()?;
        let index = self.index_in_previous().unwrap_or(0);
        removed.child(index)
    }

    /// Swaps the addressed node with its left sibling; the result addresses the
    /// moved node at its new position.
    pub fn move_left_down(&self) -> TreeResult<Self> {
        let (parent, index) = self.split_end(2)?;
        if index == 0 {
            return Err(TreeError::NoPreviousSibling);
        }
        let parent_tree = parent.tree_at_end();
        let mut children = parent_tree.children().to_vec();
        children.swap(index - 1, index);
        parent
            .update_bottom(parent_tree.adopt(children))
            .child(index - 1)
    }

    /// Moves the addressed node to the end of its previous sibling's children; the
    /// result addresses the moved node.
    pub fn become_last_child_of_previous_sibling(&self) -> TreeResult<Self> {
        let previous_sibling = self.previous_sibling()?;
        let moving = self.tree_at_end().clone();
        let sibling_index = previous_sibling.index_in_previous().unwrap_or(0);
        self.remove_bottom()?
            .child(sibling_index)?
            .add_child_last(moving)
    }

    /// Document order of two treepaths on the same root: an ancestor comes before
    /// its descendants, a left sibling before a right one.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.indices.cmp(&other.indices)
    }

    fn split_end(&self, minimum: usize) -> TreeResult<(Self, usize)> {
        match (self.previous(), self.index_in_previous()) {
            (Some(parent), Some(index)) if self.length() >= minimum => Ok((parent, index)),
            _ => Err(TreeError::TooShort {
                minimum,
                length: self.length(),
            }),
        }
    }
}
