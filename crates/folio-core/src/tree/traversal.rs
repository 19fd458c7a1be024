//! Step-by-step traversals expressed on treepaths
//!
//! Each step returns a fresh [`Treepath`], so a caller may edit the tree at the
//! current position and keep traversing from the edited treepath.

use super::Tree;
use super::treepath::Treepath;

/// Depth-first, parent before children, left to right.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preorder;

impl Preorder {
    pub fn new() -> Self {
        Self
    }

    pub fn first<T: Tree>(&self, treepath: &Treepath<T>) -> Treepath<T> {
        treepath.start()
    }

    pub fn next<T: Tree>(&self, treepath: &Treepath<T>) -> Option<Treepath<T>> {
        if treepath.tree_at_end().child_count() > 0 {
            return treepath.child(0).ok();
        }
        Self::next_up(treepath)
    }

    /// Next node that is not a descendant of the current one.
    pub fn next_up<T: Tree>(treepath: &Treepath<T>) -> Option<Treepath<T>> {
        let mut current = treepath.clone();
        loop {
            if current.has_next_sibling() {
                return current.next_sibling().ok();
            }
            current = current.previous()?;
        }
    }

    /// Every treepath of the tree in preorder, starting at the root.
    pub fn walk<T: Tree>(self, root: T) -> impl Iterator<Item = Treepath<T>> {
        std::iter::successors(Some(Treepath::create(root)), move |treepath| {
            self.next(treepath)
        })
    }
}

/// Depth-first, children before parent, right to left.
///
/// The filter decides which nodes are descended into; nodes failing it are still
/// visited, only their children are skipped.
#[derive(Debug, Clone, Copy)]
pub struct MirroredPostorder<F> {
    filter: F,
}

impl<F> MirroredPostorder<F> {
    pub fn new(filter: F) -> Self {
        Self { filter }
    }

    /// Deepest rightmost node reachable from the end of `treepath`.
    pub fn first<T>(&self, treepath: &Treepath<T>) -> Treepath<T>
    where
        T: Tree,
        F: Fn(&T) -> bool,
    {
        let mut result = treepath.clone();
        loop {
            let end = result.tree_at_end();
            let child_count = end.child_count();
            if child_count == 0 || !(self.filter)(end) {
                return result;
            }
            match result.child(child_count - 1) {
                Ok(child) => result = child,
                Err(_) => return result,
            }
        }
    }

    pub fn next<T>(&self, treepath: &Treepath<T>) -> Option<Treepath<T>>
    where
        T: Tree,
        F: Fn(&T) -> bool,
    {
        if treepath.length() < 2 {
            return None;
        }
        if treepath.has_previous_sibling() {
            let previous_sibling = treepath.previous_sibling().ok()?;
            if previous_sibling.tree_at_end().child_count() == 0 {
                Some(previous_sibling)
            } else {
                Some(self.first(&previous_sibling))
            }
        } else {
            treepath.previous()
        }
    }
}
