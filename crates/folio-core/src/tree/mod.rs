//! Persistent document trees and structural addressing
//!
//! Trees are immutable. Every edit goes through a [`Treepath`], which rebuilds the
//! ancestors of the edited node and shares everything else with the original tree.
//! A [`RobustPath`] records how to find a node again after other passes have
//! rewritten the tree around it.

pub mod kind;
pub mod node;
pub mod robust_path;
pub mod traversal;
pub mod treepath;

pub use kind::{NodeKind, TagBehavior};
pub use node::{Payload, SyntacticTree};
pub use robust_path::{FilterError, RobustPath};
pub use traversal::{MirroredPostorder, Preorder};
pub use treepath::{TreeError, Treepath};

/// A persistent tree whose nodes can be rebuilt with new children.
///
/// Implementations must make [`Tree::adopt`] cheap relative to the size of the
/// subtree: untouched children are expected to be shared, not copied.
pub trait Tree: Clone {
    /// Ordered children of this node
    fn children(&self) -> &[Self];

    /// Returns a node with the same payload and the given children.
    fn adopt(&self, children: Vec<Self>) -> Self;

    /// Text identifying the node's payload (kind name or raw text)
    fn label(&self) -> &str;

    /// Identity test: true when both handles point at the very same node.
    fn same_node(&self, other: &Self) -> bool;

    fn child_count(&self) -> usize {
        self.children().len()
    }
}
