//! Tree normalization passes
//!
//! Each pass takes a tree and returns a new one; untouched subtrees are shared.

pub mod lists;
pub mod separators;
pub mod tag_filter;
pub mod tags;

pub use lists::{aggregate_embedded_lists, aggregate_lists};
pub use separators::{
    insert_mandatory_whitespace_near_apostrophe, insert_zero_width_space_between_blocks_of_literal,
    insert_zero_width_space_between_word_and_literal, remove_separators,
};

use crate::tree::SyntacticTree;
use tracing::debug;

/// Normalizes a freshly parsed novella before identifiers get resolved.
///
/// Spacing decisions that depend on whitespace run first, then separators go away.
pub fn prepare_novella(tree: &SyntacticTree) -> SyntacticTree {
    debug!("Preparing novella");
    let tree = insert_mandatory_whitespace_near_apostrophe(tree);
    let tree = insert_zero_width_space_between_blocks_of_literal(&tree);
    let tree = insert_zero_width_space_between_word_and_literal(&tree);
    let tree = aggregate_embedded_lists(&tree);
    let tree = remove_separators(&tree);
    tags::enhance(&tree)
}
