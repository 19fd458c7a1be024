//! Names that designate parts of a document
//!
//! A [`FragmentIdentifier`] names a level, either explicitly (an absolute identifier
//! written by the author) or implicitly (derived from the level title). A [`Tag`]
//! labels content for conditional inclusion. The [`BabyInterpreter`] maps identifiers
//! to [`crate::tree::RobustPath`]s so later passes can find the fragments again.

pub mod collisions;
pub mod fragment;
pub mod implicit;
pub mod interpreter;
pub mod tag;

pub use collisions::IdentifierCollisions;
pub use fragment::FragmentIdentifier;
pub use implicit::{clean_for_tag, to_implicit_identifier};
pub use interpreter::{BabyInterpreter, identifier_tree_filter};
pub use tag::Tag;

use thiserror::Error;

/// Raised when building a designator out of unusable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignatorError {
    #[error("Fragment identifier needs at least one segment")]
    EmptyIdentifier,

    #[error("Blank segment at position {position} in fragment identifier")]
    BlankSegment { position: usize },

    #[error("Tag name cannot be blank")]
    BlankTag,
}
