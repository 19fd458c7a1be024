//! Opus assembly
//!
//! An opus is a document made of directives. `insert` pulls sources (one file, or a
//! whole directory sorted by a [`FileOrdering`]) into the book; `mapstylesheet`
//! associates stylesheets with rendition formats. Commands are pure functions from one
//! [`CommandExecutionContext`] to the next.

pub mod assembler;
pub mod command;
pub mod context;
pub mod factory;
pub mod insert;
pub mod mapstylesheet;
pub mod ordering;

pub use assembler::{AssembledDocument, OpusAssembler};
pub use command::{Command, LevelHead};
pub use context::{CommandExecutionContext, DuplicateStylesheetMapping};
pub use factory::{CommandParameterError, create_command, create_file_ordering};
pub use insert::InsertCommand;
pub use mapstylesheet::MapstylesheetCommand;
pub use ordering::{CriteriaError, CriterionCreationError, FileOrdering, SortMethod};
