//! Folio Core
//!
//! Document tree model, identifier resolution and opus assembly for the folio
//! markup compiler. Sources reach this crate as [`SyntacticTree`]s built by a
//! [`DocumentParser`]; normalization passes reshape them, designators give their
//! fragments stable names, and the [`OpusAssembler`] stitches many sources into one
//! book.

pub mod config;
pub mod designator;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod mangling;
pub mod notation;
pub mod opus;
pub mod parser;
pub mod result;
pub mod tree;

// Re-export commonly used types
pub use config::{ConfigLoader, FolioConfig};
pub use designator::{BabyInterpreter, FragmentIdentifier, IdentifierCollisions, Tag};
pub use diagnostics::{Location, Problem};
pub use discovery::SourcePatterns;
pub use error::{ErrorKind, FolioError};
pub use notation::NotationParser;
pub use opus::{AssembledDocument, FileOrdering, OpusAssembler, SortMethod};
pub use parser::{DocumentParser, ParsedDocument};
pub use result::{Result, ResultExt};
pub use tree::{NodeKind, RobustPath, SyntacticTree, Treepath};

/// Initialize the tracing subscriber for logging, writing to standard error
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
