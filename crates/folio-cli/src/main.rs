//! Folio CLI
//!
//! Command-line interface for assembling folio books

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use folio_core::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Assemble folio books from their opus and sources")]
#[command(version = folio_core::VERSION)]
#[command(
    long_about = "Folio reads an opus, evaluates its directives and prints the assembled document tree.\n\
\n\
Examples:\n  \
folio assemble book.nlp                 # Assemble and print the book\n  \
folio assemble book.nlp --tag public    # Keep only fragments tagged 'public'\n  \
folio identifiers chapter.nlp           # List the identifiers of a source"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.foliorc.toml, folio.yaml, ...)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of worker threads parsing directory inserts
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble an opus and print the resulting tree
    Assemble {
        /// Opus file
        #[arg(help = "Path to the opus")]
        opus: PathBuf,

        /// Tags to keep (replaces the configured restriction)
        #[arg(short, long = "tag", help = "Keep only fragments with this tag (repeatable)")]
        tags: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "notation", help = "Output format")]
        format: OutputFormat,
    },

    /// Print the identifiers declared or derived in sources
    Identifiers {
        /// Source files
        #[arg(required = true, help = "Source files to inspect")]
        files: Vec<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tree notation followed by problems
    Notation,
    /// JSON object for programmatic consumption
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "folio=warn",
        1 => "folio=info",
        2 => "folio=debug",
        _ => "folio=trace",
    };
    if std::env::var_os("RUST_LOG").is_none() {
        // SAFETY: no other thread exists yet
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    init_tracing();

    let outcome = match cli.command {
        Commands::Assemble { opus, tags, format } => {
            commands::assemble_command(&opus, tags, format, cli.config.as_deref(), cli.threads)
        }
        Commands::Identifiers { files } => commands::identifiers_command(&files, cli.threads),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("folio failed: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
