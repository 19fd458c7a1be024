//! Subcommand implementations
//!
//! Each command returns `Ok(true)` when it found no problem.

use crate::OutputFormat;
use crate::output;
use anyhow::{Context, Result};
use folio_core::designator::BabyInterpreter;
use folio_core::designator::interpreter::IdentifierMap;
use folio_core::mangling::prepare_novella;
use folio_core::{
    ConfigLoader, DocumentParser, Location, NotationParser, OpusAssembler, ResultExt,
    SyntacticTree, Tag,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub fn assemble_command(
    opus: &Path,
    tags: Vec<String>,
    format: OutputFormat,
    config_path: Option<&Path>,
    threads: Option<usize>,
) -> Result<bool> {
    let start_dir = opus.parent().filter(|dir| !dir.as_os_str().is_empty());
    let mut config = ConfigLoader::load_or_default(config_path, start_dir)
        .context("Cannot load configuration")?;
    if threads.is_some() {
        config.assembly.worker_threads = threads;
    }
    debug!(?config, "Configuration");

    let mut assembler = OpusAssembler::new(Arc::new(NotationParser::new()), &config)?;
    if !tags.is_empty() {
        assembler = assembler.with_tags(Tag::to_tag_set(&tags));
    }
    let document = assembler
        .assemble_file(opus)
        .with_context(|| format!("Cannot assemble '{}'", opus.display()))?;

    match format {
        OutputFormat::Notation => output::print_notation(&document),
        OutputFormat::Json => output::print_json(&document)?,
    }
    info!(problems = document.problems.len(), "Done");
    Ok(!document.has_problems())
}

pub fn identifiers_command(files: &[PathBuf], threads: Option<usize>) -> Result<bool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().context("Cannot start worker pool")?;

    let parser = NotationParser::new();
    let outcomes: Vec<folio_core::Result<output::IdentifierReport>> = pool.install(|| {
        files
            .par_iter()
            .map(|file| {
                let parsed = parser.parse_file(file)?;
                let mut report = output::IdentifierReport::new(file.clone());
                report.problems.extend(parsed.problems().iter().cloned());
                if let Some(tree) = parsed.tree() {
                    let prepared = prepare_novella(tree);
                    let interpreter = BabyInterpreter::from_tree(&prepared);
                    report.pure = locate(interpreter.pure_identifiers(), &prepared);
                    report.derived = locate(interpreter.derived_identifiers(), &prepared);
                    report.problems.extend(interpreter.problems().iter().cloned());
                }
                report.problems.sort();
                Ok(report)
            })
            .collect()
    });

    // Unreadable files are skipped with a warning; anything else stops before output.
    let mut clean = true;
    let mut reports = Vec::with_capacity(outcomes.len());
    for (file, outcome) in files.iter().zip(outcomes) {
        match outcome
            .recoverable()
            .with_context(|| format!("Cannot read '{}'", file.display()))?
        {
            Some(report) => reports.push(report),
            None => clean = false,
        }
    }

    for report in &reports {
        clean &= report.problems.is_empty();
        output::print_identifiers(report);
    }
    Ok(clean)
}

/// Pairs each identifier with the location of the node it designates.
fn locate(identifiers: &IdentifierMap, root: &SyntacticTree) -> Vec<(String, Option<Location>)> {
    identifiers
        .iter()
        .map(|(identifier, path)| {
            let location = path
                .resolve(root)
                .and_then(|treepath| treepath.tree_at_end().location().cloned());
            (identifier.absolute_representation(), location)
        })
        .collect()
}
