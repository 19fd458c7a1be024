//! Output formatting

use anyhow::Result;
use folio_core::{AssembledDocument, Location, Problem};
use serde_json::json;
use std::path::PathBuf;

/// Identifiers found in one source.
pub struct IdentifierReport {
    pub file: PathBuf,
    pub pure: Vec<(String, Option<Location>)>,
    pub derived: Vec<(String, Option<Location>)>,
    pub problems: Vec<Problem>,
}

impl IdentifierReport {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            pure: Vec::new(),
            derived: Vec::new(),
            problems: Vec::new(),
        }
    }
}

pub fn print_notation(document: &AssembledDocument) {
    if let Some(tree) = &document.tree {
        println!("{}", tree.to_notation());
    }
    print_problems(&document.problems);
}

pub fn print_json(document: &AssembledDocument) -> Result<()> {
    let value = json!({
        "tree": document.tree.as_ref().map(|tree| tree.to_notation()),
        "stylesheets": document.stylesheets,
        "problems": document.problems,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn print_identifiers(report: &IdentifierReport) {
    println!("{}", report.file.display());
    print_identifier_list("pure", &report.pure);
    print_identifier_list("derived", &report.derived);
    print_problems(&report.problems);
}

fn print_identifier_list(label: &str, identifiers: &[(String, Option<Location>)]) {
    println!("  {label}:");
    for (identifier, location) in identifiers {
        match location {
            Some(location) => println!("    {identifier} at {location}"),
            None => println!("    {identifier}"),
        }
    }
}

fn print_problems(problems: &[Problem]) {
    if problems.is_empty() {
        return;
    }
    println!("{} problem(s):", problems.len());
    for problem in problems {
        println!("  {problem}");
    }
}
