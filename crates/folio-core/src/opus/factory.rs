//! Building commands from directive trees

use super::command::{Command, LevelHead};
use super::insert::InsertCommand;
use super::mapstylesheet::MapstylesheetCommand;
use super::ordering::{FileOrdering, SortMethod};
use crate::designator::FragmentIdentifier;
use crate::tree::{NodeKind, SyntacticTree};
use indexmap::IndexMap;
use thiserror::Error;

/// A directive whose parameters make no sense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParameterError {
    #[error("Found no URL in directive {directive}")]
    MissingUrl { directive: String },

    #[error("Unknown ordering: '{0}'")]
    UnknownOrdering(String),

    #[error("Missing sort order at the end of '{0}', must be '+' or '-'")]
    MissingSortOrder(String),

    #[error("Not a level count: '{0}'")]
    InvalidLevelCount(String),

    #[error("Unusable fragment identifier in {directive}: {reason}")]
    InvalidFragmentIdentifier { directive: String, reason: String },

    #[error("Stylesheet assignment needs a mime type and a path: {0}")]
    MalformedAssignment(String),

    #[error("Not a directive: {0}")]
    UnsupportedDirective(String),
}

/// Builds the command described by a directive tree.
pub fn create_command(tree: &SyntacticTree) -> Result<Command, CommandParameterError> {
    let location = tree.location().cloned();
    match tree.kind() {
        Some(NodeKind::CommandInsert) => {
            let target = text_of_child(tree, NodeKind::UrlLiteral).ok_or_else(|| {
                CommandParameterError::MissingUrl {
                    directive: tree.to_notation(),
                }
            })?;
            let ordering = text_of_child(tree, NodeKind::CommandInsertSort)
                .map(create_file_ordering)
                .transpose()?;
            let level_head = if has_child(tree, NodeKind::CommandInsertCreateLevel) {
                Some(LevelHead::CreateLevel)
            } else if has_child(tree, NodeKind::CommandInsertNoHead) {
                Some(LevelHead::NoHead)
            } else {
                None
            };
            let level_above = text_of_child(tree, NodeKind::CommandInsertLevelAbove)
                .map(|text| {
                    text.trim()
                        .parse::<usize>()
                        .map_err(|_| CommandParameterError::InvalidLevelCount(text.to_string()))
                })
                .transpose()?
                .unwrap_or(0);

            Ok(Command::Insert(InsertCommand {
                location,
                target: target.to_string(),
                recurse: has_child(tree, NodeKind::CommandInsertRecurse),
                ordering,
                level_head,
                level_above,
                style: text_of_child(tree, NodeKind::CommandInsertStyle).map(str::to_string),
                selectors: fragment_identifiers(tree)?,
            }))
        }
        Some(NodeKind::CommandMapStylesheet) => {
            let mut mappings = IndexMap::new();
            for assignment in tree.children() {
                let pair = (
                    assignment.child(0).map(SyntacticTree::text),
                    assignment.child(1).map(SyntacticTree::text),
                );
                let (Some(mime), Some(stylesheet)) = pair else {
                    return Err(CommandParameterError::MalformedAssignment(
                        assignment.to_notation(),
                    ));
                };
                mappings.insert(mime.to_string(), stylesheet.to_string());
            }
            Ok(Command::Mapstylesheet(MapstylesheetCommand::new(
                location, mappings,
            )))
        }
        _ => Err(CommandParameterError::UnsupportedDirective(
            tree.text().to_string(),
        )),
    }
}

/// Parses `<method><+|->`, such as `version-`.
pub fn create_file_ordering(sort_order: &str) -> Result<FileOrdering, CommandParameterError> {
    let mut chars = sort_order.chars();
    let inverted = match chars.next_back() {
        Some('+') => false,
        Some('-') => true,
        _ => {
            return Err(CommandParameterError::MissingSortOrder(
                sort_order.to_string(),
            ));
        }
    };
    let method_name = chars.as_str();
    let method = SortMethod::from_name(method_name)
        .ok_or_else(|| CommandParameterError::UnknownOrdering(method_name.to_string()))?;
    let ordering = FileOrdering::new(method);
    Ok(if inverted { ordering.inverse() } else { ordering })
}

fn fragment_identifiers(
    tree: &SyntacticTree,
) -> Result<Vec<FragmentIdentifier>, CommandParameterError> {
    tree.children()
        .iter()
        .filter(|child| child.is(NodeKind::CompositeIdentifier))
        .map(|child| {
            FragmentIdentifier::new(child.children().iter().map(SyntacticTree::text)).map_err(
                |e| CommandParameterError::InvalidFragmentIdentifier {
                    directive: tree.to_notation(),
                    reason: e.to_string(),
                },
            )
        })
        .collect()
}

fn text_of_child(tree: &SyntacticTree, kind: NodeKind) -> Option<&str> {
    tree.children()
        .iter()
        .find(|child| child.is(kind))
        .and_then(SyntacticTree::first_text)
}

fn has_child(tree: &SyntacticTree, kind: NodeKind) -> bool {
    tree.children().iter().any(|child| child.is(kind))
}
