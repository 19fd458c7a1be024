//! Directives of an opus

use super::context::CommandExecutionContext;
use super::insert::InsertCommand;
use super::mapstylesheet::MapstylesheetCommand;
use crate::diagnostics::Location;

/// How an inclusion relates to the level it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelHead {
    /// Wrap each included file in a new level titled after the file.
    CreateLevel,
    /// Drop the title and identifier of an inclusion made of one bare level.
    NoHead,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Insert(InsertCommand),
    Mapstylesheet(MapstylesheetCommand),
}

impl Command {
    /// Runs the directive against `context` and returns the resulting context.
    pub fn evaluate(&self, context: CommandExecutionContext) -> CommandExecutionContext {
        match self {
            Command::Insert(insert) => insert.evaluate(context),
            Command::Mapstylesheet(mapstylesheet) => mapstylesheet.evaluate(context),
        }
    }

    /// Where the directive appears in the opus.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Command::Insert(insert) => insert.location.as_ref(),
            Command::Mapstylesheet(mapstylesheet) => mapstylesheet.location.as_ref(),
        }
    }
}
