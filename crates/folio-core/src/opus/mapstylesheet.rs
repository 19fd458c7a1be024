use super::context::CommandExecutionContext;
use crate::diagnostics::Location;
use indexmap::IndexMap;
use tracing::debug;

/// Associates stylesheets with rendition mime types (`html`, `pdf`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapstylesheetCommand {
    pub location: Option<Location>,
    pub mappings: IndexMap<String, String>,
}

impl MapstylesheetCommand {
    pub fn new(location: Option<Location>, mappings: IndexMap<String, String>) -> Self {
        Self { location, mappings }
    }

    pub fn evaluate(&self, context: CommandExecutionContext) -> CommandExecutionContext {
        debug!(mappings = ?self.mappings, "Mapping stylesheets");
        context.add_mappings(&self.mappings, self.location.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opus::context::tests::context;
    use std::path::Path;

    #[test]
    fn test_map_stylesheets() {
        let command = MapstylesheetCommand::new(
            None,
            [
                ("html".to_string(), "dir/stylesheet.xsl".to_string()),
                ("pdf".to_string(), "other/pdf.xsl".to_string()),
            ]
            .into(),
        );
        let result = command.evaluate(context(Path::new(".")));
        assert_eq!(result.stylesheet("html"), Some("dir/stylesheet.xsl"));
        assert_eq!(result.stylesheet("pdf"), Some("other/pdf.xsl"));
        assert!(result.problems().is_empty());
    }
}
