use anyhow::Result;

use crate::common::result::GitstatResult;
use crate::domain::entities::repository::RepositorySummary;
use crate::presentation::cli::OutputFormat;
use crate::presentation::ui::display::DisplayHelper;

/// Handler for listing repositories
pub struct ListCommand {
    pub output: OutputFormat,
    /// Include branch and per-file changes in text output
    pub details: bool,
}

impl ListCommand {
    pub fn new(output: OutputFormat, details: bool) -> Self {
        Self { output, details }
    }

    pub fn execute(&self, summaries: &[RepositorySummary], display: &DisplayHelper) -> Result<()> {
        match self.output {
            OutputFormat::Text => {
                if summaries.is_empty() {
                    display.warning("No repositories found");
                } else if self.details {
                    display.print_repo_details(summaries);
                } else {
                    display.print_repo_list(summaries);
                }
            }
            OutputFormat::Json | OutputFormat::Yaml => {
                println!("{}", render(summaries, &self.output)?);
            }
        }
        Ok(())
    }
}

/// Serialize the listing for machine-readable output
pub fn render(summaries: &[RepositorySummary], format: &OutputFormat) -> GitstatResult<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(summaries)?,
        OutputFormat::Yaml => serde_yaml::to_string(summaries)?,
        OutputFormat::Text => crate::presentation::ui::display::format_repo_list(summaries, false),
    };
    Ok(rendered)
}
