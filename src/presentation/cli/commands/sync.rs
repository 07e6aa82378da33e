use anyhow::Result;

use crate::application::use_cases::bulk_actions::BulkActionExecutor;
use crate::application::use_cases::sync_repositories::{
    SyncRepositoriesConfig, SyncRepositoriesUseCase, SyncResult,
};
use crate::common::result::GitstatResult;
use crate::domain::entities::registry::RegistryView;
use crate::presentation::cli::OutputFormat;
use crate::presentation::ui::display::DisplayHelper;

/// Handler for the stage/commit/push actions
pub struct SyncCommand {
    pub config: SyncRepositoriesConfig,
    pub output: OutputFormat,
}

impl SyncCommand {
    pub fn new(config: SyncRepositoriesConfig, output: OutputFormat) -> Self {
        Self { config, output }
    }

    /// Run the configured actions on `selection` and print one line per repository
    pub async fn execute(
        &self,
        registry: &mut RegistryView,
        selection: &[String],
        executor: BulkActionExecutor,
        display: &DisplayHelper,
    ) -> Result<SyncResult> {
        let use_case = SyncRepositoriesUseCase::new(self.config.clone(), executor);
        let text = matches!(self.output, OutputFormat::Text);

        let result = use_case
            .execute(registry, selection, |report| {
                if text {
                    display.print_report(report);
                }
            })
            .await;

        if let Some(rendered) = render_result(&result, &self.output)? {
            println!("{}", rendered);
        }
        Ok(result)
    }
}

/// Machine-readable rendering of the sync reports; `None` for text output
pub fn render_result(result: &SyncResult, format: &OutputFormat) -> GitstatResult<Option<String>> {
    let rendered = match format {
        OutputFormat::Text => return Ok(None),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Yaml => serde_yaml::to_string(result)?,
    };
    Ok(Some(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::bulk_actions::{ActionKind, ActionOutcome, ActionReport};

    fn result() -> SyncResult {
        SyncResult {
            reports: vec![ActionReport {
                action: ActionKind::Push,
                results: vec![
                    ("notes".to_string(), ActionOutcome::Success("refs/heads/main -> origin".to_string())),
                    ("site".to_string(), ActionOutcome::Failed("Network error: timed out".to_string())),
                ],
            }],
        }
    }

    #[test]
    fn test_text_output_is_printed_per_report() {
        assert_eq!(render_result(&result(), &OutputFormat::Text).unwrap(), None);
    }

    #[test]
    fn test_render_json_result() {
        let json = render_result(&result(), &OutputFormat::Json).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["reports"][0]["action"], "push");
        assert_eq!(value["reports"][0]["results"][1][0], "site");
        assert_eq!(value["reports"][0]["results"][1][1]["outcome"], "failed");
    }
}
