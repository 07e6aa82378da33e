pub mod commands;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::application::services::selection_resolver::{
    FixedPrompt, Selection, SelectionPrompt, SelectionResolver,
};
use crate::application::use_cases::bulk_actions::{BulkActionConfig, BulkActionExecutor};
use crate::application::use_cases::classify_state::StateClassifier;
use crate::application::use_cases::discover_repositories::{DiscoveryConfig, RepositoryDiscovery};
use crate::application::use_cases::sync_repositories::SyncRepositoriesConfig;
use crate::common::error::GitstatError;
use crate::common::result::GitstatResult;
use crate::domain::entities::registry::RegistryView;
use crate::infrastructure::filesystem::config_store::{AppConfig, ConfigStore};
use crate::infrastructure::git::remote::SshAgentCredentials;
use crate::infrastructure::scm::scm_interface::PushRequest;
use crate::presentation::ui::display::{helpers::auto_display, DisplayHelper};
use crate::presentation::ui::prompt::TerminalPrompt;
use commands::{ListCommand, SyncCommand};

/// Exit status when every repository succeeded or was skipped
pub const EXIT_OK: i32 = 0;
/// Exit status for catastrophic errors
pub const EXIT_ERROR: i32 = 1;
/// Exit status when at least one repository action failed
pub const EXIT_ACTION_FAILED: i32 = 2;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// Output format options for listings
#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// gitstat - survey and sync a fleet of local git working copies
#[derive(Parser, Debug)]
#[command(name = "gitstat")]
#[command(about = "Survey, select and sync a fleet of local git working copies")]
#[command(version = VERSION)]
pub struct Cli {
    /// Repository to act on: name, list number, '.', 'all' or fuzzy text
    #[arg(value_name = "REPO")]
    pub repo: Option<String>,

    /// List repositories with their flags and exit
    #[arg(short, long)]
    pub list: bool,

    /// Stage, commit and push (same as -ucp)
    #[arg(short, long)]
    pub sync: bool,

    /// Stage working-tree changes (add and rm)
    #[arg(short = 'u', long = "update", visible_alias = "stage")]
    pub update: bool,

    /// Commit staged changes
    #[arg(short, long)]
    pub commit: bool,

    /// Push branches that are ahead of their upstream
    #[arg(short, long)]
    pub push: bool,

    /// Commit message
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Answer ambiguous matches with 'all'; requires REPO
    #[arg(short, long)]
    pub force: bool,

    /// Only report failures
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root path pattern to scan, replaces the configured roots
    #[arg(long = "root", value_name = "PATTERN", env = "GITSTAT_ROOTS", value_delimiter = ',')]
    pub roots: Vec<String>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output format for listings and reports
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

impl Cli {
    /// Actions requested on the command line
    pub fn sync_config(&self, message: String) -> SyncRepositoriesConfig {
        SyncRepositoriesConfig::new(message)
            .with_stage(self.sync || self.update)
            .with_commit(self.sync || self.commit)
            .with_push(self.sync || self.push)
    }

    /// Merge command-line overrides into the loaded configuration
    pub fn apply_overrides(&self, mut config: AppConfig) -> GitstatResult<AppConfig> {
        if !self.roots.is_empty() {
            config.roots = self.roots.clone();
        }
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err(GitstatError::validation_error(
                    "--jobs",
                    "must be at least 1",
                    Some(jobs.to_string()),
                ));
            }
            config.jobs = Some(jobs);
        }
        if let Some(message) = &self.message {
            if message.trim().is_empty() {
                return Err(GitstatError::validation_error(
                    "--message",
                    "must not be empty",
                    None,
                ));
            }
            config.commit_message = message.clone();
        }
        Ok(config)
    }
}

pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    /// Install the tracing subscriber (stderr, `RUST_LOG` wins over `--verbose`)
    pub fn init_tracing(&self) {
        let default_level = if self.cli.verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Run and return the process exit status
    pub async fn run(self) -> i32 {
        colored::control::set_override(!self.cli.no_color);

        match self.handle_command().await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                EXIT_ERROR
            }
        }
    }

    async fn handle_command(&self) -> Result<i32> {
        let config = ConfigStore::new()
            .load(self.cli.config.as_deref())
            .map_err(GitstatError::from)?;
        let config = self.cli.apply_overrides(config)?;
        let actions = self.cli.sync_config(config.commit_message.clone());

        if self.cli.force && self.cli.repo.is_none() && !self.cli.list {
            bail!("--force requires a repository selector");
        }

        let display = auto_display(self.cli.no_color).with_quiet(self.cli.quiet);
        let jobs = config.effective_jobs();
        let mut registry = self.load_registry(&config, jobs, &display).await;
        let summaries = registry.summaries();

        if self.cli.list {
            ListCommand::new(self.cli.output.clone(), false).execute(&summaries, &display)?;
            return Ok(EXIT_OK);
        }

        let ids = registry.ids();
        let resolver = SelectionResolver::new();
        let mut prompt: Box<dyn SelectionPrompt> = if self.cli.force {
            Box::new(FixedPrompt::new("all"))
        } else {
            Box::new(TerminalPrompt::new(&summaries, display.use_color))
        };
        let selection = match &self.cli.repo {
            Some(query) => resolver.resolve(query, &ids, prompt.as_mut()),
            None => resolver.select_interactively(&ids, prompt.as_mut()),
        };
        let selected = match selection {
            Selection::Selected(selected) => selected,
            Selection::Cancelled => {
                println!("Nothing selected");
                return Ok(EXIT_OK);
            }
        };
        debug!("Selected: {}", selected.join(", "));

        if !actions.has_actions() {
            let chosen: Vec<_> = summaries
                .into_iter()
                .filter(|summary| selected.contains(&summary.id))
                .collect();
            ListCommand::new(self.cli.output.clone(), true).execute(&chosen, &display)?;
            return Ok(EXIT_OK);
        }

        let executor = BulkActionExecutor::new(BulkActionConfig {
            jobs,
            committer: config.committer.clone(),
            push: PushRequest {
                remote: config.remote.clone(),
                credentials: Arc::new(SshAgentCredentials::new(config.push_user.clone())),
            },
        });
        let result = SyncCommand::new(actions, self.cli.output.clone())
            .execute(&mut registry, &selected, executor, &display)
            .await?;

        Ok(if result.is_success() {
            EXIT_OK
        } else {
            EXIT_ACTION_FAILED
        })
    }

    async fn load_registry(&self, config: &AppConfig, jobs: usize, display: &DisplayHelper) -> RegistryView {
        let spinner = display.create_spinner("Scanning repositories...");
        let discovery = RepositoryDiscovery::new(
            DiscoveryConfig::new(config.roots.clone())
                .with_max_depth(config.max_depth)
                .with_jobs(jobs),
        );
        let mut result = discovery.discover().await;
        debug!(
            "{} root(s), {} repositories, {} discovery issue(s)",
            result.roots.len(),
            result.registry.len(),
            result.issues.len()
        );

        spinner.set_message("Reading status...");
        let report = StateClassifier::new(jobs).classify(&mut result.registry).await;
        spinner.finish_and_clear();

        for issue in report.blocking_issues() {
            display.warning(&issue.to_string());
        }
        result.registry
    }
}
