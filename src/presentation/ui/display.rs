use colored::Colorize;
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::application::use_cases::bulk_actions::{ActionOutcome, ActionReport};
use crate::domain::entities::repository::RepositorySummary;

/// Display utilities for the CLI interface
pub struct DisplayHelper {
    pub use_color: bool,
    pub quiet: bool,
    pub terminal: Term,
}

impl DisplayHelper {
    /// Create a new DisplayHelper
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            quiet: false,
            terminal: Term::stdout(),
        }
    }

    /// Suppress success and skip lines
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("{}", message);
        }
    }

    /// Print a skip message
    pub fn skipped(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.use_color {
            println!("{} {}", "-".dimmed(), message.dimmed());
        } else {
            println!("{}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "⚠".yellow().bold(), message);
        } else {
            eprintln!("[WARNING] {}", message);
        }
    }

    /// Format a repository name with appropriate styling
    pub fn format_repo(&self, repo: &str) -> String {
        if self.use_color {
            repo.cyan().bold().to_string()
        } else {
            repo.to_string()
        }
    }

    /// Spinner shown while working copies are discovered and classified
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.use_color || !self.terminal.is_term() {
            return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", ""])
            .template("{spinner:.green} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// One line per repository of an action report
    pub fn print_report(&self, report: &ActionReport) {
        for (id, outcome) in &report.results {
            let repo = self.format_repo(id);
            match outcome {
                ActionOutcome::Success(detail) => {
                    self.success(&format!("{} {} ({})", report.action.past_tense(), repo, detail))
                }
                ActionOutcome::Skipped(reason) => {
                    self.skipped(&format!("Skipped {} {}: {}", report.action, repo, reason))
                }
                ActionOutcome::Failed(reason) => {
                    self.error(&format!("{} failed for {}: {}", report.action, repo, reason))
                }
            }
        }
    }

    /// Numbered repository list with flag columns
    pub fn print_repo_list(&self, summaries: &[RepositorySummary]) {
        print!("{}", format_repo_list(summaries, self.use_color));
    }

    /// Repository list followed by each repository's changed files
    pub fn print_repo_details(&self, summaries: &[RepositorySummary]) {
        for summary in summaries {
            print!("{}", format_repo_list(std::slice::from_ref(summary), self.use_color));
            if let Some(branch) = &summary.branch {
                let upstream = summary.upstream.as_deref().unwrap_or("no upstream");
                println!("      on {} ({})", branch, upstream);
            }
            if let Some(error) = &summary.status_error {
                println!("      {}", error);
            }
            for change in &summary.changes {
                let codes: String = change.categories.iter().map(|c| c.short_code()).collect();
                println!("      {:<2} {}", codes, change.path);
            }
        }
    }
}

/// Three flag columns: `*` dirty (or `!` blocked), `-` staged, `^` ahead
pub fn flag_columns(summary: &RepositorySummary) -> String {
    let first = if summary.blocked {
        '!'
    } else if summary.dirty {
        '*'
    } else {
        ' '
    };
    let second = if summary.staged { '-' } else { ' ' };
    let third = if summary.ahead { '^' } else { ' ' };
    [first, second, third].iter().collect()
}

/// Render `N)FFF id` rows, numbers right-aligned to the widest index
pub fn format_repo_list(summaries: &[RepositorySummary], use_color: bool) -> String {
    let width = summaries
        .iter()
        .map(|s| s.index.to_string().len())
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    for summary in summaries {
        let flags = flag_columns(summary);
        let flags = if use_color {
            if summary.blocked {
                flags.red().bold().to_string()
            } else {
                flags.yellow().to_string()
            }
        } else {
            flags
        };
        out.push_str(&format!(
            "{:>width$}){} {}\n",
            summary.index,
            flags,
            summary.id,
            width = width
        ));
    }
    out
}

/// Helper functions for common display patterns
pub mod helpers {
    use super::*;

    /// Create a display helper with color detection
    pub fn auto_display(no_color: bool) -> DisplayHelper {
        let use_color =
            !no_color && atty::is(atty::Stream::Stdout) && std::env::var("NO_COLOR").is_err();
        DisplayHelper::new(use_color)
    }
}
