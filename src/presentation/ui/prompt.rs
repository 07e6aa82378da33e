use console::Term;
use std::collections::HashMap;
use std::io::{self, BufRead};
use tracing::debug;

use crate::application::services::selection_resolver::SelectionPrompt;
use crate::domain::entities::repository::RepositorySummary;
use crate::presentation::ui::display::format_repo_list;

/// Interactive prompt on the controlling terminal
///
/// The choices and the question go to stderr so that piping stdout does not
/// hide them. Answers are read from stdin only when stdin is a terminal; a
/// closed or non-interactive stdin answers nothing.
pub struct TerminalPrompt {
    term: Term,
    input: Option<Box<dyn BufRead>>,
    summaries: HashMap<String, RepositorySummary>,
    use_color: bool,
}

impl TerminalPrompt {
    pub fn new(summaries: &[RepositorySummary], use_color: bool) -> Self {
        let input: Option<Box<dyn BufRead>> = if atty::is(atty::Stream::Stdin) {
            Some(Box::new(io::BufReader::new(io::stdin())))
        } else {
            None
        };
        Self::with_input(summaries, use_color, input)
    }

    /// Prompt reading its answers from `input` (`None` never answers)
    pub fn with_input(
        summaries: &[RepositorySummary],
        use_color: bool,
        input: Option<Box<dyn BufRead>>,
    ) -> Self {
        Self {
            term: Term::stderr(),
            input,
            summaries: summaries
                .iter()
                .map(|summary| (summary.id.clone(), summary.clone()))
                .collect(),
            use_color,
        }
    }

    fn choice_list(&self, choices: &[String]) -> String {
        let numbered: Vec<RepositorySummary> = choices
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let mut summary = self.summaries.get(id).cloned().unwrap_or_else(|| RepositorySummary {
                    index: 0,
                    id: id.clone(),
                    path: Default::default(),
                    branch: None,
                    upstream: None,
                    dirty: false,
                    staged: false,
                    ahead: false,
                    blocked: false,
                    status_error: None,
                    changes: vec![],
                });
                summary.index = i + 1;
                summary
            })
            .collect();
        format_repo_list(&numbered, self.use_color)
    }

    fn read_answer(&mut self) -> Option<String> {
        let Some(input) = self.input.as_mut() else {
            debug!("stdin is not interactive, no answer");
            return None;
        };
        let mut answer = String::new();
        match input.read_line(&mut answer) {
            Ok(0) => None,
            Ok(_) => Some(answer.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                debug!("No answer from terminal: {}", e);
                None
            }
        }
    }
}

impl SelectionPrompt for TerminalPrompt {
    fn choose(&mut self, question: &str, choices: &[String]) -> Option<String> {
        let listing = self.choice_list(choices);
        let prompt = format!("{} {}", question, range_hint(choices.len()));

        let written = self
            .term
            .write_str(&listing)
            .and_then(|_| self.term.write_str(&prompt))
            .and_then(|_| self.term.flush());
        if let Err(e) = written {
            debug!("Cannot write prompt: {}", e);
            return None;
        }

        self.read_answer()
    }
}

/// `[1-N/all/cancel] `
pub fn range_hint(count: usize) -> String {
    format!("[1-{}/all/cancel] ", count.max(1))
}
