pub mod display;
pub mod prompt;

pub use display::DisplayHelper;
pub use prompt::TerminalPrompt;
