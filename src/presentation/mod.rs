/// Presentation layer: command-line parsing, commands and terminal output
pub mod cli;
pub mod ui;
