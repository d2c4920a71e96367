//! Presentation layer for chatlink
//!
//! This crate contains the CLI definition, console formatting of the
//! chat lifecycle, and the interactive chat REPL.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
