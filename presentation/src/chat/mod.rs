//! Interactive chat module
//!
//! Provides a line-based chat interface over the current session.

mod repl;

pub use repl::{ChatRepl, ReplCommand};
