//! Configuration file loading for chatlink
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CHATLINK_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatlink.toml` or `./.chatlink.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/chatlink/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileChatConfig, FileConfig, FileLoggingConfig, FileSessionConfig,
};
pub use loader::ConfigLoader;
