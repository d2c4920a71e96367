//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for chatlink
#[derive(Parser, Debug)]
#[command(name = "chatlink")]
#[command(author, version, about = "Start a chat with a contact center and talk to an agent")]
#[command(long_about = r#"
chatlink creates a chat contact through an API gateway, opens the chat
transport and drops you into an interactive session.

Configuration files are loaded from (in priority order):
1. CHATLINK_* environment variables (e.g. CHATLINK_CHAT__INSTANCE_ID)
2. --config <path>       Explicit config file
3. ./chatlink.toml       Project-level config
4. ~/.config/chatlink/config.toml   Global config

Example:
  chatlink --endpoint https://gw.example.com/prod/start \
           --contact-flow-id cf-123 --instance-id inst-456 --display-name Jane
  chatlink --config support.toml --language fr_FR
"#)]
pub struct Cli {
    /// Contact flow to start the chat in
    #[arg(long, value_name = "ID")]
    pub contact_flow_id: Option<String>,

    /// Contact center instance
    #[arg(long, value_name = "ID")]
    pub instance_id: Option<String>,

    /// Name shown to the agent
    #[arg(long, value_name = "NAME")]
    pub display_name: Option<String>,

    /// Language tag (e.g. en_US, fr_FR)
    #[arg(short, long, value_name = "TAG")]
    pub language: Option<String>,

    /// Chat creation endpoint (API gateway URL)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// JSON file with pre-built session parameters (skips chat creation)
    #[arg(long, value_name = "PATH")]
    pub session_parameters: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the effective config, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Tracing filter directive for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
