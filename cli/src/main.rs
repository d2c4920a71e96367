//! CLI entrypoint for chatlink
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use chatlink_application::{
    DiagnosticsLogger, EventBus, InMemorySessionRegistry, InitChat, InitChatRequest,
    InitiationCallbacks, InitiationOrchestrator, NoDiagnosticsLogger, SessionRegistry,
};
use chatlink_domain::{InitiationInput, LifecycleState, SessionDescriptor};
use chatlink_infrastructure::{
    ConfigLoader, FileConfig, HttpSessionDescriptorFactory, JsonlDiagnosticsLogger,
    WebSocketConnector,
};
use chatlink_presentation::{ChatRepl, Cli, ConsoleFormatter};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);

    let _log_guard = init_tracing(&cli, &config);

    if cli.show_config {
        ConfigLoader::print_config_sources();
        println!();
        println!("{}", ConfigLoader::render(&config)?);
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    let input = build_input(&config)?;
    let timeout = Duration::from_secs(config.session.connect_timeout_seconds);

    info!("Starting chatlink");

    // === Dependency Injection ===
    let bus = Arc::new(EventBus::new());
    let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new());
    let logger = diagnostics_logger(config.logging.diagnostics_file.as_deref());
    let factory = HttpSessionDescriptorFactory::with_timeout(timeout)?;

    let orchestrator = InitiationOrchestrator::builder(
        Arc::new(factory),
        Arc::new(WebSocketConnector),
        Arc::clone(&bus),
    )
    .with_registry(Arc::clone(&registry))
    .with_logger(logger)
    .with_params(config.session.to_orchestrator_params())
    .build();

    // Start the chat the same way an embedding page would: through initChat
    let mut states = orchestrator.subscribe_state();
    let callbacks = InitiationCallbacks::none()
        .on_failure(|error| eprintln!("{}", ConsoleFormatter::format_error(error)));
    bus.trigger::<InitChat>(&InitChatRequest::new(input.clone()).with_callbacks(callbacks));
    println!(
        "{}",
        ConsoleFormatter::format_transition(&orchestrator.snapshot())
    );

    let settled = tokio::time::timeout(
        timeout,
        states.wait_for(|s| {
            matches!(
                s.state,
                LifecycleState::Initiated | LifecycleState::InitiateFailed
            )
        }),
    )
    .await;

    match settled {
        Ok(Ok(snapshot)) => {
            let snapshot = snapshot.clone();
            println!("{}", ConsoleFormatter::format_transition(&snapshot));
        }
        Ok(Err(_)) => anyhow::bail!("Chat lifecycle closed unexpectedly"),
        Err(_) => {
            warn!("Chat did not start within {:?}", timeout);
            orchestrator.reset();
            eprintln!(
                "Chat did not start within {}s. Type /retry to try again.",
                timeout.as_secs()
            );
        }
    }

    ChatRepl::new(Arc::clone(&orchestrator), input)
        .with_retry_timeout(timeout)
        .run()
        .await?;

    Ok(())
}

/// Command-line flags take precedence over every config source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    let chat = &mut config.chat;
    if let Some(id) = &cli.contact_flow_id {
        chat.contact_flow_id = id.clone();
    }
    if let Some(id) = &cli.instance_id {
        chat.instance_id = id.clone();
    }
    if let Some(name) = &cli.display_name {
        chat.display_name = name.clone();
    }
    if let Some(language) = &cli.language {
        chat.language = Some(language.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        chat.api_gateway_endpoint = Some(endpoint.clone());
    }
    if let Some(path) = &cli.session_parameters {
        chat.session_parameters_file = Some(path.clone());
    }
}

fn build_input(config: &FileConfig) -> Result<InitiationInput> {
    let mut input = config.chat.to_initiation_input();
    if let Some(path) = &config.chat.session_parameters_file {
        input = input.with_chat_session_parameters(load_session_parameters(path)?);
    }
    Ok(input)
}

fn load_session_parameters(path: &Path) -> Result<SessionDescriptor> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session parameters {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid session parameters in {}", path.display()))
}

fn diagnostics_logger(path: Option<&Path>) -> Arc<dyn DiagnosticsLogger> {
    match path.and_then(JsonlDiagnosticsLogger::open) {
        Some(logger) => {
            info!("Diagnostics logged to {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoDiagnosticsLogger),
    }
}

/// Initialize logging based on verbosity level; with `[logging] log_dir`
/// set, logs are also written to a daily-rotated file.
fn init_tracing(cli: &Cli, config: &FileConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::new(cli.log_level());

    match &config.logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "chatlink.log");
            let (file, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr.and(file))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
