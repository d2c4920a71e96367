//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use chatlink_application::{
    IncomingMessages, InitiationCallbacks, InitiationOrchestrator, InitiationOutcome,
};
use chatlink_domain::{InitiationInput, Language, LifecycleState};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text, sent to the agent.
    Send(String),
    End,
    /// `/lang` alone shows the current tag.
    Language(Option<String>),
    Status,
    Retry,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if !line.starts_with('/') {
            return Self::Send(line.to_string());
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (line, None),
        };

        match command {
            "/end" => Self::End,
            "/lang" | "/language" => Self::Language(arg.map(str::to_string)),
            "/status" => Self::Status,
            "/retry" => Self::Retry,
            "/help" | "/h" | "/?" => Self::Help,
            "/quit" | "/exit" | "/q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplOutcome {
    Continue(Option<String>),
    Quit(Option<String>),
}

/// Interactive chat REPL over the orchestrator's current session
pub struct ChatRepl {
    orchestrator: Arc<InitiationOrchestrator>,
    input: InitiationInput,
    retry_timeout: Option<Duration>,
}

impl ChatRepl {
    /// `input` is reused by `/retry`.
    pub fn new(orchestrator: Arc<InitiationOrchestrator>, input: InitiationInput) -> Self {
        Self {
            orchestrator,
            input,
            retry_timeout: None,
        }
    }

    pub fn with_retry_timeout(mut self, timeout: Duration) -> Self {
        self.retry_timeout = Some(timeout);
        self
    }

    /// Run the interactive REPL until `/quit` or end of input
    pub async fn run(&self) -> io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut states = self.orchestrator.subscribe_state();
        states.borrow_and_update();
        let mut incoming = self.attach_incoming();

        self.print_welcome();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        println!("Bye!");
                        break;
                    };
                    match self.execute(ReplCommand::parse(&line)).await {
                        ReplOutcome::Continue(message) => Self::print(message),
                        ReplOutcome::Quit(message) => {
                            Self::print(message);
                            break;
                        }
                    }
                }
                frame = next_frame(&mut incoming) => {
                    if let Some(frame) = frame {
                        println!("{}", ConsoleFormatter::format_incoming(&frame));
                    }
                }
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = states.borrow_and_update().clone();
                    println!("{}", ConsoleFormatter::format_transition(&snapshot));
                    if snapshot.state == LifecycleState::Initiated && incoming.is_none() {
                        incoming = self.attach_incoming();
                    }
                }
            }
        }

        Ok(())
    }

    /// Execute one command and describe the result.
    pub async fn execute(&self, command: ReplCommand) -> ReplOutcome {
        match command {
            ReplCommand::Empty => ReplOutcome::Continue(None),
            ReplCommand::Send(text) => ReplOutcome::Continue(self.send(&text).await),
            ReplCommand::End => ReplOutcome::Continue(self.end().await),
            ReplCommand::Language(None) => ReplOutcome::Continue(Some(format!(
                "Language: {}",
                self.orchestrator.language()
            ))),
            ReplCommand::Language(Some(tag)) => match tag.parse::<Language>() {
                Ok(language) => {
                    self.orchestrator.set_language(language.clone());
                    ReplOutcome::Continue(Some(format!("Language set to {}", language)))
                }
                Err(e) => ReplOutcome::Continue(Some(format!("{}", e))),
            },
            ReplCommand::Status => ReplOutcome::Continue(Some(ConsoleFormatter::format_snapshot(
                &self.orchestrator.snapshot(),
            ))),
            ReplCommand::Retry => ReplOutcome::Continue(self.retry().await),
            ReplCommand::Help => ReplOutcome::Continue(Some(Self::help())),
            ReplCommand::Quit => {
                if let Some(session) = self.orchestrator.registry().current()
                    && let Err(e) = session.close().await
                {
                    debug!("Session close on quit: {}", e);
                }
                ReplOutcome::Quit(Some("Bye!".to_string()))
            }
            ReplCommand::Unknown(command) => ReplOutcome::Continue(Some(format!(
                "Unknown command: {}\nType /help for available commands",
                command
            ))),
        }
    }

    async fn send(&self, text: &str) -> Option<String> {
        let Some(session) = self.orchestrator.registry().current() else {
            return Some("No active chat. Type /retry to start one.".to_string());
        };
        match session.send_message(text).await {
            Ok(()) => None,
            Err(e) => {
                warn!("Send failed on contact {}: {}", session.contact_id(), e);
                Some(format!("Message not sent: {}", e))
            }
        }
    }

    async fn end(&self) -> Option<String> {
        let Some(session) = self.orchestrator.registry().current() else {
            return Some("No active chat.".to_string());
        };
        // Closing runs the session's close handler, which publishes endChat
        match session.close().await {
            Ok(()) => None,
            Err(e) => Some(format!("Could not end chat: {}", e)),
        }
    }

    async fn retry(&self) -> Option<String> {
        match self.orchestrator.state() {
            LifecycleState::Initiated => return Some("Chat already active.".to_string()),
            LifecycleState::Initiating => return Some("Still connecting...".to_string()),
            LifecycleState::InitiateFailed => self.orchestrator.reset(),
            LifecycleState::NotInitiated => {}
        }

        let attempt = self
            .orchestrator
            .initiate(self.input.clone(), InitiationCallbacks::none());

        let outcome = match self.retry_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, attempt).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.orchestrator.reset();
                    return Some(format!("Chat did not start within {:?}", timeout));
                }
            },
            None => attempt.await,
        };

        match outcome {
            InitiationOutcome::Failed(error) => Some(ConsoleFormatter::format_error(&error)),
            InitiationOutcome::Initiated(_) | InitiationOutcome::Superseded => None,
        }
    }

    fn attach_incoming(&self) -> Option<IncomingMessages> {
        self.orchestrator
            .registry()
            .current()
            .and_then(|session| session.incoming())
    }

    fn print(message: Option<String>) {
        if let Some(message) = message {
            println!("{}", message);
        }
    }

    fn help() -> String {
        [
            "Commands:",
            "  /status           - Show chat status",
            "  /lang [TAG]       - Show or change the language tag",
            "  /end              - End the current chat",
            "  /retry            - Start a new chat after a failure or end",
            "  /help, /h, /?     - Show this help",
            "  /quit, /exit, /q  - Exit",
        ]
        .join("\n")
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               chatlink - Chat               │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{}", Self::help());
        println!();
    }
}

async fn next_frame(incoming: &mut Option<IncomingMessages>) -> Option<String> {
    match incoming {
        Some(rx) => {
            let frame = rx.recv().await;
            if frame.is_none() {
                *incoming = None;
            }
            frame
        }
        None => std::future::pending().await,
    }
}
