//! Console output formatter for the chat lifecycle

use chatlink_application::{InitiationError, LifecycleSnapshot};
use chatlink_domain::LifecycleState;
use colored::Colorize;
use serde_json::Value;

/// Formats lifecycle snapshots and chat traffic for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Full status block for `/status`
    pub fn format_snapshot(snapshot: &LifecycleSnapshot) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Chat Status"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "State:".cyan().bold(),
            Self::state_label(snapshot.state)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Language:".cyan().bold(),
            snapshot.language
        ));

        if let Some(contact) = &snapshot.contact_id {
            output.push_str(&format!("{} {}\n", "Contact:".cyan().bold(), contact));
        }

        if let Some(composer) = snapshot.composer {
            output.push_str(&format!(
                "{} attachments {}, rich messaging {}\n",
                "Composer:".cyan().bold(),
                Self::on_off(composer.attachments_enabled),
                Self::on_off(composer.rich_messaging_enabled)
            ));
        }

        if snapshot.attempt > 0 {
            output.push_str(&format!(
                "{} {}\n",
                "Attempt:".dimmed(),
                snapshot.attempt
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// One-line notice printed when the state changes
    pub fn format_transition(snapshot: &LifecycleSnapshot) -> String {
        let detail = match snapshot.state {
            LifecycleState::NotInitiated => "chat ended".to_string(),
            LifecycleState::Initiating => "connecting...".to_string(),
            LifecycleState::Initiated => match &snapshot.contact_id {
                Some(contact) => format!("connected (contact {})", contact),
                None => "connected".to_string(),
            },
            LifecycleState::InitiateFailed => "could not start chat, type /retry".to_string(),
        };
        format!("{} {}", Self::state_label(snapshot.state), detail.dimmed())
    }

    pub fn format_error(error: &InitiationError) -> String {
        format!(
            "{} {} ({})",
            "Error:".red().bold(),
            error,
            error.phase().dimmed()
        )
    }

    /// Render an incoming frame. JSON frames with a `content` field show the
    /// sender and content; anything else is printed raw.
    pub fn format_incoming(raw: &str) -> String {
        let Ok(Value::Object(frame)) = serde_json::from_str::<Value>(raw) else {
            return format!("{} {}", "<<".dimmed(), raw);
        };

        let Some(content) = frame.get("content").and_then(Value::as_str) else {
            return format!("{} {}", "<<".dimmed(), raw);
        };

        let sender = ["displayName", "participantRole"]
            .iter()
            .find_map(|key| frame.get(*key).and_then(Value::as_str))
            .unwrap_or("agent");

        format!("{} {}", format!("{}:", sender).yellow().bold(), content)
    }

    fn state_label(state: LifecycleState) -> String {
        let label = format!("[{}]", state);
        match state {
            LifecycleState::NotInitiated => label.dimmed().to_string(),
            LifecycleState::Initiating => label.yellow().to_string(),
            LifecycleState::Initiated => label.green().bold().to_string(),
            LifecycleState::InitiateFailed => label.red().bold().to_string(),
        }
    }

    fn on_off(enabled: bool) -> String {
        if enabled {
            "on".green().to_string()
        } else {
            "off".dimmed().to_string()
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(40);
        format!("{}\n{:^40}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(40).cyan())
    }
}
