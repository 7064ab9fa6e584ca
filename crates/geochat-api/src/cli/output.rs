//! Rendering of chat events for the terminal.

use console::style;
use geochat_types::connection::ConnectionState;
use geochat_types::event::ChatEvent;

/// Render `event` as a single styled line.
pub fn render_event(event: &ChatEvent) -> String {
    match event {
        ChatEvent::NewMessage { text } => format!("  {} {}", style("<").cyan().bold(), text),
        ChatEvent::MessageSent { name, text, count } => format!(
            "  {} {}: {} {}",
            style(">").green().bold(),
            style(name).cyan(),
            text,
            style(format!("(#{count})")).dim()
        ),
        ChatEvent::SessionClosed { message, .. } => {
            format!("  {} {}", style("!").yellow().bold(), style(message).yellow())
        }
        ChatEvent::StateChanged { from, to } => format!(
            "  {} {} -> {}",
            style("•").dim(),
            style(from).dim(),
            state_style(*to)
        ),
        ChatEvent::ConnectionFailed { server_uri, reason } => format!(
            "  {} could not connect to {}: {}",
            style("✗").red().bold(),
            style(server_uri).cyan(),
            reason
        ),
        ChatEvent::ConnectionClosed { server_uri } => format!(
            "  {} disconnected from {}",
            style("•").dim(),
            style(server_uri).cyan()
        ),
        ChatEvent::LeaveFailed { reason } => format!(
            "  {} leave notification not delivered: {}",
            style("✗").red().bold(),
            reason
        ),
    }
}

/// Render `event` as one line of JSON.
pub fn event_json(event: &ChatEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

fn state_style(state: ConnectionState) -> console::StyledObject<ConnectionState> {
    match state {
        ConnectionState::Connected => style(state).green().bold(),
        ConnectionState::Connecting => style(state).yellow(),
        ConnectionState::Disconnected => style(state).red(),
    }
}
