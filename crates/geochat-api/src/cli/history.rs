//! `geochat history`: recently stored chat messages.

use anyhow::Context;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use geochat_infra::sqlite::{DatabasePool, SqliteMessageStore};
use geochat_types::message::{MessageKind, StoredMessage};

use crate::state::AppPaths;

/// Print the `limit` most recent messages, oldest first.
pub async fn show_history(paths: &AppPaths, limit: u32, json: bool) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&paths.data_dir)
        .await
        .with_context(|| format!("failed to create {}", paths.data_dir.display()))?;
    let pool = DatabasePool::new(&paths.database_url())
        .await
        .context("failed to open the history database")?;
    let store = SqliteMessageStore::new(pool);

    let mut messages = store.recent(limit).await?;
    messages.reverse();

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!(
            "  {} No messages yet. Start a session with {}",
            style("i").blue().bold(),
            style("geochat run").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", history_table(&messages));
    println!();
    println!(
        "  {} message{}",
        style(messages.len()).bold(),
        if messages.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

fn history_table(messages: &[StoredMessage]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("From").fg(Color::White),
        Cell::new("Message").fg(Color::White),
    ]);

    for message in messages {
        let kind_cell = match message.kind {
            MessageKind::Incoming => Cell::new("in").fg(Color::Cyan),
            MessageKind::Outgoing => Cell::new("out").fg(Color::Green),
            MessageKind::System => Cell::new("system").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(message.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
                .fg(Color::DarkGrey),
            kind_cell,
            Cell::new(message.sender.as_deref().unwrap_or("-")),
            Cell::new(&message.body),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use geochat_types::event::ChatEvent;

    #[test]
    fn table_lists_every_message() {
        let messages: Vec<StoredMessage> = [
            ChatEvent::NewMessage {
                text: "bob: hi".into(),
            },
            ChatEvent::MessageSent {
                name: "alice".into(),
                text: "hello".into(),
                count: 1,
            },
            ChatEvent::session_closed(1),
        ]
        .iter()
        .filter_map(StoredMessage::from_event)
        .collect();

        let rendered = history_table(&messages).to_string();
        assert!(rendered.contains("bob: hi"));
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("hello"));
        assert!(rendered.contains("system"));
        assert!(rendered.contains("Session closed"));
    }
}
