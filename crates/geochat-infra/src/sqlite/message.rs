//! SQLite chat history.
//!
//! `SqliteMessageStore` persists the history-worthy chat events (messages
//! received, messages sent, session-closed notices). `spawn_recorder` hooks it
//! up to the event bus so the controller never waits on the database.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geochat_types::error::RepositoryError;
use geochat_types::event::ChatEvent;
use geochat_types::message::{MessageKind, StoredMessage};
use sqlx::Row;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed chat history.
pub struct SqliteMessageStore {
    pool: DatabasePool,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, message: &StoredMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO chat_messages (id, kind, sender, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.kind.to_string())
        .bind(message.sender.as_deref())
        .bind(&message.body)
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    /// Store `event` if it belongs in the history. Returns whether it was stored.
    pub async fn record(&self, event: &ChatEvent) -> Result<bool, RepositoryError> {
        match StoredMessage::from_event(event) {
            Some(message) => {
                self.insert(&message).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Most recent messages, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, kind, sender, body, created_at FROM chat_messages ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(row_to_message).collect()
    }
}

/// Record every history-worthy event published on `events` until the bus closes.
pub fn spawn_recorder(
    store: Arc<SqliteMessageStore>,
    mut events: broadcast::Receiver<ChatEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(err) = store.record(&event).await {
                        tracing::warn!(error = %err, kind = event.kind(), "failed to store chat event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "message recorder lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<StoredMessage, RepositoryError> {
    let query_err = |e: sqlx::Error| RepositoryError::Query(e.to_string());

    let id: String = row.try_get("id").map_err(query_err)?;
    let kind: String = row.try_get("kind").map_err(query_err)?;
    let sender: Option<String> = row.try_get("sender").map_err(query_err)?;
    let body: String = row.try_get("body").map_err(query_err)?;
    let created_at: String = row.try_get("created_at").map_err(query_err)?;

    Ok(StoredMessage {
        id: parse_uuid(&id)?,
        kind: kind.parse::<MessageKind>().map_err(RepositoryError::Query)?,
        sender,
        body,
        created_at: parse_datetime(&created_at)?,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid, RepositoryError> {
    s.parse::<Uuid>()
        .map_err(|e| RepositoryError::Query(format!("invalid UUID: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url;
    use geochat_core::event::EventBus;
    use geochat_types::connection::ConnectionState;
    use tempfile::TempDir;

    async fn test_store() -> (SqliteMessageStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path())).await.unwrap();
        (SqliteMessageStore::new(pool), dir)
    }

    #[tokio::test]
    async fn record_stores_history_events_only() {
        let (store, _dir) = test_store().await;

        assert!(store
            .record(&ChatEvent::NewMessage {
                text: "bob: hello".into()
            })
            .await
            .unwrap());
        assert!(!store
            .record(&ChatEvent::StateChanged {
                from: ConnectionState::Connecting,
                to: ConnectionState::Connected,
            })
            .await
            .unwrap());

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, MessageKind::Incoming);
        assert_eq!(recent[0].body, "bob: hello");
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let (store, _dir) = test_store().await;

        for (count, text) in ["one", "two", "three"].iter().enumerate() {
            store
                .record(&ChatEvent::MessageSent {
                    name: "alice".into(),
                    text: text.to_string(),
                    count: count as u32 + 1,
                })
                .await
                .unwrap();
        }
        store.record(&ChatEvent::session_closed(3)).await.unwrap();

        let recent = store.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].kind, MessageKind::System);
        assert_eq!(recent[1].body, "three");
        assert_eq!(recent[1].sender.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn recorder_persists_published_events() {
        let (store, _dir) = test_store().await;
        let store = Arc::new(store);
        let bus = EventBus::new(16);
        let handle = spawn_recorder(store.clone(), bus.subscribe());

        bus.publish(ChatEvent::NewMessage {
            text: "bob: hi".into(),
        });
        bus.publish(ChatEvent::session_closed(2));
        drop(bus);
        handle.await.unwrap();

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(
            recent[0].body,
            "Session closed after reaching the limit: 2 messages"
        );
    }
}
