use std::str::FromStr;

use serde::Serialize;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};
use time::OffsetDateTime;

pub const HISTORY_LIMIT: u32 = 500;

/// A stored chat message. `room_id` stays server side.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    #[serde(skip)]
    pub room_id: String,
    pub name: String,
    pub text: Option<String>,
    pub attachment_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub name: String,
    pub text: String,
    pub attachment_url: Option<String>,
}

#[derive(Clone)]
pub struct MessageStore {
    db_pool: SqlitePool,
}

impl MessageStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true);
        let db_pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await?;

        Self::migrate(db_pool).await
    }

    /// Single-connection in-memory database; every pooled connection would
    /// otherwise see its own empty database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::migrate(db_pool).await
    }

    async fn migrate(db_pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::migrate!().run(&db_pool).await?;
        Ok(Self { db_pool })
    }

    /// Persists the message and returns it with its id and timestamp.
    /// The insert has completed by the time this returns.
    pub async fn append(&self, room_id: &str, NewMessage { name, text, attachment_url }: NewMessage) -> sqlx::Result<Message> {
        sqlx::query_as(
            "INSERT INTO messages (room_id,name,text,attachment_url,created_at) VALUES (?,?,?,?,?) \
             RETURNING id,room_id,name,text,attachment_url,created_at"
        )
            .bind(room_id)
            .bind(name)
            .bind(text)
            .bind(attachment_url)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(&self.db_pool)
            .await
    }

    /// Oldest first, at most `min(limit, HISTORY_LIMIT)` rows.
    pub async fn list(&self, room_id: &str, limit: u32) -> sqlx::Result<Vec<Message>> {
        sqlx::query_as(
            "SELECT id,room_id,name,text,attachment_url,created_at FROM messages \
             WHERE room_id=? ORDER BY id ASC LIMIT ?"
        )
            .bind(room_id)
            .bind(limit.min(HISTORY_LIMIT))
            .fetch_all(&self.db_pool)
            .await
    }
}
