//! Durable room and message records. The store is the single writer for
//! everything persisted; fanout and the HTTP surface call into it.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{appresult::validation, auth::Identity, AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Seen,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Seen => "seen",
        }
    }

    fn parse(s: &str) -> AppResult<MessageStatus> {
        match s {
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "seen" => Ok(MessageStatus::Seen),
            other => Err(AppError::Storage(sqlx::Error::Decode(
                format!("unknown message status {other:?}").into(),
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender: String,
    pub text: String,
    pub status: MessageStatus,
    pub reply_to: Option<Uuid>,
    pub timestamp: i64,
}

type MessageRow = (String, String, String, String, String, Option<String>, i64);

fn message_from_row(
    (id, room_id, sender, text, status, reply_to, timestamp): MessageRow,
) -> AppResult<Message> {
    Ok(Message {
        id: Uuid::parse_str(&id).map_err(|_| validation("bad message id"))?,
        room_id: Uuid::parse_str(&room_id).map_err(|_| validation("bad room id"))?,
        sender,
        text,
        status: MessageStatus::parse(&status)?,
        reply_to: match reply_to {
            Some(x) => Some(Uuid::parse_str(&x).map_err(|_| validation("bad reply id"))?),
            None => None,
        },
        timestamp,
    })
}

pub(crate) fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

const MESSAGE_COLS: &str = "id,room_id,sender,text,status,reply_to,timestamp";

#[derive(Clone)]
pub struct MessageStore {
    db_pool: SqlitePool,
}

impl MessageStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// Persists a new message with status `sent` and a server-assigned
    /// timestamp. The sender is already allowlist-checked: an [`Identity`]
    /// only comes out of the user directory.
    pub async fn create_message(
        &self,
        room_id: Uuid,
        sender: &Identity,
        text: &str,
        reply_to: Option<Uuid>,
    ) -> AppResult<Message> {
        if text.trim().is_empty() {
            return Err(validation("message text is required"));
        }
        if !self.room_exists(room_id).await? {
            return Err(validation(format!("room {room_id} does not exist")));
        }

        let id = Uuid::now_v7();
        let timestamp = now_millis();
        sqlx::query("INSERT INTO messages (id,room_id,sender,text,status,reply_to,timestamp) VALUES (?,?,?,?,?,?,?)")
            .bind(id.to_string())
            .bind(room_id.to_string())
            .bind(sender.name())
            .bind(text)
            .bind(MessageStatus::Sent.as_str())
            .bind(reply_to.as_ref().map(Uuid::to_string))
            .bind(timestamp)
            .execute(&self.db_pool)
            .await?;

        Ok(Message {
            id,
            room_id,
            sender: sender.name().to_owned(),
            text: text.to_owned(),
            status: MessageStatus::Sent,
            reply_to,
            timestamp,
        })
    }

    /// Advances a message's status. Only forward transitions take effect;
    /// an equal-or-earlier target is a no-op that returns the current record.
    /// The update is conditional in SQL so concurrent callers cannot regress
    /// a status that already moved further along.
    pub async fn update_status(
        &self,
        message_id: Uuid,
        new_status: MessageStatus,
    ) -> AppResult<Message> {
        let update = match new_status {
            // nothing is earlier than sent, so there is nothing to do
            MessageStatus::Sent => None,
            MessageStatus::Delivered => {
                Some("UPDATE messages SET status='delivered' WHERE id=? AND status='sent'")
            }
            MessageStatus::Seen => {
                Some("UPDATE messages SET status='seen' WHERE id=? AND status IN ('sent','delivered')")
            }
        };

        if let Some(update) = update {
            sqlx::query(update)
                .bind(message_id.to_string())
                .execute(&self.db_pool)
                .await?;
        }

        self.get_message(message_id)
            .await?
            .ok_or(AppError::NotFound("message"))
    }

    pub async fn get_message(&self, message_id: Uuid) -> AppResult<Option<Message>> {
        let row: Option<MessageRow> =
            sqlx::query_as(&format!("SELECT {MESSAGE_COLS} FROM messages WHERE id=?"))
                .bind(message_id.to_string())
                .fetch_optional(&self.db_pool)
                .await?;

        row.map(message_from_row).transpose()
    }

    /// All messages of a room, ascending by timestamp. The v7 id breaks ties
    /// deterministically; per-room timestamp monotonicity is not guaranteed.
    pub async fn list_messages(&self, room_id: Uuid) -> AppResult<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLS} FROM messages WHERE room_id=? ORDER BY timestamp ASC, id ASC"
        ))
        .bind(room_id.to_string())
        .fetch_all(&self.db_pool)
        .await?;

        rows.into_iter().map(message_from_row).collect()
    }

    /// Creates a room with a unique, trimmed name. A collision with an
    /// existing name (after trimming) is a `Duplicate` error.
    pub async fn create_room(&self, name: &str) -> AppResult<Room> {
        let name = name.trim();
        if name.is_empty() {
            return Err(validation("room name is required"));
        }

        let id = Uuid::now_v7();
        let created_at = now_millis();
        let inserted = sqlx::query("INSERT INTO rooms (id,name,created_at) VALUES (?,?,?)")
            .bind(id.to_string())
            .bind(name)
            .bind(created_at)
            .execute(&self.db_pool)
            .await;

        match inserted {
            Ok(_) => Ok(Room {
                id,
                name: name.to_owned(),
                created_at,
            }),
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::Duplicate(format!("room {name:?} already exists")))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All rooms, newest first.
    pub async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        let rows: Vec<(String, String, i64)> =
            sqlx::query_as("SELECT id,name,created_at FROM rooms ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.db_pool)
                .await?;

        rows.into_iter()
            .map(|(id, name, created_at)| {
                Ok(Room {
                    id: Uuid::parse_str(&id).map_err(|_| validation("bad room id"))?,
                    name,
                    created_at,
                })
            })
            .collect()
    }

    pub async fn room_exists(&self, room_id: Uuid) -> AppResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM rooms WHERE id=?")
            .bind(room_id.to_string())
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.is_some())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
