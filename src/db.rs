use sqlx::SqlitePool;

use crate::AppResult;

/// Creates the schema on startup. Ids are uuid v7 stored as TEXT, timestamps
/// are unix milliseconds.
pub async fn init_db(db_pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS rooms (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(db_pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            room_id TEXT NOT NULL REFERENCES rooms(id),
            sender TEXT NOT NULL,
            text TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'sent',
            reply_to TEXT,
            timestamp INTEGER NOT NULL
        )",
    )
    .execute(db_pool)
    .await?;

    Ok(())
}
