use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::UserDirectory,
    store::{Message, MessageStatus, MessageStore},
    AppError, AppResult,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageQuery {
    room_id: Uuid,
    sender: String,
    text: String,
    #[serde(default)]
    reply_to: Option<Uuid>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list_messages(
    Path(room_id): Path<Uuid>,
    State(store): State<MessageStore>,
) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(store.list_messages(room_id).await?))
}

// Persists without broadcasting; fanout happens only on the realtime path.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn create_message(
    State(store): State<MessageStore>,
    State(users): State<UserDirectory>,
    Json(SendMessageQuery { room_id, sender, text, reply_to }): Json<SendMessageQuery>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let sender = users.resolve(&sender).ok_or(AppError::Forbidden)?;
    let message = store.create_message(room_id, &sender, &text, reply_to).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn mark_delivered(
    Path(id): Path<Uuid>,
    State(store): State<MessageStore>,
) -> AppResult<Json<Message>> {
    Ok(Json(store.update_status(id, MessageStatus::Delivered).await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn mark_seen(
    Path(id): Path<Uuid>,
    State(store): State<MessageStore>,
) -> AppResult<Json<Message>> {
    Ok(Json(store.update_status(id, MessageStatus::Seen).await?))
}
