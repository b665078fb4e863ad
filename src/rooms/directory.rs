use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    store::{MessageStore, Room},
    AppResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomQuery {
    name: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list_rooms(State(store): State<MessageStore>) -> AppResult<Json<Vec<Room>>> {
    Ok(Json(store.list_rooms().await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn create_room(
    State(store): State<MessageStore>,
    Json(NewRoomQuery { name }): Json<NewRoomQuery>,
) -> AppResult<(StatusCode, Json<Room>)> {
    let room = store.create_room(&name).await?;
    Ok((StatusCode::CREATED, Json(room)))
}
