mod directory;
mod msg;
mod ws;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

pub fn chatroom_router() -> Router<AppState> {
    Router::new()
        .route("/", get(directory::list_rooms))
        .route("/create", post(directory::create_room))
}

pub fn message_router() -> Router<AppState> {
    Router::new()
        .route("/", post(msg::create_message))
        .route("/{room_id}", get(msg::list_messages))
        .route("/{id}/delivered", put(msg::mark_delivered))
        .route("/{id}/seen", put(msg::mark_seen))
}

pub fn ws_router() -> Router<AppState> {
    Router::new().route("/ws", get(ws::chat_ws))
}
