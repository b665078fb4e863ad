use axum::{
    debug_handler,
    extract::{ws::WebSocket, Query, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{Identity, UserDirectory},
    events::ClientEvent,
    fanout::FanoutEngine,
    registry::{RoomRegistry, SessionId},
    AppError,
};

#[derive(Deserialize)]
pub(crate) struct ConnectQuery {
    user: String,
}

/// One session per upgraded socket. The declared identity must be on the
/// allowlist; every message sent over this connection is bound to it.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn chat_ws(
    Query(ConnectQuery { user }): Query<ConnectQuery>,
    State(users): State<UserDirectory>,
    State(registry): State<RoomRegistry>,
    State(fanout): State<FanoutEngine>,

    ws: WebSocketUpgrade,
) -> Response {
    let Some(identity) = users.resolve(&user) else {
        return AppError::Forbidden.into_response();
    };

    ws.on_upgrade(move |stream| handle_session(stream, identity, registry, fanout))
}

async fn handle_session(
    stream: WebSocket,
    identity: Identity,
    registry: RoomRegistry,
    fanout: FanoutEngine,
) {
    let session_id = Uuid::now_v7();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.connect(session_id, tx).await;

    let (mut sender, mut receiver) = stream.split();
    let forward_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(frame) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(frame.into()).await.is_err() {
                break;
            }
        }
    });

    // Inbound events are handled one at a time, so per-connection order is
    // preserved and an event in flight finishes even if the socket drops.
    while let Some(Ok(frame)) = receiver.next().await {
        let Ok(event) = serde_json::from_slice(&frame.into_data()) else {
            continue;
        };

        dispatch(event, session_id, &identity, &registry, &fanout).await;
    }

    registry.disconnect(session_id).await;
    forward_task.abort();
}

async fn dispatch(
    event: ClientEvent,
    session_id: SessionId,
    identity: &Identity,
    registry: &RoomRegistry,
    fanout: &FanoutEngine,
) {
    match event {
        ClientEvent::JoinRoom { room_id } => registry.join(session_id, room_id).await,
        ClientEvent::SendMessage { room_id, sender, text, reply_to } => {
            // sender is bound to the connection identity, not the payload
            if sender != identity.name() {
                debug!("dropping send claiming sender {sender:?} on {}'s session", identity.name());
                return;
            }
            fanout.on_send_message(room_id, identity.clone(), text, reply_to).await;
        }
        ClientEvent::MessageSeen { message_id } => fanout.on_mark_seen(message_id).await,
    }
}
