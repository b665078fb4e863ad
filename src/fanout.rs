//! Bridges durable storage with ephemeral broadcast: persist first, then
//! publish to the current members of the message's room. Every failure on
//! this path is local to the one event — logged, dropped, never retried and
//! never surfaced to a client.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::Identity,
    events::ServerEvent,
    registry::{RoomId, RoomRegistry},
    store::{MessageStatus, MessageStore},
    AppError,
};

#[derive(Clone)]
pub struct FanoutEngine {
    store: MessageStore,
    registry: RoomRegistry,
}

impl FanoutEngine {
    pub fn new(store: MessageStore, registry: RoomRegistry) -> Self {
        Self { store, registry }
    }

    /// Persists an inbound message and broadcasts it to every member of the
    /// room, the sender's own session included.
    pub async fn on_send_message(
        &self,
        room_id: RoomId,
        sender: Identity,
        text: String,
        reply_to: Option<Uuid>,
    ) {
        if text.trim().is_empty() {
            debug!("dropping blank message for room {room_id}");
            return;
        }

        match self.store.create_message(room_id, &sender, &text, reply_to).await {
            Ok(message) => {
                self.publish(room_id, ServerEvent::ReceiveMessage(message)).await;
            }
            Err(err) => warn!("dropping message for room {room_id}: {err}"),
        }
    }

    /// Advances a message to `seen` and republishes it to its room.
    pub async fn on_mark_seen(&self, message_id: Uuid) {
        match self.store.update_status(message_id, MessageStatus::Seen).await {
            Ok(message) => {
                self.publish(message.room_id, ServerEvent::MessageUpdated(message)).await;
            }
            Err(AppError::NotFound(_)) => debug!("seen for unknown message {message_id}"),
            Err(err) => warn!("dropping status update for {message_id}: {err}"),
        }
    }

    async fn publish(&self, room_id: RoomId, event: ServerEvent) {
        for session_id in self.registry.members_of(room_id).await {
            self.registry.send_to(session_id, event.clone()).await;
        }
    }
}
