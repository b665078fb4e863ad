//! In-memory Room↔Session membership. The registry is the only owner of this
//! state; it is rebuilt from join events and does not survive a restart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc::UnboundedSender, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::events::ServerEvent;

pub type SessionId = Uuid;
pub type RoomId = Uuid;

#[derive(Default)]
struct RegistryInner {
    /// Outbound channel of every live session.
    sessions: HashMap<SessionId, UnboundedSender<ServerEvent>>,
    /// Room → member sessions.
    rooms: HashMap<RoomId, HashSet<SessionId>>,
    /// Session → joined rooms, so disconnects clean up in one pass.
    joined: HashMap<SessionId, HashSet<RoomId>>,
}

#[derive(Clone, Default)]
pub struct RoomRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly connected session and its outbound channel.
    pub async fn connect(&self, session_id: SessionId, tx: UnboundedSender<ServerEvent>) {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(session_id, tx);
        debug!("session {session_id} connected");
    }

    /// Drops a session entirely: leaves every room and forgets its channel.
    pub async fn disconnect(&self, session_id: SessionId) {
        let mut inner = self.inner.write().await;
        inner.sessions.remove(&session_id);
        if let Some(rooms) = inner.joined.remove(&session_id) {
            for room_id in rooms {
                if let Some(members) = inner.rooms.get_mut(&room_id) {
                    members.remove(&session_id);
                }
            }
        }
        debug!("session {session_id} disconnected");
    }

    /// Idempotent: joining a room twice leaves a single membership.
    pub async fn join(&self, session_id: SessionId, room_id: RoomId) {
        let mut inner = self.inner.write().await;
        inner.rooms.entry(room_id).or_default().insert(session_id);
        inner.joined.entry(session_id).or_default().insert(room_id);
        debug!("session {session_id} joined room {room_id}");
    }

    pub async fn leave(&self, session_id: SessionId, room_id: RoomId) {
        let mut inner = self.inner.write().await;
        if let Some(members) = inner.rooms.get_mut(&room_id) {
            members.remove(&session_id);
        }
        if let Some(rooms) = inner.joined.get_mut(&session_id) {
            rooms.remove(&room_id);
        }
    }

    pub async fn leave_all(&self, session_id: SessionId) {
        let mut inner = self.inner.write().await;
        if let Some(rooms) = inner.joined.remove(&session_id) {
            for room_id in rooms {
                if let Some(members) = inner.rooms.get_mut(&room_id) {
                    members.remove(&session_id);
                }
            }
        }
    }

    /// Current members of a room, the fanout engine's delivery targets.
    pub async fn members_of(&self, room_id: RoomId) -> Vec<SessionId> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(&room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Queues an event on a session's outbound channel. A session that
    /// disconnected (or whose receiver is gone) is silently skipped.
    pub async fn send_to(&self, session_id: SessionId, event: ServerEvent) {
        let inner = self.inner.read().await;
        if let Some(tx) = inner.sessions.get(&session_id) {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn join_is_idempotent() {
        let registry = RoomRegistry::new();
        let session = Uuid::now_v7();
        let room = Uuid::now_v7();

        registry.join(session, room).await;
        registry.join(session, room).await;

        assert_eq!(registry.members_of(room).await, vec![session]);
    }

    #[tokio::test]
    async fn leave_and_leave_all_are_idempotent() {
        let registry = RoomRegistry::new();
        let session = Uuid::now_v7();
        let room_a = Uuid::now_v7();
        let room_b = Uuid::now_v7();

        registry.join(session, room_a).await;
        registry.join(session, room_b).await;

        registry.leave(session, room_a).await;
        registry.leave(session, room_a).await;
        assert!(registry.members_of(room_a).await.is_empty());
        assert_eq!(registry.members_of(room_b).await, vec![session]);

        registry.leave_all(session).await;
        registry.leave_all(session).await;
        assert!(registry.members_of(room_b).await.is_empty());
    }

    #[tokio::test]
    async fn disconnect_removes_membership_and_channel() {
        let registry = RoomRegistry::new();
        let session = Uuid::now_v7();
        let room = Uuid::now_v7();
        let (tx, mut rx) = mpsc::unbounded_channel();

        registry.connect(session, tx).await;
        registry.join(session, room).await;
        registry.disconnect(session).await;

        assert!(registry.members_of(room).await.is_empty());
        // the sender side is gone, so the channel closes
        assert!(rx.recv().await.is_none());
    }
}
