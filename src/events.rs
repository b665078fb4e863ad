//! Wire events exchanged over a chat WebSocket, as `{"type", "data"}` frames.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Message;

/// Client-to-server events. Frames that fail to parse are dropped by the
/// session loop, which is also how falsy/malformed ids are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: Uuid },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_id: Uuid,
        sender: String,
        text: String,
        #[serde(default)]
        reply_to: Option<Uuid>,
    },
    #[serde(rename_all = "camelCase")]
    MessageSeen { message_id: Uuid },
}

/// Server-to-client events, broadcast to the members of a message's room.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    ReceiveMessage(Message),
    MessageUpdated(Message),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MessageStatus;

    #[test]
    fn parses_join_room() {
        let raw = r#"{"type":"joinRoom","data":{"roomId":"0195c7a4-9e1e-7cc3-ba31-111111111111"}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert!(matches!(event, ClientEvent::JoinRoom { .. }));
    }

    #[test]
    fn parses_send_message_without_reply() {
        let raw = r#"{"type":"sendMessage","data":{"roomId":"0195c7a4-9e1e-7cc3-ba31-111111111111","sender":"Jay","text":"hi"}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::SendMessage { sender, text, reply_to, .. } => {
                assert_eq!(sender, "Jay");
                assert_eq!(text, "hi");
                assert!(reply_to.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn blank_room_id_fails_to_parse() {
        let raw = r#"{"type":"joinRoom","data":{"roomId":""}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn server_events_use_wire_names() {
        let message = Message {
            id: Uuid::now_v7(),
            room_id: Uuid::now_v7(),
            sender: "Jay".to_owned(),
            text: "hi".to_owned(),
            status: MessageStatus::Sent,
            reply_to: None,
            timestamp: 0,
        };

        let receive = serde_json::to_value(ServerEvent::ReceiveMessage(message.clone())).unwrap();
        assert_eq!(receive["type"], "receiveMessage");
        assert_eq!(receive["data"]["text"], "hi");
        assert_eq!(receive["data"]["status"], "sent");

        let updated = serde_json::to_value(ServerEvent::MessageUpdated(message)).unwrap();
        assert_eq!(updated["type"], "messageUpdated");
        assert_eq!(updated["data"]["roomId"].as_str().unwrap().len(), 36);
    }
}
