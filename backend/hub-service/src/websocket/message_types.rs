use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Frames a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsInboundEvent {
    Typing { group_id: Uuid, user_id: Uuid },
}

/// Frames the hub pushes to subscribers. `new_message` deliberately omits
/// the sender display name: realtime events carry no joined profile data.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsOutboundEvent {
    NewMessage {
        group_id: Uuid,
        message_id: Uuid,
        sender_id: Uuid,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        client_ref: Option<String>,
        created_at: String,
    },
    MessageDeleted {
        group_id: Uuid,
        message_id: Uuid,
    },
    Typing {
        group_id: Uuid,
        user_id: Uuid,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_serializes_with_tag() {
        let evt = WsOutboundEvent::NewMessage {
            group_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            content: "hello".into(),
            client_ref: Some("local-3".into()),
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["type"], "new_message");
        assert_eq!(json["client_ref"], "local-3");
    }

    #[test]
    fn typing_round_trips() {
        let group_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let raw = format!(r#"{{"type":"typing","group_id":"{group_id}","user_id":"{user_id}"}}"#);
        let evt: WsInboundEvent = serde_json::from_str(&raw).unwrap();
        let WsInboundEvent::Typing { group_id: g, user_id: u } = evt;
        assert_eq!(g, group_id);
        assert_eq!(u, user_id);
    }
}
