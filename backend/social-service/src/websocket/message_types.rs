use serde::{Deserialize, Serialize};

/// Inbound WebSocket events from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "chat_message")]
    ChatMessage { message: String },
}

/// Outbound WebSocket events from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    /// Sent once to a connection when it becomes active
    #[serde(rename = "welcome")]
    Welcome { username: String, avatar: String },

    #[serde(rename = "chat_message")]
    ChatMessage {
        message: String,
        username: String,
        avatar: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_wire_format() {
        let evt: WsInboundEvent =
            serde_json::from_value(json!({ "type": "chat_message", "message": "hi" })).unwrap();
        assert_eq!(
            evt,
            WsInboundEvent::ChatMessage {
                message: "hi".into()
            }
        );

        assert!(serde_json::from_value::<WsInboundEvent>(json!({ "type": "typing" })).is_err());
    }

    #[test]
    fn test_outbound_wire_format() {
        let welcome = WsOutboundEvent::Welcome {
            username: "alice".into(),
            avatar: "https://gravatar.com/avatar/x?s=128".into(),
        };
        assert_eq!(
            serde_json::to_value(&welcome).unwrap(),
            json!({
                "type": "welcome",
                "username": "alice",
                "avatar": "https://gravatar.com/avatar/x?s=128",
            })
        );
    }
}
