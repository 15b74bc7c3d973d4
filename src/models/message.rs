use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::timestamp::Timestamp;

/// One chat message. `parent_message_id` links it into the conversation's
/// reply tree; roots point at the all-zero sentinel id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub conversation_id: String,
    pub client_id: String,
    pub parent_message_id: String,
    pub sender: String,
    pub text: String,
    pub is_created_by_user: bool,
    pub error: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Parent id carried by the first message of a conversation.
pub const ROOT_PARENT_ID: &str = "00000000-0000-0000-0000-000000000000";

impl Message {
    pub fn is_root(&self) -> bool {
        self.parent_message_id == ROOT_PARENT_ID
    }
}

pub type Messages = Vec<Message>;

/// Client-side message cache: `None` until the conversation has loaded.
pub type MessagesAtom = Option<Messages>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleContent {
    pub content: String,
}

/// Few-shot input/output pair sent to Google models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: ExampleContent,
    pub output: ExampleContent,
}

impl Example {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: ExampleContent { content: input.into() },
            output: ExampleContent { content: output.into() },
        }
    }
}

// The tree and search node shapes are owned by the message tree builder and
// the search index; they pass through untouched.
pub type MessageTreeNode = Map<String, Value>;
pub type SearchMessage = Map<String, Value>;
pub type SearchMessageTreeNode = Map<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_message() {
        let json = r#"{
            "messageId": "m2",
            "conversationId": "c1",
            "clientId": "cl",
            "parentMessageId": "00000000-0000-0000-0000-000000000000",
            "sender": "User",
            "text": "hello",
            "isCreatedByUser": true,
            "error": false,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:01Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.is_root());
        assert!(msg.is_created_by_user);
        assert!(msg.created_at < msg.updated_at);

        let back = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["parentMessageId"], ROOT_PARENT_ID);
        assert_eq!(back["updatedAt"], "2024-01-01T00:00:01Z");
    }

    #[test]
    fn example_shape() {
        let value = serde_json::to_value(Example::new("hi", "hello")).unwrap();
        assert_eq!(value, serde_json::json!({"input": {"content": "hi"}, "output": {"content": "hello"}}));
    }
}
