use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TITLE: &str = "New Conversation";

/// Opaque conversation identifier, assigned by the store that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp,
            error: false,
        }
    }

    pub fn bot(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            timestamp,
            error: false,
        }
    }

    /// A bot message standing in for a reply that never arrived.
    pub fn failure(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            error: true,
            ..Self::bot(text, timestamp)
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: ConversationId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_owned(),
            created_at: now,
            last_updated: now,
            messages: vec![],
        }
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }
}

/// Most recently updated first.
pub fn sort_by_recency(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn error_flag_is_omitted_when_false() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let json = serde_json::to_value(Message::bot("hi", at)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sender": "bot", "text": "hi", "timestamp": "2024-05-01T10:00:00Z"})
        );

        let json = serde_json::to_value(Message::failure("oops", at)).unwrap();
        assert_eq!(json["error"], serde_json::json!(true));
    }

    #[test]
    fn reads_messages_without_error_key() {
        let message: Message = serde_json::from_str(
            r#"{"sender":"user","text":"What is a tort?","timestamp":"2024-05-01T10:00:00.123Z"}"#,
        )
        .unwrap();
        assert!(message.is_user());
        assert!(!message.error);
    }

    #[test]
    fn sorts_most_recent_first() {
        let old = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let new = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let mut list = vec![
            Conversation::new(ConversationId::new("a"), old),
            Conversation::new(ConversationId::new("b"), new),
        ];
        sort_by_recency(&mut list);
        assert_eq!(list[0].id.as_str(), "b");
        assert_eq!(list[0].title, DEFAULT_TITLE);
    }
}
