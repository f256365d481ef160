use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub participant_names: Vec<String>,
    pub messages: Vec<ChatMessage>,
    pub last_activity: DateTime<Utc>,
}

impl Conversation {
    /// Messages not yet read by `user_id` (their own messages never count).
    pub fn unread_for(&self, user_id: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| !m.is_read && m.sender_id != user_id)
            .count()
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
