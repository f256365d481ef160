use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::dto::social_dto::SendMessagePayload;
use crate::error::{Error, Result};
use crate::models::message::{ChatMessage, Conversation};
use crate::models::user::{Session, User};
use crate::services::store::{lock, MutationOutcome, Publisher};
use crate::utils::time::Clock;

pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnalytics {
    pub conversation_count: usize,
    pub unread_messages: usize,
    pub unread_conversations: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSnapshot {
    pub conversations: Vec<Conversation>,
    pub analytics: ChatAnalytics,
}

struct ChatState {
    /// Most recent activity first.
    conversations: Vec<Conversation>,
    directory: Vec<User>,
}

impl ChatState {
    fn sort(&mut self) {
        self.conversations
            .sort_by_key(|c| std::cmp::Reverse(c.last_activity));
    }

    fn snapshot(&self, user_id: &str) -> ChatSnapshot {
        let unread: Vec<usize> = self
            .conversations
            .iter()
            .map(|c| c.unread_for(user_id))
            .collect();
        ChatSnapshot {
            conversations: self.conversations.clone(),
            analytics: ChatAnalytics {
                conversation_count: self.conversations.len(),
                unread_messages: unread.iter().sum(),
                unread_conversations: unread.iter().filter(|n| **n > 0).count(),
            },
        }
    }
}

/// One-to-one conversations between the session user and their contacts.
#[derive(Clone)]
pub struct ChatStore {
    state: Arc<Mutex<ChatState>>,
    publisher: Arc<Publisher<ChatSnapshot>>,
    clock: Arc<dyn Clock>,
    session: Session,
}

impl ChatStore {
    pub fn new(
        conversations: Vec<Conversation>,
        directory: Vec<User>,
        session: Session,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut state = ChatState {
            conversations,
            directory,
        };
        state.sort();
        let publisher = Publisher::new(state.snapshot(&session.user_id));

        Self {
            state: Arc::new(Mutex::new(state)),
            publisher: Arc::new(publisher),
            clock,
            session,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.publisher.current()
    }

    fn publish(&self, state: &ChatState) {
        self.publisher.publish(state.snapshot(&self.session.user_id));
    }

    pub fn get_by_id(&self, conversation_id: &str) -> Option<Conversation> {
        lock(&self.state, "chat")
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
    }

    /// Appends a message from the session user. The body is trimmed before
    /// it is checked against the length bounds.
    pub fn send_message(&self, conversation_id: &str, body: &str) -> Result<ChatMessage> {
        let payload = SendMessagePayload {
            body: body.trim().to_string(),
        };
        if let Err(errors) = payload.validate() {
            debug!(conversation_id, "rejected message body");
            return Err(errors.into());
        }

        let mut state = lock(&self.state, "chat");
        let now = self.clock.now();
        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| {
                Error::NotFound(format!("Conversation {} not found", conversation_id))
            })?;

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender_id: self.session.user_id.clone(),
            body: payload.body,
            sent_at: now,
            is_read: true,
        };
        conversation.messages.push(message.clone());
        conversation.last_activity = now;
        state.sort();
        self.publish(&state);
        Ok(message)
    }

    /// Marks the other participant's messages as read.
    pub fn mark_read(&self, conversation_id: &str) -> MutationOutcome {
        let mut state = lock(&self.state, "chat");
        let user_id = self.session.user_id.as_str();
        let Some(conversation) = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        else {
            return MutationOutcome::Ignored;
        };

        let mut changed = false;
        for message in conversation
            .messages
            .iter_mut()
            .filter(|m| !m.is_read && m.sender_id != user_id)
        {
            message.is_read = true;
            changed = true;
        }
        if changed {
            self.publish(&state);
        }
        changed.into()
    }

    /// Returns the existing conversation with `user_id`, or opens an empty one.
    /// `None` when the user is not in the directory.
    pub fn start_conversation(&self, user_id: &str) -> Option<Conversation> {
        let mut state = lock(&self.state, "chat");
        if let Some(existing) = state
            .conversations
            .iter()
            .find(|c| c.participant_ids.iter().any(|p| p == user_id))
        {
            return Some(existing.clone());
        }

        let partner = state.directory.iter().find(|u| u.id == user_id)?.clone();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            participant_ids: vec![self.session.user_id.clone(), partner.id],
            participant_names: vec![self.session.display_name.clone(), partner.name],
            messages: Vec::new(),
            last_activity: self.clock.now(),
        };
        info!(conversation_id = %conversation.id, user_id, "conversation started");
        state.conversations.insert(0, conversation.clone());
        self.publish(&state);
        Some(conversation)
    }

    pub fn delete_conversation(&self, conversation_id: &str) -> MutationOutcome {
        let mut state = lock(&self.state, "chat");
        let before = state.conversations.len();
        state.conversations.retain(|c| c.id != conversation_id);
        if state.conversations.len() == before {
            return MutationOutcome::Ignored;
        }
        info!(conversation_id, "conversation deleted");
        self.publish(&state);
        MutationOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generator::DemoDataGenerator;
    use crate::utils::time::MockClock;
    use chrono::{Duration, Utc};

    fn store() -> (ChatStore, Vec<User>) {
        let now = Utc::now();
        let mut generator = DemoDataGenerator::from_seed(Some(3), now);
        let users = generator.generate_users(5);
        let conversations = generator.generate_conversations(3, &users, "me");

        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(move || now + Duration::minutes(1));
        let store = ChatStore::new(
            conversations,
            users.clone(),
            Session::new("me", "Me"),
            Arc::new(clock),
        );
        (store, users)
    }

    #[test]
    fn sending_moves_the_conversation_to_the_top() {
        let (store, _) = store();
        let last = store.snapshot().conversations[2].id.clone();

        let message = store.send_message(&last, "  See you Monday  ").unwrap();
        assert_eq!(message.body, "See you Monday");
        assert_eq!(message.sender_id, "me");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.conversations[0].id, last);
        assert_eq!(snapshot.conversations[0].last_message().unwrap().id, message.id);
    }

    #[test]
    fn invalid_messages_are_rejected() {
        let (store, _) = store();
        let id = store.snapshot().conversations[0].id.clone();
        assert!(matches!(
            store.send_message(&id, "   "),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.send_message(&id, &"x".repeat(MAX_MESSAGE_LENGTH + 1)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.send_message("missing", "hello"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn mark_read_clears_unread_counts() {
        let (store, _) = store();
        for conversation in store.snapshot().conversations {
            store.mark_read(&conversation.id);
        }
        let analytics = store.snapshot().analytics;
        assert_eq!(analytics.unread_messages, 0);
        assert_eq!(analytics.unread_conversations, 0);
        assert_eq!(store.mark_read("missing"), MutationOutcome::Ignored);
    }

    #[test]
    fn start_conversation_reuses_existing_threads() {
        let (store, users) = store();
        let existing = store.start_conversation(&users[0].id).unwrap();
        assert!(!existing.messages.is_empty());
        assert_eq!(store.snapshot().analytics.conversation_count, 3);

        let fresh = store.start_conversation(&users[4].id).unwrap();
        assert!(fresh.messages.is_empty());
        assert_eq!(store.snapshot().analytics.conversation_count, 4);
        assert_eq!(store.start_conversation(&users[4].id).unwrap().id, fresh.id);

        assert!(store.start_conversation("stranger").is_none());
    }

    #[test]
    fn delete_conversation() {
        let (store, _) = store();
        let id = store.snapshot().conversations[0].id.clone();
        assert!(store.delete_conversation(&id).applied());
        assert!(store.get_by_id(&id).is_none());
        assert_eq!(store.delete_conversation(&id), MutationOutcome::Ignored);
    }
}
