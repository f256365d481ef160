use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::message::Conversation;
use crate::models::notification::{Notification, NotificationKind};
use crate::services::chat_store::ChatAnalytics;
use crate::services::notification_store::NotificationAnalytics;
use crate::utils::time::relative_label;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendConnectionRequestPayload {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(max = 300, message = "Invitation notes are limited to 300 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestAction {
    Accept,
    Decline,
    Withdraw,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSearchQuery {
    pub keyword: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationQuery {
    pub kind: Option<NotificationKind>,
    pub unread_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartConversationPayload {
    #[validate(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessagePayload {
    #[validate(length(min = 1, max = 2000, message = "Messages must be 1 to 2000 characters"))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub age: String,
}

impl NotificationView {
    pub fn new(notification: Notification, now: DateTime<Utc>) -> Self {
        Self {
            age: relative_label(notification.created_at, now),
            notification,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub items: Vec<NotificationView>,
    pub analytics: NotificationAnalytics,
}

/// Inbox row: who, the latest line and how much is unread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub participant_names: Vec<String>,
    pub last_message: Option<String>,
    pub unread: usize,
    pub last_activity: DateTime<Utc>,
    pub age: String,
}

impl ConversationSummary {
    pub fn for_user(conversation: &Conversation, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: conversation.id.clone(),
            participant_ids: conversation.participant_ids.clone(),
            participant_names: conversation.participant_names.clone(),
            last_message: conversation.last_message().map(|m| m.body.clone()),
            unread: conversation.unread_for(user_id),
            last_activity: conversation.last_activity,
            age: relative_label(conversation.last_activity, now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub items: Vec<ConversationSummary>,
    pub analytics: ChatAnalytics,
}
