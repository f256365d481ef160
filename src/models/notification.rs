use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    ConnectionRequest,
    ConnectionAccepted,
    JobAlert,
    Mention,
    ProfileView,
    ApplicationUpdate,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 8] = [
        NotificationKind::Like,
        NotificationKind::Comment,
        NotificationKind::ConnectionRequest,
        NotificationKind::ConnectionAccepted,
        NotificationKind::JobAlert,
        NotificationKind::Mention,
        NotificationKind::ProfileView,
        NotificationKind::ApplicationUpdate,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}
