use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::dto::social_dto::NotificationQuery;
use crate::models::notification::{Notification, NotificationKind};
use crate::services::store::{lock, MutationOutcome, Publisher};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAnalytics {
    pub total: usize,
    pub unread: usize,
    pub by_kind: BTreeMap<NotificationKind, usize>,
}

impl NotificationAnalytics {
    pub fn compute(notifications: &[Notification]) -> Self {
        let mut by_kind = BTreeMap::new();
        for n in notifications {
            *by_kind.entry(n.kind).or_insert(0) += 1;
        }
        Self {
            total: notifications.len(),
            unread: notifications.iter().filter(|n| !n.is_read).count(),
            by_kind,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub analytics: NotificationAnalytics,
}

#[derive(Clone)]
pub struct NotificationStore {
    /// Newest first.
    notifications: Arc<Mutex<Vec<Notification>>>,
    publisher: Arc<Publisher<NotificationSnapshot>>,
}

fn snapshot_of(notifications: &[Notification]) -> NotificationSnapshot {
    NotificationSnapshot {
        notifications: notifications.to_vec(),
        analytics: NotificationAnalytics::compute(notifications),
    }
}

impl NotificationStore {
    pub fn new(mut notifications: Vec<Notification>) -> Self {
        notifications.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        let publisher = Publisher::new(snapshot_of(&notifications));
        Self {
            notifications: Arc::new(Mutex::new(notifications)),
            publisher: Arc::new(publisher),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        self.publisher.current()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Notification> {
        lock(&self.notifications, "notifications")
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub fn list(&self, query: &NotificationQuery) -> Vec<Notification> {
        lock(&self.notifications, "notifications")
            .iter()
            .filter(|n| query.kind.map_or(true, |kind| n.kind == kind))
            .filter(|n| !query.unread_only || !n.is_read)
            .cloned()
            .collect()
    }

    pub fn push(&self, notification: Notification) {
        let mut notifications = lock(&self.notifications, "notifications");
        debug!(id = %notification.id, kind = ?notification.kind, "notification pushed");
        notifications.insert(0, notification);
        self.publisher.publish(snapshot_of(&notifications));
    }

    pub fn mark_read(&self, id: &str) -> MutationOutcome {
        let mut notifications = lock(&self.notifications, "notifications");
        let Some(notification) = notifications.iter_mut().find(|n| n.id == id && !n.is_read) else {
            return MutationOutcome::Ignored;
        };
        notification.is_read = true;
        self.publisher.publish(snapshot_of(&notifications));
        MutationOutcome::Applied
    }

    /// Returns how many notifications flipped to read.
    pub fn mark_all_read(&self) -> usize {
        let mut notifications = lock(&self.notifications, "notifications");
        let mut changed = 0;
        for n in notifications.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        if changed > 0 {
            info!(changed, "marked all notifications read");
            self.publisher.publish(snapshot_of(&notifications));
        }
        changed
    }

    pub fn delete(&self, id: &str) -> MutationOutcome {
        let mut notifications = lock(&self.notifications, "notifications");
        let before = notifications.len();
        notifications.retain(|n| n.id != id);
        if notifications.len() == before {
            return MutationOutcome::Ignored;
        }
        self.publisher.publish(snapshot_of(&notifications));
        MutationOutcome::Applied
    }
}
