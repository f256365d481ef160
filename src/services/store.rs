//! Pieces shared by the per-domain stores: the visible-slice + side-cache
//! collection, snapshot publishing, ranking helpers and simulated latency.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

use crate::models::job::JobPosting;
use crate::models::post::Post;

/// Result of a store mutation. Unknown ids and no-op changes are `Ignored`,
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    Applied,
    Ignored,
}

impl MutationOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

impl From<bool> for MutationOutcome {
    fn from(changed: bool) -> Self {
        if changed {
            MutationOutcome::Applied
        } else {
            MutationOutcome::Ignored
        }
    }
}

pub trait Entity: Clone {
    fn id(&self) -> &str;
}

impl Entity for JobPosting {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The slice currently shown to the consumer plus a cache of everything it
/// has ever been shown. Paged slices never hold the whole dataset, so lookups
/// fall back to the cache.
#[derive(Debug, Clone)]
pub struct CachedCollection<T> {
    visible: Vec<T>,
    cache: HashMap<String, T>,
}

impl<T> Default for CachedCollection<T> {
    fn default() -> Self {
        Self {
            visible: Vec::new(),
            cache: HashMap::new(),
        }
    }
}

impl<T: Entity> CachedCollection<T> {
    pub fn visible(&self) -> &[T] {
        &self.visible
    }

    pub fn replace_visible(&mut self, items: Vec<T>) {
        self.remember(&items);
        self.visible = items;
    }

    pub fn append(&mut self, items: Vec<T>) {
        self.remember(&items);
        self.visible.extend(items);
    }

    pub fn prepend(&mut self, item: T) {
        self.cache.insert(item.id().to_string(), item.clone());
        self.visible.insert(0, item);
    }

    pub fn remember(&mut self, items: &[T]) {
        for item in items {
            self.cache.insert(item.id().to_string(), item.clone());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cache.contains_key(id) || self.visible.iter().any(|item| item.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.visible
            .iter()
            .find(|item| item.id() == id)
            .or_else(|| self.cache.get(id))
    }

    /// Overwrites every copy of `item` the collection holds. Returns false when
    /// the id is unknown to both the slice and the cache.
    pub fn refresh(&mut self, item: &T) -> bool {
        let mut found = false;
        if let Some(slot) = self.visible.iter_mut().find(|v| v.id() == item.id()) {
            *slot = item.clone();
            found = true;
        }
        if let Some(slot) = self.cache.get_mut(item.id()) {
            *slot = item.clone();
            found = true;
        }
        found
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.visible.len();
        self.visible.retain(|item| item.id() != id);
        let cached = self.cache.remove(id).is_some();
        cached || self.visible.len() != before
    }
}

/// Explicit publish side of a store: consumers `subscribe` and receive every
/// snapshot the store hands to `publish`.
#[derive(Debug)]
pub struct Publisher<S> {
    sender: watch::Sender<S>,
}

impl<S: Clone> Publisher<S> {
    pub fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn publish(&self, snapshot: S) {
        self.sender.send_replace(snapshot);
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> S {
        self.sender.borrow().clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCount {
    pub name: String,
    pub count: usize,
}

/// The `n` most frequent names, most frequent first, ties broken alphabetically.
pub fn top_counts<'a, I>(names: I, n: usize) -> Vec<RankedCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    let mut ranked: Vec<RankedCount> = counts
        .into_iter()
        .map(|(name, count)| RankedCount {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(n);
    ranked
}

pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, store: &'static str) -> MutexGuard<'a, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| {
            tracing::warn!(store, "store mutex poisoned, continuing with inner state");
            poisoned.into_inner()
        })
}

pub async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: u32,
    }

    impl Entity for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, value: u32) -> Item {
        Item {
            id: id.into(),
            value,
        }
    }

    #[test]
    fn lookups_fall_back_to_cache() {
        let mut c = CachedCollection::default();
        c.replace_visible(vec![item("a", 1), item("b", 2)]);
        c.replace_visible(vec![item("c", 3)]);

        assert_eq!(c.visible().len(), 1);
        assert_eq!(c.get("a").map(|i| i.value), Some(1));
        assert!(c.contains("b"));
        assert!(c.get("zzz").is_none());
    }

    #[test]
    fn refresh_updates_every_copy() {
        let mut c = CachedCollection::default();
        c.replace_visible(vec![item("a", 1)]);
        assert!(c.refresh(&item("a", 10)));
        assert_eq!(c.visible()[0].value, 10);
        c.replace_visible(vec![]);
        assert_eq!(c.get("a").map(|i| i.value), Some(10));
        assert!(!c.refresh(&item("nope", 0)));
    }

    #[test]
    fn append_and_remove() {
        let mut c = CachedCollection::default();
        c.replace_visible(vec![item("a", 1)]);
        c.append(vec![item("b", 2)]);
        c.prepend(item("z", 0));
        let ids: Vec<&str> = c
            .visible()
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, ["z", "a", "b"]);
        assert!(c.remove("a"));
        assert!(!c.contains("a"));
        assert!(!c.remove("a"));
    }

    #[test]
    fn top_counts_breaks_ties_by_name() {
        let ranked = top_counts(["rust", "go", "rust", "swift", "go", "ada"], 3);
        let ranked: Vec<(&str, usize)> = ranked
            .iter()
            .map(|r| (r.name.as_str(), r.count))
            .collect();
        assert_eq!(ranked, [("go", 2), ("rust", 2), ("ada", 1)]);
    }

    #[tokio::test]
    async fn publisher_delivers_latest_snapshot() {
        let publisher = Publisher::new(0u32);
        let mut rx = publisher.subscribe();
        publisher.publish(7);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 7);
        assert_eq!(publisher.current(), 7);
    }
}
