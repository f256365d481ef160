use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::dto::post_dto::{CreatePostPayload, FeedFilter, PostMutation, MAX_POST_LENGTH};
use crate::error::Result;
use crate::models::post::{Comment, Post};
use crate::models::user::Session;
use crate::services::pagination::PaginationCursor;
use crate::services::store::{
    lock, simulate_latency, top_counts, CachedCollection, MutationOutcome, Publisher, RankedCount,
};
use crate::utils::time::Clock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedAnalytics {
    pub total_posts: usize,
    pub total_likes: usize,
    /// Comments plus every nested reply.
    pub total_comments: usize,
    pub total_shares: u64,
    pub average_engagement: f64,
    pub my_post_count: usize,
    pub top_hashtags: Vec<RankedCount>,
}

impl FeedAnalytics {
    pub fn compute(posts: &[Post], user_id: &str) -> Self {
        let total_posts = posts.len();
        let engagement: usize = posts.iter().map(Post::engagement).sum();
        Self {
            total_posts,
            total_likes: posts.iter().map(Post::like_count).sum(),
            total_comments: posts.iter().map(Post::comment_count).sum(),
            total_shares: posts.iter().map(|p| u64::from(p.share_count)).sum(),
            average_engagement: if total_posts == 0 {
                0.0
            } else {
                engagement as f64 / total_posts as f64
            },
            my_post_count: posts.iter().filter(|p| p.author_id == user_id).count(),
            top_hashtags: top_counts(
                posts.iter().flat_map(|p| p.hashtags.iter().map(String::as_str)),
                5,
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
    pub filter: FeedFilter,
    pub current_page: usize,
    pub has_more: bool,
    pub is_loading: bool,
    pub total_matches: usize,
    pub analytics: FeedAnalytics,
}

struct FeedState {
    /// Newest first.
    posts: Vec<Post>,
    matches: Vec<String>,
    collection: CachedCollection<Post>,
    cursor: PaginationCursor,
    filter: FeedFilter,
    analytics: FeedAnalytics,
    is_loading: bool,
    generation: u64,
}

impl FeedState {
    fn next_page(&mut self) -> Vec<Post> {
        let ids = self.cursor.next_page(&self.matches).to_vec();
        ids.iter()
            .filter(|id| !self.is_visible(id))
            .filter_map(|id| self.posts.iter().find(|p| p.id == **id).cloned())
            .collect()
    }

    fn is_visible(&self, id: &str) -> bool {
        self.collection.visible().iter().any(|p| p.id == id)
    }

    fn insert_created(&mut self, post: &Post) {
        self.posts.insert(0, post.clone());
        if self.filter.matches(post) {
            self.matches.insert(0, post.id.clone());
            self.collection.prepend(post.clone());
        } else {
            self.collection.remember(std::slice::from_ref(post));
        }
    }

    /// Drops `id` from the dataset and the match list. The visible slice keeps
    /// covering every delivered page, so when a delivered id goes away the
    /// next undelivered match moves into view.
    fn remove_deleted(&mut self, index: usize, id: &str) {
        self.posts.remove(index);
        self.collection.remove(id);
        let delivered = self.cursor.current_page() * self.cursor.page_size();
        let delivered = delivered.min(self.matches.len());
        let Some(position) = self.matches.iter().position(|m| m == id) else {
            return;
        };
        self.matches.remove(position);
        if position >= delivered {
            return;
        }
        let pulled = self
            .matches
            .get(delivered - 1)
            .filter(|next| !self.is_visible(next))
            .and_then(|next| self.posts.iter().find(|p| p.id == *next).cloned());
        if let Some(post) = pulled {
            self.collection.append(vec![post]);
        }
    }

    fn run_refresh(&mut self, filter: FeedFilter) {
        self.matches = self
            .posts
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.id.clone())
            .collect();
        self.filter = filter;
        self.cursor.reset();
        let page = self.next_page();
        self.collection.replace_visible(page);
    }

    fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            posts: self.collection.visible().to_vec(),
            filter: self.filter.clone(),
            current_page: self.cursor.current_page(),
            has_more: self.cursor.has_more(),
            is_loading: self.is_loading,
            total_matches: self.matches.len(),
            analytics: self.analytics.clone(),
        }
    }
}

/// Paged social feed with likes, threaded comments and authoring.
#[derive(Clone)]
pub struct FeedStore {
    state: Arc<Mutex<FeedState>>,
    publisher: Arc<Publisher<FeedSnapshot>>,
    clock: Arc<dyn Clock>,
    session: Session,
    latency: Duration,
}

impl FeedStore {
    pub fn new(
        mut posts: Vec<Post>,
        session: Session,
        page_size: usize,
        clock: Arc<dyn Clock>,
        latency: Duration,
    ) -> Self {
        posts.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        let mut state = FeedState {
            analytics: FeedAnalytics::compute(&posts, &session.user_id),
            posts,
            matches: Vec::new(),
            collection: CachedCollection::default(),
            cursor: PaginationCursor::new(page_size),
            filter: FeedFilter::default(),
            is_loading: false,
            generation: 0,
        };
        state.run_refresh(FeedFilter::default());
        let publisher = Publisher::new(state.snapshot());

        Self {
            state: Arc::new(Mutex::new(state)),
            publisher: Arc::new(publisher),
            clock,
            session,
            latency,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.publisher.current()
    }

    fn publish(&self, state: &FeedState) {
        self.publisher.publish(state.snapshot());
    }

    pub async fn refresh(&self, filter: FeedFilter) -> FeedSnapshot {
        let generation = {
            let mut state = lock(&self.state, "feed");
            state.generation += 1;
            state.is_loading = true;
            self.publish(&state);
            state.generation
        };

        simulate_latency(self.latency).await;

        let mut state = lock(&self.state, "feed");
        if state.generation != generation {
            debug!(generation, "discarding stale feed refresh");
            return state.snapshot();
        }
        state.run_refresh(filter);
        state.is_loading = false;
        info!(matches = state.matches.len(), "feed refreshed");
        self.publish(&state);
        state.snapshot()
    }

    pub async fn load_more(&self) -> FeedSnapshot {
        let generation = {
            let mut state = lock(&self.state, "feed");
            if state.is_loading || !state.cursor.has_more() {
                return state.snapshot();
            }
            state.is_loading = true;
            self.publish(&state);
            state.generation
        };

        simulate_latency(self.latency).await;

        let mut state = lock(&self.state, "feed");
        if state.generation != generation {
            return state.snapshot();
        }
        let page = state.next_page();
        state.collection.append(page);
        state.is_loading = false;
        self.publish(&state);
        state.snapshot()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Post> {
        lock(&self.state, "feed").collection.get(id).cloned()
    }

    /// Publishes a post by the session user at the top of the feed.
    pub fn create_post(&self, payload: CreatePostPayload) -> Result<Post> {
        let payload = CreatePostPayload {
            content: payload.content.trim().to_string(),
            ..payload
        };
        payload.validate()?;
        let now = self.clock.now();

        let mut post = Post {
            id: Uuid::new_v4().to_string(),
            author_id: self.session.user_id.clone(),
            author_name: self.session.display_name.clone(),
            author_headline: self.session.headline.clone(),
            content: String::new(),
            media_urls: payload.media_urls,
            liked_by_user_ids: BTreeSet::new(),
            comments: Vec::new(),
            share_count: 0,
            hashtags: Vec::new(),
            mentions: Vec::new(),
            created_at: now,
            updated_at: now,
            is_edited: false,
        };
        post.set_content(&payload.content);

        let mut state = lock(&self.state, "feed");
        state.insert_created(&post);
        state.analytics = FeedAnalytics::compute(&state.posts, &self.session.user_id);
        info!(post_id = %post.id, hashtags = post.hashtags.len(), "post created");
        self.publish(&state);
        Ok(post)
    }

    pub fn mutate(&self, id: &str, mutation: PostMutation) -> MutationOutcome {
        let mut state = lock(&self.state, "feed");
        if !state.collection.contains(id) {
            debug!(post_id = id, "mutation on unknown post ignored");
            return MutationOutcome::Ignored;
        }
        let user_id = self.session.user_id.as_str();

        if mutation == PostMutation::Delete {
            let Some(index) = state.posts.iter().position(|p| p.id == id) else {
                return MutationOutcome::Ignored;
            };
            if state.posts[index].author_id != user_id {
                debug!(post_id = id, "only the author can delete a post");
                return MutationOutcome::Ignored;
            }
            state.remove_deleted(index, id);
            state.analytics = FeedAnalytics::compute(&state.posts, user_id);
            info!(post_id = id, "post deleted");
            self.publish(&state);
            return MutationOutcome::Applied;
        }

        let now = self.clock.now();
        let Some(post) = state.posts.iter_mut().find(|p| p.id == id) else {
            return MutationOutcome::Ignored;
        };

        let changed = match mutation {
            PostMutation::Like => {
                if !post.liked_by_user_ids.remove(user_id) {
                    post.liked_by_user_ids.insert(user_id.to_string());
                }
                true
            }
            PostMutation::Comment { text } => match self.comment(&text, now) {
                Some(comment) => {
                    post.comments.push(comment);
                    true
                }
                None => false,
            },
            PostMutation::Reply { comment_id, text } => {
                match (post.find_comment_mut(&comment_id), self.comment(&text, now)) {
                    (Some(parent), Some(reply)) => {
                        parent.replies.push(reply);
                        true
                    }
                    _ => false,
                }
            }
            PostMutation::Share => {
                post.share_count += 1;
                true
            }
            PostMutation::Edit { content } => {
                let content = content.trim();
                let editable = post.author_id == user_id
                    && !content.is_empty()
                    && content.chars().count() as u64 <= MAX_POST_LENGTH;
                if editable {
                    post.set_content(content);
                    post.is_edited = true;
                    post.updated_at = now;
                }
                editable
            }
            PostMutation::Delete => false,
        };

        if !changed {
            debug!(post_id = id, "post mutation was a no-op");
            return MutationOutcome::Ignored;
        }

        let updated = post.clone();
        state.collection.refresh(&updated);
        state.analytics = FeedAnalytics::compute(&state.posts, user_id);
        self.publish(&state);
        MutationOutcome::Applied
    }

    fn comment(&self, text: &str, now: chrono::DateTime<chrono::Utc>) -> Option<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Comment {
            id: Uuid::new_v4().to_string(),
            author_id: self.session.user_id.clone(),
            author_name: self.session.display_name.clone(),
            text: text.to_string(),
            created_at: now,
            liked_by_user_ids: BTreeSet::new(),
            replies: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::generator::DemoDataGenerator;
    use crate::utils::time::MockClock;
    use chrono::{DateTime, TimeZone, Utc};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn store_with(page_size: usize) -> FeedStore {
        let mut clock = MockClock::new();
        clock.expect_now().returning(fixed_now);
        let mut generator = DemoDataGenerator::from_seed(Some(9), fixed_now());
        let authors = generator.generate_users(6);
        let posts = generator.generate_posts(25, &authors);
        FeedStore::new(
            posts,
            Session::new("me", "Me").with_headline("Rustacean"),
            page_size,
            Arc::new(clock),
            Duration::ZERO,
        )
    }

    fn payload(content: &str) -> CreatePostPayload {
        CreatePostPayload {
            content: content.into(),
            media_urls: vec![],
        }
    }

    #[test]
    fn first_page_is_published_on_construction() {
        let store = store_with(10);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.posts.len(), 10);
        assert_eq!(snapshot.total_matches, 25);
        assert!(snapshot.has_more);
        assert!(snapshot
            .posts
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn like_toggles_for_the_session_user() {
        let store = store_with(10);
        let id = store.snapshot().posts[0].id.clone();
        let likes = store.get_by_id(&id).unwrap().like_count();

        assert!(store.mutate(&id, PostMutation::Like).applied());
        assert_eq!(store.get_by_id(&id).unwrap().like_count(), likes + 1);
        assert!(store.mutate(&id, PostMutation::Like).applied());
        assert_eq!(store.get_by_id(&id).unwrap().like_count(), likes);
    }

    #[test]
    fn comments_and_replies_count_towards_totals() {
        let store = store_with(10);
        let id = store.snapshot().posts[0].id.clone();
        let before = store.snapshot().analytics.total_comments;

        store.mutate(&id, PostMutation::Comment { text: "Great point".into() });
        let comment_id = store.get_by_id(&id).unwrap().comments.last().unwrap().id.clone();
        store.mutate(
            &id,
            PostMutation::Reply {
                comment_id,
                text: "Thanks!".into(),
            },
        );

        assert_eq!(store.snapshot().analytics.total_comments, before + 2);
        assert_eq!(
            store.mutate(&id, PostMutation::Comment { text: "   ".into() }),
            MutationOutcome::Ignored
        );
        assert_eq!(
            store.mutate(
                &id,
                PostMutation::Reply {
                    comment_id: "missing".into(),
                    text: "hello".into()
                }
            ),
            MutationOutcome::Ignored
        );
    }

    #[test]
    fn created_posts_are_prepended_with_tags() {
        let store = store_with(10);
        let post = store
            .create_post(payload("Shipping our new crate today #Rust #OpenSource @ferris"))
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.posts[0].id, post.id);
        assert_eq!(post.hashtags, vec!["rust", "opensource"]);
        assert_eq!(post.mentions, vec!["ferris"]);
        assert_eq!(post.author_headline, "Rustacean");
        assert_eq!(snapshot.analytics.total_posts, 26);
        assert_eq!(snapshot.analytics.my_post_count, 1);
        assert_eq!(snapshot.total_matches, 26);
    }

    #[test]
    fn invalid_posts_are_rejected() {
        let store = store_with(10);
        let err = store.create_post(payload("")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = store.create_post(payload("   \n\t ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.snapshot().analytics.total_posts, 25);
        assert_eq!(store.snapshot().total_matches, 25);
    }

    #[test]
    fn created_content_is_trimmed() {
        let store = store_with(10);
        let post = store.create_post(payload("  hello #rust  ")).unwrap();
        assert_eq!(post.content, "hello #rust");
    }

    #[tokio::test]
    async fn match_count_follows_creates_and_deletes() {
        let store = store_with(4);
        let first = store.create_post(payload("first")).unwrap();
        let second = store.create_post(payload("second")).unwrap();
        assert_eq!(store.snapshot().total_matches, 27);

        store.load_more().await;
        assert!(store.mutate(&first.id, PostMutation::Delete).applied());
        assert_eq!(store.snapshot().total_matches, 26);

        let mut snapshot = store.snapshot();
        while snapshot.has_more {
            snapshot = store.load_more().await;
        }
        let mut ids: Vec<&str> = snapshot.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 26);
        assert_eq!(ids[0], second.id);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 26);
    }

    #[test]
    fn only_the_author_can_edit_or_delete() {
        let store = store_with(10);
        let foreign = store.snapshot().posts[0].id.clone();
        assert_eq!(store.mutate(&foreign, PostMutation::Delete), MutationOutcome::Ignored);
        assert_eq!(
            store.mutate(&foreign, PostMutation::Edit { content: "mine now".into() }),
            MutationOutcome::Ignored
        );

        let own = store.create_post(payload("first draft")).unwrap();
        assert!(store
            .mutate(&own.id, PostMutation::Edit { content: "final #draft".into() })
            .applied());
        let edited = store.get_by_id(&own.id).unwrap();
        assert!(edited.is_edited);
        assert_eq!(edited.hashtags, vec!["draft"]);

        assert!(store.mutate(&own.id, PostMutation::Delete).applied());
        assert!(store.get_by_id(&own.id).is_none());
        assert_eq!(store.snapshot().analytics.total_posts, 25);
    }

    #[test]
    fn unknown_post_is_ignored() {
        let store = store_with(10);
        let before = store.snapshot();
        assert_eq!(store.mutate("nope", PostMutation::Share), MutationOutcome::Ignored);
        assert_eq!(store.snapshot().analytics, before.analytics);
    }

    #[tokio::test]
    async fn refresh_by_author_and_paging() {
        let store = store_with(4);
        let author = store.snapshot().posts[0].author_id.clone();
        let filter = FeedFilter {
            author_id: Some(author.clone()),
            ..FeedFilter::default()
        };

        let mut snapshot = store.refresh(filter).await;
        while snapshot.has_more {
            snapshot = store.load_more().await;
        }
        assert_eq!(snapshot.posts.len(), snapshot.total_matches);
        assert!(snapshot.posts.iter().all(|p| p.author_id == author));
    }
}
