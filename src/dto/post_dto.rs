use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::post::Post;
use crate::services::feed_store::{FeedAnalytics, FeedSnapshot};

pub const MAX_POST_LENGTH: u64 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostPayload {
    #[validate(length(
        min = 1,
        max = 3000,
        message = "Post must be between 1 and 3000 characters"
    ))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "A post can carry at most 10 attachments"))]
    pub media_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PostMutation {
    Like,
    Comment { text: String },
    Reply { comment_id: String, text: String },
    Share,
    Edit { content: String },
    Delete,
}

/// Feed narrowing; unset fields do not constrain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedFilter {
    pub author_id: Option<String>,
    pub hashtag: String,
    pub keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<Post>,
    pub page: usize,
    pub has_more: bool,
    pub is_loading: bool,
    pub total_matches: usize,
    pub analytics: FeedAnalytics,
}

impl From<FeedSnapshot> for FeedResponse {
    fn from(value: FeedSnapshot) -> Self {
        Self {
            items: value.posts,
            page: value.current_page,
            has_more: value.has_more,
            is_loading: value.is_loading,
            total_matches: value.total_matches,
            analytics: value.analytics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_post_is_rejected() {
        let payload = CreatePostPayload {
            content: String::new(),
            media_urls: vec![],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn oversized_post_is_rejected() {
        let payload = CreatePostPayload {
            content: "x".repeat(MAX_POST_LENGTH as usize + 1),
            media_urls: vec![],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn reply_mutation_parses() {
        let mutation: PostMutation = serde_json::from_value(json!({
            "action": "reply",
            "comment_id": "c1",
            "text": "agreed"
        }))
        .unwrap();
        assert_eq!(
            mutation,
            PostMutation::Reply {
                comment_id: "c1".into(),
                text: "agreed".into()
            }
        );
    }
}
