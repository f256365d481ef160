use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::utils::text::{extract_hashtags, extract_mentions};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub liked_by_user_ids: BTreeSet<String>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// This comment plus every nested reply.
    pub fn thread_len(&self) -> usize {
        1 + self.replies.iter().map(Comment::thread_len).sum::<usize>()
    }

    pub fn find_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        if self.id == comment_id {
            return Some(self);
        }
        self.replies.iter_mut().find_map(|r| r.find_mut(comment_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_headline: String,
    pub content: String,
    pub media_urls: Vec<String>,
    pub liked_by_user_ids: BTreeSet<String>,
    pub comments: Vec<Comment>,
    pub share_count: u32,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_edited: bool,
}

impl Post {
    /// Replaces the content and re-derives hashtags and mentions from it.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.hashtags = extract_hashtags(&self.content);
        self.mentions = extract_mentions(&self.content);
    }

    pub fn like_count(&self) -> usize {
        self.liked_by_user_ids.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(Comment::thread_len).sum()
    }

    pub fn engagement(&self) -> usize {
        self.like_count() + self.comment_count() + self.share_count as usize
    }

    pub fn find_comment_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        self.comments
            .iter_mut()
            .find_map(|c| c.find_mut(comment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, replies: Vec<Comment>) -> Comment {
        Comment {
            id: id.into(),
            author_id: "u1".into(),
            author_name: "Ana".into(),
            text: "nice".into(),
            created_at: Utc::now(),
            liked_by_user_ids: BTreeSet::new(),
            replies,
        }
    }

    #[test]
    fn nested_replies_are_counted_and_found() {
        let mut post = Post {
            id: "p1".into(),
            author_id: "u1".into(),
            author_name: "Ana".into(),
            author_headline: "Engineer".into(),
            content: String::new(),
            media_urls: vec![],
            liked_by_user_ids: BTreeSet::new(),
            comments: vec![
                comment("c1", vec![comment("c1-1", vec![comment("c1-1-1", vec![])])]),
                comment("c2", vec![]),
            ],
            share_count: 2,
            hashtags: vec![],
            mentions: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_edited: false,
        };

        assert_eq!(post.comment_count(), 4);
        assert_eq!(post.engagement(), 6);
        assert!(post.find_comment_mut("c1-1-1").is_some());
        assert!(post.find_comment_mut("missing").is_none());

        post.set_content("Hiring! #Rust @lead_dev");
        assert_eq!(post.hashtags, vec!["rust"]);
        assert_eq!(post.mentions, vec!["lead_dev"]);
    }
}
