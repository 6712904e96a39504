use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    models::{CallerIdentity, PostComment, timestamp_now},
};

pub const UPVOTE: i16 = 1;
pub const DOWNVOTE: i16 = -1;

static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((([A-Za-z]{3,9}:(?://)?)(?:[-;:&=+$,\w]+@)?[A-Za-z0-9.-]+(:[0-9]+)?|(?:www.|[-;:&=+$,\w]+@)[A-Za-z0-9.-]+)((?:/[+~%/.\w_-]*)?\??(?:[-+=&;%@.\w_]*)#?(?:\w*))?)$",
    )
    .expect("URL pattern is valid")
});

pub fn is_valid_url(url: &str) -> bool {
    URL_SHAPE.is_match(url)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Link,
    Text,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Link => "link",
            PostType::Text => "text",
        }
    }
}

impl FromStr for PostType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "link" => Ok(PostType::Link),
            "text" => Ok(PostType::Text),
            _ => Err(AppError::InvalidPostType),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Music,
    Funny,
    Videos,
    Programming,
    News,
    Fashion,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Music => "music",
            PostCategory::Funny => "funny",
            PostCategory::Videos => "videos",
            PostCategory::Programming => "programming",
            PostCategory::News => "news",
            PostCategory::Fashion => "fashion",
        }
    }
}

impl FromStr for PostCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "music" => Ok(PostCategory::Music),
            "funny" => Ok(PostCategory::Funny),
            "videos" => Ok(PostCategory::Videos),
            "programming" => Ok(PostCategory::Programming),
            "news" => Ok(PostCategory::News),
            "fashion" => Ok(PostCategory::Fashion),
            _ => Err(AppError::InvalidCategory),
        }
    }
}

/// One ledger entry: who voted and in which direction (`1` or `-1`).
/// At most one entry per user, enforced by the vote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostVote {
    pub user: Uuid,
    pub vote: i16,
}

/// The post aggregate. Pure in-memory state transitions, no I/O; all
/// serialization of concurrent access happens in the store layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub score: i64,
    pub views: u64,
    #[serde(rename = "type")]
    pub kind: PostType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub author: CallerIdentity,
    pub category: PostCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub votes: Vec<PostVote>,
    pub comments: Vec<PostComment>,
    pub created: String,
    #[serde(rename = "upvotePercentage")]
    pub upvote_percentage: i64,
}

// Post creation request.
#[derive(Debug, Clone, Validate, Deserialize)]
pub struct PostPayload {
    #[serde(rename = "type")]
    pub kind: PostType,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    pub category: PostCategory,
    #[serde(default)]
    pub text: Option<String>,
}

impl Post {
    /// Builds a fresh post: score 1, one self-upvote from the author,
    /// views 1, no comments, 100% upvotes.
    pub fn new(author: CallerIdentity, payload: PostPayload) -> Result<Self> {
        let (url, text) = match payload.kind {
            PostType::Link => {
                let url = payload.url.unwrap_or_default();
                if !is_valid_url(&url) {
                    return Err(AppError::InvalidUrl);
                }
                (Some(url), None)
            }
            PostType::Text => (None, payload.text),
        };

        Ok(Self {
            id: Uuid::new_v4(),
            score: 1,
            views: 1,
            kind: payload.kind,
            title: payload.title,
            url,
            category: payload.category,
            text,
            votes: vec![PostVote {
                user: author.id,
                vote: UPVOTE,
            }],
            comments: Vec::new(),
            created: timestamp_now(),
            upvote_percentage: 100,
            author,
        })
    }

    /// Appends a comment. Body validation happens one layer up, in the
    /// service, before this is ever called.
    pub fn add_comment(&mut self, author: CallerIdentity, body: &str) -> PostComment {
        let comment = PostComment::new(author, body);
        self.comments.push(comment.clone());
        comment
    }

    pub fn delete_comment(&mut self, comment_id: Uuid) -> Result<()> {
        let len_before = self.comments.len();
        self.comments.retain(|comment| comment.id != comment_id);
        if self.comments.len() == len_before {
            return Err(AppError::CommentNotFound);
        }

        Ok(())
    }

    /// Returns the resulting ledger entry and whether it was newly created.
    /// A repeated upvote by the same user is a no-op.
    pub fn upvote(&mut self, user: Uuid) -> (PostVote, bool) {
        let result = match self.votes.iter_mut().find(|v| v.user == user) {
            None => {
                let vote = PostVote { user, vote: UPVOTE };
                self.votes.push(vote);
                self.score += 1;
                (vote, true)
            }
            Some(vote) => {
                if vote.vote == DOWNVOTE {
                    vote.vote = UPVOTE;
                    self.score += 2;
                }
                (*vote, false)
            }
        };
        self.refresh_upvote_percentage();

        result
    }

    pub fn downvote(&mut self, user: Uuid) -> (PostVote, bool) {
        let result = match self.votes.iter_mut().find(|v| v.user == user) {
            None => {
                let vote = PostVote {
                    user,
                    vote: DOWNVOTE,
                };
                self.votes.push(vote);
                self.score -= 1;
                (vote, true)
            }
            Some(vote) => {
                if vote.vote == UPVOTE {
                    vote.vote = DOWNVOTE;
                    self.score -= 2;
                }
                (*vote, false)
            }
        };
        self.refresh_upvote_percentage();

        result
    }

    pub fn unvote(&mut self, user: Uuid) -> Result<()> {
        let Some(idx) = self.votes.iter().position(|v| v.user == user) else {
            return Err(AppError::VoteNotFound);
        };

        let removed = self.votes.remove(idx);
        if removed.vote == UPVOTE {
            self.score -= 1;
        } else {
            self.score += 1;
        }
        self.refresh_upvote_percentage();

        Ok(())
    }

    /// Best-effort view counter; not required to be exactly-once under
    /// concurrent readers.
    pub fn bump_views(&mut self) {
        self.views += 1;
    }

    pub fn vote_of(&self, user: Uuid) -> Option<&PostVote> {
        self.votes.iter().find(|v| v.user == user)
    }

    // Shared by every ledger mutation so the cached value never drifts.
    // score + total is non-negative (each vote contributes ±1), so integer
    // division truncates toward zero and equals floor.
    fn refresh_upvote_percentage(&mut self) {
        let total = self.votes.len() as i64;
        self.upvote_percentage = if total == 0 {
            0
        } else {
            (self.score + total) * 100 / (total * 2)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(name: &str) -> CallerIdentity {
        CallerIdentity {
            username: name.to_string(),
            id: Uuid::new_v4(),
        }
    }

    fn text_post() -> Post {
        Post::new(
            caller("author"),
            PostPayload {
                kind: PostType::Text,
                title: "T".to_string(),
                url: None,
                category: PostCategory::Music,
                text: Some("hello".to_string()),
            },
        )
        .unwrap()
    }

    fn expected_percentage(post: &Post) -> i64 {
        let total = post.votes.len() as i64;
        if total == 0 {
            0
        } else {
            (post.score + total) * 100 / (total * 2)
        }
    }

    #[test]
    fn new_text_post_starts_with_author_upvote() {
        let post = text_post();
        assert_eq!(post.score, 1);
        assert_eq!(post.views, 1);
        assert_eq!(post.upvote_percentage, 100);
        assert_eq!(post.votes.len(), 1);
        assert_eq!(post.votes[0].user, post.author.id);
        assert_eq!(post.votes[0].vote, UPVOTE);
        assert!(post.comments.is_empty());
        assert!(post.url.is_none());
        assert_eq!(post.text.as_deref(), Some("hello"));
    }

    #[test]
    fn link_post_rejects_malformed_url() {
        let err = Post::new(
            caller("author"),
            PostPayload {
                kind: PostType::Link,
                title: "T".to_string(),
                url: Some("not a url".to_string()),
                category: PostCategory::News,
                text: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl));
    }

    #[test]
    fn link_post_accepts_url_and_drops_text() {
        let post = Post::new(
            caller("author"),
            PostPayload {
                kind: PostType::Link,
                title: "T".to_string(),
                url: Some("http://localhost:8080/".to_string()),
                category: PostCategory::News,
                text: Some("ignored".to_string()),
            },
        )
        .unwrap();
        assert_eq!(post.url.as_deref(), Some("http://localhost:8080/"));
        assert!(post.text.is_none());
    }

    #[test]
    fn upvote_is_idempotent() {
        let mut post = text_post();
        let voter = Uuid::new_v4();

        let (_, created) = post.upvote(voter);
        assert!(created);
        let after_first = post.clone();

        let (vote, created) = post.upvote(voter);
        assert!(!created);
        assert_eq!(vote.vote, UPVOTE);
        assert_eq!(post, after_first);
    }

    #[test]
    fn downvote_after_upvote_moves_score_by_two() {
        let mut post = text_post();
        let voter = Uuid::new_v4();

        post.upvote(voter);
        let score_after_upvote = post.score;

        post.downvote(voter);
        assert_eq!(post.score, score_after_upvote - 2);
        assert_eq!(post.vote_of(voter).unwrap().vote, DOWNVOTE);
    }

    #[test]
    fn unvote_without_vote_fails() {
        let mut post = text_post();
        let err = post.unvote(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::VoteNotFound));
    }

    #[test]
    fn unvote_restores_pre_vote_score() {
        let mut post = text_post();
        let voter = Uuid::new_v4();
        let before = post.score;

        post.downvote(voter);
        post.unvote(voter).unwrap();
        assert_eq!(post.score, before);
        assert!(post.vote_of(voter).is_none());

        post.upvote(voter);
        post.unvote(voter).unwrap();
        assert_eq!(post.score, before);
    }

    #[test]
    fn percentage_invariant_holds_across_mixed_sequences() {
        let mut post = text_post();
        let voters: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        post.upvote(voters[0]);
        post.downvote(voters[1]);
        post.downvote(voters[2]);
        assert_eq!(post.upvote_percentage, expected_percentage(&post));

        post.upvote(voters[1]);
        post.unvote(voters[0]).unwrap();
        post.downvote(voters[3]);
        post.upvote(voters[4]);
        assert_eq!(post.upvote_percentage, expected_percentage(&post));

        // all voters (author included) gone: percentage drops to 0
        let author = post.author.id;
        for voter in post.votes.iter().map(|v| v.user).collect::<Vec<_>>() {
            post.unvote(voter).unwrap();
        }
        assert_eq!(post.upvote_percentage, 0);
        assert!(post.vote_of(author).is_none());
    }

    #[test]
    fn one_ledger_entry_per_voter() {
        let mut post = text_post();
        let voter = Uuid::new_v4();

        post.upvote(voter);
        post.downvote(voter);
        post.upvote(voter);
        let entries = post.votes.iter().filter(|v| v.user == voter).count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn delete_comment_shrinks_list_or_fails() {
        let mut post = text_post();
        let comment = post.add_comment(caller("visitor"), "nice");
        assert_eq!(post.comments.len(), 1);

        let err = post.delete_comment(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::CommentNotFound));
        assert_eq!(post.comments.len(), 1);

        post.delete_comment(comment.id).unwrap();
        assert!(post.comments.is_empty());
    }

    #[test]
    fn comments_keep_insertion_order() {
        let mut post = text_post();
        let first = post.add_comment(caller("a"), "first");
        let second = post.add_comment(caller("b"), "second");
        assert_eq!(post.comments[0].id, first.id);
        assert_eq!(post.comments[1].id, second.id);
    }

    #[test]
    fn serialized_post_omits_absent_optional_fields() {
        let post = text_post();
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("url").is_none());
        assert_eq!(value["type"], "text");
        assert_eq!(value["category"], "music");
        assert_eq!(value["upvotePercentage"], 100);
    }

    #[test]
    fn category_and_type_parse_from_wire_strings() {
        assert_eq!(
            "programming".parse::<PostCategory>().unwrap(),
            PostCategory::Programming
        );
        assert!(matches!(
            "cooking".parse::<PostCategory>().unwrap_err(),
            AppError::InvalidCategory
        ));
        assert_eq!("link".parse::<PostType>().unwrap(), PostType::Link);
        assert!(matches!(
            "poll".parse::<PostType>().unwrap_err(),
            AppError::InvalidPostType
        ));
    }
}
