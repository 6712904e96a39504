use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CallerIdentity, timestamp_now};

/// A single comment inside a post's ordered comment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostComment {
    pub id: Uuid,
    pub created: String,
    pub author: CallerIdentity,
    pub body: String,
}

impl PostComment {
    pub fn new(author: CallerIdentity, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created: timestamp_now(),
            author,
            body: body.into(),
        }
    }
}

// Comment creation request: {"comment": "..."}
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}
