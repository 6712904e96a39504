use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registered account. Lives only in the user repository; posts and comments
/// carry a [`CallerIdentity`] snapshot instead of referencing this record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// Authenticated caller: login plus stable id, embedded into posts and
/// comments at creation time and immutable afterwards, even if the account
/// is later renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub username: String,
    pub id: Uuid,
}

impl From<&User> for CallerIdentity {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            id: user.id,
        }
    }
}

#[derive(Debug, Validate, Deserialize)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued JWT session token, as returned by register/login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
}
