use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::User,
};

/// In-process user repository keyed by username.
#[derive(Default)]
pub struct UserRepo {
    users: RwLock<HashMap<String, User>>,
}

impl UserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `UserExists` when the username is already taken.
    pub async fn create(&self, username: &str, password_hash: String) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(AppError::UserExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
        };
        users.insert(username.to_string(), user.clone());

        Ok(user)
    }

    pub async fn by_username(&self, username: &str) -> Result<User> {
        let users = self.users.read().await;
        users.get(username).cloned().ok_or(AppError::UserNotFound)
    }
}
