use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{self, Claims},
    error::{AppError, Result},
    models::{CallerIdentity, Session},
    storage::UserRepo,
};

/// Registration, login and session issuance. Sessions live in an in-process
/// registry keyed by the token's `jti`; a token whose session is gone is
/// rejected even if its signature still verifies.
pub struct UserService {
    users: UserRepo,
    sessions: RwLock<HashMap<String, Uuid>>,
    jwt_secret: String,
}

impl UserService {
    pub fn new(jwt_secret: String) -> Self {
        Self {
            users: UserRepo::new(),
            sessions: RwLock::new(HashMap::new()),
            jwt_secret,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Session> {
        let password_hash = auth::hash_password(password).map_err(|e| e.in_op("register"))?;
        let user = self
            .users
            .create(username, password_hash)
            .await
            .map_err(|e| e.in_op("register"))?;

        self.issue_session(&CallerIdentity::from(&user)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let user = self
            .users
            .by_username(username)
            .await
            .map_err(|e| e.in_op("login"))?;
        if !auth::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidPassword);
        }

        self.issue_session(&CallerIdentity::from(&user)).await
    }

    /// Resolves a token's `jti` to the logged-in user id.
    pub async fn session_user(&self, jti: &str) -> Result<Uuid> {
        let sessions = self.sessions.read().await;
        sessions.get(jti).copied().ok_or(AppError::SessionNotFound)
    }

    async fn issue_session(&self, identity: &CallerIdentity) -> Result<Session> {
        let (token, claims) = Claims::new(identity.id, &identity.username, &self.jwt_secret)?;
        let mut sessions = self.sessions.write().await;
        sessions.insert(claims.jti, identity.id);

        Ok(Session { token })
    }
}
