use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::CallerIdentity,
};

const SESSION_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String, // session id
}

impl Claims {
    pub fn new(user_id: Uuid, username: &str, jwt_secret: &str) -> Result<(String, Self)> {
        let now = Utc::now();
        let exp = now + Duration::days(SESSION_LIFETIME_DAYS);

        let claims = Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_ref()),
        )?;

        Ok((token, claims))
    }

    pub fn verify(token: &str, jwt_secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt_secret.as_ref()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

/// Authenticated caller, extracted from the bearer token and checked against
/// the live session registry. From here on down the identity travels as an
/// explicit parameter, never as an ambient request-context value.
#[derive(Debug)]
pub struct AuthUser {
    pub identity: CallerIdentity,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::BadToken)?;

        let claims = Claims::verify(bearer.token(), &state.config.jwt_secret)?;

        let session_user = state.users.session_user(&claims.jti).await?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::BadPayload)?;
        if session_user != user_id {
            return Err(AppError::SessionNotFound);
        }

        Ok(AuthUser {
            identity: CallerIdentity {
                username: claims.username,
                id: user_id,
            },
        })
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let cost = 12;
    bcrypt::hash(password, cost).map_err(AppError::from)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(AppError::from)
}
