use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("post not found")]
    PostNotFound,

    #[error("comment not found")]
    CommentNotFound,

    #[error("no votes from the requested user")]
    VoteNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("session not found")]
    SessionNotFound,

    #[error("url is invalid")]
    InvalidUrl,

    #[error("invalid category")]
    InvalidCategory,

    #[error("invalid post type")]
    InvalidPostType,

    #[error("comment body is required")]
    BadCommentBody,

    #[error("username already exist")]
    UserExists,

    #[error("invalid password")]
    InvalidPassword,

    #[error("bad token")]
    BadToken,

    #[error("bad payload")]
    BadPayload,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation-name context added while an error travels up the stack.
    /// The original kind stays reachable through [`AppError::root`].
    #[error("{op}: {source}")]
    Op {
        op: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl AppError {
    /// Wraps the error with the name of the operation that produced it.
    pub fn in_op(self, op: &'static str) -> Self {
        AppError::Op {
            op,
            source: Box::new(self),
        }
    }

    /// Walks the operation-context chain down to the underlying kind.
    pub fn root(&self) -> &AppError {
        let mut err = self;
        while let AppError::Op { source, .. } = err {
            err = source;
        }
        err
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.root() {
            AppError::PostNotFound
            | AppError::CommentNotFound
            | AppError::VoteNotFound
            | AppError::UserNotFound => (StatusCode::NOT_FOUND, self.root().to_string()),
            AppError::InvalidCategory | AppError::InvalidPostType | AppError::BadPayload => {
                (StatusCode::BAD_REQUEST, self.root().to_string())
            }
            AppError::InvalidUrl
            | AppError::BadCommentBody
            | AppError::UserExists
            | AppError::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.root().to_string())
            }
            AppError::InvalidPassword | AppError::BadToken | AppError::SessionNotFound => {
                (StatusCode::UNAUTHORIZED, self.root().to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "bad token".to_string())
            }
            AppError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::Op { .. } => unreachable!("root() never returns an Op wrapper"),
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();

        AppError::Validation(error_messages.join(", "))
    }
}
