use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{CommentRequest, Post, PostCategory, PostPayload},
};

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    let posts = state.posts.all_posts().await?;
    Ok(Json(posts))
}

pub async fn list_posts_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Post>>> {
    let category: PostCategory = category.parse()?;
    let posts = state.posts.posts_by_category(category).await?;
    Ok(Json(posts))
}

pub async fn list_posts_by_author(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Post>>> {
    let posts = state.posts.posts_by_author(&username).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>> {
    let post = state.posts.post_by_id(post_id).await?;
    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<PostPayload>,
) -> Result<(StatusCode, Json<Post>)> {
    payload.validate()?;

    let post = state
        .posts
        .create_post(&auth_user.identity, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.posts.delete_post(post_id).await?;
    Ok(Json(json!({ "message": "success" })))
}

pub async fn add_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = state
        .posts
        .add_comment(post_id, &auth_user.identity, &payload.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Post>> {
    let post = state.posts.delete_comment(post_id, comment_id).await?;
    Ok(Json(post))
}

pub async fn upvote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>> {
    let post = state.posts.upvote(post_id, &auth_user.identity).await?;
    Ok(Json(post))
}

pub async fn downvote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>> {
    let post = state.posts.downvote(post_id, &auth_user.identity).await?;
    Ok(Json(post))
}

pub async fn unvote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>> {
    let post = state.posts.unvote(post_id, &auth_user.identity).await?;
    Ok(Json(post))
}
