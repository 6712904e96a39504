pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;

use axum::{
    Router,
    http::{
        Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    services::{PostService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub users: Arc<UserService>,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .route("/api/register", post(handlers::users::register))
        .route("/api/login", post(handlers::users::login))
        .route("/api/posts", get(handlers::posts::list_posts))
        .route("/api/posts", post(handlers::posts::create_post))
        .route(
            "/api/posts/{category}",
            get(handlers::posts::list_posts_by_category),
        )
        .route(
            "/api/user/{username}",
            get(handlers::posts::list_posts_by_author),
        )
        .route("/api/post/{post_id}", get(handlers::posts::get_post))
        .route("/api/post/{post_id}", post(handlers::posts::add_comment))
        .route("/api/post/{post_id}", delete(handlers::posts::delete_post))
        .route(
            "/api/post/{post_id}/{comment_id}",
            delete(handlers::posts::delete_comment),
        )
        .route("/api/post/{post_id}/upvote", get(handlers::posts::upvote))
        .route(
            "/api/post/{post_id}/downvote",
            get(handlers::posts::downvote),
        )
        .route("/api/post/{post_id}/unvote", get(handlers::posts::unvote))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
