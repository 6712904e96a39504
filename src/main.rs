use std::sync::Arc;

use mongodb::Client;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkboard::config::{Config, StorageBackend};
use linkboard::models::Post;
use linkboard::services::{PostService, UserService};
use linkboard::storage::{MemoryPostStore, MongoPostStore, PostStore};
use linkboard::{AppState, create_app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!("Configuration loaded");

    let store: Arc<dyn PostStore> = match config.storage {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory post storage");
            Arc::new(MemoryPostStore::new())
        }
        StorageBackend::Mongo => {
            let client = Client::with_uri_str(&config.mongo_url).await?;
            let collection = client
                .database(&config.mongo_db)
                .collection::<Post>("posts");
            tracing::info!(db = %config.mongo_db, "Using MongoDB post storage");
            Arc::new(MongoPostStore::new(collection))
        }
    };

    let state = AppState {
        posts: Arc::new(PostService::new(store)),
        users: Arc::new(UserService::new(config.jwt_secret.clone())),
        config: Arc::new(config.clone()),
    };

    let app = create_app(state);

    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    tracing::info!("Server listening on {}:{}", config.host, config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
