pub mod memory;
pub mod mongo;
pub mod users;

pub use memory::MemoryPostStore;
pub use mongo::{MongoPostStore, PostCollection};
pub use users::UserRepo;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{CallerIdentity, Post, PostCategory, PostPayload},
};

/// Persistence contract for posts. Every backend must expose identical
/// externally observed semantics:
///
/// - reads return owned snapshots, never aliases of internal storage;
/// - `all_posts`/`posts_by_category` order by descending score, stable
///   (equal scores keep creation order);
/// - `posts_by_author` orders by descending creation time;
/// - every mutation owns its whole fetch-mutate-persist span, so two
///   concurrent voters on one post cannot lose an update;
/// - persistence writes express field-level deltas, not full-record
///   rewrites, to the extent the backend's update primitives allow.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn all_posts(&self) -> Result<Vec<Post>>;

    async fn posts_by_category(&self, category: PostCategory) -> Result<Vec<Post>>;

    async fn posts_by_author(&self, username: &str) -> Result<Vec<Post>>;

    /// Fails with `PostNotFound` when the id is unknown.
    async fn post_by_id(&self, post_id: Uuid) -> Result<Post>;

    async fn create_post(&self, author: &CallerIdentity, payload: PostPayload) -> Result<Post>;

    /// Fails with `PostNotFound` when nothing was removed.
    async fn delete_post(&self, post_id: Uuid) -> Result<()>;

    async fn add_comment(
        &self,
        post_id: Uuid,
        author: &CallerIdentity,
        body: &str,
    ) -> Result<Post>;

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Post>;

    async fn upvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post>;

    async fn downvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post>;

    async fn unvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post>;

    /// Best-effort view counter increment.
    async fn bump_views(&self, post_id: Uuid) -> Result<()>;
}
