use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CallerIdentity, Post, PostCategory, PostPayload},
    storage::PostStore,
};

/// In-process backend: one reader/writer lock over the whole collection.
/// Reads clone; mutations hold the write lock across the full
/// fetch-mutate-persist span, so concurrent voters on one post serialize.
/// The collection is kept stable-sorted by descending score, so score ties
/// preserve creation order.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sort_by_score(posts: &mut [Post]) {
        posts.sort_by_key(|post| std::cmp::Reverse(post.score));
    }

    fn find_mut(posts: &mut [Post], post_id: Uuid) -> Result<&mut Post> {
        posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or(AppError::PostNotFound)
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn all_posts(&self) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.clone())
    }

    async fn posts_by_category(&self, category: PostCategory) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .filter(|post| post.category == category)
            .cloned()
            .collect())
    }

    async fn posts_by_author(&self, username: &str) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut by_author: Vec<Post> = posts
            .iter()
            .filter(|post| post.author.username == username)
            .cloned()
            .collect();
        // contractual order: most recent first; the timestamp format is
        // fixed-width so string comparison is chronological
        by_author.sort_by(|a, b| b.created.cmp(&a.created));

        Ok(by_author)
    }

    async fn post_by_id(&self, post_id: Uuid) -> Result<Post> {
        let posts = self.posts.read().await;
        posts
            .iter()
            .find(|post| post.id == post_id)
            .cloned()
            .ok_or(AppError::PostNotFound)
    }

    async fn create_post(&self, author: &CallerIdentity, payload: PostPayload) -> Result<Post> {
        let post = Post::new(author.clone(), payload)?;
        let mut posts = self.posts.write().await;
        posts.push(post.clone());
        Self::sort_by_score(&mut posts);

        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let mut posts = self.posts.write().await;
        let len_before = posts.len();
        posts.retain(|post| post.id != post_id);
        if posts.len() == len_before {
            return Err(AppError::PostNotFound);
        }

        Ok(())
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        author: &CallerIdentity,
        body: &str,
    ) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let post = Self::find_mut(&mut posts, post_id)?;
        post.add_comment(author.clone(), body);

        Ok(post.clone())
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let post = Self::find_mut(&mut posts, post_id)?;
        post.delete_comment(comment_id)?;

        Ok(post.clone())
    }

    async fn upvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let post = Self::find_mut(&mut posts, post_id)?;
        post.upvote(voter.id);
        let snapshot = post.clone();
        Self::sort_by_score(&mut posts);

        Ok(snapshot)
    }

    async fn downvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let post = Self::find_mut(&mut posts, post_id)?;
        post.downvote(voter.id);
        let snapshot = post.clone();
        Self::sort_by_score(&mut posts);

        Ok(snapshot)
    }

    async fn unvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let post = Self::find_mut(&mut posts, post_id)?;
        post.unvote(voter.id)?;
        let snapshot = post.clone();
        Self::sort_by_score(&mut posts);

        Ok(snapshot)
    }

    async fn bump_views(&self, post_id: Uuid) -> Result<()> {
        let mut posts = self.posts.write().await;
        let post = Self::find_mut(&mut posts, post_id)?;
        post.bump_views();

        Ok(())
    }
}
