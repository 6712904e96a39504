use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CallerIdentity, Post, PostCategory, PostPayload, PostType, is_valid_url},
    storage::PostStore,
};

/// Orchestrates the store and the post aggregate: fetch, apply a mutation,
/// persist, translate errors. Backend-agnostic; every store error is
/// re-wrapped with the initiating operation's name.
pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn all_posts(&self) -> Result<Vec<Post>> {
        self.store
            .all_posts()
            .await
            .map_err(|e| e.in_op("get_all_posts"))
    }

    pub async fn posts_by_category(&self, category: PostCategory) -> Result<Vec<Post>> {
        self.store
            .posts_by_category(category)
            .await
            .map_err(|e| e.in_op("get_posts_by_category"))
    }

    pub async fn posts_by_author(&self, username: &str) -> Result<Vec<Post>> {
        self.store
            .posts_by_author(username)
            .await
            .map_err(|e| e.in_op("get_posts_by_author"))
    }

    /// Fetches a post and bumps its view counter as a best-effort side
    /// effect: a failed persisted increment is logged, never surfaced, and
    /// the returned post reflects the increment regardless.
    pub async fn post_by_id(&self, post_id: Uuid) -> Result<Post> {
        let mut post = self
            .store
            .post_by_id(post_id)
            .await
            .map_err(|e| e.in_op("get_post_by_id"))?;

        if let Err(e) = self.store.bump_views(post_id).await {
            tracing::warn!(%post_id, error = %e, "view count increment failed");
        }
        post.bump_views();

        Ok(post)
    }

    /// Fail-fast URL check so an invalid link payload never reaches the
    /// store.
    pub async fn create_post(
        &self,
        author: &CallerIdentity,
        payload: PostPayload,
    ) -> Result<Post> {
        if payload.kind == PostType::Link
            && !is_valid_url(payload.url.as_deref().unwrap_or_default())
        {
            return Err(AppError::InvalidUrl.in_op("create_post"));
        }

        self.store
            .create_post(author, payload)
            .await
            .map_err(|e| e.in_op("create_post"))
    }

    pub async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        self.store
            .delete_post(post_id)
            .await
            .map_err(|e| e.in_op("delete_post"))
    }

    pub async fn upvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        self.store
            .upvote(post_id, voter)
            .await
            .map_err(|e| e.in_op("upvote"))
    }

    pub async fn downvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        self.store
            .downvote(post_id, voter)
            .await
            .map_err(|e| e.in_op("downvote"))
    }

    pub async fn unvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        self.store
            .unvote(post_id, voter)
            .await
            .map_err(|e| e.in_op("unvote"))
    }

    /// Rejects empty bodies before the store is ever touched.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: &CallerIdentity,
        body: &str,
    ) -> Result<Post> {
        if body.is_empty() {
            return Err(AppError::BadCommentBody.in_op("add_comment"));
        }

        self.store
            .add_comment(post_id, author, body)
            .await
            .map_err(|e| e.in_op("add_comment"))
    }

    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Post> {
        self.store
            .delete_comment(post_id, comment_id)
            .await
            .map_err(|e| e.in_op("delete_comment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPostStore;

    fn service() -> PostService {
        PostService::new(Arc::new(MemoryPostStore::new()))
    }

    fn caller(name: &str) -> CallerIdentity {
        CallerIdentity {
            username: name.to_string(),
            id: Uuid::new_v4(),
        }
    }

    fn text_payload(title: &str) -> PostPayload {
        PostPayload {
            kind: PostType::Text,
            title: title.to_string(),
            url: None,
            category: PostCategory::Music,
            text: Some("hello".to_string()),
        }
    }

    #[tokio::test]
    async fn get_by_id_bumps_views() {
        let service = service();
        let post = service
            .create_post(&caller("a"), text_payload("T"))
            .await
            .unwrap();
        assert_eq!(post.views, 1);

        let fetched = service.post_by_id(post.id).await.unwrap();
        assert_eq!(fetched.views, 2);

        let fetched = service.post_by_id(post.id).await.unwrap();
        assert_eq!(fetched.views, 3);
    }

    #[tokio::test]
    async fn invalid_url_fails_before_the_store() {
        let service = service();
        let payload = PostPayload {
            kind: PostType::Link,
            title: "T".to_string(),
            url: Some("not a url".to_string()),
            category: PostCategory::News,
            text: None,
        };

        let err = service
            .create_post(&caller("a"), payload)
            .await
            .unwrap_err();
        assert!(matches!(err.root(), AppError::InvalidUrl));
        assert!(service.all_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_comment_body_is_rejected() {
        let service = service();
        let author = caller("a");
        let post = service
            .create_post(&author, text_payload("T"))
            .await
            .unwrap();

        let err = service
            .add_comment(post.id, &author, "")
            .await
            .unwrap_err();
        assert!(matches!(err.root(), AppError::BadCommentBody));
        assert_eq!(err.to_string(), "add_comment: comment body is required");
        assert!(service.post_by_id(post.id).await.unwrap().comments.is_empty());
    }

    #[tokio::test]
    async fn vote_flow_round_trip() {
        let service = service();
        let post = service
            .create_post(&caller("a"), text_payload("T"))
            .await
            .unwrap();
        let voter = caller("voter");

        let updated = service.upvote(post.id, &voter).await.unwrap();
        assert_eq!(updated.score, 2);
        assert_eq!(updated.upvote_percentage, 100);

        let updated = service.downvote(post.id, &voter).await.unwrap();
        assert_eq!(updated.score, 0);
        assert_eq!(updated.upvote_percentage, 50);

        let updated = service.unvote(post.id, &voter).await.unwrap();
        assert_eq!(updated.score, 1);
        assert_eq!(updated.upvote_percentage, 100);
    }

    #[tokio::test]
    async fn store_errors_keep_their_kind_through_the_op_chain() {
        let service = service();
        let err = service.delete_post(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err.root(), AppError::PostNotFound));
        assert!(err.to_string().starts_with("delete_post:"));

        let err = service
            .unvote(Uuid::new_v4(), &caller("v"))
            .await
            .unwrap_err();
        assert!(matches!(err.root(), AppError::PostNotFound));
    }

    #[tokio::test]
    async fn aggregate_errors_are_wrapped_with_the_op_name_once() {
        let service = service();
        let post = service
            .create_post(&caller("a"), text_payload("T"))
            .await
            .unwrap();

        let err = service
            .unvote(post.id, &caller("bystander"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unvote: no votes from the requested user");

        let err = service
            .delete_comment(post.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "delete_comment: comment not found");
    }
}
