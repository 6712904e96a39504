use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection,
    bson::{Document, doc, to_bson},
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CallerIdentity, Post, PostCategory, PostPayload, PostVote},
    storage::PostStore,
};

/// The narrow slice of the driver the post store needs. Lets the store's
/// filter/update documents be verified without a running server.
#[async_trait]
pub trait PostCollection: Send + Sync {
    async fn find_sorted(&self, filter: Document, sort: Document) -> Result<Vec<Post>>;

    async fn find_one(&self, filter: Document) -> Result<Option<Post>>;

    async fn insert_one(&self, post: &Post) -> Result<()>;

    /// Returns the matched-document count.
    async fn update_one(&self, filter: Document, update: Document) -> Result<u64>;

    /// Returns the deleted-document count.
    async fn delete_one(&self, filter: Document) -> Result<u64>;
}

#[async_trait]
impl PostCollection for Collection<Post> {
    async fn find_sorted(&self, filter: Document, sort: Document) -> Result<Vec<Post>> {
        let cursor = self.find(filter).sort(sort).await?;
        let posts = cursor.try_collect().await?;

        Ok(posts)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Post>> {
        Ok(Collection::find_one(self, filter).await?)
    }

    async fn insert_one(&self, post: &Post) -> Result<()> {
        Collection::insert_one(self, post).await?;

        Ok(())
    }

    async fn update_one(&self, filter: Document, update: Document) -> Result<u64> {
        let result = Collection::update_one(self, filter, update).await?;

        Ok(result.matched_count)
    }

    async fn delete_one(&self, filter: Document) -> Result<u64> {
        let result = Collection::delete_one(self, filter).await?;

        Ok(result.deleted_count)
    }
}

/// MongoDB-backed store. No client-side locking: every mutation is issued as
/// one targeted update command ($push/$pull/$set/$inc on the changed fields
/// only), so correctness under concurrent voters rests on the server's
/// per-document atomicity. Vote flips patch the matched array element via the
/// positional operator instead of rewriting the whole ledger.
pub struct MongoPostStore {
    collection: Box<dyn PostCollection>,
}

impl MongoPostStore {
    pub fn new(collection: impl PostCollection + 'static) -> Self {
        Self {
            collection: Box::new(collection),
        }
    }

    async fn fetch(&self, post_id: Uuid) -> Result<Post> {
        self.collection
            .find_one(doc! { "id": post_id.to_string() })
            .await?
            .ok_or(AppError::PostNotFound)
    }

    /// Delta write for a vote outcome: a fresh ledger entry is pushed into
    /// the array; a direction flip matches the entry by voter id and patches
    /// only that element.
    async fn persist_vote(&self, post: &Post, vote: PostVote, created: bool) -> Result<()> {
        let (filter, update) = if created {
            (
                doc! { "id": post.id.to_string() },
                doc! {
                    "$push": { "votes": { "user": vote.user.to_string(), "vote": i32::from(vote.vote) } },
                    "$set": {
                        "score": post.score,
                        "upvotePercentage": post.upvote_percentage,
                    },
                },
            )
        } else {
            (
                doc! {
                    "id": post.id.to_string(),
                    "votes.user": vote.user.to_string(),
                },
                doc! {
                    "$set": {
                        "votes.$.vote": i32::from(vote.vote),
                        "score": post.score,
                        "upvotePercentage": post.upvote_percentage,
                    },
                },
            )
        };
        self.collection.update_one(filter, update).await?;

        Ok(())
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn all_posts(&self) -> Result<Vec<Post>> {
        // secondary key keeps score ties in creation order; the server sort
        // alone is not guaranteed stable
        self.collection
            .find_sorted(doc! {}, doc! { "score": -1, "created": 1 })
            .await
            .map_err(|e| e.in_op("all_posts"))
    }

    async fn posts_by_category(&self, category: PostCategory) -> Result<Vec<Post>> {
        self.collection
            .find_sorted(
                doc! { "category": category.as_str() },
                doc! { "score": -1, "created": 1 },
            )
            .await
            .map_err(|e| e.in_op("posts_by_category"))
    }

    async fn posts_by_author(&self, username: &str) -> Result<Vec<Post>> {
        self.collection
            .find_sorted(doc! { "author.username": username }, doc! { "created": -1 })
            .await
            .map_err(|e| e.in_op("posts_by_author"))
    }

    async fn post_by_id(&self, post_id: Uuid) -> Result<Post> {
        self.fetch(post_id).await.map_err(|e| e.in_op("post_by_id"))
    }

    async fn create_post(&self, author: &CallerIdentity, payload: PostPayload) -> Result<Post> {
        let post = Post::new(author.clone(), payload)?;
        self.collection
            .insert_one(&post)
            .await
            .map_err(|e| e.in_op("create_post"))?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let deleted = self
            .collection
            .delete_one(doc! { "id": post_id.to_string() })
            .await
            .map_err(|e| e.in_op("delete_post"))?;
        if deleted == 0 {
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
        let mut post = self.fetch(post_id).await.map_err(|e| e.in_op("add_comment"))?;
        let comment = post.add_comment(author.clone(), body);
        let comment = to_bson(&comment)
            .map_err(|e| AppError::Database(e.into()).in_op("add_comment"))?;

        self.collection
            .update_one(
                doc! { "id": post.id.to_string() },
                doc! { "$push": { "comments": comment } },
            )
            .await
            .map_err(|e| e.in_op("add_comment"))?;

        Ok(post)
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Post> {
        let mut post = self
            .fetch(post_id)
            .await
            .map_err(|e| e.in_op("delete_comment"))?;
        post.delete_comment(comment_id)?;

        self.collection
            .update_one(
                doc! { "id": post.id.to_string() },
                doc! { "$pull": { "comments": { "id": comment_id.to_string() } } },
            )
            .await
            .map_err(|e| e.in_op("delete_comment"))?;

        Ok(post)
    }

    async fn upvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        let mut post = self.fetch(post_id).await.map_err(|e| e.in_op("upvote"))?;
        let (vote, created) = post.upvote(voter.id);
        self.persist_vote(&post, vote, created)
            .await
            .map_err(|e| e.in_op("upvote"))?;

        Ok(post)
    }

    async fn downvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        let mut post = self.fetch(post_id).await.map_err(|e| e.in_op("downvote"))?;
        let (vote, created) = post.downvote(voter.id);
        self.persist_vote(&post, vote, created)
            .await
            .map_err(|e| e.in_op("downvote"))?;

        Ok(post)
    }

    async fn unvote(&self, post_id: Uuid, voter: &CallerIdentity) -> Result<Post> {
        let mut post = self.fetch(post_id).await.map_err(|e| e.in_op("unvote"))?;
        post.unvote(voter.id)?;

        self.collection
            .update_one(
                doc! { "id": post.id.to_string() },
                doc! {
                    "$pull": { "votes": { "user": voter.id.to_string() } },
                    "$set": {
                        "score": post.score,
                        "upvotePercentage": post.upvote_percentage,
                    },
                },
            )
            .await
            .map_err(|e| e.in_op("unvote"))?;

        Ok(post)
    }

    async fn bump_views(&self, post_id: Uuid) -> Result<()> {
        let matched = self
            .collection
            .update_one(
                doc! { "id": post_id.to_string() },
                doc! { "$inc": { "views": 1 } },
            )
            .await
            .map_err(|e| e.in_op("bump_views"))?;
        if matched == 0 {
            return Err(AppError::PostNotFound);
        }

        Ok(())
    }
}
