//! Comment services.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CommentCommand, CommentQuery, CommentRepository, CommentRepositoryError, PostRepository,
};
use crate::domain::user_service::map_post_repository_error;
use crate::domain::{Comment, CommentBody, CommentId, Error, PostId, Principal};

fn map_comment_repository_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentRepositoryError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
        CommentRepositoryError::PostNotFound => Error::not_found("post not found"),
        CommentRepositoryError::NotFound => Error::not_found("comment not found"),
    }
}

/// Comment service implementing the comment driving ports.
#[derive(Clone)]
pub struct CommentService<C, P> {
    comments: Arc<C>,
    posts: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<C, P> CommentService<C, P> {
    pub fn new(comments: Arc<C>, posts: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            comments,
            posts,
            clock,
        }
    }
}

impl<C, P> CommentService<C, P>
where
    C: CommentRepository,
{
    async fn load_comment(&self, id: &CommentId) -> Result<Comment, Error> {
        self.comments
            .find_by_id(id)
            .await
            .map_err(map_comment_repository_error)?
            .ok_or_else(|| Error::not_found(format!("comment {id} not found")))
    }
}

#[async_trait]
impl<C, P> CommentCommand for CommentService<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    async fn create(
        &self,
        principal: &Principal,
        post_id: &PostId,
        body: CommentBody,
    ) -> Result<Comment, Error> {
        let comment = Comment::new(
            CommentId::random(),
            *post_id,
            principal.user_id,
            body,
            self.clock.utc(),
        );
        self.comments
            .create(&comment)
            .await
            .map_err(map_comment_repository_error)?;
        info!(comment_id = %comment.id(), %post_id, "created comment");
        Ok(comment)
    }

    async fn delete(&self, principal: &Principal, id: &CommentId) -> Result<(), Error> {
        let comment = self.load_comment(id).await?;

        if !principal.can_manage(comment.user_id()) {
            let post_owner = self
                .posts
                .find_by_id(&comment.post_id())
                .await
                .map_err(map_post_repository_error)?
                .map(|post| post.user_id());
            if post_owner != Some(principal.user_id) {
                return Err(Error::forbidden(
                    "only the comment author, the post owner or an admin may delete this comment",
                ));
            }
        }

        self.comments
            .delete(id)
            .await
            .map_err(map_comment_repository_error)?;
        info!(comment_id = %id, "deleted comment");
        Ok(())
    }
}

#[async_trait]
impl<C, P> CommentQuery for CommentService<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    async fn get(&self, id: &CommentId) -> Result<Comment, Error> {
        self.load_comment(id).await
    }

    async fn list_for_post(&self, post_id: &PostId) -> Result<Vec<Comment>, Error> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_repository_error)?
            .ok_or_else(|| Error::not_found(format!("post {post_id} not found")))?;
        self.comments
            .list_for_post(post_id)
            .await
            .map_err(map_comment_repository_error)
    }
}
