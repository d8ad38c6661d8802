//! Driving ports for comments.

use async_trait::async_trait;

use crate::domain::{Comment, CommentBody, CommentId, Error, PostId, Principal};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentCommand: Send + Sync {
    async fn create(
        &self,
        principal: &Principal,
        post_id: &PostId,
        body: CommentBody,
    ) -> Result<Comment, Error>;

    /// Allowed for the comment owner, the post owner and admins.
    async fn delete(&self, principal: &Principal, id: &CommentId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentQuery: Send + Sync {
    async fn get(&self, id: &CommentId) -> Result<Comment, Error>;

    /// Comments on an existing post, oldest first.
    async fn list_for_post(&self, post_id: &PostId) -> Result<Vec<Comment>, Error>;
}
