//! Port for comment persistence.

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError {
        Connection { message: String } => "comment repository connection failed: {message}",
        Query { message: String } => "comment repository query failed: {message}",
        /// The post being commented on does not exist.
        PostNotFound => "post not found",
        NotFound => "comment not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment after confirming its post exists.
    async fn create(&self, comment: &Comment) -> Result<(), CommentRepositoryError>;

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentRepositoryError>;

    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: &PostId) -> Result<Vec<Comment>, CommentRepositoryError>;

    async fn delete(&self, id: &CommentId) -> Result<(), CommentRepositoryError>;
}
