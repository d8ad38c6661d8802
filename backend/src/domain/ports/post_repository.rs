//! Port for post persistence.

use async_trait::async_trait;

use crate::domain::{Offset, Page, Post, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError {
        Connection { message: String } => "post repository connection failed: {message}",
        Query { message: String } => "post repository query failed: {message}",
        /// The referenced author does not exist.
        AuthorNotFound => "author not found",
        NotFound => "post not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> Result<(), PostRepositoryError>;

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Overwrite the content of an existing post.
    async fn update(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Delete the post and its comments in one transaction.
    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError>;

    /// Page through all posts, newest first.
    async fn list(&self, offset: Offset, limit: i64) -> Result<Page<Post>, PostRepositoryError>;

    /// Page through the posts of one user, newest first.
    async fn list_by_user(
        &self,
        user_id: &UserId,
        offset: Offset,
        limit: i64,
    ) -> Result<Page<Post>, PostRepositoryError>;
}
