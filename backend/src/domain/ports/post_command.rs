//! Driving ports for posts.

use async_trait::async_trait;

use crate::domain::{Error, Offset, Page, Post, PostContent, PostId, Principal};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    async fn create(&self, principal: &Principal, content: PostContent) -> Result<Post, Error>;

    /// Replace a post's content. Owner or admin only.
    async fn update(
        &self,
        principal: &Principal,
        id: &PostId,
        content: PostContent,
    ) -> Result<(), Error>;

    /// Delete a post with its comments. Owner or admin only.
    async fn delete(&self, principal: &Principal, id: &PostId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostQuery: Send + Sync {
    async fn get(&self, id: &PostId) -> Result<Post, Error>;

    /// Newest first.
    async fn list(&self, offset: Offset) -> Result<Page<Post>, Error>;
}
