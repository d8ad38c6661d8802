//! Driving port for account reads.

use async_trait::async_trait;

use crate::domain::{Error, Offset, Page, Post, User, UserId, UserName};

use super::StoredAvatar;

/// A user together with one page of their posts.
#[derive(Debug, Clone)]
pub struct UserPosts {
    pub user: User,
    pub posts: Page<Post>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<User, Error>;

    /// `true` when no user holds `user_name`, ignoring case.
    async fn is_user_name_available(&self, user_name: &UserName) -> Result<bool, Error>;

    async fn posts_by_user(&self, id: &UserId, offset: Offset) -> Result<UserPosts, Error>;

    async fn avatar(&self, id: &UserId) -> Result<StoredAvatar, Error>;
}
