//! Port for storing avatar image bytes.

use async_trait::async_trait;

use crate::domain::{AvatarFormat, AvatarImage, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStoreError {
        Io { message: String } => "avatar storage failed: {message}",
    }
}

/// Avatar bytes read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAvatar {
    pub format: AvatarFormat,
    pub bytes: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Store the image for `user_id`, replacing any previous one, and return
    /// the storage key it was written under.
    async fn save(&self, user_id: &UserId, image: &AvatarImage) -> Result<String, AvatarStoreError>;

    async fn load(&self, user_id: &UserId) -> Result<Option<StoredAvatar>, AvatarStoreError>;
}
