//! Driving port for account mutations.

use async_trait::async_trait;

use crate::domain::{
    AvatarImage, ConcurrencyStamp, Email, Error, Password, Principal, UserId, UserProfile,
};

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub email: Email,
    pub profile: UserProfile,
    pub password: Password,
}

/// Validated profile update.
#[derive(Debug, Clone)]
pub struct UpdateProfileRequest {
    pub user_id: UserId,
    pub profile: UserProfile,
    /// Stamp the client last saw. When absent the stamp read at the start of
    /// the update is used.
    pub expected_stamp: Option<ConcurrencyStamp>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Create an account and return its identifier.
    async fn register(&self, request: RegisterUserRequest) -> Result<UserId, Error>;

    async fn update_profile(
        &self,
        principal: &Principal,
        request: UpdateProfileRequest,
    ) -> Result<(), Error>;

    /// Store a new avatar and return the URL it is served from.
    async fn upload_avatar(
        &self,
        principal: &Principal,
        user_id: &UserId,
        image: AvatarImage,
    ) -> Result<String, Error>;
}
