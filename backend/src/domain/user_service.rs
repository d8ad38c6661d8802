//! Account services.
//!
//! Implements the [`UserCommand`] and [`UserQuery`] driving ports on top of
//! the user and post repositories, the password hasher and the avatar store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    AvatarStore, AvatarStoreError, PasswordHasher, PasswordHasherError, PostRepository,
    PostRepositoryError, RegisterUserRequest, StoredAvatar, UpdateProfileRequest, UserCommand,
    UserPosts, UserQuery, UserRepository, UserRepositoryError,
};
use crate::domain::{
    AvatarImage, Error, Offset, PAGE_SIZE, Principal, User, UserId, UserName,
};

/// URL an uploaded avatar is served from.
pub fn avatar_url(user_id: &UserId) -> String {
    format!("/api/v1/users/{user_id}/avatar")
}

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUserName => duplicate_user_name(),
        UserRepositoryError::DuplicateEmail => duplicate_email(),
        UserRepositoryError::ConcurrencyConflict => stale_profile(),
        UserRepositoryError::NotFound => Error::not_found("user not found"),
    }
}

pub(crate) fn map_post_repository_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("post repository unavailable: {message}"))
        }
        PostRepositoryError::Query { message } => {
            Error::internal(format!("post repository error: {message}"))
        }
        PostRepositoryError::AuthorNotFound => Error::not_found("author not found"),
        PostRepositoryError::NotFound => Error::not_found("post not found"),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_avatar_error(error: AvatarStoreError) -> Error {
    Error::internal(error.to_string())
}

fn duplicate_user_name() -> Error {
    Error::conflict("user name is already taken")
        .with_details(json!({ "field": "userName", "code": "duplicate_user_name" }))
}

fn duplicate_email() -> Error {
    Error::conflict("email is already registered")
        .with_details(json!({ "field": "email", "code": "duplicate_email" }))
}

fn stale_profile() -> Error {
    Error::conflict("user was modified by another request")
        .with_details(json!({ "field": "concurrencyStamp", "code": "stale" }))
}

fn ensure_self(principal: &Principal, user_id: &UserId, action: &str) -> Result<(), Error> {
    if principal.user_id == *user_id {
        Ok(())
    } else {
        Err(Error::forbidden(format!("users may only {action} for themselves")))
    }
}

/// Account service implementing the user driving ports.
#[derive(Clone)]
pub struct UserService<U, P, H, S> {
    users: Arc<U>,
    posts: Arc<P>,
    hasher: Arc<H>,
    avatars: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<U, P, H, S> UserService<U, P, H, S> {
    pub fn new(
        users: Arc<U>,
        posts: Arc<P>,
        hasher: Arc<H>,
        avatars: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            posts,
            hasher,
            avatars,
            clock,
        }
    }
}

impl<U, P, H, S> UserService<U, P, H, S>
where
    U: UserRepository,
{
    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn user_name_taken(&self, user_name: &UserName) -> Result<bool, Error> {
        self.users
            .user_name_exists(user_name)
            .await
            .map_err(map_user_repository_error)
    }
}

#[async_trait]
impl<U, P, H, S> UserCommand for UserService<U, P, H, S>
where
    U: UserRepository,
    P: PostRepository,
    H: PasswordHasher,
    S: AvatarStore,
{
    async fn register(&self, request: RegisterUserRequest) -> Result<UserId, Error> {
        let RegisterUserRequest {
            email,
            profile,
            password,
        } = request;

        if self.user_name_taken(&profile.user_name).await? {
            return Err(duplicate_user_name());
        }
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_repository_error)?
            .is_some()
        {
            return Err(duplicate_email());
        }

        let password_hash = self
            .hasher
            .hash(&password)
            .await
            .map_err(map_hasher_error)?;
        let user = User::register(email, profile, password_hash, self.clock.utc());
        self.users
            .create(&user)
            .await
            .map_err(map_user_repository_error)?;

        info!(user_id = %user.id(), "registered user");
        Ok(user.id())
    }

    async fn update_profile(
        &self,
        principal: &Principal,
        request: UpdateProfileRequest,
    ) -> Result<(), Error> {
        let UpdateProfileRequest {
            user_id,
            profile,
            expected_stamp,
        } = request;
        ensure_self(principal, &user_id, "update the profile")?;

        let current = self.load_user(&user_id).await?;
        let expected = expected_stamp.unwrap_or_else(|| current.concurrency_stamp());
        if expected != current.concurrency_stamp() {
            return Err(stale_profile());
        }
        let renamed = current.user_name().normalized() != profile.user_name.normalized();
        if renamed && self.user_name_taken(&profile.user_name).await? {
            return Err(duplicate_user_name());
        }

        let updated = current.with_profile(profile);
        self.users
            .update_profile(&updated, expected)
            .await
            .map_err(map_user_repository_error)?;
        info!(%user_id, "updated user profile");
        Ok(())
    }

    async fn upload_avatar(
        &self,
        principal: &Principal,
        user_id: &UserId,
        image: AvatarImage,
    ) -> Result<String, Error> {
        ensure_self(principal, user_id, "change the avatar")?;
        self.load_user(user_id).await?;

        self.avatars
            .save(user_id, &image)
            .await
            .map_err(map_avatar_error)?;
        let url = avatar_url(user_id);
        self.users
            .set_avatar_url(user_id, &url)
            .await
            .map_err(map_user_repository_error)?;
        info!(%user_id, bytes = image.bytes().len(), "stored avatar");
        Ok(url)
    }
}

#[async_trait]
impl<U, P, H, S> UserQuery for UserService<U, P, H, S>
where
    U: UserRepository,
    P: PostRepository,
    H: PasswordHasher,
    S: AvatarStore,
{
    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        self.load_user(id).await
    }

    async fn is_user_name_available(&self, user_name: &UserName) -> Result<bool, Error> {
        Ok(!self.user_name_taken(user_name).await?)
    }

    async fn posts_by_user(&self, id: &UserId, offset: Offset) -> Result<UserPosts, Error> {
        let user = self.load_user(id).await?;
        let posts = self
            .posts
            .list_by_user(id, offset, PAGE_SIZE)
            .await
            .map_err(map_post_repository_error)?;
        Ok(UserPosts { user, posts })
    }

    async fn avatar(&self, id: &UserId) -> Result<StoredAvatar, Error> {
        self.avatars
            .load(id)
            .await
            .map_err(map_avatar_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} has no avatar")))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
