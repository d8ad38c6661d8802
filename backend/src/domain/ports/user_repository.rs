//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{ConcurrencyStamp, Email, User, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already holds the normalised user name.
        DuplicateUserName => "user name is already taken",
        /// Another user already registered the email address.
        DuplicateEmail => "email is already registered",
        /// The stored concurrency stamp no longer matches the expected one.
        ConcurrencyConflict => "user was modified concurrently",
        /// No user with the given identifier exists.
        NotFound => "user not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user together with its roles in a single transaction.
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Look a user up by email, ignoring case.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError>;

    /// Whether any user holds `user_name`, ignoring case.
    async fn user_name_exists(&self, user_name: &UserName) -> Result<bool, UserRepositoryError>;

    /// Persist the profile fields and stamp of `user`, provided the stored
    /// stamp still equals `expected`.
    async fn update_profile(
        &self,
        user: &User,
        expected: ConcurrencyStamp,
    ) -> Result<(), UserRepositoryError>;

    async fn set_avatar_url(&self, id: &UserId, url: &str) -> Result<(), UserRepositoryError>;
}
