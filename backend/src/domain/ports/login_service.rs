//! Driving port for sign-in, token resolution and sign-out.
//!
//! Inbound adapters authenticate requests through this port without knowing
//! how tokens or users are stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccessToken, Error, LoginCredentials, Principal, UserId};

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub user_id: UserId,
    pub access_token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and issue an access token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginSuccess, Error>;

    /// The principal behind a bearer token, if it is known and unexpired.
    async fn resolve_token(&self, token: &AccessToken) -> Result<Option<Principal>, Error>;

    /// The principal for a user id carried by a session cookie.
    async fn resolve_user(&self, user_id: &UserId) -> Result<Option<Principal>, Error>;

    /// Revoke a token. Unknown tokens are ignored.
    async fn logout(&self, token: &AccessToken) -> Result<(), Error>;
}
