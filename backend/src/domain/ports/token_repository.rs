//! Port for access token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{TokenDigest, UserToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token repository adapters.
    pub enum TokenRepositoryError {
        Connection { message: String } => "token repository connection failed: {message}",
        Query { message: String } => "token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn store(&self, token: &UserToken) -> Result<(), TokenRepositoryError>;

    /// Find a token by digest that has not expired at `now`.
    async fn find_active(
        &self,
        digest: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<UserToken>, TokenRepositoryError>;

    /// Remove the token. Removing an unknown digest is not an error.
    async fn revoke(&self, digest: &TokenDigest) -> Result<(), TokenRepositoryError>;
}
