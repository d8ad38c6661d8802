//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;

    /// Check a candidate password against a stored hash.
    ///
    /// Returns `Ok(false)` for a mismatch and reserves `Err` for hashes the
    /// adapter cannot interpret.
    async fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;
}
