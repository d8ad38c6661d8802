//! bcrypt implementation of the `PasswordHasher` port.
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

/// Hashes passwords with bcrypt at a fixed cost factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Lowest and highest cost factors bcrypt accepts.
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;

    /// Use `cost`, clamped into the range bcrypt accepts.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(Self::MIN_COST, Self::MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

fn join_error(error: &tokio::task::JoinError) -> PasswordHasherError {
    PasswordHasherError::hashing(format!("hashing task aborted: {error}"))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let cost = self.cost;
        let secret = Zeroizing::new(password.expose().to_owned());
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(secret.as_str(), cost))
            .await
            .map_err(|err| join_error(&err))?
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(hashed))
    }

    async fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let candidate = Zeroizing::new(candidate.to_owned());
        let stored = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(candidate.as_str(), &stored))
            .await
            .map_err(|err| join_error(&err))?
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }
}
