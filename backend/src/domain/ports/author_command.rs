//! Driving ports for authors.

use async_trait::async_trait;

use crate::domain::{Author, AuthorId, AuthorName, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorCommand: Send + Sync {
    async fn create(&self, name: AuthorName) -> Result<Author, Error>;

    /// Rename an author, re-deriving its web URL.
    async fn update(&self, id: &AuthorId, name: AuthorName) -> Result<Author, Error>;

    async fn delete(&self, id: &AuthorId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorQuery: Send + Sync {
    async fn list(&self) -> Result<Vec<Author>, Error>;

    async fn get(&self, id: &AuthorId) -> Result<Author, Error>;
}
