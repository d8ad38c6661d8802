//! Port for author persistence.

use async_trait::async_trait;

use crate::domain::{Author, AuthorId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by author repository adapters.
    pub enum AuthorRepositoryError {
        Connection { message: String } => "author repository connection failed: {message}",
        Query { message: String } => "author repository query failed: {message}",
        NotFound => "author not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// All authors ordered by name.
    async fn list(&self) -> Result<Vec<Author>, AuthorRepositoryError>;

    async fn find_by_id(&self, id: &AuthorId) -> Result<Option<Author>, AuthorRepositoryError>;

    async fn create(&self, author: &Author) -> Result<(), AuthorRepositoryError>;

    async fn update(&self, author: &Author) -> Result<(), AuthorRepositoryError>;

    /// Delete the author; posts crediting it lose the reference.
    async fn delete(&self, id: &AuthorId) -> Result<(), AuthorRepositoryError>;
}
