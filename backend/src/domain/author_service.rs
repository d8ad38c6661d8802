//! Author services.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{AuthorCommand, AuthorQuery, AuthorRepository, AuthorRepositoryError};
use crate::domain::{Author, AuthorId, AuthorName, AuthorValidationError, Error};

pub(crate) fn map_author_repository_error(error: AuthorRepositoryError) -> Error {
    match error {
        AuthorRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("author repository unavailable: {message}"))
        }
        AuthorRepositoryError::Query { message } => {
            Error::internal(format!("author repository error: {message}"))
        }
        AuthorRepositoryError::NotFound => Error::not_found("author not found"),
    }
}

fn map_validation_error(error: &AuthorValidationError) -> Error {
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": "name", "code": error.code() }))
}

/// Author service implementing the author driving ports.
#[derive(Clone)]
pub struct AuthorService<A> {
    authors: Arc<A>,
}

impl<A> AuthorService<A> {
    pub fn new(authors: Arc<A>) -> Self {
        Self { authors }
    }
}

impl<A> AuthorService<A>
where
    A: AuthorRepository,
{
    async fn load(&self, id: &AuthorId) -> Result<Author, Error> {
        self.authors
            .find_by_id(id)
            .await
            .map_err(map_author_repository_error)?
            .ok_or_else(|| Error::not_found(format!("author {id} not found")))
    }
}

#[async_trait]
impl<A> AuthorCommand for AuthorService<A>
where
    A: AuthorRepository,
{
    async fn create(&self, name: AuthorName) -> Result<Author, Error> {
        let author = Author::create(name).map_err(|err| map_validation_error(&err))?;
        self.authors
            .create(&author)
            .await
            .map_err(map_author_repository_error)?;
        info!(author_id = %author.id(), web_url = author.web_url().as_ref(), "created author");
        Ok(author)
    }

    async fn update(&self, id: &AuthorId, name: AuthorName) -> Result<Author, Error> {
        let author = self
            .load(id)
            .await?
            .rename(name)
            .map_err(|err| map_validation_error(&err))?;
        self.authors
            .update(&author)
            .await
            .map_err(map_author_repository_error)?;
        info!(author_id = %id, "renamed author");
        Ok(author)
    }

    async fn delete(&self, id: &AuthorId) -> Result<(), Error> {
        self.authors
            .delete(id)
            .await
            .map_err(map_author_repository_error)?;
        info!(author_id = %id, "deleted author");
        Ok(())
    }
}

#[async_trait]
impl<A> AuthorQuery for AuthorService<A>
where
    A: AuthorRepository,
{
    async fn list(&self) -> Result<Vec<Author>, Error> {
        self.authors
            .list()
            .await
            .map_err(map_author_repository_error)
    }

    async fn get(&self, id: &AuthorId) -> Result<Author, Error> {
        self.load(id).await
    }
}
