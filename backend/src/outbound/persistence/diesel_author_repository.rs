//! PostgreSQL-backed `AuthorRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuthorRepository, AuthorRepositoryError};
use crate::domain::{Author, AuthorId, AuthorName, AuthorWebUrl};

use super::diesel_error_mapping::DbFailure;
use super::models::AuthorRow;
use super::pool::DbPool;
use super::schema::authors;

/// Diesel implementation of [`AuthorRepository`].
#[derive(Clone)]
pub struct DieselAuthorRepository {
    pool: DbPool,
}

impl DieselAuthorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> AuthorRepositoryError {
    match failure {
        DbFailure::Connection(message) => AuthorRepositoryError::connection(message),
        DbFailure::Query(message) => AuthorRepositoryError::query(message),
        DbFailure::Unique(_) | DbFailure::ForeignKey(_) => {
            AuthorRepositoryError::query("constraint violation")
        }
    }
}

fn map_diesel_error(error: DieselError) -> AuthorRepositoryError {
    map_failure(DbFailure::from(error))
}

fn author_to_row(author: &Author) -> AuthorRow {
    AuthorRow {
        id: *author.id().as_uuid(),
        name: author.name().as_ref().to_owned(),
        web_url: author.web_url().as_ref().to_owned(),
    }
}

fn row_to_author(row: AuthorRow) -> Result<Author, AuthorRepositoryError> {
    let invalid = |err: crate::domain::AuthorValidationError| {
        AuthorRepositoryError::query(format!("stored author is invalid: {err}"))
    };
    Ok(Author::new(
        AuthorId::from_uuid(row.id),
        AuthorName::new(row.name).map_err(invalid)?,
        AuthorWebUrl::new(row.web_url).map_err(invalid)?,
    ))
}

#[async_trait]
impl AuthorRepository for DieselAuthorRepository {
    async fn list(&self) -> Result<Vec<Author>, AuthorRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        authors::table
            .order((authors::name.asc(), authors::id.asc()))
            .select(AuthorRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(row_to_author)
            .collect()
    }

    async fn find_by_id(&self, id: &AuthorId) -> Result<Option<Author>, AuthorRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        authors::table
            .filter(authors::id.eq(id.as_uuid()))
            .select(AuthorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_author)
            .transpose()
    }

    async fn create(&self, author: &Author) -> Result<(), AuthorRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        diesel::insert_into(authors::table)
            .values(author_to_row(author))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, author: &Author) -> Result<(), AuthorRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let row = author_to_row(author);
        let updated = diesel::update(authors::table.filter(authors::id.eq(row.id)))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(AuthorRepositoryError::not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: &AuthorId) -> Result<(), AuthorRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let deleted = diesel::delete(authors::table.filter(authors::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(AuthorRepositoryError::not_found());
        }
        Ok(())
    }
}
