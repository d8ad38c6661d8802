//! PostgreSQL-backed `CommentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentBody, CommentId, PostId, UserId};

use super::diesel_error_mapping::{COMMENTS_POST_FKEY, DbFailure};
use super::models::CommentRow;
use super::pool::DbPool;
use super::schema::comments;

/// Diesel implementation of [`CommentRepository`].
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> CommentRepositoryError {
    if failure.violates(COMMENTS_POST_FKEY) {
        return CommentRepositoryError::post_not_found();
    }
    match failure {
        DbFailure::Connection(message) => CommentRepositoryError::connection(message),
        DbFailure::Query(message) => CommentRepositoryError::query(message),
        DbFailure::Unique(_) | DbFailure::ForeignKey(_) => {
            CommentRepositoryError::query("constraint violation")
        }
    }
}

fn map_diesel_error(error: DieselError) -> CommentRepositoryError {
    map_failure(DbFailure::from(error))
}

fn row_to_comment(row: CommentRow) -> Result<Comment, CommentRepositoryError> {
    let body = CommentBody::new(row.body)
        .map_err(|err| CommentRepositoryError::query(format!("stored comment is invalid: {err}")))?;
    Ok(Comment::new(
        CommentId::from_uuid(row.id),
        PostId::from_uuid(row.post_id),
        UserId::from_uuid(row.user_id),
        body,
        row.created_at,
    ))
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<(), CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let row = CommentRow {
            id: *comment.id().as_uuid(),
            post_id: *comment.post_id().as_uuid(),
            user_id: *comment.user_id().as_uuid(),
            body: comment.body().as_ref().to_owned(),
            created_at: comment.created_at(),
        };
        diesel::insert_into(comments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        comments::table
            .filter(comments::id.eq(id.as_uuid()))
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_comment)
            .transpose()
    }

    async fn list_for_post(&self, post_id: &PostId) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        comments::table
            .filter(comments::post_id.eq(post_id.as_uuid()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(row_to_comment)
            .collect()
    }

    async fn delete(&self, id: &CommentId) -> Result<(), CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let deleted = diesel::delete(comments::table.filter(comments::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(CommentRepositoryError::not_found());
        }
        Ok(())
    }
}
