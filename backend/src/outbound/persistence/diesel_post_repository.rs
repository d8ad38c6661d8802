//! PostgreSQL-backed `PostRepository`.
//!
//! Pages are ordered newest first with the id as a tie breaker so paging
//! stays stable when posts share a timestamp.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{
    AuthorId, Offset, Page, Post, PostBody, PostContent, PostId, Summary, Title, UserId,
};

use super::diesel_error_mapping::{DbFailure, POSTS_AUTHOR_FKEY};
use super::models::{PostRow, PostUpdate};
use super::pool::DbPool;
use super::schema::{comments, posts};

/// Diesel implementation of [`PostRepository`].
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> PostRepositoryError {
    if failure.violates(POSTS_AUTHOR_FKEY) {
        return PostRepositoryError::author_not_found();
    }
    match failure {
        DbFailure::Connection(message) => PostRepositoryError::connection(message),
        DbFailure::Query(message) => PostRepositoryError::query(message),
        DbFailure::Unique(_) | DbFailure::ForeignKey(_) => {
            PostRepositoryError::query("constraint violation")
        }
    }
}

fn map_diesel_error(error: DieselError) -> PostRepositoryError {
    map_failure(DbFailure::from(error))
}

fn post_to_row(post: &Post) -> PostRow {
    PostRow {
        id: *post.id().as_uuid(),
        user_id: *post.user_id().as_uuid(),
        author_id: post.author_id().map(|id| *id.as_uuid()),
        title: post.title().as_ref().to_owned(),
        summary: post.summary().as_ref().to_owned(),
        body: post.body().as_ref().to_owned(),
        created_at: post.created_at(),
        updated_at: post.updated_at(),
    }
}

fn row_to_post(row: PostRow) -> Result<Post, PostRepositoryError> {
    let invalid = |err: crate::domain::PostValidationError| {
        PostRepositoryError::query(format!("stored post is invalid: {err}"))
    };
    let content = PostContent {
        title: Title::new(row.title).map_err(invalid)?,
        summary: Summary::new(row.summary).map_err(invalid)?,
        body: PostBody::new(row.body).map_err(invalid)?,
        author_id: row.author_id.map(AuthorId::from_uuid),
    };
    Ok(Post::new(
        PostId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        content,
        row.created_at,
        row.updated_at,
    ))
}

fn rows_to_page(
    rows: Vec<PostRow>,
    offset: Offset,
    limit: i64,
    total: i64,
) -> Result<Page<Post>, PostRepositoryError> {
    let items = rows
        .into_iter()
        .map(row_to_post)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page::new(items, offset, limit, total))
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn create(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        diesel::insert_into(posts::table)
            .values(post_to_row(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        posts::table
            .filter(posts::id.eq(id.as_uuid()))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_post)
            .transpose()
    }

    async fn update(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let changes = PostUpdate {
            author_id: post.author_id().map(|id| *id.as_uuid()),
            title: post.title().as_ref(),
            summary: post.summary().as_ref(),
            body: post.body().as_ref(),
            updated_at: post.updated_at(),
        };
        let updated = diesel::update(posts::table.filter(posts::id.eq(post.id().as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PostRepositoryError::not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let post_id = *id.as_uuid();
        let deleted = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    diesel::delete(comments::table.filter(comments::post_id.eq(post_id)))
                        .execute(conn)
                        .await?;
                    diesel::delete(posts::table.filter(posts::id.eq(post_id)))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(PostRepositoryError::not_found());
        }
        Ok(())
    }

    async fn list(&self, offset: Offset, limit: i64) -> Result<Page<Post>, PostRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let total: i64 = posts::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = posts::table
            .order((posts::created_at.desc(), posts::id.desc()))
            .offset(offset.get())
            .limit(limit)
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_page(rows, offset, limit, total)
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        offset: Offset,
        limit: i64,
    ) -> Result<Page<Post>, PostRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let total: i64 = posts::table
            .filter(posts::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = posts::table
            .filter(posts::user_id.eq(user_id.as_uuid()))
            .order((posts::created_at.desc(), posts::id.desc()))
            .offset(offset.get())
            .limit(limit)
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_page(rows, offset, limit, total)
    }
}
