//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; repositories convert them to
//! domain types at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{authors, comments, posts, user_roles, user_tokens, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub concurrency_stamp: Uuid,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub normalized_email: String,
    pub user_name: &'a str,
    pub normalized_user_name: String,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub concurrency_stamp: Uuid,
    pub avatar_url: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Profile columns rewritten by an update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub user_name: &'a str,
    pub normalized_user_name: String,
    pub concurrency_stamp: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_roles)]
pub(crate) struct NewUserRoleRow {
    pub user_id: Uuid,
    pub role_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserTokenRow {
    pub user_id: Uuid,
    pub login_provider: String,
    pub name: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: Uuid,
    pub name: String,
    pub web_url: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Option<Uuid>,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content columns rewritten by a post update. `None` author ids are
/// written as NULL rather than skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PostUpdate<'a> {
    pub author_id: Option<Uuid>,
    pub title: &'a str,
    pub summary: &'a str,
    pub body: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
