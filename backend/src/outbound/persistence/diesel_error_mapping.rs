//! Classification of Diesel failures shared by every repository.
//!
//! Repositories translate a [`DbFailure`] into their own port error, so the
//! constraint names from the migrations live in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

pub(crate) const USERS_EMAIL_KEY: &str = "users_normalized_email_key";
pub(crate) const USERS_USER_NAME_KEY: &str = "users_normalized_user_name_key";
pub(crate) const POSTS_AUTHOR_FKEY: &str = "posts_author_id_fkey";
pub(crate) const COMMENTS_POST_FKEY: &str = "comments_post_id_fkey";

/// A database failure reduced to what repositories act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// A unique constraint was violated; carries the constraint name if known.
    Unique(Option<String>),
    /// A foreign key constraint was violated.
    ForeignKey(Option<String>),
    Connection(String),
    Query(String),
}

impl DbFailure {
    /// Whether this is a violation of the named constraint.
    pub(crate) fn violates(&self, constraint: &str) -> bool {
        match self {
            Self::Unique(name) | Self::ForeignKey(name) => name.as_deref() == Some(constraint),
            Self::Connection(_) | Self::Query(_) => false,
        }
    }
}

impl From<PoolError> for DbFailure {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                Self::Connection(message)
            }
        }
    }
}

impl From<DieselError> for DbFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), constraint = info.constraint_name(), "diesel operation failed");
            }
            _ => debug!(%error, "diesel operation failed"),
        }
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Unique(info.constraint_name().map(str::to_owned))
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKey(info.constraint_name().map(str::to_owned))
            }
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}
