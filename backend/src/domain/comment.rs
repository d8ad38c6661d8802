//! Comments left on posts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifier::uuid_identifier;
use super::post::PostId;
use super::text::{TextIssue, check_bounded};
use super::user::UserId;

/// Maximum comment length.
pub const COMMENT_BODY_MAX: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    EmptyBody,
    BodyTooLong { max: usize },
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "comment must not be empty"),
            Self::BodyTooLong { max } => write!(f, "comment must be at most {max} characters"),
        }
    }
}

impl std::error::Error for CommentValidationError {}

impl CommentValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyBody => "empty",
            Self::BodyTooLong { .. } => "too_long",
        }
    }
}

uuid_identifier!(
    /// Stable comment identifier.
    CommentId
);

/// Comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentBody(String);

impl CommentBody {
    pub fn new(value: impl Into<String>) -> Result<Self, CommentValidationError> {
        let value = value.into();
        check_bounded(&value, COMMENT_BODY_MAX).map_err(|issue| match issue {
            TextIssue::Empty => CommentValidationError::EmptyBody,
            TextIssue::TooLong => CommentValidationError::BodyTooLong {
                max: COMMENT_BODY_MAX,
            },
        })?;
        Ok(Self(value))
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CommentBody> for String {
    fn from(value: CommentBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentBody {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Comment on a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: CommentId,
    post_id: PostId,
    user_id: UserId,
    body: CommentBody,
    created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        id: CommentId,
        post_id: PostId,
        user_id: UserId,
        body: CommentBody,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post_id,
            user_id,
            body,
            created_at,
        }
    }

    pub fn id(&self) -> CommentId {
        self.id
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn body(&self) -> &CommentBody {
        &self.body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
