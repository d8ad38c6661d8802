//! Blog posts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::author::AuthorId;
use super::identifier::uuid_identifier;
use super::text::{TextIssue, check_bounded};
use super::user::UserId;

/// Maximum title length.
pub const TITLE_MAX: usize = 200;
/// Maximum summary length.
pub const SUMMARY_MAX: usize = 255;
/// Maximum body length.
pub const POST_BODY_MAX: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptySummary,
    SummaryTooLong { max: usize },
    EmptyBody,
    BodyTooLong { max: usize },
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptySummary => write!(f, "summary must not be empty"),
            Self::SummaryTooLong { max } => {
                write!(f, "summary must be at most {max} characters")
            }
            Self::EmptyBody => write!(f, "body must not be empty"),
            Self::BodyTooLong { max } => write!(f, "body must be at most {max} characters"),
        }
    }
}

impl std::error::Error for PostValidationError {}

impl PostValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptySummary | Self::SummaryTooLong { .. } => "summary",
            Self::EmptyBody | Self::BodyTooLong { .. } => "body",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::EmptySummary | Self::EmptyBody => "empty",
            Self::TitleTooLong { .. } | Self::SummaryTooLong { .. } | Self::BodyTooLong { .. } => {
                "too_long"
            }
        }
    }
}

uuid_identifier!(
    /// Stable post identifier.
    PostId
);

/// Post headline, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    pub fn new(value: impl Into<String>) -> Result<Self, PostValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        check_bounded(trimmed, TITLE_MAX).map_err(|issue| match issue {
            TextIssue::Empty => PostValidationError::EmptyTitle,
            TextIssue::TooLong => PostValidationError::TitleTooLong { max: TITLE_MAX },
        })?;
        Ok(Self(trimmed.to_owned()))
    }
}

/// Short teaser shown in listings. Kept verbatim, surrounding whitespace
/// included.
///
/// # Examples
/// ```
/// use blog_backend::domain::Summary;
///
/// assert_eq!(Summary::new(" teaser ").unwrap().as_ref(), " teaser ");
/// assert!(Summary::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Summary(String);

impl Summary {
    pub fn new(value: impl Into<String>) -> Result<Self, PostValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(PostValidationError::EmptySummary);
        }
        if value.chars().count() > SUMMARY_MAX {
            return Err(PostValidationError::SummaryTooLong { max: SUMMARY_MAX });
        }
        Ok(Self(value))
    }
}

/// Post content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostBody(String);

impl PostBody {
    pub fn new(value: impl Into<String>) -> Result<Self, PostValidationError> {
        let value = value.into();
        check_bounded(&value, POST_BODY_MAX).map_err(|issue| match issue {
            TextIssue::Empty => PostValidationError::EmptyBody,
            TextIssue::TooLong => PostValidationError::BodyTooLong { max: POST_BODY_MAX },
        })?;
        Ok(Self(value))
    }
}

macro_rules! post_text {
    ($($name:ident),*) => {
        $(
            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl TryFrom<String> for $name {
                type Error = PostValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }
        )*
    };
}

post_text!(Title, Summary, PostBody);

/// Writable post fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: Title,
    pub summary: Summary,
    pub body: PostBody,
    pub author_id: Option<AuthorId>,
}

/// Published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    user_id: UserId,
    content: PostContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        id: PostId,
        user_id: UserId,
        content: PostContent,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            content,
            created_at,
            updated_at,
        }
    }

    /// A new post written by `user_id` at `now`.
    pub fn draft(user_id: UserId, content: PostContent, now: DateTime<Utc>) -> Self {
        Self::new(PostId::random(), user_id, content, now, now)
    }

    /// Replace the content and bump `updated_at`.
    #[must_use]
    pub fn revise(mut self, content: PostContent, now: DateTime<Utc>) -> Self {
        self.content = content;
        self.updated_at = now;
        self
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn author_id(&self) -> Option<AuthorId> {
        self.content.author_id
    }

    pub fn title(&self) -> &Title {
        &self.content.title
    }

    pub fn summary(&self) -> &Summary {
        &self.content.summary
    }

    pub fn body(&self) -> &PostBody {
        &self.content.body
    }

    pub fn content(&self) -> &PostContent {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
