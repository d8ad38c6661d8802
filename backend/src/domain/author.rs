//! Authors posts may be credited to.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::uuid_identifier;
use super::slug::{is_valid_slug, slugify};
use super::text::{TextIssue, check_bounded};

/// Maximum author name length.
pub const AUTHOR_NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorValidationError {
    EmptyName,
    NameTooLong { max: usize },
    /// The name holds no characters a web URL can be derived from.
    NameWithoutSlug,
    InvalidWebUrl,
}

impl fmt::Display for AuthorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "author name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "author name must be at most {max} characters")
            }
            Self::NameWithoutSlug => {
                write!(f, "author name must contain at least one letter or digit")
            }
            Self::InvalidWebUrl => write!(
                f,
                "web url may only contain lowercase letters, digits and single hyphens"
            ),
        }
    }
}

impl std::error::Error for AuthorValidationError {}

impl AuthorValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty",
            Self::NameTooLong { .. } => "too_long",
            Self::NameWithoutSlug => "no_slug",
            Self::InvalidWebUrl => "invalid_slug",
        }
    }
}

uuid_identifier!(
    /// Stable author identifier.
    AuthorId
);

/// Display name of an author, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(value: impl Into<String>) -> Result<Self, AuthorValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        check_bounded(trimmed, AUTHOR_NAME_MAX).map_err(|issue| match issue {
            TextIssue::Empty => AuthorValidationError::EmptyName,
            TextIssue::TooLong => AuthorValidationError::NameTooLong {
                max: AUTHOR_NAME_MAX,
            },
        })?;
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for AuthorName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AuthorName> for String {
    fn from(value: AuthorName) -> Self {
        value.0
    }
}

impl TryFrom<String> for AuthorName {
    type Error = AuthorValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Slug addressing an author's page.
///
/// # Examples
/// ```
/// use blog_backend::domain::{AuthorName, AuthorWebUrl};
///
/// let name = AuthorName::new("Ada Lovelace").unwrap();
/// let url = AuthorWebUrl::from_name(&name).unwrap();
/// assert_eq!(url.as_ref(), "ada-lovelace");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorWebUrl(String);

impl AuthorWebUrl {
    pub fn new(value: impl Into<String>) -> Result<Self, AuthorValidationError> {
        let value = value.into();
        if !is_valid_slug(&value) {
            return Err(AuthorValidationError::InvalidWebUrl);
        }
        Ok(Self(value))
    }

    pub fn from_name(name: &AuthorName) -> Result<Self, AuthorValidationError> {
        slugify(name.as_ref())
            .map(Self)
            .ok_or(AuthorValidationError::NameWithoutSlug)
    }
}

impl AsRef<str> for AuthorWebUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AuthorWebUrl> for String {
    fn from(value: AuthorWebUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for AuthorWebUrl {
    type Error = AuthorValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Author posts may be credited to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id: AuthorId,
    name: AuthorName,
    web_url: AuthorWebUrl,
}

impl Author {
    pub fn new(id: AuthorId, name: AuthorName, web_url: AuthorWebUrl) -> Self {
        Self { id, name, web_url }
    }

    /// A new author whose web URL is derived from `name`.
    pub fn create(name: AuthorName) -> Result<Self, AuthorValidationError> {
        let web_url = AuthorWebUrl::from_name(&name)?;
        Ok(Self::new(AuthorId::random(), name, web_url))
    }

    /// Rename, re-deriving the web URL.
    pub fn rename(self, name: AuthorName) -> Result<Self, AuthorValidationError> {
        let web_url = AuthorWebUrl::from_name(&name)?;
        Ok(Self::new(self.id, name, web_url))
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    pub fn name(&self) -> &AuthorName {
        &self.name
    }

    pub fn web_url(&self) -> &AuthorWebUrl {
        &self.web_url
    }
}
