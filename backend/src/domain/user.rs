//! User account model and its value objects.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identifier::uuid_identifier;
use super::password::PasswordHash;
use super::text::{TextIssue, check_bounded};

/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 255;
/// Maximum length of a first name.
pub const FIRST_NAME_MAX: usize = 50;
/// Maximum length of a last name.
pub const LAST_NAME_MAX: usize = 50;
/// Maximum length of a user name. Shares the email limit so an email can
/// double as a user name.
pub const USER_NAME_MAX: usize = EMAIL_MAX;

/// Validation errors raised by the user value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
    EmptyFirstName,
    FirstNameTooLong { max: usize },
    EmptyLastName,
    LastNameTooLong { max: usize },
    EmptyUserName,
    UserNameTooLong { max: usize },
    UserNameInvalidCharacters,
    UnknownRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::FirstNameTooLong { max } => {
                write!(f, "first name must be at most {max} characters")
            }
            Self::EmptyLastName => write!(f, "last name must not be empty"),
            Self::LastNameTooLong { max } => {
                write!(f, "last name must be at most {max} characters")
            }
            Self::EmptyUserName => write!(f, "user name must not be empty"),
            Self::UserNameTooLong { max } => {
                write!(f, "user name must be at most {max} characters")
            }
            Self::UserNameInvalidCharacters => write!(
                f,
                "user name may only contain letters, digits and the characters - . _ @ +",
            ),
            Self::UnknownRole => write!(f, "role must be one of author or admin"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Stable snake_case code reported to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::EmptyFirstName | Self::EmptyLastName | Self::EmptyUserName => {
                "empty"
            }
            Self::EmailTooLong { .. }
            | Self::FirstNameTooLong { .. }
            | Self::LastNameTooLong { .. }
            | Self::UserNameTooLong { .. } => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::UserNameInvalidCharacters => "invalid_characters",
            Self::UnknownRole => "unknown_role",
        }
    }
}

uuid_identifier!(
    /// Stable user identifier.
    UserId
);

macro_rules! string_value {
    ($name:ident) => {
        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

/// Email address used to sign in.
///
/// ## Invariants
/// - Stored trimmed and at most [`EMAIL_MAX`] characters, both as given and
///   once normalised.
/// - Exactly one `@` with a non-empty local part; the domain contains a dot
///   that neither starts nor ends it.
///
/// # Examples
/// ```
/// use blog_backend::domain::Email;
///
/// let email = Email::new(" ada@example.org ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.org");
/// assert_eq!(email.normalized(), "ADA@EXAMPLE.ORG");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        check_bounded(trimmed, EMAIL_MAX).map_err(|issue| match issue {
            TextIssue::Empty => UserValidationError::EmptyEmail,
            TextIssue::TooLong => UserValidationError::EmailTooLong { max: EMAIL_MAX },
        })?;
        if !is_plausible_email(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        // Upper-casing can expand characters (ß becomes SS); the stored
        // normalised form shares the column limit.
        if trimmed.to_uppercase().chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Upper-case form used for uniqueness checks.
    pub fn normalized(&self) -> String {
        self.0.to_uppercase()
    }
}

fn is_plausible_email(value: &str) -> bool {
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

string_value!(Email);

/// Given name shown on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FirstName(String);

impl FirstName {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        check_bounded(trimmed, FIRST_NAME_MAX).map_err(|issue| match issue {
            TextIssue::Empty => UserValidationError::EmptyFirstName,
            TextIssue::TooLong => UserValidationError::FirstNameTooLong {
                max: FIRST_NAME_MAX,
            },
        })?;
        Ok(Self(trimmed.to_owned()))
    }
}

string_value!(FirstName);

/// Family name shown on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LastName(String);

impl LastName {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        check_bounded(trimmed, LAST_NAME_MAX).map_err(|issue| match issue {
            TextIssue::Empty => UserValidationError::EmptyLastName,
            TextIssue::TooLong => UserValidationError::LastNameTooLong { max: LAST_NAME_MAX },
        })?;
        Ok(Self(trimmed.to_owned()))
    }
}

string_value!(LastName);

/// Public handle, unique across users ignoring case.
///
/// # Examples
/// ```
/// use blog_backend::domain::UserName;
///
/// assert!(UserName::new("ada.lovelace+blog").is_ok());
/// assert!(UserName::new("ada lovelace").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        check_bounded(&value, USER_NAME_MAX).map_err(|issue| match issue {
            TextIssue::Empty => UserValidationError::EmptyUserName,
            TextIssue::TooLong => UserValidationError::UserNameTooLong {
                max: USER_NAME_MAX,
            },
        })?;
        if !value.chars().all(is_user_name_char) {
            return Err(UserValidationError::UserNameInvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Upper-case form used for uniqueness checks.
    pub fn normalized(&self) -> String {
        self.0.to_uppercase()
    }
}

fn is_user_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | '@' | '+')
}

string_value!(UserName);

/// Random token regenerated on every profile change.
///
/// Updates carry the stamp they were based on; a mismatch means someone else
/// changed the row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConcurrencyStamp(Uuid);

impl ConcurrencyStamp {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConcurrencyStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorisation role attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Granted to everyone at registration.
    Author,
    /// May edit and delete any post or comment.
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author" => Ok(Self::Author),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: FirstName,
    pub last_name: LastName,
    pub user_name: UserName,
}

/// Validated components used to assemble a [`User`].
#[derive(Debug, Clone)]
pub struct UserParts {
    pub id: UserId,
    pub email: Email,
    pub profile: UserProfile,
    pub password_hash: PasswordHash,
    pub concurrency_stamp: ConcurrencyStamp,
    pub avatar_url: Option<String>,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

/// Registered account.
///
/// ## Invariants
/// - `roles` holds no duplicates.
/// - Every profile change produces a new `concurrency_stamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    profile: UserProfile,
    password_hash: PasswordHash,
    concurrency_stamp: ConcurrencyStamp,
    avatar_url: Option<String>,
    roles: Vec<Role>,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn from_parts(parts: UserParts) -> Self {
        let UserParts {
            id,
            email,
            profile,
            password_hash,
            concurrency_stamp,
            avatar_url,
            mut roles,
            created_at,
        } = parts;
        roles.sort_by_key(|role| role.as_str());
        roles.dedup();
        Self {
            id,
            email,
            profile,
            password_hash,
            concurrency_stamp,
            avatar_url,
            roles,
            created_at,
        }
    }

    /// A freshly registered author.
    pub fn register(
        email: Email,
        profile: UserProfile,
        password_hash: PasswordHash,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::from_parts(UserParts {
            id: UserId::random(),
            email,
            profile,
            password_hash,
            concurrency_stamp: ConcurrencyStamp::random(),
            avatar_url: None,
            roles: vec![Role::Author],
            created_at,
        })
    }

    /// Replace the editable fields, rotating the concurrency stamp.
    #[must_use]
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self.concurrency_stamp = ConcurrencyStamp::random();
        self
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn first_name(&self) -> &FirstName {
        &self.profile.first_name
    }

    pub fn last_name(&self) -> &LastName {
        &self.profile.last_name
    }

    pub fn user_name(&self) -> &UserName {
        &self.profile.user_name
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn concurrency_stamp(&self) -> ConcurrencyStamp {
        self.concurrency_stamp
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
