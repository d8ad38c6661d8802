//! Authentication primitives: login credentials, access tokens and the
//! principal attached to authenticated requests.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::{Email, Role, UserId, UserValidationError};

/// Number of random bytes in an access token.
pub const ACCESS_TOKEN_BYTES: usize = 32;
/// Login provider recorded for tokens issued by the password flow.
pub const LOCAL_LOGIN_PROVIDER: &str = "local";
/// Token name recorded for access tokens.
pub const ACCESS_TOKEN_NAME: &str = "access_token";

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    Email(UserValidationError),
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// Only the shape is checked here; the password policy applies at
/// registration, not at sign-in.
///
/// # Examples
/// ```
/// use blog_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.org ", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.org");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email).map_err(LoginValidationError::Email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Opaque bearer token handed to clients. Only its digest is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Generate a token from [`ACCESS_TOKEN_BYTES`] random bytes, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; ACCESS_TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(bytes.as_mut_slice());
        Self(Zeroizing::new(hex::encode(bytes.as_slice())))
    }

    /// Wrap a token presented by a client.
    pub fn from_presented(value: &str) -> Option<Self> {
        let value = value.trim();
        (!value.is_empty()).then(|| Self(Zeroizing::new(value.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Hex-encoded SHA-256 digest of an [`AccessToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Rehydrate a digest read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Persisted token record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserToken {
    pub user_id: UserId,
    pub login_provider: String,
    pub name: String,
    pub digest: TokenDigest,
    pub expires_at: DateTime<Utc>,
}

impl UserToken {
    /// Record for an access token issued by the password flow.
    pub fn access(user_id: UserId, digest: TokenDigest, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            login_provider: LOCAL_LOGIN_PROVIDER.to_owned(),
            name: ACCESS_TOKEN_NAME.to_owned(),
            digest,
            expires_at,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Whether this principal may act on a resource owned by `owner`.
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.user_id == owner || self.is_admin()
    }
}
