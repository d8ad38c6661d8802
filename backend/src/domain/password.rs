//! Plain-text passwords and their stored hashes.
//!
//! Plain text lives in a [`Zeroizing`] buffer and is never serialised.

use std::fmt;

use zeroize::Zeroizing;

/// Minimum password length.
pub const PASSWORD_MIN: usize = 6;

/// Password policy violations, reported in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordValidationError {
    TooShort { min: usize },
    MissingDigit,
    MissingLowercase,
    MissingUppercase,
    MissingSymbol,
}

impl fmt::Display for PasswordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => write!(f, "password must be at least {min} characters"),
            Self::MissingDigit => write!(f, "password must contain a digit"),
            Self::MissingLowercase => write!(f, "password must contain a lowercase letter"),
            Self::MissingUppercase => write!(f, "password must contain an uppercase letter"),
            Self::MissingSymbol => {
                write!(f, "password must contain a non-alphanumeric character")
            }
        }
    }
}

impl std::error::Error for PasswordValidationError {}

impl PasswordValidationError {
    pub fn code(self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too_short",
            Self::MissingDigit => "missing_digit",
            Self::MissingLowercase => "missing_lowercase",
            Self::MissingUppercase => "missing_uppercase",
            Self::MissingSymbol => "missing_symbol",
        }
    }
}

/// Password satisfying the account policy.
///
/// # Examples
/// ```
/// use blog_backend::domain::Password;
///
/// assert!(Password::new("Secr3t!").is_ok());
/// assert!(Password::new("secret").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(value: &str) -> Result<Self, PasswordValidationError> {
        if value.chars().count() < PASSWORD_MIN {
            return Err(PasswordValidationError::TooShort { min: PASSWORD_MIN });
        }
        if !value.chars().any(|ch| ch.is_ascii_digit()) {
            return Err(PasswordValidationError::MissingDigit);
        }
        if !value.chars().any(char::is_lowercase) {
            return Err(PasswordValidationError::MissingLowercase);
        }
        if !value.chars().any(char::is_uppercase) {
            return Err(PasswordValidationError::MissingUppercase);
        }
        if value.chars().all(char::is_alphanumeric) {
            return Err(PasswordValidationError::MissingSymbol);
        }
        Ok(Self(Zeroizing::new(value.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Opaque password hash as produced by the configured hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}
