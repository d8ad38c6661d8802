//! UUID-backed entity identifiers.
//!
//! Every aggregate gets its own identifier type so a post id can never be
//! passed where a user id is expected.

use std::fmt;

/// Errors returned when parsing an identifier from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierError {
    Empty,
    Invalid,
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier must not be empty"),
            Self::Invalid => write!(f, "identifier must be a valid UUID"),
        }
    }
}

impl std::error::Error for IdentifierError {}

pub(crate) fn parse_uuid(raw: &str) -> Result<uuid::Uuid, IdentifierError> {
    if raw.trim().is_empty() {
        return Err(IdentifierError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdentifierError::Invalid);
    }
    uuid::Uuid::parse_str(raw).map_err(|_| IdentifierError::Invalid)
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Validate and parse an identifier from text.
            pub fn new(
                raw: impl AsRef<str>,
            ) -> Result<Self, $crate::domain::identifier::IdentifierError> {
                $crate::domain::identifier::parse_uuid(raw.as_ref()).map(Self)
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            pub fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::identifier::IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::identifier::IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

pub(crate) use uuid_identifier;
