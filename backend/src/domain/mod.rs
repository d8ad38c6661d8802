//! Domain primitives, aggregates and services.
//!
//! Value objects validate on construction and are immutable afterwards.
//! Services implement the driving ports declared in [`ports`] on top of the
//! driven ports implemented by outbound adapters.

pub mod auth;
pub mod auth_service;
pub mod author;
pub mod author_service;
pub mod avatar;
pub mod comment;
pub mod comment_service;
pub mod error;
pub mod identifier;
pub mod pagination;
pub mod password;
pub mod ports;
pub mod post;
pub mod post_service;
mod slug;
#[cfg(test)]
pub(crate) mod test_fixtures;
mod text;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::auth::{
    AccessToken, LoginCredentials, LoginValidationError, Principal, TokenDigest, UserToken,
};
pub use self::auth_service::{AuthService, DEFAULT_TOKEN_TTL_HOURS};
pub use self::author::{
    AUTHOR_NAME_MAX, Author, AuthorId, AuthorName, AuthorValidationError, AuthorWebUrl,
};
pub use self::author_service::AuthorService;
pub use self::avatar::{AVATAR_MAX_BYTES, AvatarFormat, AvatarImage, AvatarValidationError};
pub use self::comment::{
    COMMENT_BODY_MAX, Comment, CommentBody, CommentId, CommentValidationError,
};
pub use self::comment_service::CommentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifier::IdentifierError;
pub use self::pagination::{NegativeOffset, Offset, PAGE_SIZE, Page};
pub use self::password::{PASSWORD_MIN, Password, PasswordHash, PasswordValidationError};
pub use self::post::{
    POST_BODY_MAX, Post, PostBody, PostContent, PostId, PostValidationError, SUMMARY_MAX,
    Summary, TITLE_MAX, Title,
};
pub use self::post_service::PostService;
pub use self::trace_id::TraceId;
pub use self::user::{
    ConcurrencyStamp, EMAIL_MAX, Email, FIRST_NAME_MAX, FirstName, LAST_NAME_MAX, LastName, Role,
    USER_NAME_MAX, User, UserId, UserName, UserParts, UserProfile, UserValidationError,
};
pub use self::user_service::{UserService, avatar_url};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use blog_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
