//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hasher, avatar store) are implemented by
//! outbound adapters. Driving ports (commands, queries, login) are called by
//! inbound adapters and implemented by the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod author_command;
mod author_repository;
mod avatar_store;
mod comment_command;
mod comment_repository;
mod login_service;
mod password_hasher;
mod post_command;
mod post_repository;
mod token_repository;
mod user_command;
mod user_query;
mod user_repository;

#[cfg(test)]
pub use author_command::{MockAuthorCommand, MockAuthorQuery};
pub use author_command::{AuthorCommand, AuthorQuery};
#[cfg(test)]
pub use author_repository::MockAuthorRepository;
pub use author_repository::{AuthorRepository, AuthorRepositoryError};
#[cfg(test)]
pub use avatar_store::MockAvatarStore;
pub use avatar_store::{AvatarStore, AvatarStoreError, StoredAvatar};
#[cfg(test)]
pub use comment_command::{MockCommentCommand, MockCommentQuery};
pub use comment_command::{CommentCommand, CommentQuery};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginService, LoginSuccess};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use post_command::{MockPostCommand, MockPostQuery};
pub use post_command::{PostCommand, PostQuery};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
#[cfg(test)]
pub use token_repository::MockTokenRepository;
pub use token_repository::{TokenRepository, TokenRepositoryError};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::{RegisterUserRequest, UpdateProfileRequest, UserCommand};
#[cfg(test)]
pub use user_query::MockUserQuery;
pub use user_query::{UserPosts, UserQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
