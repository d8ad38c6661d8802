//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; repositories hand domain types across the port boundary
//! and translate database failures into port errors.
//!
//! ```ignore
//! use blog_backend::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/blog")).await?;
//! let posts = DieselPostRepository::new(pool);
//! ```

mod diesel_author_repository;
mod diesel_comment_repository;
mod diesel_error_mapping;
mod diesel_post_repository;
mod diesel_token_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_author_repository::DieselAuthorRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_token_repository::DieselTokenRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
