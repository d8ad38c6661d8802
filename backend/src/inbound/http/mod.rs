//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod authors;
pub mod comments;
pub mod error;
pub mod health;
pub mod posts;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal user routes are registered ahead of `/users/{id}` so they are
/// never captured as identifiers.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(users::register)
        .service(users::user_name_available)
        .service(users::user_posts)
        .service(users::upload_avatar)
        .service(users::get_avatar)
        .service(users::get_user)
        .service(users::update_user)
        .service(posts::list_posts)
        .service(posts::create_post)
        .service(comments::list_comments)
        .service(comments::create_comment)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post)
        .service(comments::get_comment)
        .service(comments::delete_comment)
        .service(authors::list_authors)
        .service(authors::create_author)
        .service(authors::get_author)
        .service(authors::update_author)
        .service(authors::delete_author);
}
