//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] lists every `/api/v1` handler, the health probes and the
//! request and response bodies they use. Swagger UI serves it in debug
//! builds and `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::authors::{AuthorRequest, AuthorResponse};
use crate::inbound::http::comments::{CommentRequest, CommentResponse};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::posts::{PostPageResponse, PostRequest, PostResponse};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::users::{
    AvatarUpload, LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest,
    UserPostResponse, UserResponse,
};

/// Adds the two accepted authentication schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Encrypted session cookie issued by POST /api/v1/users/login.",
            ))),
        );
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Opaque access token returned by login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    security(("SessionCookie" = []), ("BearerToken" = [])),
    info(
        title = "Blog backend API",
        description = "Accounts, posts, comments and authors for a blogging platform.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::user_name_available,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::upload_avatar,
        crate::inbound::http::users::get_avatar,
        crate::inbound::http::users::user_posts,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::create_comment,
        crate::inbound::http::comments::get_comment,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::authors::list_authors,
        crate::inbound::http::authors::get_author,
        crate::inbound::http::authors::create_author,
        crate::inbound::http::authors::update_author,
        crate::inbound::http::authors::delete_author,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        LoginResponse,
        AvatarUpload,
        RegisterRequest,
        UpdateUserRequest,
        UserResponse,
        UserPostResponse,
        PostRequest,
        PostResponse,
        PostPageResponse,
        CommentRequest,
        CommentResponse,
        AuthorRequest,
        AuthorResponse,
        ProbeStatus,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and avatars"),
        (name = "posts", description = "Blog posts"),
        (name = "comments", description = "Comments on posts"),
        (name = "authors", description = "Authors posts may be credited to"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
