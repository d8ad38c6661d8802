//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use std::sync::Arc;

use super::state::{AccountPorts, ContentPorts, HttpState};
use crate::domain::ports::{
    MockAuthorCommand, MockAuthorQuery, MockCommentCommand, MockCommentQuery, MockLoginService,
    MockPostCommand, MockPostQuery, MockUserCommand, MockUserQuery,
};

/// Build a session middleware configured for tests.
///
/// Uses a fresh key per call, the `session` cookie name and no `Secure` flag
/// so plain HTTP test requests carry the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Mock driving ports; unset expectations panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub user_commands: MockUserCommand,
    pub users: MockUserQuery,
    pub post_commands: MockPostCommand,
    pub posts: MockPostQuery,
    pub comment_commands: MockCommentCommand,
    pub comments: MockCommentQuery,
    pub author_commands: MockAuthorCommand,
    pub authors: MockAuthorQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            AccountPorts {
                login: Arc::new(self.login),
                commands: Arc::new(self.user_commands),
                queries: Arc::new(self.users),
            },
            ContentPorts {
                post_commands: Arc::new(self.post_commands),
                posts: Arc::new(self.posts),
                comment_commands: Arc::new(self.comment_commands),
                comments: Arc::new(self.comments),
                author_commands: Arc::new(self.author_commands),
                authors: Arc::new(self.authors),
            },
        )
    }
}
