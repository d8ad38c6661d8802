//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuthorCommand, AuthorQuery, CommentCommand, CommentQuery, LoginService, PostCommand,
    PostQuery, UserCommand, UserQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub user_commands: Arc<dyn UserCommand>,
    pub users: Arc<dyn UserQuery>,
    pub post_commands: Arc<dyn PostCommand>,
    pub posts: Arc<dyn PostQuery>,
    pub comment_commands: Arc<dyn CommentCommand>,
    pub comments: Arc<dyn CommentQuery>,
    pub author_commands: Arc<dyn AuthorCommand>,
    pub authors: Arc<dyn AuthorQuery>,
}

/// Account-facing ports.
#[derive(Clone)]
pub struct AccountPorts {
    pub login: Arc<dyn LoginService>,
    pub commands: Arc<dyn UserCommand>,
    pub queries: Arc<dyn UserQuery>,
}

/// Content-facing ports: posts, comments and authors.
#[derive(Clone)]
pub struct ContentPorts {
    pub post_commands: Arc<dyn PostCommand>,
    pub posts: Arc<dyn PostQuery>,
    pub comment_commands: Arc<dyn CommentCommand>,
    pub comments: Arc<dyn CommentQuery>,
    pub author_commands: Arc<dyn AuthorCommand>,
    pub authors: Arc<dyn AuthorQuery>,
}

impl HttpState {
    /// Assemble the handler state from its two port bundles.
    pub fn new(accounts: AccountPorts, content: ContentPorts) -> Self {
        let AccountPorts {
            login,
            commands,
            queries,
        } = accounts;
        let ContentPorts {
            post_commands,
            posts,
            comment_commands,
            comments,
            author_commands,
            authors,
        } = content;
        Self {
            login,
            user_commands: commands,
            users: queries,
            post_commands,
            posts,
            comment_commands,
            comments,
            author_commands,
            authors,
        }
    }
}
