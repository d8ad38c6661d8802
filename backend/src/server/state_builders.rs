//! Builds the handler state from Diesel repositories and domain services.

use std::sync::Arc;

use chrono::Duration;
use mockable::{Clock, DefaultClock};

use blog_backend::domain::{
    AuthService, AuthorService, CommentService, DEFAULT_TOKEN_TTL_HOURS, PostService, UserService,
};
use blog_backend::inbound::http::state::{AccountPorts, ContentPorts, HttpState};
use blog_backend::outbound::persistence::{
    DieselAuthorRepository, DieselCommentRepository, DieselPostRepository, DieselTokenRepository,
    DieselUserRepository,
};
use blog_backend::outbound::security::BcryptPasswordHasher;
use blog_backend::outbound::storage::CapStdAvatarStore;

use super::ServerConfig;

/// Repositories shared by the services. All of them hold the same pool.
struct Repositories {
    users: Arc<DieselUserRepository>,
    tokens: Arc<DieselTokenRepository>,
    posts: Arc<DieselPostRepository>,
    comments: Arc<DieselCommentRepository>,
    authors: Arc<DieselAuthorRepository>,
}

impl Repositories {
    fn from_config(config: &ServerConfig) -> Self {
        let pool = &config.db_pool;
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            tokens: Arc::new(DieselTokenRepository::new(pool.clone())),
            posts: Arc::new(DieselPostRepository::new(pool.clone())),
            comments: Arc::new(DieselCommentRepository::new(pool.clone())),
            authors: Arc::new(DieselAuthorRepository::new(pool.clone())),
        }
    }
}

fn build_account_ports(
    config: &ServerConfig,
    repos: &Repositories,
    clock: &Arc<dyn Clock>,
) -> std::io::Result<AccountPorts> {
    let hasher = Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost));
    let avatars = Arc::new(CapStdAvatarStore::open(&config.avatar_dir)?);

    let login = AuthService::new(
        Arc::clone(&repos.users),
        Arc::clone(&repos.tokens),
        Arc::clone(&hasher),
        Arc::clone(clock),
    )
    .with_token_ttl(
        Duration::try_hours(config.token_ttl_hours)
            .unwrap_or_else(|| Duration::hours(DEFAULT_TOKEN_TTL_HOURS)),
    );
    let users = Arc::new(UserService::new(
        Arc::clone(&repos.users),
        Arc::clone(&repos.posts),
        hasher,
        avatars,
        Arc::clone(clock),
    ));

    Ok(AccountPorts {
        login: Arc::new(login),
        commands: users.clone(),
        queries: users,
    })
}

fn build_content_ports(repos: &Repositories, clock: &Arc<dyn Clock>) -> ContentPorts {
    let posts = Arc::new(PostService::new(
        Arc::clone(&repos.posts),
        Arc::clone(&repos.authors),
        Arc::clone(clock),
    ));
    let comments = Arc::new(CommentService::new(
        Arc::clone(&repos.comments),
        Arc::clone(&repos.posts),
        Arc::clone(clock),
    ));
    let authors = Arc::new(AuthorService::new(Arc::clone(&repos.authors)));

    ContentPorts {
        post_commands: posts.clone(),
        posts,
        comment_commands: comments.clone(),
        comments,
        author_commands: authors.clone(),
        authors,
    }
}

/// Wire every driving port to its Diesel-backed service.
///
/// Fails only when the avatar directory cannot be created or opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repos = Repositories::from_config(config);
    let accounts = build_account_ports(config, &repos, &clock)?;
    let content = build_content_ports(&repos, &clock);
    Ok(HttpState::new(accounts, content))
}
