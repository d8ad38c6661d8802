//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use blog_backend::domain::DEFAULT_TOKEN_TTL_HOURS;
use blog_backend::inbound::http::session_config::SessionSettings;
use blog_backend::outbound::persistence::DbPool;

/// Everything needed to wire adapters and start listening.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) avatar_dir: PathBuf,
    pub(crate) bcrypt_cost: u32,
    pub(crate) token_ttl_hours: i64,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        avatar_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool,
            avatar_dir,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub fn with_token_ttl_hours(mut self, hours: i64) -> Self {
        self.token_ttl_hours = hours;
        self
    }
}
