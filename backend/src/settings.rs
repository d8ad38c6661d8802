//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `BLOG_*` environment variables, an optional
//! configuration file and command-line flags, in increasing precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BCRYPT_COST: u32 = 12;
const DEFAULT_AVATAR_DIR: &str = "data/avatars";
/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Server and adapter settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOG")]
pub struct BlogSettings {
    /// Address to bind; defaults to all interfaces.
    pub host: Option<IpAddr>,
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// PostgreSQL connection string. Required to start the server.
    pub database_url: Option<String>,
    /// Directory avatar images are written to.
    pub avatar_dir: Option<PathBuf>,
    pub bcrypt_cost: Option<u32>,
    /// Lifetime of issued access tokens.
    pub token_ttl_hours: Option<i64>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

/// Raised when a setting the server cannot run without is absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required setting {name}")]
pub struct MissingSetting {
    pub name: &'static str,
}

impl BlogSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port,
        )
    }

    /// The database URL, which has no default.
    pub fn require_database_url(&self) -> Result<&str, MissingSetting> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(MissingSetting {
                name: "BLOG_DATABASE_URL",
            })
    }

    pub fn avatar_dir(&self) -> PathBuf {
        self.avatar_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AVATAR_DIR))
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST)
    }

    /// Token lifetime in hours, clamped to `1..=MAX_TOKEN_TTL_HOURS`.
    pub fn token_ttl_hours(&self) -> i64 {
        self.token_ttl_hours
            .unwrap_or(crate::domain::DEFAULT_TOKEN_TTL_HOURS)
            .clamp(1, MAX_TOKEN_TTL_HOURS)
    }
}
