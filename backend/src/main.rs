//! Backend entry-point: loads settings, migrates the database and serves
//! the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use blog_backend::inbound::http::health::HealthState;
use blog_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use blog_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use blog_backend::settings::BlogSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = BlogSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let database_url = settings
        .require_database_url()
        .map_err(std::io::Error::other)?
        .to_owned();
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(std::io::Error::other)?;

    run_migrations(&database_url)
        .await
        .map_err(std::io::Error::other)?;

    let mut pool_config = PoolConfig::new(database_url);
    if let Some(max) = settings.db_max_connections {
        pool_config = pool_config.with_max_size(max);
    }
    let pool = DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)?;

    let bind_addr = settings.bind_addr();
    let config = ServerConfig::new(session, bind_addr, pool, settings.avatar_dir())
        .with_bcrypt_cost(settings.bcrypt_cost())
        .with_token_ttl_hours(settings.token_ttl_hours());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "blog backend listening");
    server.await
}
