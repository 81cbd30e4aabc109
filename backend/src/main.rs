//! Backend entry-point: wires the REST API, adapters, and OpenAPI docs.

use std::env;
use std::net::SocketAddr;

use actix_web::web;
use mockable::DefaultEnv;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{ServerConfig, create_server};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

fn bind_addr_from_env() -> std::io::Result<SocketAddr> {
    let raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
    raw.parse()
        .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR {raw}: {err}")))
}

fn swap_webhook_from_env() -> std::io::Result<Option<Url>> {
    match env::var("SWAP_WEBHOOK_URL") {
        Ok(raw) => {
            let endpoint = Url::parse(&raw)
                .map_err(|err| std::io::Error::other(format!("invalid SWAP_WEBHOOK_URL: {err}")))?;
            Ok(Some(endpoint))
        }
        Err(_) => Ok(None),
    }
}

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

    let settings = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = bind_addr_from_env()?;

    let mut config = ServerConfig::new(
        settings.key,
        settings.cookie_secure,
        settings.same_site,
        bind_addr,
    );

    if let Some(endpoint) = swap_webhook_from_env()? {
        config = config.with_swap_webhook(endpoint);
    }

    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
            config = config.with_db_pool(pool);
            info!("persistence: PostgreSQL pool configured");
        }
        Err(_) => {
            warn!("DATABASE_URL not set; using in-memory repositories");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "server started");
    server.await
}
