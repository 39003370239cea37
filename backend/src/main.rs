//! Backend entry-point: loads settings, prepares the database, and serves
//! the REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use communalert::inbound::http::health::HealthState;
use communalert::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, AuthConfig, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::from_args(std::env::args_os())?;
    let database_url = settings.database_url()?;
    let auth = AuthConfig::from_settings(&settings)?;
    let bind_addr = settings.bind_addr()?;

    if settings.run_migrations() {
        run_pending_migrations(database_url)
            .await
            .wrap_err("database migrations failed")?;
    } else {
        info!("skipping migrations at startup");
    }

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .wrap_err("failed to create database pool")?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr, pool, auth).with_docs(settings.docs_enabled());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, docs = settings.docs_enabled(), "server listening");

    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("server terminated with an error")
}
