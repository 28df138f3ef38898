//! Warehouse API - REST server for products and orders

use axum_helpers::{close_postgres, create_production_app, create_router, health_router, parse_origins};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config_with_retry, run_migrations};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        environment = ?config.environment,
        "Starting warehouse API"
    );

    let db = connect_from_config_with_retry(config.postgres.clone(), None).await?;
    info!("Connected to PostgreSQL");

    if config.run_migrations {
        run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    }

    let state = AppState {
        config: config.clone(),
        db,
    };

    let cors_origins = parse_origins(&state.config.cors_origins)?;
    let app = create_router::<openapi::ApiDoc>(api::routes(&state), cors_origins)
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()));

    info!(port = state.config.server.port, "Serving REST API");

    let db = state.db.clone();
    create_production_app(
        app,
        &state.config.server,
        state.config.shutdown_timeout,
        async move {
            close_postgres(db, "warehouse").await;
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Warehouse API shutdown complete");
    Ok(())
}
