//! Configuration for the warehouse API

use core_config::{AppInfo, FromEnv, app_info, env_list, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use std::time::Duration;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub postgres: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
    /// Upper bound for the cleanup phase after a shutdown signal
    pub shutdown_timeout: Duration,
    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let postgres = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        let cors_origins = env_list("CORS_ALLOWED_ORIGIN", "http://localhost:3000");
        let shutdown_timeout = Duration::from_secs(env_parse("SHUTDOWN_TIMEOUT_SECS", "30")?);
        let run_migrations = env_parse("RUN_MIGRATIONS", "true")?;

        Ok(Self {
            app: app_info!(),
            postgres,
            server,
            environment,
            cors_origins,
            shutdown_timeout,
            run_migrations,
        })
    }
}
