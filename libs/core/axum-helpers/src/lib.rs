//! # Axum Helpers
//!
//! HTTP glue shared by the warehouse API:
//!
//! - **[`errors`]**: [`AppError`] and the JSON error body with [`ErrorCode`]s
//! - **[`extractors`]**: [`IdPath`], [`ValidatedJson`], [`ValidatedQuery`]
//! - **[`http`]**: CORS and security header middleware
//! - **[`server`]**: router assembly with OpenAPI docs, health/readiness, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{IdPath, ValidatedJson, ValidatedQuery};
pub use http::{create_cors_layer, parse_origins, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};
