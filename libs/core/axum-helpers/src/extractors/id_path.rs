//! Integer id path parameter.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Positive integer id taken from the single path parameter.
///
/// ```ignore
/// async fn get_order(IdPath(id): IdPath) -> String {
///     format!("order {id}")
/// }
///
/// let app = Router::new().route("/orders/{id}", get(get_order));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;

        match raw.parse::<i32>() {
            Ok(id) if id >= 1 => Ok(IdPath(id)),
            _ => Err(AppError::InvalidId(format!(
                "Id must be a positive integer, got '{raw}'"
            ))),
        }
    }
}
