//! JSON request bodies that fail as envelope errors.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use tracing::debug;

use enghub_core::error::AppError;

/// Like [`axum::Json`], but a missing content type, malformed JSON or a
/// mistyped field is rejected with [`AppError::invalid_argument`] so the
/// response body stays an envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_error(rejection)),
        }
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    debug!(status = %rejection.status(), "Rejected request body");
    AppError::invalid_argument(format!("Invalid request body: {}", rejection.body_text()))
}
