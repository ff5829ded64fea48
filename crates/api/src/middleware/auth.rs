//! API-key authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use mediakit_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the request carried the configured API key.
///
/// Put it first in a handler's argument list so authentication runs before
/// the body is read:
///
/// ```ignore
/// async fn my_handler(_auth: RequireApiKey, State(state): State<AppState>) -> impl IntoResponse {
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(key) = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
        else {
            tracing::warn!(path = %parts.uri.path(), "Missing API key in request");
            return Err(AppError::Core(CoreError::Unauthorized(
                "API key is required".into(),
            )));
        };

        if key != state.config.api_key {
            tracing::warn!(path = %parts.uri.path(), "Invalid API key provided");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid API key".into(),
            )));
        }

        Ok(RequireApiKey)
    }
}

/// Whether `headers` carry exactly the `expected` key.
pub fn has_valid_api_key(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == expected)
}
