//! Handlers for the toolkit routes. They always bypass the queue.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::engine::job::Operation;
use crate::middleware::auth::{has_valid_api_key, RequireApiKey};
use crate::middleware::payload::RawPayload;
use crate::operations::toolkit::{Authenticate, ToolkitTest};
use crate::state::AppState;

async fn dispatch_inline(state: &AppState, payload: RawPayload, operation: Arc<dyn Operation>) -> Response {
    let (envelope, status) = state.dispatcher.dispatch(payload.0, true, operation).await;
    (status, Json(envelope)).into_response()
}

async fn check_key(endpoint: &'static str, state: &AppState, headers: &HeaderMap, payload: RawPayload) -> Response {
    let operation = Authenticate {
        endpoint,
        authorized: has_valid_api_key(headers, &state.config.api_key),
    };
    dispatch_inline(state, payload, Arc::new(operation)).await
}

/// GET|POST /authenticate
///
/// Answers `200 Authorized` or `401 Unauthorized` in a regular envelope
/// instead of rejecting the request.
pub async fn authenticate(State(state): State<AppState>, headers: HeaderMap, payload: RawPayload) -> Response {
    check_key("/authenticate", &state, &headers, payload).await
}

/// GET|POST /v1/toolkit/authenticate
pub async fn toolkit_authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: RawPayload,
) -> Response {
    check_key("/v1/toolkit/authenticate", &state, &headers, payload).await
}

/// GET|POST /v1/toolkit/test
pub async fn toolkit_test(_auth: RequireApiKey, State(state): State<AppState>, payload: RawPayload) -> Response {
    dispatch_inline(&state, payload, Arc::new(ToolkitTest)).await
}
