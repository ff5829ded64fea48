//! Route definitions for the toolkit utilities.

use axum::routing::get;
use axum::Router;

use crate::handlers::toolkit;
use crate::state::AppState;

/// Toolkit routes, mounted at the root.
///
/// ```text
/// GET|POST  /authenticate              -> authenticate
/// GET|POST  /v1/toolkit/authenticate   -> toolkit_authenticate
/// GET|POST  /v1/toolkit/test           -> toolkit_test (requires X-API-Key)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/authenticate",
            get(toolkit::authenticate).post(toolkit::authenticate),
        )
        .route(
            "/v1/toolkit/authenticate",
            get(toolkit::toolkit_authenticate).post(toolkit::toolkit_authenticate),
        )
        .route(
            "/v1/toolkit/test",
            get(toolkit::toolkit_test).post(toolkit::toolkit_test),
        )
}
