pub mod health;
pub mod media;
pub mod toolkit;

use axum::Router;

use crate::state::AppState;

/// Build the job route tree (media and toolkit). Health and static
/// artifacts are mounted separately by the router builder.
pub fn job_routes() -> Router<AppState> {
    Router::new()
        .merge(media::router())
        .merge(toolkit::router())
}
