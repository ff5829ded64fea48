#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use mediakit_api::config::ServerConfig;
use mediakit_api::engine::worker::Worker;
use mediakit_api::router::build_app_router;
use mediakit_api::state::AppState;

pub const TEST_API_KEY: &str = "test-api-key";

/// Build a test `ServerConfig` with safe defaults and the given directories.
pub fn test_config(max_queue_length: usize, scratch: PathBuf, uploads: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_key: TEST_API_KEY.to_string(),
        max_queue_length,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        webhook_timeout_secs: 5,
        storage_path: scratch,
        local_storage_path: uploads,
        temp_file_max_age_secs: 3600,
    }
}

/// The full application plus the pieces tests need to reach into.
///
/// The worker is returned unstarted. Keeping it (started or not) alive
/// keeps the queue open; dropping it closes the queue.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub worker: Option<Worker>,
    pub scratch: TempDir,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Spawn the worker so queued jobs actually run.
    pub fn start_worker(&mut self) -> tokio_util::sync::CancellationToken {
        let cancel = tokio_util::sync::CancellationToken::new();
        let worker = self.worker.take().expect("worker already started");
        tokio::spawn(worker.run(cancel.clone()));
        cancel
    }
}

/// Build the full application router with all middleware layers.
///
/// This goes through the same builder as `main.rs` so integration tests
/// exercise the production middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery).
pub fn build_test_app(max_queue_length: usize) -> TestApp {
    let scratch = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let config = test_config(
        max_queue_length,
        scratch.path().to_path_buf(),
        uploads.path().to_path_buf(),
    );

    let (state, worker) = AppState::new(config.clone());
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        worker: Some(worker),
        scratch,
        uploads,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_with_key(app: Router, uri: &str, key: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("X-API-Key", key)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a raw body with the test API key.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("X-API-Key", TEST_API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body with the test API key.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ---------------------------------------------------------------------------
// Webhook receiver
// ---------------------------------------------------------------------------

/// Bind a webhook receiver on an ephemeral port. Every JSON body it gets is
/// forwarded on the returned channel.
pub async fn spawn_webhook_receiver() -> (
    String,
    tokio::sync::mpsc::UnboundedReceiver<serde_json::Value>,
) {
    use axum::extract::State;
    use axum::routing::post;
    use axum::Json;
    use tokio::sync::mpsc;

    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route(
            "/hook",
            post(
                |State(tx): State<mpsc::UnboundedSender<serde_json::Value>>,
                 Json(body): Json<serde_json::Value>| async move {
                    let _ = tx.send(body);
                },
            ),
        )
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/hook"), rx)
}
