use std::sync::Arc;
use std::time::Duration;

use mediakit_core::storage::LocalStorage;
use mediakit_events::WebhookNotifier;

use crate::config::{ServerConfig, BUILD_NUMBER};
use crate::engine::dispatcher::Dispatcher;
use crate::engine::worker::Worker;
use crate::operations::MediaContext;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (API key, paths, timeouts).
    pub config: Arc<ServerConfig>,
    /// Inline-or-enqueue decision point shared by every job route.
    pub dispatcher: Arc<Dispatcher>,
    /// HTTP client, scratch directory and artifact storage of the media operations.
    pub media: Arc<MediaContext>,
}

impl AppState {
    /// Wire the dispatcher, its queue and the single worker that drains it.
    ///
    /// The worker is returned unstarted; the caller spawns it.
    pub fn new(config: ServerConfig) -> (Self, Worker) {
        let (dispatcher, receiver) = Dispatcher::new(config.max_queue_length, BUILD_NUMBER);
        let notifier = WebhookNotifier::new(Duration::from_secs(config.webhook_timeout_secs));
        let worker = Worker::new(receiver, dispatcher.identity().clone(), notifier);

        let media = MediaContext::new(
            config.storage_path.clone(),
            LocalStorage::new(config.local_storage_path.clone()),
        );

        let state = Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            media: Arc::new(media),
        };
        (state, worker)
    }
}
