//! The unit of work handled by the engine.
//!
//! An [`Operation`] is the route-specific work; a [`JobEnvelope`] binds one
//! invocation of it to a job id, the request payload and the instant the
//! request arrived.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mediakit_core::outcome::Outcome;
use mediakit_core::payload;
use mediakit_core::types::{new_job_id, JobId, Payload};
use serde_json::Value;

/// Route-specific work run by the dispatcher or the worker.
///
/// Expected errors are reported as [`Outcome::Failure`]. A panic is caught
/// by [`JobEnvelope::execute`] and turned into a `500` failure.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Route name reported in webhook payloads, e.g. `/media-to-mp3`.
    fn endpoint(&self) -> &'static str;

    async fn run(&self, job_id: JobId, payload: &Payload) -> Outcome;
}

/// Immutable record of one job, consumed exactly once.
pub struct JobEnvelope {
    pub job_id: JobId,
    pub payload: Arc<Payload>,
    pub webhook_url: Option<String>,
    pub operation: Arc<dyn Operation>,
    /// When the request was received, not when the job was queued.
    pub received_at: Instant,
}

impl JobEnvelope {
    /// Wrap a request under a fresh job id, stamped with the current instant.
    pub fn new(payload: Payload, operation: Arc<dyn Operation>) -> Self {
        let webhook_url = payload::webhook_url(&payload).map(str::to_owned);
        Self {
            job_id: new_job_id(),
            payload: Arc::new(payload),
            webhook_url,
            operation,
            received_at: Instant::now(),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.operation.endpoint()
    }

    /// The caller's correlation id, echoed back untouched.
    pub fn correlation_id(&self) -> Option<Value> {
        payload::correlation_id(&self.payload)
    }

    /// Run the operation on its own task and measure how long it took.
    ///
    /// A panic inside the operation surfaces as a `500` failure naming the
    /// panic payload.
    pub async fn execute(&self) -> (Outcome, Duration) {
        let operation = Arc::clone(&self.operation);
        let payload = Arc::clone(&self.payload);
        let job_id = self.job_id;

        let started = Instant::now();
        let handle = tokio::spawn(async move { operation.run(job_id, &payload).await });
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                let message = format!("operation panicked: {}", panic_message(e.into_panic()));
                tracing::error!(
                    %job_id,
                    endpoint = self.endpoint(),
                    id = ?self.correlation_id(),
                    error = %message,
                    "Operation panicked",
                );
                Outcome::internal(message)
            }
            Err(e) => {
                tracing::error!(%job_id, endpoint = self.endpoint(), error = %e, "Operation task aborted");
                Outcome::internal(format!("operation aborted: {e}"))
            }
        };
        (outcome, started.elapsed())
    }
}

impl std::fmt::Debug for JobEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEnvelope")
            .field("job_id", &self.job_id)
            .field("endpoint", &self.endpoint())
            .field("webhook_url", &self.webhook_url)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
