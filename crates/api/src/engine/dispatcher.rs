//! Per-request dispatch: run inline, or enqueue for the worker.
//!
//! A request runs inline when its route bypasses the queue or when it
//! carries no `webhook_url`. Otherwise it is queued behind a capacity check
//! and acknowledged with `202` straight away.

use std::sync::Arc;

use axum::http::StatusCode;
use mediakit_core::envelope::{ProcessIdentity, ResponseEnvelope};
use mediakit_core::timing::JobTimings;
use mediakit_core::types::Payload;

use super::job::{JobEnvelope, Operation};
use super::queue::{QueueError, QueueReceiver, WorkQueue};

/// Entry point for every job route.
#[derive(Debug)]
pub struct Dispatcher {
    queue: WorkQueue,
    identity: ProcessIdentity,
}

impl Dispatcher {
    /// Build a dispatcher around a fresh queue. The returned receiver is
    /// meant for the single [`Worker`](super::worker::Worker).
    pub fn new(max_queue_length: usize, build_number: &str) -> (Self, QueueReceiver) {
        let (queue, receiver) = WorkQueue::new(max_queue_length);
        let identity = ProcessIdentity::current(queue.id(), build_number);
        (Self { queue, identity }, receiver)
    }

    pub fn identity(&self) -> &ProcessIdentity {
        &self.identity
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Run or enqueue one request and build the envelope to answer with.
    pub async fn dispatch(
        &self,
        payload: Payload,
        bypass: bool,
        operation: Arc<dyn Operation>,
    ) -> (ResponseEnvelope, StatusCode) {
        let job = JobEnvelope::new(payload, operation);
        let job_id = job.job_id;
        let id = job.correlation_id();

        if bypass || job.webhook_url.is_none() {
            let (outcome, run) = job.execute().await;
            let status = status_code(outcome.code());
            tracing::debug!(%job_id, endpoint = job.endpoint(), code = outcome.code(), "Inline job finished");
            let envelope = ResponseEnvelope::completed(
                &self.identity,
                job_id,
                id,
                outcome,
                JobTimings::inline(run),
                self.queue.len(),
            );
            return (envelope, status);
        }

        let endpoint = job.endpoint();
        match self.queue.try_push(job) {
            Ok(()) => {
                let queue_length = self.queue.len();
                tracing::info!(%job_id, endpoint, queue_length, "Job queued");
                (
                    ResponseEnvelope::accepted(
                        &self.identity,
                        job_id,
                        id,
                        self.queue.capacity(),
                        queue_length,
                    ),
                    StatusCode::ACCEPTED,
                )
            }
            Err(QueueError::Full { limit }) => {
                let queue_length = self.queue.len();
                tracing::warn!(%job_id, endpoint, queue_length, limit, "Queue full, job rejected");
                (
                    ResponseEnvelope::rejected(&self.identity, job_id, id, limit, queue_length),
                    StatusCode::TOO_MANY_REQUESTS,
                )
            }
            Err(e @ QueueError::Closed) => {
                tracing::error!(%job_id, endpoint, error = %e, "Cannot queue job");
                (
                    ResponseEnvelope::bare(
                        &self.identity,
                        StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                        job_id,
                        id,
                        e.to_string(),
                        self.queue.len(),
                    ),
                    StatusCode::SERVICE_UNAVAILABLE,
                )
            }
        }
    }
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
