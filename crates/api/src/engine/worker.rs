//! The single background consumer of the work queue.
//!
//! Jobs run strictly one at a time in queue order. Each finished job is
//! reported to its webhook; delivery failures are logged and never retried.

use mediakit_core::envelope::{ProcessIdentity, ResponseEnvelope};
use mediakit_core::timing::JobTimings;
use mediakit_events::WebhookNotifier;
use tokio_util::sync::CancellationToken;

use super::job::JobEnvelope;
use super::queue::QueueReceiver;

pub struct Worker {
    receiver: QueueReceiver,
    identity: ProcessIdentity,
    notifier: WebhookNotifier,
}

impl Worker {
    pub fn new(receiver: QueueReceiver, identity: ProcessIdentity, notifier: WebhookNotifier) -> Self {
        Self {
            receiver,
            identity,
            notifier,
        }
    }

    /// Drain the queue until `cancel` fires or every producer is gone.
    ///
    /// Cancellation is only observed between jobs; a running job always
    /// finishes and is reported.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(queue_id = %self.identity.queue_id, "Worker started");

        loop {
            let job = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(pending = self.receiver.len(), "Worker shutting down");
                    self.abandon_pending();
                    break;
                }
                job = self.receiver.pop() => match job {
                    Some(job) => job,
                    None => {
                        tracing::info!("Work queue closed, worker stopping");
                        break;
                    }
                },
            };

            self.process(job).await;
        }
    }

    /// Close the queue and log every job that will never run. Returns how
    /// many were dropped.
    fn abandon_pending(&mut self) -> usize {
        let pending = self.receiver.close_and_drain();
        for job in &pending {
            tracing::warn!(
                job_id = %job.job_id,
                endpoint = job.endpoint(),
                webhook_url = job.webhook_url.as_deref().unwrap_or_default(),
                id = ?job.correlation_id(),
                "Queued job dropped at shutdown"
            );
        }
        pending.len()
    }

    /// Run one job, then deliver its envelope to the webhook.
    pub async fn process(&self, job: JobEnvelope) -> ResponseEnvelope {
        let queue_wait = job.received_at.elapsed();
        let endpoint = job.endpoint();
        tracing::info!(job_id = %job.job_id, endpoint, "Job started");

        let (outcome, run) = job.execute().await;
        let code = outcome.code();
        let envelope = ResponseEnvelope::completed(
            &self.identity,
            job.job_id,
            job.correlation_id(),
            outcome,
            JobTimings::queued(queue_wait, run),
            self.receiver.len(),
        )
        .with_endpoint(endpoint);

        tracing::info!(
            job_id = %job.job_id,
            endpoint,
            code,
            run_time = envelope.run_time,
            queue_time = envelope.queue_time,
            "Job finished",
        );

        if let Some(url) = &job.webhook_url {
            self.notifier.notify(url, &envelope).await;
        }
        envelope
    }
}
