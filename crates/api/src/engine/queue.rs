//! FIFO backlog between request tasks and the worker.
//!
//! [`WorkQueue`] is the producer side held by the dispatcher;
//! [`QueueReceiver`] is the single consumer side owned by the worker. Both
//! share one length counter so capacity checks and reporting see the same
//! number.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mediakit_core::envelope::MaxQueueLength;
use tokio::sync::mpsc;

use super::job::JobEnvelope;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("MAX_QUEUE_LENGTH ({limit}) reached")]
    Full { limit: usize },

    #[error("work queue is closed")]
    Closed,
}

/// Producer half of the backlog.
#[derive(Debug)]
pub struct WorkQueue {
    id: String,
    capacity: MaxQueueLength,
    length: Arc<AtomicUsize>,
    sender: mpsc::UnboundedSender<JobEnvelope>,
}

/// Consumer half of the backlog. Exactly one exists per queue.
#[derive(Debug)]
pub struct QueueReceiver {
    length: Arc<AtomicUsize>,
    receiver: mpsc::UnboundedReceiver<JobEnvelope>,
}

impl WorkQueue {
    /// Create a queue with the given capacity (`0` = unlimited) and its
    /// only receiver.
    pub fn new(max_queue_length: usize) -> (Self, QueueReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let length = Arc::new(AtomicUsize::new(0));
        let queue = Self {
            id: uuid::Uuid::new_v4().to_string(),
            capacity: MaxQueueLength::from_limit(max_queue_length),
            length: Arc::clone(&length),
            sender,
        };
        (queue, QueueReceiver { length, receiver })
    }

    /// Stable identifier of this queue instance.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capacity(&self) -> MaxQueueLength {
        self.capacity
    }

    /// Point-in-time number of jobs waiting (not counting the one running).
    pub fn len(&self) -> usize {
        self.length.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a job regardless of capacity.
    pub fn push(&self, job: JobEnvelope) -> Result<(), QueueError> {
        self.length.fetch_add(1, Ordering::SeqCst);
        self.send(job)
    }

    /// Append a job if a slot is free.
    ///
    /// The capacity check and the slot reservation are a single
    /// compare-and-swap, so concurrent callers can never overshoot a
    /// positive capacity.
    pub fn try_push(&self, job: JobEnvelope) -> Result<(), QueueError> {
        let Some(limit) = self.capacity.limit() else {
            return self.push(job);
        };

        self.length
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < limit).then_some(current + 1)
            })
            .map_err(|_| QueueError::Full { limit })?;
        self.send(job)
    }

    /// Hand a job whose slot is already reserved to the channel.
    fn send(&self, job: JobEnvelope) -> Result<(), QueueError> {
        self.sender.send(job).map_err(|_| {
            self.length.fetch_sub(1, Ordering::SeqCst);
            QueueError::Closed
        })
    }
}

impl QueueReceiver {
    /// Wait for the next job in push order. Returns `None` once every
    /// producer is gone and the backlog is drained.
    pub async fn pop(&mut self) -> Option<JobEnvelope> {
        let job = self.receiver.recv().await?;
        self.length.fetch_sub(1, Ordering::SeqCst);
        Some(job)
    }

    /// Close the queue and take every job still waiting, in push order.
    ///
    /// Later pushes fail with [`QueueError::Closed`].
    pub fn close_and_drain(&mut self) -> Vec<JobEnvelope> {
        self.receiver.close();
        let mut pending = Vec::new();
        while let Ok(job) = self.receiver.try_recv() {
            self.length.fetch_sub(1, Ordering::SeqCst);
            pending.push(job);
        }
        pending
    }

    /// Point-in-time number of jobs still waiting.
    pub fn len(&self) -> usize {
        self.length.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
