//! Operations with scripted behaviour for engine unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mediakit_core::outcome::Outcome;
use mediakit_core::types::{JobId, Payload};
use serde_json::{json, Value};

use super::job::Operation;

pub fn payload(value: Value) -> Payload {
    value.as_object().cloned().expect("test payload must be an object")
}

/// Returns the same outcome every time.
pub struct FixedOperation {
    endpoint: &'static str,
    outcome: Outcome,
}

impl FixedOperation {
    pub fn success(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            outcome: Outcome::Success(json!("done")),
        }
    }

    pub fn failure(endpoint: &'static str, code: u16, message: &str) -> Self {
        Self {
            endpoint,
            outcome: Outcome::failure(code, message),
        }
    }
}

#[async_trait]
impl Operation for FixedOperation {
    fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    async fn run(&self, _job_id: JobId, _payload: &Payload) -> Outcome {
        self.outcome.clone()
    }
}

pub struct PanickingOperation;

#[async_trait]
impl Operation for PanickingOperation {
    fn endpoint(&self) -> &'static str {
        "/panic"
    }

    async fn run(&self, _job_id: JobId, _payload: &Payload) -> Outcome {
        panic!("boom");
    }
}

/// Sleeps, then succeeds. Records the order in which jobs started and the
/// highest number of runs that ever overlapped.
pub struct RecordingOperation {
    delay: Duration,
    running: AtomicUsize,
    pub max_concurrent: AtomicUsize,
    pub started: Mutex<Vec<JobId>>,
}

impl RecordingOperation {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            running: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Operation for RecordingOperation {
    fn endpoint(&self) -> &'static str {
        "/record"
    }

    async fn run(&self, job_id: JobId, _payload: &Payload) -> Outcome {
        self.started.lock().unwrap().push(job_id);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.running.fetch_sub(1, Ordering::SeqCst);
        Outcome::Success(json!({ "slept_ms": self.delay.as_millis() as u64 }))
    }
}
