//! The uniform response envelope.
//!
//! One flat JSON object shape serves four situations: the synchronous result
//! of an inline job, the `202` acknowledgement of a queued job, the `429`
//! rejection when the backlog is full, and the webhook payload sent once a
//! queued job completes. Optional fields are omitted rather than `null` so
//! each variant only carries what it means.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::outcome::Outcome;
use crate::timing::JobTimings;
use crate::types::JobId;

/// Message of a `202` envelope.
pub const PROCESSING_MESSAGE: &str = "processing";

/// Message of a completed envelope whose outcome succeeded.
pub const SUCCESS_MESSAGE: &str = "success";

// ---------------------------------------------------------------------------
// Process identity
// ---------------------------------------------------------------------------

/// Read-only facts about the process and queue that stamp every envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub queue_id: String,
    pub build_number: String,
}

impl ProcessIdentity {
    /// Identity of the current process for the given queue.
    pub fn current(queue_id: impl Into<String>, build_number: impl Into<String>) -> Self {
        Self {
            pid: std::process::id(),
            queue_id: queue_id.into(),
            build_number: build_number.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

/// Configured backlog capacity, reported on `202` envelopes.
///
/// Serializes as the number, or as the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxQueueLength {
    Limited(usize),
    Unlimited,
}

impl MaxQueueLength {
    /// `0` means unlimited.
    pub fn from_limit(limit: usize) -> Self {
        if limit == 0 {
            Self::Unlimited
        } else {
            Self::Limited(limit)
        }
    }

    /// The positive limit, if any.
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Limited(n) => Some(n),
            Self::Unlimited => None,
        }
    }
}

impl Serialize for MaxQueueLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limited(n) => serializer.serialize_u64(*n as u64),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

// ---------------------------------------------------------------------------
// ResponseEnvelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    /// Route name that produced the result. Webhook payloads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub code: u16,
    /// Caller correlation id; `null` when the caller sent none.
    pub id: Option<Value>,
    pub job_id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<f64>,
    pub pid: u32,
    pub queue_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_queue_length: Option<MaxQueueLength>,
    pub queue_length: usize,
    pub build_number: String,
}

impl ResponseEnvelope {
    /// Envelope for a finished job, inline or queued.
    ///
    /// `response` is only set when the outcome succeeded; otherwise the
    /// failure text becomes the `message`.
    pub fn completed(
        identity: &ProcessIdentity,
        job_id: JobId,
        id: Option<Value>,
        outcome: Outcome,
        timings: JobTimings,
        queue_length: usize,
    ) -> Self {
        let code = outcome.code();
        let (response, message) = match outcome {
            Outcome::Success(value) => (Some(value), SUCCESS_MESSAGE.to_string()),
            Outcome::Failure { message, .. } => (None, message),
        };

        Self {
            endpoint: None,
            code,
            id,
            job_id,
            response,
            message,
            run_time: Some(timings.run_time()),
            queue_time: Some(timings.queue_time()),
            total_time: Some(timings.total_time()),
            pid: identity.pid,
            queue_id: identity.queue_id.clone(),
            max_queue_length: None,
            queue_length,
            build_number: identity.build_number.clone(),
        }
    }

    /// `202` acknowledgement for a job that was pushed onto the backlog.
    pub fn accepted(
        identity: &ProcessIdentity,
        job_id: JobId,
        id: Option<Value>,
        max_queue_length: MaxQueueLength,
        queue_length: usize,
    ) -> Self {
        Self {
            max_queue_length: Some(max_queue_length),
            ..Self::bare(identity, 202, job_id, id, PROCESSING_MESSAGE, queue_length)
        }
    }

    /// `429` rejection: the backlog is at capacity and nothing was queued.
    pub fn rejected(
        identity: &ProcessIdentity,
        job_id: JobId,
        id: Option<Value>,
        limit: usize,
        queue_length: usize,
    ) -> Self {
        Self::bare(
            identity,
            429,
            job_id,
            id,
            format!("MAX_QUEUE_LENGTH ({limit}) reached"),
            queue_length,
        )
    }

    /// An acknowledgement-shaped envelope with an arbitrary code and message.
    pub fn bare(
        identity: &ProcessIdentity,
        code: u16,
        job_id: JobId,
        id: Option<Value>,
        message: impl Into<String>,
        queue_length: usize,
    ) -> Self {
        Self {
            endpoint: None,
            code,
            id,
            job_id,
            response: None,
            message: message.into(),
            run_time: None,
            queue_time: None,
            total_time: None,
            pid: identity.pid,
            queue_id: identity.queue_id.clone(),
            max_queue_length: None,
            queue_length,
            build_number: identity.build_number.clone(),
        }
    }

    /// Attach the producing route, turning a completed envelope into the
    /// webhook payload form.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
