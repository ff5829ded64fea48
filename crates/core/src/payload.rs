//! Control fields recognised in every request body.
//!
//! Route-specific fields belong to the operations; the dispatch core only
//! ever looks at `webhook_url` and `id`.

use serde_json::Value;

use crate::types::Payload;

/// Presence of this field moves a request onto the asynchronous path.
pub const WEBHOOK_URL_FIELD: &str = "webhook_url";

/// Caller-supplied correlation id, echoed back untouched.
pub const CORRELATION_ID_FIELD: &str = "id";

/// The webhook URL of a payload, if the caller asked for one.
///
/// Only a non-empty string counts; any other JSON value is ignored so a
/// malformed field can never push a request onto the queue.
pub fn webhook_url(payload: &Payload) -> Option<&str> {
    payload
        .get(WEBHOOK_URL_FIELD)
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
}

/// The correlation id exactly as the caller sent it.
pub fn correlation_id(payload: &Payload) -> Option<Value> {
    payload.get(CORRELATION_ID_FIELD).cloned()
}
