/// Every job is identified by a random UUID v4, generated per request.
pub type JobId = uuid::Uuid;

/// A request body: a JSON object, possibly empty.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Generate a fresh job id.
pub fn new_job_id() -> JobId {
    uuid::Uuid::new_v4()
}
