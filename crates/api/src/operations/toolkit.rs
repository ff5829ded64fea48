//! Synchronous utility operations. Their routes always bypass the queue.

use async_trait::async_trait;
use mediakit_core::outcome::Outcome;
use mediakit_core::types::{JobId, Payload};
use serde_json::json;

use crate::engine::job::Operation;

/// Reports whether the request carried the right API key.
pub struct Authenticate {
    pub endpoint: &'static str,
    pub authorized: bool,
}

#[async_trait]
impl Operation for Authenticate {
    fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    async fn run(&self, _job_id: JobId, _payload: &Payload) -> Outcome {
        if self.authorized {
            Outcome::Success(json!("Authorized"))
        } else {
            Outcome::failure(401, "Unauthorized")
        }
    }
}

/// Liveness check for authenticated callers.
pub struct ToolkitTest;

pub const TOOLKIT_TEST_MESSAGE: &str = "mediakit is working";

#[async_trait]
impl Operation for ToolkitTest {
    fn endpoint(&self) -> &'static str {
        "/v1/toolkit/test"
    }

    async fn run(&self, job_id: JobId, _payload: &Payload) -> Outcome {
        tracing::debug!(%job_id, "Toolkit test requested");
        Outcome::Success(json!(TOOLKIT_TEST_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn authenticate_reports_key_check() {
        let ok = Authenticate {
            endpoint: "/authenticate",
            authorized: true,
        };
        assert_eq!(
            ok.run(uuid::Uuid::new_v4(), &Payload::new()).await,
            Outcome::Success(json!("Authorized"))
        );

        let denied = Authenticate {
            endpoint: "/authenticate",
            authorized: false,
        };
        assert_eq!(
            denied.run(uuid::Uuid::new_v4(), &Payload::new()).await,
            Outcome::failure(401, "Unauthorized")
        );
    }
}
