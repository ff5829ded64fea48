//! Best-effort webhook delivery.
//!
//! [`WebhookNotifier`] POSTs a JSON body to a caller-supplied URL exactly
//! once. Failures are logged and reported as `false`; nothing is retried or
//! persisted, and the outgoing call carries no signature.

use std::time::Duration;

use serde::Serialize;

/// Timeout of a single delivery when the notifier is built with defaults.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookNotifier
// ---------------------------------------------------------------------------

/// Delivers job outcomes to external webhook endpoints.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    timeout: Duration,
}

impl WebhookNotifier {
    /// Create a notifier whose deliveries time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, timeout }
    }

    /// The timeout applied by [`notify`](Self::notify).
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deliver `payload` to `url` using the notifier's timeout.
    ///
    /// Returns `true` on a 2xx answer. Any other result is logged.
    pub async fn notify<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> bool {
        self.notify_with_timeout(url, payload, self.timeout).await
    }

    /// Deliver `payload` to `url`, overriding the timeout for this call.
    pub async fn notify_with_timeout<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
        timeout: Duration,
    ) -> bool {
        match self.try_send(url, payload, timeout).await {
            Ok(status) => {
                tracing::info!(url, status, "Webhook delivered");
                true
            }
            Err(e) => {
                tracing::error!(url, error = %e, "Webhook delivery failed");
                false
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
        timeout: Duration,
    ) -> Result<u16, WebhookError> {
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::HttpStatus(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

impl Default for WebhookNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_WEBHOOK_TIMEOUT)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
