//! Outbound notification infrastructure for mediakit.
//!
//! - [`delivery`] - external delivery channels. Today that is the
//!   [`WebhookNotifier`], which reports finished jobs to a caller-supplied URL.

pub mod delivery;

pub use delivery::webhook::{WebhookError, WebhookNotifier, DEFAULT_WEBHOOK_TIMEOUT};
