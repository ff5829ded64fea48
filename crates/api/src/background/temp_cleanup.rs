//! Periodic cleanup of stale scratch files.
//!
//! Downloads and intermediates normally disappear when their job finishes;
//! this task removes whatever a crash or an aborted job left behind in the
//! scratch directory.

use std::path::PathBuf;
use std::time::Duration;

use mediakit_core::storage::delete_older_than;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(600); // 10 minutes

/// Run the scratch cleanup loop until `cancel` is triggered.
///
/// Every `interval`, deletes regular files in `scratch_dir` whose
/// modification time is older than `max_age`.
pub async fn run(scratch_dir: PathBuf, max_age: Duration, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        dir = %scratch_dir.display(),
        max_age_secs = max_age.as_secs(),
        interval_secs = interval.as_secs(),
        "Scratch cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Scratch cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                match delete_older_than(&scratch_dir, max_age).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Scratch cleanup: removed stale files");
                    }
                    Ok(_) => {
                        tracing::debug!("Scratch cleanup: nothing to remove");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Scratch cleanup: failed");
                    }
                }
            }
        }
    }
}
