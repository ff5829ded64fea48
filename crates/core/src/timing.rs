//! Timing instrumentation shared by the inline and queued paths.

use std::time::Duration;

/// Round a duration to seconds with three decimals.
pub fn round_secs(duration: Duration) -> f64 {
    round3(duration.as_secs_f64())
}

fn round3(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// How long a job waited in the backlog and how long it ran.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobTimings {
    pub queue: Duration,
    pub run: Duration,
}

impl JobTimings {
    /// Timings for the inline path, which never waits.
    pub fn inline(run: Duration) -> Self {
        Self {
            queue: Duration::ZERO,
            run,
        }
    }

    pub fn queued(queue: Duration, run: Duration) -> Self {
        Self { queue, run }
    }

    pub fn run_time(&self) -> f64 {
        round_secs(self.run)
    }

    pub fn queue_time(&self) -> f64 {
        round_secs(self.queue)
    }

    /// Rounded from the unrounded sum so the identity
    /// `total_time == round(queue_time + run_time, 3)` holds up to one
    /// rounding step.
    pub fn total_time(&self) -> f64 {
        round_secs(self.queue + self.run)
    }
}
