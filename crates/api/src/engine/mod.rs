//! Job dispatch engine.
//!
//! Requests enter through the [`Dispatcher`](dispatcher::Dispatcher), which
//! either runs the [`Operation`](job::Operation) inline or pushes a
//! [`JobEnvelope`](job::JobEnvelope) onto the [`WorkQueue`](queue::WorkQueue).
//! A single [`Worker`](worker::Worker) drains the queue in order and reports
//! each outcome to the caller's webhook.

pub mod dispatcher;
pub mod job;
pub mod queue;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;
