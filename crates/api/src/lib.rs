//! mediakit API server library.
//!
//! Exposes the building blocks (config, state, error handling, dispatch
//! engine, operations, routes) so integration tests and the binary
//! entrypoint can both access them.

pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod operations;
pub mod router;
pub mod routes;
pub mod state;
