//! Request extractors that run before a job reaches the dispatcher.
//!
//! - [`auth::RequireApiKey`] -- Requires a valid `X-API-Key` header.
//! - [`payload::ValidatedPayload`] -- Requires a JSON object body that
//!   passes a typed request's validation rules.
//! - [`payload::RawPayload`] -- Any JSON object body, or an empty one.

pub mod auth;
pub mod payload;
