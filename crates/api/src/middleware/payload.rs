//! JSON body extractors.
//!
//! Both extractors hand the dispatcher the raw JSON object: the typed
//! request is re-derived by the operation when it runs, which may be much
//! later on the worker.

use std::marker::PhantomData;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use mediakit_core::error::CoreError;
use mediakit_core::requests::parse_request;
use mediakit_core::types::Payload;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::error::AppError;
use crate::state::AppState;

pub const MISSING_JSON_MESSAGE: &str = "Missing JSON in request";

/// A non-empty JSON object body that validates as `T`.
///
/// Rejects with `400 Missing JSON in request` when there is no usable body
/// and `400 Invalid payload: ...` when validation fails.
#[derive(Debug)]
pub struct ValidatedPayload<T> {
    pub payload: Payload,
    _request: PhantomData<fn() -> T>,
}

impl<T> FromRequest<AppState> for ValidatedPayload<T>
where
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::BadRequest(MISSING_JSON_MESSAGE.into()))?;

        let payload = json_object(&bytes)
            .filter(|payload| !payload.is_empty())
            .ok_or_else(|| {
                tracing::warn!("Missing JSON in request");
                AppError::BadRequest(MISSING_JSON_MESSAGE.into())
            })?;

        parse_request::<T>(&payload).map_err(|e| match e {
            CoreError::Validation(detail) => {
                tracing::warn!(error = %detail, "Invalid payload");
                AppError::Core(CoreError::Validation(format!("Invalid payload: {detail}")))
            }
            other => AppError::Core(other),
        })?;

        Ok(Self {
            payload,
            _request: PhantomData,
        })
    }
}

/// Any JSON object body; a missing or non-object body yields an empty payload.
#[derive(Debug, Default)]
pub struct RawPayload(pub Payload);

impl FromRequest<AppState> for RawPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let payload = Bytes::from_request(req, state)
            .await
            .ok()
            .and_then(|bytes| json_object(&bytes))
            .unwrap_or_default();
        Ok(Self(payload))
    }
}

fn json_object(bytes: &[u8]) -> Option<Payload> {
    match serde_json::from_slice::<Value>(bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
