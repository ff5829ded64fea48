//! Route operations run by the dispatch engine.
//!
//! Media operations implement [`MediaJob`]: they receive an already typed
//! request and return the JSON result or a [`MediaError`]. [`Media`] adapts
//! any `MediaJob` to the engine's [`Operation`] contract, re-validating the
//! payload and turning errors into failure outcomes.

pub mod audio_mixing;
pub mod caption_video;
pub mod combine_videos;
pub mod context;
pub mod extract_keyframes;
pub mod image_to_video;
pub mod media_to_mp3;
pub mod toolkit;
pub mod transcribe_media;

use async_trait::async_trait;
use mediakit_core::ffmpeg::FfmpegError;
use mediakit_core::outcome::Outcome;
use mediakit_core::requests::parse_request;
use mediakit_core::storage::StorageError;
use mediakit_core::transcription::WhisperError;
use mediakit_core::types::{JobId, Payload};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::engine::job::Operation;

pub use context::MediaContext;

/// Error type of a media operation. Every variant is reported as a `500`.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Ffmpeg(#[from] FfmpegError),

    #[error(transparent)]
    Transcription(#[from] WhisperError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    NoOutput(String),
}

/// A media operation with a typed request.
#[async_trait]
pub trait MediaJob: Send + Sync + 'static {
    type Request: DeserializeOwned + Validate + Send + 'static;

    /// Route name, e.g. `/media-to-mp3`.
    const ENDPOINT: &'static str;

    async fn process(&self, job_id: JobId, request: Self::Request) -> Result<Value, MediaError>;
}

/// Adapter from [`MediaJob`] to [`Operation`].
pub struct Media<J>(pub J);

#[async_trait]
impl<J: MediaJob> Operation for Media<J> {
    fn endpoint(&self) -> &'static str {
        J::ENDPOINT
    }

    async fn run(&self, job_id: JobId, payload: &Payload) -> Outcome {
        let request = match parse_request::<J::Request>(payload) {
            Ok(request) => request,
            Err(e) => return Outcome::failure(400, e.to_string()),
        };

        match self.0.process(job_id, request).await {
            Ok(value) => Outcome::Success(value),
            Err(e) => {
                tracing::error!(%job_id, endpoint = J::ENDPOINT, error = %e, "Media operation failed");
                Outcome::internal(e.to_string())
            }
        }
    }
}
