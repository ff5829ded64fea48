//! Handlers for the media routes.
//!
//! Every handler authenticates, validates the body against the route's
//! request type and hands the raw payload to the dispatcher. Requests with
//! a `webhook_url` are queued; all others run inline.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mediakit_core::requests::{
    AudioMixingRequest, CaptionVideoRequest, CombineVideosRequest, ExtractKeyframesRequest,
    ImageToVideoRequest, MediaToMp3Request, TranscribeMediaRequest,
};
use mediakit_core::types::Payload;

use crate::middleware::auth::RequireApiKey;
use crate::middleware::payload::ValidatedPayload;
use crate::operations::audio_mixing::AudioMixing;
use crate::operations::caption_video::CaptionVideo;
use crate::operations::combine_videos::CombineVideos;
use crate::operations::extract_keyframes::ExtractKeyframes;
use crate::operations::image_to_video::ImageToVideo;
use crate::operations::media_to_mp3::MediaToMp3;
use crate::operations::transcribe_media::TranscribeMedia;
use crate::operations::{Media, MediaJob};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn dispatch_media<J: MediaJob>(state: &AppState, payload: Payload, job: J) -> Response {
    let (envelope, status) = state
        .dispatcher
        .dispatch(payload, false, Arc::new(Media(job)))
        .await;
    (status, Json(envelope)).into_response()
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// POST /media-to-mp3
pub async fn media_to_mp3(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    body: ValidatedPayload<MediaToMp3Request>,
) -> Response {
    let job = MediaToMp3 {
        ctx: Arc::clone(&state.media),
    };
    dispatch_media(&state, body.payload, job).await
}

/// POST /extract-keyframes
pub async fn extract_keyframes(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    body: ValidatedPayload<ExtractKeyframesRequest>,
) -> Response {
    let job = ExtractKeyframes {
        ctx: Arc::clone(&state.media),
    };
    dispatch_media(&state, body.payload, job).await
}

/// POST /combine-videos
pub async fn combine_videos(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    body: ValidatedPayload<CombineVideosRequest>,
) -> Response {
    let job = CombineVideos {
        ctx: Arc::clone(&state.media),
    };
    dispatch_media(&state, body.payload, job).await
}

/// POST /image-to-video
pub async fn image_to_video(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    body: ValidatedPayload<ImageToVideoRequest>,
) -> Response {
    let job = ImageToVideo {
        ctx: Arc::clone(&state.media),
    };
    dispatch_media(&state, body.payload, job).await
}

/// POST /audio-mixing
pub async fn audio_mixing(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    body: ValidatedPayload<AudioMixingRequest>,
) -> Response {
    let job = AudioMixing {
        ctx: Arc::clone(&state.media),
    };
    dispatch_media(&state, body.payload, job).await
}

/// POST /caption-video
pub async fn caption_video(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    body: ValidatedPayload<CaptionVideoRequest>,
) -> Response {
    let job = CaptionVideo {
        ctx: Arc::clone(&state.media),
    };
    dispatch_media(&state, body.payload, job).await
}

/// POST /transcribe-media
pub async fn transcribe_media(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    body: ValidatedPayload<TranscribeMediaRequest>,
) -> Response {
    let job = TranscribeMedia {
        ctx: Arc::clone(&state.media),
    };
    dispatch_media(&state, body.payload, job).await
}
