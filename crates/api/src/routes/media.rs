//! Route definitions for the media operations.
//!
//! All endpoints require `X-API-Key`.

use axum::routing::post;
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

/// Media routes, mounted at the root.
///
/// ```text
/// POST   /media-to-mp3        -> media_to_mp3
/// POST   /extract-keyframes   -> extract_keyframes
/// POST   /combine-videos      -> combine_videos
/// POST   /image-to-video      -> image_to_video
/// POST   /audio-mixing        -> audio_mixing
/// POST   /caption-video       -> caption_video
/// POST   /transcribe-media    -> transcribe_media
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media-to-mp3", post(media::media_to_mp3))
        .route("/extract-keyframes", post(media::extract_keyframes))
        .route("/combine-videos", post(media::combine_videos))
        .route("/image-to-video", post(media::image_to_video))
        .route("/audio-mixing", post(media::audio_mixing))
        .route("/caption-video", post(media::caption_video))
        .route("/transcribe-media", post(media::transcribe_media))
}
