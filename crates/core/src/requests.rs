//! Typed request bodies of the media routes and their validation rules.
//!
//! Every body also accepts the control fields `webhook_url` and `id`.
//! Unknown fields are rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::captions::{CaptionFormat, CaptionOption};
use crate::error::CoreError;
use crate::ffmpeg::{OutputLength, ZoomParams};
use crate::transcription::{TranscriptFormat, DEFAULT_MAX_CHARS};
use crate::types::Payload;

static BITRATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+k$").expect("bitrate pattern is valid"));

pub const DEFAULT_BITRATE: &str = "128k";
pub const DEFAULT_LENGTH_SECS: f64 = 5.0;
pub const DEFAULT_FRAME_RATE: u32 = 30;
pub const DEFAULT_ZOOM_SPEED_PCT: f64 = 3.0;
pub const DEFAULT_VOLUME_PCT: f64 = 100.0;

/// Deserialize a payload into `T` and run its validation rules.
pub fn parse_request<T>(payload: &Payload) -> Result<T, CoreError>
where
    T: DeserializeOwned + Validate,
{
    let request: T = serde_json::from_value(serde_json::Value::Object(payload.clone()))
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    request
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    Ok(request)
}

// ---------------------------------------------------------------------------
// Media to MP3
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MediaToMp3Request {
    #[validate(url)]
    pub media_url: String,
    #[validate(regex(path = *BITRATE_PATTERN))]
    pub bitrate: Option<String>,
    #[validate(url)]
    pub webhook_url: Option<String>,
    pub id: Option<String>,
}

impl MediaToMp3Request {
    pub fn bitrate(&self) -> &str {
        self.bitrate.as_deref().unwrap_or(DEFAULT_BITRATE)
    }
}

// ---------------------------------------------------------------------------
// Keyframes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExtractKeyframesRequest {
    #[validate(url)]
    pub video_url: String,
    #[validate(url)]
    pub webhook_url: Option<String>,
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// Combine videos
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct VideoUrl {
    #[validate(url)]
    pub video_url: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CombineVideosRequest {
    #[validate(length(min = 1), nested)]
    pub video_urls: Vec<VideoUrl>,
    #[validate(url)]
    pub webhook_url: Option<String>,
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// Image to video
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ImageToVideoRequest {
    #[validate(url)]
    pub image_url: String,
    #[validate(range(min = 1.0, max = 60.0))]
    pub length: Option<f64>,
    #[validate(range(min = 15, max = 60))]
    pub frame_rate: Option<u32>,
    /// Percent of zoom gained per second.
    #[validate(range(min = 0.0, max = 100.0))]
    pub zoom_speed: Option<f64>,
    #[validate(url)]
    pub webhook_url: Option<String>,
    pub id: Option<String>,
}

impl ImageToVideoRequest {
    pub fn zoom_params(&self) -> ZoomParams {
        ZoomParams {
            length: self.length.unwrap_or(DEFAULT_LENGTH_SECS),
            frame_rate: self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE),
            zoom_speed: self.zoom_speed.unwrap_or(DEFAULT_ZOOM_SPEED_PCT) / 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Audio mixing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AudioMixingRequest {
    #[validate(url)]
    pub video_url: String,
    #[validate(url)]
    pub audio_url: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub video_vol: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub audio_vol: Option<f64>,
    pub output_length: Option<OutputLength>,
    #[validate(url)]
    pub webhook_url: Option<String>,
    pub id: Option<String>,
}

impl AudioMixingRequest {
    pub fn video_vol(&self) -> f64 {
        self.video_vol.unwrap_or(DEFAULT_VOLUME_PCT)
    }

    pub fn audio_vol(&self) -> f64 {
        self.audio_vol.unwrap_or(DEFAULT_VOLUME_PCT)
    }

    pub fn output_length(&self) -> OutputLength {
        self.output_length.unwrap_or(OutputLength::Video)
    }
}

// ---------------------------------------------------------------------------
// Transcription
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TranscribeMediaRequest {
    #[validate(url)]
    pub media_url: String,
    pub output: Option<TranscriptFormat>,
    /// Character budget of one ASS caption line.
    #[validate(range(min = 1))]
    pub max_chars: Option<usize>,
    #[validate(url)]
    pub webhook_url: Option<String>,
    pub id: Option<String>,
}

impl TranscribeMediaRequest {
    pub fn output(&self) -> TranscriptFormat {
        self.output.unwrap_or_default()
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars.unwrap_or(DEFAULT_MAX_CHARS)
    }
}

// ---------------------------------------------------------------------------
// Captions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_caption_source"))]
pub struct CaptionVideoRequest {
    #[validate(url)]
    pub video_url: String,
    /// SRT captions, inline or as an `https` URL.
    pub srt: Option<String>,
    /// ASS captions, inline or as an `https` URL.
    pub ass: Option<String>,
    #[serde(default)]
    pub options: Vec<CaptionOption>,
    #[validate(url)]
    pub webhook_url: Option<String>,
    pub id: Option<String>,
}

impl CaptionVideoRequest {
    /// The caption text (or URL) and its format. ASS wins if both are set,
    /// which validation already rules out.
    pub fn source(&self) -> (&str, CaptionFormat) {
        match (&self.ass, &self.srt) {
            (Some(ass), _) => (ass, CaptionFormat::Ass),
            (None, Some(srt)) => (srt, CaptionFormat::Srt),
            (None, None) => ("", CaptionFormat::Srt),
        }
    }
}

fn validate_caption_source(request: &CaptionVideoRequest) -> Result<(), ValidationError> {
    match (&request.srt, &request.ass) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(ValidationError::new("caption_source")
            .with_message("exactly one of 'srt' or 'ass' is required".into())),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn payload(value: serde_json::Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn mp3_defaults_bitrate() {
        let req: MediaToMp3Request =
            parse_request(&payload(json!({"media_url": "https://cdn.test/a.mp4"}))).unwrap();
        assert_eq!(req.bitrate(), "128k");
    }

    #[test]
    fn mp3_rejects_bad_bitrate() {
        let err = parse_request::<MediaToMp3Request>(&payload(
            json!({"media_url": "https://cdn.test/a.mp4", "bitrate": "fast"}),
        ))
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("bitrate"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse_request::<ExtractKeyframesRequest>(&payload(
            json!({"video_url": "https://cdn.test/a.mp4", "extra": 1}),
        ))
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("extra"));
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = parse_request::<ExtractKeyframesRequest>(&Payload::new()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("video_url"));
    }

    #[test]
    fn rejects_non_url() {
        let err = parse_request::<ExtractKeyframesRequest>(&payload(
            json!({"video_url": "not a url"}),
        ))
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn combine_requires_at_least_one_video() {
        let err = parse_request::<CombineVideosRequest>(&payload(json!({"video_urls": []})))
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));

        let ok: CombineVideosRequest = parse_request(&payload(json!({
            "video_urls": [{"video_url": "https://cdn.test/1.mp4"}, {"video_url": "https://cdn.test/2.mp4"}],
            "webhook_url": "https://hooks.test/done",
            "id": "batch-7"
        })))
        .unwrap();
        assert_eq!(ok.video_urls.len(), 2);
    }

    #[test]
    fn image_to_video_ranges_and_defaults() {
        let req: ImageToVideoRequest =
            parse_request(&payload(json!({"image_url": "https://cdn.test/a.png"}))).unwrap();
        let params = req.zoom_params();
        assert_eq!(params.length, 5.0);
        assert_eq!(params.frame_rate, 30);
        assert!((params.zoom_speed - 0.03).abs() < 1e-9);

        let err = parse_request::<ImageToVideoRequest>(&payload(
            json!({"image_url": "https://cdn.test/a.png", "frame_rate": 120}),
        ))
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("frame_rate"));
    }

    #[test]
    fn audio_mixing_output_length() {
        let req: AudioMixingRequest = parse_request(&payload(json!({
            "video_url": "https://cdn.test/v.mp4",
            "audio_url": "https://cdn.test/a.mp3",
            "output_length": "audio"
        })))
        .unwrap();
        assert_eq!(req.output_length(), OutputLength::Audio);
        assert_eq!(req.audio_vol(), 100.0);

        let err = parse_request::<AudioMixingRequest>(&payload(json!({
            "video_url": "https://cdn.test/v.mp4",
            "audio_url": "https://cdn.test/a.mp3",
            "output_length": "both"
        })))
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn caption_needs_exactly_one_source() {
        let neither = payload(json!({"video_url": "https://cdn.test/v.mp4"}));
        assert_matches!(
            parse_request::<CaptionVideoRequest>(&neither),
            Err(CoreError::Validation(_))
        );

        let both = payload(json!({"video_url": "https://cdn.test/v.mp4", "srt": "a", "ass": "b"}));
        assert_matches!(
            parse_request::<CaptionVideoRequest>(&both),
            Err(CoreError::Validation(_))
        );

        let srt: CaptionVideoRequest = parse_request(&payload(json!({
            "video_url": "https://cdn.test/v.mp4",
            "srt": "1\n00:00:00,000 --> 00:00:01,000\nhi\n",
            "options": [{"option": "font_size", "value": 20}]
        })))
        .unwrap();
        assert_eq!(srt.source().1, CaptionFormat::Srt);
        assert_eq!(srt.options.len(), 1);
    }

    #[test]
    fn transcribe_defaults_and_formats() {
        let req: TranscribeMediaRequest =
            parse_request(&payload(json!({"media_url": "https://cdn.test/talk.mp3"}))).unwrap();
        assert_eq!(req.output(), TranscriptFormat::Transcript);
        assert_eq!(req.max_chars(), 56);

        let req: TranscribeMediaRequest = parse_request(&payload(
            json!({"media_url": "https://cdn.test/talk.mp3", "output": "ass", "max_chars": 30}),
        ))
        .unwrap();
        assert_eq!(req.output(), TranscriptFormat::Ass);
        assert_eq!(req.max_chars(), 30);

        for bad in [json!({"output": "docx"}), json!({"max_chars": 0}), json!({"language": "en"})] {
            let mut body = payload(json!({"media_url": "https://cdn.test/talk.mp3"}));
            body.extend(payload(bad));
            assert_matches!(
                parse_request::<TranscribeMediaRequest>(&body),
                Err(CoreError::Validation(_))
            );
        }
    }
}
