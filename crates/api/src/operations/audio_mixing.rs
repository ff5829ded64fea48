use std::sync::Arc;

use async_trait::async_trait;
use mediakit_core::ffmpeg;
use mediakit_core::requests::AudioMixingRequest;
use mediakit_core::types::JobId;
use serde_json::{json, Value};

use super::{MediaContext, MediaError, MediaJob};

/// `/audio-mixing`: lay an audio track over a video.
pub struct AudioMixing {
    pub ctx: Arc<MediaContext>,
}

#[async_trait]
impl MediaJob for AudioMixing {
    type Request = AudioMixingRequest;
    const ENDPOINT: &'static str = "/audio-mixing";

    async fn process(&self, job_id: JobId, request: AudioMixingRequest) -> Result<Value, MediaError> {
        let inputs = self
            .ctx
            .download_all(&[request.video_url.as_str(), request.audio_url.as_str()], job_id)
            .await?;
        let output = self.ctx.scratch_path(job_id, "", "mp4");
        let result = ffmpeg::mix_audio(
            &inputs[0],
            &inputs[1],
            &output,
            request.video_vol(),
            request.audio_vol(),
            request.output_length(),
        )
        .await;

        let url = self.ctx.publish(&output, &inputs, result).await?;
        Ok(json!(url))
    }
}
