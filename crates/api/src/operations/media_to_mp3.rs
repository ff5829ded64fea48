use std::sync::Arc;

use async_trait::async_trait;
use mediakit_core::ffmpeg;
use mediakit_core::requests::MediaToMp3Request;
use mediakit_core::types::JobId;
use serde_json::{json, Value};

use super::{MediaContext, MediaError, MediaJob};

/// `/media-to-mp3`: transcode any audio or video input into an MP3.
pub struct MediaToMp3 {
    pub ctx: Arc<MediaContext>,
}

#[async_trait]
impl MediaJob for MediaToMp3 {
    type Request = MediaToMp3Request;
    const ENDPOINT: &'static str = "/media-to-mp3";

    async fn process(&self, job_id: JobId, request: MediaToMp3Request) -> Result<Value, MediaError> {
        tracing::info!(%job_id, bitrate = request.bitrate(), "Converting media to MP3");

        let input = self.ctx.download(&request.media_url, job_id).await?;
        let output = self.ctx.scratch_path(job_id, "", "mp3");
        let result = ffmpeg::convert_to_mp3(&input, &output, request.bitrate()).await;

        let url = self.ctx.publish(&output, &[input], result).await?;
        Ok(json!(url))
    }
}
