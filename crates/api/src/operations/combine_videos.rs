use std::sync::Arc;

use async_trait::async_trait;
use mediakit_core::ffmpeg;
use mediakit_core::requests::CombineVideosRequest;
use mediakit_core::types::JobId;
use serde_json::{json, Value};

use super::{MediaContext, MediaError, MediaJob};

/// `/combine-videos`: concatenate videos in the order given.
pub struct CombineVideos {
    pub ctx: Arc<MediaContext>,
}

#[async_trait]
impl MediaJob for CombineVideos {
    type Request = CombineVideosRequest;
    const ENDPOINT: &'static str = "/combine-videos";

    async fn process(&self, job_id: JobId, request: CombineVideosRequest) -> Result<Value, MediaError> {
        let urls: Vec<&str> = request.video_urls.iter().map(|v| v.video_url.as_str()).collect();
        tracing::info!(%job_id, count = urls.len(), "Combining videos");

        let inputs = self.ctx.download_all(&urls, job_id).await?;
        let output = self.ctx.scratch_path(job_id, "", "mp4");
        let result = ffmpeg::concat_videos(&inputs, &output).await;

        let url = self.ctx.publish(&output, &inputs, result).await?;
        Ok(json!(url))
    }
}
