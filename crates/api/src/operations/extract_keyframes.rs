use std::sync::Arc;

use async_trait::async_trait;
use mediakit_core::ffmpeg;
use mediakit_core::requests::ExtractKeyframesRequest;
use mediakit_core::storage::remove_files;
use mediakit_core::types::JobId;
use serde_json::{json, Value};

use super::{MediaContext, MediaError, MediaJob};

/// `/extract-keyframes`: export every I-frame of a video as a JPEG.
pub struct ExtractKeyframes {
    pub ctx: Arc<MediaContext>,
}

#[async_trait]
impl MediaJob for ExtractKeyframes {
    type Request = ExtractKeyframesRequest;
    const ENDPOINT: &'static str = "/extract-keyframes";

    async fn process(&self, job_id: JobId, request: ExtractKeyframesRequest) -> Result<Value, MediaError> {
        let input = self.ctx.download(&request.video_url, job_id).await?;
        let prefix = job_id.to_string();
        let result = ffmpeg::extract_keyframes(&input, self.ctx.scratch_dir(), &prefix).await;
        remove_files(&[input]).await;

        let frames = result?;
        if frames.is_empty() {
            return Err(MediaError::NoOutput("no keyframes were extracted".into()));
        }
        tracing::info!(%job_id, count = frames.len(), "Keyframes extracted");

        let mut image_urls = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            match self.ctx.storage().store(frame).await {
                Ok(url) => image_urls.push(json!({ "image_url": url })),
                Err(e) => {
                    remove_files(&frames[i..]).await;
                    return Err(e.into());
                }
            }
        }

        Ok(json!({ "image_urls": image_urls }))
    }
}
