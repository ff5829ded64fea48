use std::sync::Arc;

use async_trait::async_trait;
use mediakit_core::ffmpeg;
use mediakit_core::requests::ImageToVideoRequest;
use mediakit_core::types::JobId;
use serde_json::{json, Value};

use super::{MediaContext, MediaError, MediaJob};

/// `/image-to-video`: turn a still image into a slowly zooming clip.
pub struct ImageToVideo {
    pub ctx: Arc<MediaContext>,
}

#[async_trait]
impl MediaJob for ImageToVideo {
    type Request = ImageToVideoRequest;
    const ENDPOINT: &'static str = "/image-to-video";

    async fn process(&self, job_id: JobId, request: ImageToVideoRequest) -> Result<Value, MediaError> {
        let params = request.zoom_params();
        tracing::info!(
            %job_id,
            length = params.length,
            frame_rate = params.frame_rate,
            zoom_speed = params.zoom_speed,
            "Rendering image to video",
        );

        let image = self.ctx.download(&request.image_url, job_id).await?;
        let output = self.ctx.scratch_path(job_id, "", "mp4");
        let result = ffmpeg::image_to_video(&image, &output, params).await;

        let url = self.ctx.publish(&output, &[image], result).await?;
        Ok(json!(url))
    }
}
