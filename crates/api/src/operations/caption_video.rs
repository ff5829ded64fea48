use std::sync::Arc;

use async_trait::async_trait;
use mediakit_core::captions::{self, CaptionFormat};
use mediakit_core::ffmpeg;
use mediakit_core::requests::CaptionVideoRequest;
use mediakit_core::types::JobId;
use serde_json::{json, Value};

use super::{MediaContext, MediaError, MediaJob};

/// `/caption-video`: burn SRT or ASS captions into a video.
pub struct CaptionVideo {
    pub ctx: Arc<MediaContext>,
}

/// Caption sources starting with these are fetched, anything else is
/// treated as the caption text itself.
fn is_remote(source: &str) -> bool {
    source.starts_with("https://") || source.starts_with("http://")
}

/// The subtitle file contents: ASS captions get a generated header whose
/// `Default` style reflects the options.
fn subtitle_document(format: CaptionFormat, text: &str, request: &CaptionVideoRequest) -> String {
    match format {
        CaptionFormat::Ass => format!("{}{text}", captions::ass_header(&request.options)),
        CaptionFormat::Srt => text.to_string(),
    }
}

#[async_trait]
impl MediaJob for CaptionVideo {
    type Request = CaptionVideoRequest;
    const ENDPOINT: &'static str = "/caption-video";

    async fn process(&self, job_id: JobId, request: CaptionVideoRequest) -> Result<Value, MediaError> {
        let (source, format) = request.source();
        let text = if is_remote(source) {
            self.ctx.fetch_text(source).await?
        } else {
            source.to_string()
        };

        tokio::fs::create_dir_all(self.ctx.scratch_dir()).await?;
        let subtitles = self.ctx.scratch_path(job_id, "", format.extension());
        tokio::fs::write(&subtitles, subtitle_document(format, &text, &request)).await?;

        let video = match self.ctx.download(&request.video_url, job_id).await {
            Ok(path) => path,
            Err(e) => {
                mediakit_core::storage::remove_files(&[subtitles]).await;
                return Err(e);
            }
        };

        let force_style = match format {
            CaptionFormat::Srt => Some(captions::force_style(&request.options)),
            CaptionFormat::Ass => None,
        };
        let output = self.ctx.scratch_path(job_id, "_captioned", "mp4");
        let result = ffmpeg::burn_subtitles(&video, &subtitles, &output, force_style.as_deref()).await;

        let url = self.ctx.publish(&output, &[video, subtitles], result).await?;
        Ok(json!(url))
    }
}
