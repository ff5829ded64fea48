use std::sync::Arc;

use async_trait::async_trait;
use mediakit_core::requests::TranscribeMediaRequest;
use mediakit_core::storage::remove_files;
use mediakit_core::transcription::{self, TranscriptFormat};
use mediakit_core::types::JobId;
use serde_json::{json, Value};

use super::{MediaContext, MediaError, MediaJob};

/// `/transcribe-media`: speech-to-text with whisper.
///
/// The plain transcript is returned inline; subtitle formats are stored as
/// artifacts and their URL is returned.
pub struct TranscribeMedia {
    pub ctx: Arc<MediaContext>,
}

#[async_trait]
impl MediaJob for TranscribeMedia {
    type Request = TranscribeMediaRequest;
    const ENDPOINT: &'static str = "/transcribe-media";

    async fn process(&self, job_id: JobId, request: TranscribeMediaRequest) -> Result<Value, MediaError> {
        let format = request.output();
        tracing::info!(%job_id, ?format, "Transcribing media");

        let input = self.ctx.download(&request.media_url, job_id).await?;
        let result = transcription::transcribe(&input, self.ctx.scratch_dir()).await;
        remove_files(&[input]).await;
        let transcript = result?;

        tracing::info!(
            %job_id,
            language = transcript.language.as_deref().unwrap_or("unknown"),
            segments = transcript.segments.len(),
            "Transcription finished"
        );

        let rendered = transcription::render(&transcript, format, request.max_chars());
        let Some(extension) = format.extension() else {
            return Ok(json!(rendered));
        };

        let output = self.ctx.scratch_path(job_id, "_transcript", extension);
        if let Err(e) = tokio::fs::write(&output, rendered).await {
            remove_files(&[output]).await;
            return Err(e.into());
        }
        let url = self.ctx.storage().store(&output).await?;
        Ok(json!(url))
    }
}
