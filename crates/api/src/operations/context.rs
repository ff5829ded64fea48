//! Shared resources of the media operations: HTTP client, scratch
//! directory and artifact storage.

use std::path::{Path, PathBuf};

use mediakit_core::ffmpeg::FfmpegError;
use mediakit_core::storage::{remove_files, LocalStorage};
use mediakit_core::types::JobId;
use tokio::io::AsyncWriteExt;

use super::MediaError;

/// Extension used when a URL does not reveal one.
const FALLBACK_EXTENSION: &str = "bin";

#[derive(Debug, Clone)]
pub struct MediaContext {
    http: reqwest::Client,
    scratch_dir: PathBuf,
    storage: LocalStorage,
}

impl MediaContext {
    pub fn new(scratch_dir: impl Into<PathBuf>, storage: LocalStorage) -> Self {
        Self {
            http: reqwest::Client::new(),
            scratch_dir: scratch_dir.into(),
            storage,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// A scratch path named after the job.
    pub fn scratch_path(&self, job_id: JobId, suffix: &str, extension: &str) -> PathBuf {
        self.scratch_dir.join(format!("{job_id}{suffix}.{extension}"))
    }

    /// Stream `url` into a new scratch file and return its path.
    pub async fn download(&self, url: &str, job_id: JobId) -> Result<PathBuf, MediaError> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let path = self.scratch_dir.join(format!(
            "{job_id}_{}.{}",
            uuid::Uuid::new_v4().simple(),
            url_extension(url)
        ));

        tracing::info!(%job_id, url, file = %path.display(), "Downloading input");
        let mut response = self.http.get(url).send().await?.error_for_status()?;
        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(path)
    }

    /// Download every URL in order. On failure, files already fetched are
    /// removed before the error is returned.
    pub async fn download_all(&self, urls: &[&str], job_id: JobId) -> Result<Vec<PathBuf>, MediaError> {
        let mut paths = Vec::with_capacity(urls.len());
        for url in urls {
            match self.download(url, job_id).await {
                Ok(path) => paths.push(path),
                Err(e) => {
                    remove_files(&paths).await;
                    return Err(e);
                }
            }
        }
        Ok(paths)
    }

    /// Fetch a small text resource such as a caption file.
    pub async fn fetch_text(&self, url: &str) -> Result<String, MediaError> {
        Ok(self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }

    /// Remove the job's `inputs`, then store `output` if the FFmpeg step
    /// succeeded. A failed step also discards whatever partial output exists.
    pub async fn publish(
        &self,
        output: &Path,
        inputs: &[PathBuf],
        result: Result<(), FfmpegError>,
    ) -> Result<String, MediaError> {
        remove_files(inputs).await;
        if let Err(e) = result {
            remove_files(&[output.to_path_buf()]).await;
            return Err(e.into());
        }
        Ok(self.storage.store(output).await?)
    }
}

/// The file extension of the last path segment of `url`, if it looks like
/// one (1–5 alphanumeric characters).
fn url_extension(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            let segment = parsed.path_segments()?.last()?.to_string();
            let (_, ext) = segment.rsplit_once('.')?;
            let valid = (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric());
            valid.then(|| ext.to_ascii_lowercase())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
