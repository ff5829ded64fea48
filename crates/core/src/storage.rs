//! Local artifact storage and scratch-directory housekeeping.
//!
//! Finished artifacts are moved into a directory that the HTTP layer serves
//! under [`PUBLIC_PREFIX`]; callers receive the public path, never the
//! filesystem path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// URL prefix under which stored artifacts are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("artifact has no file name: {0}")]
    InvalidPath(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Moves finished files into the artifact directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Move `file` into storage and return its public URL path.
    ///
    /// Falls back to copy + remove when a plain rename crosses filesystems.
    pub async fn store(&self, file: &Path) -> Result<String, StorageError> {
        let name = file
            .file_name()
            .ok_or_else(|| StorageError::InvalidPath(file.to_string_lossy().to_string()))?
            .to_string_lossy()
            .to_string();

        tokio::fs::create_dir_all(&self.root).await?;
        let destination = self.root.join(&name);

        if tokio::fs::rename(file, &destination).await.is_err() {
            tokio::fs::copy(file, &destination).await?;
            tokio::fs::remove_file(file).await?;
        }

        tracing::info!(file = %destination.display(), "Artifact stored");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }
}

/// Delete regular files directly inside `dir` whose modification time is
/// older than `max_age`. Returns how many files were removed.
///
/// A missing directory counts as empty. Files that vanish or cannot be
/// removed are logged and skipped.
pub async fn delete_older_than(dir: &Path, max_age: Duration) -> Result<usize, StorageError> {
    let Some(cutoff) = chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|age| Utc::now().checked_sub_signed(age))
    else {
        // Nothing can be older than an unrepresentable age.
        return Ok(0);
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if DateTime::<Utc>::from(modified) >= cutoff {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => {
                tracing::debug!(file = %entry.path().display(), "Deleted stale scratch file");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(file = %entry.path().display(), error = %e, "Failed to delete scratch file");
            }
        }
    }

    Ok(removed)
}

/// Best-effort removal of intermediate files.
pub async fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(file = %path.display(), error = %e, "Error removing file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_moves_file_and_returns_public_path() {
        let scratch = tempfile::tempdir().unwrap();
        let uploads = tempfile::tempdir().unwrap();
        let file = scratch.path().join("job.mp3");
        tokio::fs::write(&file, b"data").await.unwrap();

        let storage = LocalStorage::new(uploads.path());
        let url = storage.store(&file).await.unwrap();

        assert_eq!(url, "/uploads/job.mp3");
        assert!(!file.exists());
        assert_eq!(
            tokio::fs::read(uploads.path().join("job.mp3")).await.unwrap(),
            b"data"
        );
    }

    #[tokio::test]
    async fn store_rejects_path_without_file_name() {
        let uploads = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(uploads.path());
        let err = storage.store(Path::new("/")).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn delete_older_than_keeps_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("fresh.mp4"), b"x").await.unwrap();

        let removed = delete_older_than(dir.path(), Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("fresh.mp4").exists());
    }

    #[tokio::test]
    async fn delete_older_than_zero_age_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("old.mp4"), b"x").await.unwrap();
        tokio::fs::create_dir(dir.path().join("nested")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let removed = delete_older_than(dir.path(), Duration::ZERO).await.unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn delete_older_than_missing_dir_is_empty() {
        let removed = delete_older_than(Path::new("/definitely/not/here"), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn remove_files_ignores_missing() {
        remove_files(&[PathBuf::from("/definitely/not/here.mp4")]).await;
    }
}
