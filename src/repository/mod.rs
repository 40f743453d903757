use chrono::{DateTime, Utc};
use tokio::{fs, io::AsyncReadExt, io::AsyncWriteExt};

use std::{
    io,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::models::{NOTE_KEY, Note};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create data directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to move {} into place: {source}", path.display())]
    Rename { path: PathBuf, source: io::Error },
}

/// File backed store holding a single note under [`NOTE_KEY`].
///
/// Writes go to a temporary sibling file which is renamed over the note
/// file, so readers see either the old or the new content in full.
/// Concurrent writers are last-writer-wins.
#[derive(Debug, Clone)]
pub struct Repository {
    data_dir: PathBuf,
}

impl Repository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn note_path(&self) -> PathBuf {
        self.data_dir.join(format!("{NOTE_KEY}.txt"))
    }

    /// Creates the data directory if it is missing. Safe to call repeatedly.
    pub async fn ensure_storage(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.data_dir.clone(),
                source,
            })
    }

    pub async fn read_note(&self) -> Result<Note, StorageError> {
        let path = self.note_path();
        let read_err = |source| StorageError::Read {
            path: path.clone(),
            source,
        };

        let mut file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Note::empty()),
            Err(e) => return Err(read_err(e)),
        };

        let metadata = file.metadata().await.map_err(read_err)?;
        let modified = metadata.modified().map_err(read_err)?;

        let mut bytes = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
        file.read_to_end(&mut bytes).await.map_err(read_err)?;

        Ok(Note {
            content: String::from_utf8_lossy(&bytes).into_owned(),
            updated_at: Some(DateTime::<Utc>::from(modified)),
        })
    }

    /// Replaces the whole note and returns its new modification time.
    pub async fn write_note(&self, content: &str) -> Result<DateTime<Utc>, StorageError> {
        self.ensure_storage().await?;

        let path = self.note_path();
        let tmp_path = self.data_dir.join(format!(
            ".{NOTE_KEY}.{}.{}.tmp",
            process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let result = Self::write_and_swap(&tmp_path, &path, content.as_bytes()).await;
        if result.is_err() {
            if let Err(e) = fs::remove_file(&tmp_path).await {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        "failed to remove temporary file {}: {e}",
                        tmp_path.display()
                    );
                }
            }
        }

        result
    }

    async fn write_and_swap(
        tmp_path: &Path,
        path: &Path,
        bytes: &[u8],
    ) -> Result<DateTime<Utc>, StorageError> {
        let write_err = |source| StorageError::Write {
            path: tmp_path.to_path_buf(),
            source,
        };

        let mut file = fs::File::create(tmp_path).await.map_err(write_err)?;
        file.write_all(bytes).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;

        // rename keeps the mtime, and reading it from our own handle avoids
        // reporting a concurrent writer's timestamp
        let modified = file
            .metadata()
            .await
            .and_then(|m| m.modified())
            .map_err(write_err)?;
        drop(file);

        fs::rename(tmp_path, path)
            .await
            .map_err(|source| StorageError::Rename {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(DateTime::<Utc>::from(modified))
    }
}
