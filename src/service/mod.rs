use crate::{
    dto::{NoteResponse, SaveNoteResponse},
    repository::{Repository, StorageError},
};

use std::sync::Arc;

/// Largest accepted note, in UTF-16 code units.
pub const MAX_CONTENT_CHARS: usize = 1_000_000;

#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    #[error("content has length {length}, limit is {MAX_CONTENT_CHARS}")]
    ContentTooLarge { length: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<Repository>,
}

impl NoteService {
    pub const fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_note(&self) -> Result<NoteResponse, NoteServiceError> {
        Ok(self.repo.read_note().await?.into())
    }

    pub async fn save_note(&self, content: String) -> Result<SaveNoteResponse, NoteServiceError> {
        // characters outside the BMP count twice, as in a browser string
        let length = content.encode_utf16().count();
        if length > MAX_CONTENT_CHARS {
            return Err(NoteServiceError::ContentTooLarge { length });
        }

        let saved_at = self.repo.write_note(&content).await?;
        tracing::info!("Saved note (length {})", length);

        Ok(SaveNoteResponse { ok: true, saved_at })
    }
}
