use chrono::{DateTime, Utc};

/// Key of the single note kept by the store.
pub const NOTE_KEY: &str = "note";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub content: String,
    /// Modification time of the backing file, `None` until the first write.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    pub const fn empty() -> Self {
        Self {
            content: String::new(),
            updated_at: None,
        }
    }
}
