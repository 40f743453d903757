use chrono::{DateTime, Local, Utc};

use crate::api::{ClientError, NoteBackend, NoteSnapshot, SaveReceipt};

/// Client side view of the note: an editable draft plus load/save state.
///
/// The draft only becomes authoritative once a save succeeds. Loading and
/// saving are tracked separately, and an error from either phase is kept
/// until the next successful load or save.
#[derive(Debug, Clone)]
pub struct NoteEditor {
    draft: String,
    loading: bool,
    saving: bool,
    error: Option<String>,
    last_loaded_at: Option<DateTime<Utc>>,
    last_saved_at: Option<DateTime<Utc>>,
    focused: bool,
}

impl Default for NoteEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteEditor {
    /// A fresh editor starts out loading.
    pub const fn new() -> Self {
        Self {
            draft: String::new(),
            loading: true,
            saving: false,
            error: None,
            last_loaded_at: None,
            last_saved_at: None,
            focused: false,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn last_loaded_at(&self) -> Option<DateTime<Utc>> {
        self.last_loaded_at
    }

    pub const fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Input is locked only while loading; a save in flight does not block edits.
    pub const fn input_enabled(&self) -> bool {
        !self.loading
    }

    pub const fn can_save(&self) -> bool {
        !self.loading && !self.saving
    }

    pub const fn can_reload(&self) -> bool {
        !self.loading && !self.saving
    }

    pub fn status_text(&self) -> String {
        if self.saving {
            "Saving…".to_string()
        } else if self.loading {
            "Loading…".to_string()
        } else if let Some(error) = &self.error {
            format!("Error: {error}")
        } else {
            "Ready".to_string()
        }
    }

    /// Replaces the draft. Returns `false` and leaves it untouched while loading.
    pub fn edit(&mut self, text: impl Into<String>) -> bool {
        if !self.input_enabled() {
            return false;
        }
        self.draft = text.into();
        true
    }

    pub fn append_line(&mut self, line: &str) -> bool {
        if !self.input_enabled() {
            return false;
        }
        if !self.draft.is_empty() {
            self.draft.push('\n');
        }
        self.draft.push_str(line);
        true
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.focused = false;
    }

    pub fn finish_load(&mut self, result: Result<NoteSnapshot, ClientError>) {
        match result {
            Ok(snapshot) => {
                self.draft = snapshot.content.unwrap_or_default();
                self.last_loaded_at = snapshot.updated_at;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("loading note failed: {e}");
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
        self.focused = true;
    }

    pub async fn load<B: NoteBackend>(&mut self, backend: &B) {
        self.begin_load();
        let result = backend.load().await;
        self.finish_load(result);
    }

    /// Marks a save in flight and returns the content to send.
    pub fn begin_save(&mut self) -> String {
        self.saving = true;
        self.draft.clone()
    }

    pub fn finish_save(&mut self, result: Result<SaveReceipt, ClientError>) {
        match result {
            Ok(receipt) => {
                self.last_saved_at = Some(receipt.saved_at.unwrap_or_else(Utc::now));
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("saving note failed: {e}");
                self.error = Some(e.to_string());
            }
        }
        self.saving = false;
    }

    pub async fn save<B: NoteBackend>(&mut self, backend: &B) {
        let content = self.begin_save();
        let result = backend.save(&content).await;
        self.finish_save(result);
    }

    /// Drops every bit of local state, unsaved draft included, and loads again.
    pub async fn reload<B: NoteBackend>(&mut self, backend: &B) {
        *self = Self::new();
        self.load(backend).await;
    }
}

/// Local time as `YYYY-MM-DD HH:MM:SS`, or a dash when unknown.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(
        || "—".to_string(),
        |ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        stored: Mutex<Option<String>>,
        updated_at: Option<DateTime<Utc>>,
        fail_load: bool,
        fail_save: bool,
        omit_saved_at: bool,
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    impl NoteBackend for FakeBackend {
        async fn load(&self) -> Result<NoteSnapshot, ClientError> {
            if self.fail_load {
                return Err(ClientError::LoadFailed(StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(NoteSnapshot {
                content: self.stored.lock().unwrap().clone(),
                updated_at: self.updated_at,
            })
        }

        async fn save(&self, content: &str) -> Result<SaveReceipt, ClientError> {
            if self.fail_save {
                return Err(ClientError::SaveFailed(StatusCode::INTERNAL_SERVER_ERROR));
            }
            *self.stored.lock().unwrap() = Some(content.to_string());
            Ok(SaveReceipt {
                saved_at: (!self.omit_saved_at).then(|| ts(2_000)),
            })
        }
    }

    fn backend_with(content: &str) -> FakeBackend {
        FakeBackend {
            stored: Mutex::new(Some(content.to_string())),
            updated_at: Some(ts(1_000)),
            ..FakeBackend::default()
        }
    }

    #[test]
    fn new_editor_is_loading_with_input_locked() {
        let mut editor = NoteEditor::new();

        assert_eq!(editor.status_text(), "Loading…");
        assert!(!editor.input_enabled());
        assert!(!editor.can_save());
        assert!(!editor.edit("typed too early"));
        assert_eq!(editor.draft(), "");
    }

    #[tokio::test]
    async fn load_populates_draft_and_focuses() {
        let backend = backend_with("stored note");
        let mut editor = NoteEditor::new();

        editor.load(&backend).await;

        assert_eq!(editor.draft(), "stored note");
        assert_eq!(editor.last_loaded_at(), Some(ts(1_000)));
        assert_eq!(editor.status_text(), "Ready");
        assert!(editor.is_focused());
        assert!(editor.input_enabled());
    }

    #[tokio::test]
    async fn missing_content_loads_as_empty_draft() {
        let backend = FakeBackend::default();
        let mut editor = NoteEditor::new();

        editor.load(&backend).await;

        assert_eq!(editor.draft(), "");
        assert_eq!(editor.last_loaded_at(), None);
        assert_eq!(editor.status_text(), "Ready");
    }

    #[tokio::test]
    async fn failed_load_sets_error_and_still_becomes_ready() {
        let backend = FakeBackend {
            fail_load: true,
            ..backend_with("unreachable")
        };
        let mut editor = NoteEditor::new();

        editor.load(&backend).await;

        assert!(!editor.is_loading());
        assert_eq!(editor.draft(), "");
        assert_eq!(editor.status_text(), "Error: Failed to load");
        assert!(editor.is_focused());
    }

    #[tokio::test]
    async fn save_sends_draft_and_records_timestamp() {
        let backend = backend_with("old");
        let mut editor = NoteEditor::new();
        editor.load(&backend).await;

        assert!(editor.edit("new text"));
        editor.save(&backend).await;

        assert_eq!(backend.stored.lock().unwrap().as_deref(), Some("new text"));
        assert_eq!(editor.last_saved_at(), Some(ts(2_000)));
        assert!(!editor.is_saving());
        assert_eq!(editor.status_text(), "Ready");
    }

    #[tokio::test]
    async fn save_without_timestamp_uses_current_time() {
        let backend = FakeBackend {
            omit_saved_at: true,
            ..backend_with("")
        };
        let mut editor = NoteEditor::new();
        editor.load(&backend).await;
        let before = Utc::now();

        editor.save(&backend).await;

        assert!(editor.last_saved_at().unwrap() >= before);
    }

    #[tokio::test]
    async fn failed_save_keeps_draft_and_reports_error() {
        let backend = FakeBackend {
            fail_save: true,
            ..backend_with("old")
        };
        let mut editor = NoteEditor::new();
        editor.load(&backend).await;
        editor.edit("unsaved");

        editor.save(&backend).await;

        assert!(!editor.is_saving());
        assert_eq!(editor.draft(), "unsaved");
        assert_eq!(editor.last_saved_at(), None);
        assert_eq!(editor.status_text(), "Error: Failed to save");
    }

    #[tokio::test]
    async fn successful_save_clears_previous_error() {
        let failing = FakeBackend {
            fail_load: true,
            ..FakeBackend::default()
        };
        let working = backend_with("");
        let mut editor = NoteEditor::new();
        editor.load(&failing).await;
        assert!(editor.error().is_some());

        editor.save(&working).await;

        assert_eq!(editor.error(), None);
    }

    #[tokio::test]
    async fn saving_status_wins_and_edits_stay_enabled() {
        let backend = backend_with("note");
        let mut editor = NoteEditor::new();
        editor.load(&backend).await;

        let sent = editor.begin_save();

        assert_eq!(sent, "note");
        assert_eq!(editor.status_text(), "Saving…");
        assert!(editor.input_enabled());
        assert!(!editor.can_save());
        assert!(!editor.can_reload());
        assert!(editor.edit("typed while saving"));

        // loading underneath a save still reads as saving
        editor.begin_load();
        assert_eq!(editor.status_text(), "Saving…");
    }

    #[tokio::test]
    async fn reload_discards_unsaved_draft() {
        let backend = backend_with("on server");
        let mut editor = NoteEditor::new();
        editor.load(&backend).await;
        editor.edit("local only");
        editor.save(&FakeBackend {
            fail_save: true,
            ..FakeBackend::default()
        })
        .await;

        editor.reload(&backend).await;

        assert_eq!(editor.draft(), "on server");
        assert_eq!(editor.error(), None);
        assert_eq!(editor.last_saved_at(), None);
    }

    #[tokio::test]
    async fn append_line_joins_with_newline() {
        let backend = backend_with("");
        let mut editor = NoteEditor::new();
        editor.load(&backend).await;

        editor.append_line("first");
        editor.append_line("second");

        assert_eq!(editor.draft(), "first\nsecond");
    }

    #[test]
    fn missing_timestamp_formats_as_dash() {
        assert_eq!(format_timestamp(None), "—");
        assert_eq!(format_timestamp(Some(ts(0))).len(), "1970-01-01 00:00:00".len());
    }
}
