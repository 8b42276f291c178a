//! In-memory note collection for the loaded video

use crate::{Note, NoteError, NoteId};
use tracing::debug;

/// Input for a note that has not been committed yet
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub text: String,
    pub timestamp: f64,
    pub thumbnail: Option<String>,
    pub ai_generated: bool,
}

/// Notes ordered by timestamp. Equal timestamps keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note. Blank text is rejected and leaves the store untouched.
    pub fn add_note(
        &mut self,
        text: impl Into<String>,
        timestamp: f64,
        thumbnail: Option<String>,
    ) -> Option<Note> {
        self.add_note_with(NewNote {
            text: text.into(),
            timestamp,
            thumbnail,
            ai_generated: false,
        })
    }

    pub fn add_note_with(&mut self, new_note: NewNote) -> Option<Note> {
        if new_note.text.trim().is_empty() {
            return None;
        }

        let mut note =
            Note::new(new_note.timestamp, new_note.text).with_ai_generated(new_note.ai_generated);
        if let Some(thumbnail) = new_note.thumbnail {
            note = note.with_thumbnail(thumbnail);
        }

        // After every note at or before this timestamp, so ties stay in insertion order.
        let index = self
            .notes
            .partition_point(|existing| existing.timestamp <= note.timestamp);
        self.notes.insert(index, note.clone());
        debug!(id = %note.id, timestamp = note.timestamp, index, "note added");
        Some(note)
    }

    /// Remove a note. Unknown ids are ignored.
    pub fn delete_note(&mut self, id: &NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|note| &note.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Notes sorted by timestamp
    pub fn list_notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Drop every note, used when a new video replaces the current one
    pub fn reset(&mut self) {
        self.notes.clear();
    }

    /// Pretty-printed JSON array of all notes, in list order
    pub fn export_notes(&self) -> Result<String, NoteError> {
        Ok(serde_json::to_string_pretty(&self.notes)?)
    }
}

/// File name for an export of the notes taken on `video_name`.
pub fn export_file_name(video_name: &str) -> String {
    let name: String = video_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("notes-{name}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(store: &NoteStore) -> Vec<&str> {
        store.list_notes().iter().map(|n| n.text.as_str()).collect()
    }

    #[test]
    fn add_keeps_timestamp_order() {
        let mut store = NoteStore::new();
        store.add_note("late", 30.0, None).unwrap();
        store.add_note("early", 1.0, None).unwrap();
        store.add_note("middle", 10.0, None).unwrap();

        assert_eq!(texts(&store), vec!["early", "middle", "late"]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let mut store = NoteStore::new();
        store.add_note("first", 5.0, None).unwrap();
        store.add_note("second", 5.0, None).unwrap();
        store.add_note("before", 2.0, None).unwrap();
        store.add_note("third", 5.0, None).unwrap();

        assert_eq!(texts(&store), vec!["before", "first", "second", "third"]);
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut store = NoteStore::new();
        assert!(store.add_note("", 1.0, None).is_none());
        assert!(store.add_note("   ", 1.0, None).is_none());
        assert!(store.add_note("\n\t", 1.0, None).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn text_is_stored_as_entered() {
        let mut store = NoteStore::new();
        let note = store.add_note("  padded  ", 1.0, None).unwrap();
        assert_eq!(note.text, "  padded  ");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = NoteStore::new();
        let keep = store.add_note("keep", 1.0, None).unwrap();
        let gone = store.add_note("gone", 2.0, None).unwrap();

        assert_eq!(store.delete_note(&gone.id).map(|n| n.text), Some("gone".into()));
        assert!(store.delete_note(&gone.id).is_none());
        assert!(store.delete_note(&NoteId::new()).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.list_notes()[0].id, keep.id);
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = NoteStore::new();
        store.add_note("a", 1.0, None);
        store.add_note("b", 2.0, Some("data:image/jpeg;base64,AA==".into()));
        store.reset();
        assert!(store.list_notes().is_empty());
    }

    #[test]
    fn export_of_empty_store_is_empty_array() {
        assert_eq!(NoteStore::new().export_notes().unwrap(), "[]");
    }

    #[test]
    fn export_file_name_follows_convention() {
        assert_eq!(export_file_name("clip.mp4"), "notes-clip.mp4.json");
        assert_eq!(export_file_name("a/b.webm"), "notes-a_b.webm.json");
    }
}
