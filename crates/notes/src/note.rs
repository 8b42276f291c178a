//! Timestamped notes attached to a video position

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Note ID
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct NoteId(pub Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A committed annotation. Notes are never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,

    /// Seconds into the video, never negative
    pub timestamp: f64,

    pub text: String,

    /// Frame captured when the note was committed, as a `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Text was produced or rewritten by the assistant
    #[serde(default, skip_serializing_if = "is_false")]
    pub ai_generated: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Note {
    pub fn new(timestamp: f64, text: String) -> Self {
        Self {
            id: NoteId::new(),
            timestamp: sanitize_timestamp(timestamp),
            text,
            thumbnail: None,
            ai_generated: false,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: String) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn with_ai_generated(mut self, ai_generated: bool) -> Self {
        self.ai_generated = ai_generated;
        self
    }
}

/// Clamps a playback position to a valid note timestamp.
pub fn sanitize_timestamp(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
