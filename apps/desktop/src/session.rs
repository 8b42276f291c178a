//! Editing session for one video: notes, playback, draft and assistant state.
//!
//! Every UI event maps to one method here. Assistant calls are split into
//! `begin_*` (produces an [`AssistRequest`]) and [`Session::complete`] (applies
//! the [`AssistResponse`]) so the network round trip can run elsewhere.

use crate::playback::PlaybackController;
use assistant::{AnnotationAssistant, AssistantError};
use media_io::{EncodedImage, FrameCapturer, FrameSource, MediaSource, RgbaFrame, SourceError};
use notes::{export_file_name, NewNote, Note, NoteId, NoteStore};
use std::path::Path;
use tracing::{debug, error, info};

pub const ANALYZE_FAILED: &str = "Failed to analyze the frame. Please check your API key.";
pub const REFINE_FAILED: &str = "Failed to refine text.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistKind {
    Analyze,
    Refine,
}

#[derive(Debug, Clone)]
pub enum AssistPayload {
    Analyze(EncodedImage),
    Refine(String),
}

/// Work for the assistant, tagged with the video it was issued for.
#[derive(Debug, Clone)]
pub struct AssistRequest {
    pub epoch: u64,
    pub payload: AssistPayload,
}

impl AssistRequest {
    pub fn kind(&self) -> AssistKind {
        match self.payload {
            AssistPayload::Analyze(_) => AssistKind::Analyze,
            AssistPayload::Refine(_) => AssistKind::Refine,
        }
    }

    pub async fn run(self, assistant: &dyn AnnotationAssistant) -> AssistResponse {
        let kind = self.kind();
        let result = match &self.payload {
            AssistPayload::Analyze(image) => assistant.analyze_frame(image).await,
            AssistPayload::Refine(text) => assistant.refine_note_text(text).await,
        };
        AssistResponse {
            epoch: self.epoch,
            kind,
            result,
        }
    }
}

#[derive(Debug)]
pub struct AssistResponse {
    pub epoch: u64,
    pub kind: AssistKind,
    pub result: Result<String, AssistantError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub text: String,
    /// Last written by the assistant
    pub ai_assisted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteExport {
    pub file_name: String,
    pub contents: String,
}

/// The open video plus the frame currently on screen.
pub struct LoadedVideo {
    media: MediaSource,
    displayed: Option<RgbaFrame>,
}

impl FrameSource for LoadedVideo {
    fn current_frame(&self) -> Option<&RgbaFrame> {
        self.displayed.as_ref()
    }
}

#[derive(Default)]
pub struct Session {
    notes: NoteStore,
    playback: PlaybackController,
    source: Option<LoadedVideo>,
    draft: Draft,
    active_timestamp: Option<f64>,
    in_flight: Option<AssistKind>,
    // Bumped whenever the video changes; stale responses carry an old value.
    epoch: u64,
    notification: Option<String>,
    capturer: FrameCapturer,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    pub fn source(&self) -> Option<&LoadedVideo> {
        self.source.as_ref()
    }

    pub fn video_name(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.media.name())
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Direct edits by the user; the text is no longer assistant output.
    pub fn draft_text_mut(&mut self) -> &mut String {
        self.draft.ai_assisted = false;
        &mut self.draft.text
    }

    pub fn active_timestamp(&self) -> Option<f64> {
        self.active_timestamp
    }

    /// Timestamp the next note would get
    pub fn pending_timestamp(&self) -> f64 {
        self.active_timestamp
            .unwrap_or_else(|| self.playback.current_time())
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<AssistKind> {
        self.in_flight
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(message.into());
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Probe `path` and switch to it. On failure the current video stays.
    pub fn load_video(&mut self, path: &Path) -> Result<(), SourceError> {
        match MediaSource::open(path) {
            Ok(media) => {
                self.install_source(media);
                Ok(())
            }
            Err(err) => {
                error!("failed to open {}: {err}", path.display());
                self.notification = Some(format!("Could not open video: {err}"));
                Err(err)
            }
        }
    }

    pub fn install_source(&mut self, media: MediaSource) {
        // Release the previous handle before taking the new one.
        self.source = None;
        self.clear();
        let duration = media.duration().unwrap_or(0.0);
        info!("loaded {} ({duration:.2}s)", media.name());
        self.playback.on_metadata_loaded(duration);
        self.source = Some(LoadedVideo {
            media,
            displayed: None,
        });
    }

    /// Safe to call with nothing loaded.
    pub fn unload_video(&mut self) {
        if let Some(source) = self.source.take() {
            info!("unloading {}", source.media.name());
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.epoch += 1;
        self.notes.reset();
        self.playback.reset();
        self.draft = Draft::default();
        self.active_timestamp = None;
        self.in_flight = None;
        self.notification = None;
    }

    /// Record the frame now on screen. Ignored with nothing loaded.
    pub fn present_frame(&mut self, frame: RgbaFrame) {
        if let Some(source) = self.source.as_mut() {
            source.displayed = Some(frame);
        }
    }

    pub fn on_time_update(&mut self, seconds: f64) {
        self.playback.on_time_update(seconds);
    }

    pub fn on_metadata_loaded(&mut self, duration: f64) {
        self.playback.on_metadata_loaded(duration);
    }

    pub fn seek_to(&mut self, seconds: f64) -> f64 {
        self.playback.seek_to(seconds)
    }

    pub fn capture_frame(&self) -> Option<EncodedImage> {
        self.source.as_ref().and_then(|s| self.capturer.capture(s))
    }

    /// Pause, snapshot the frame and pin its timestamp. `None` without a
    /// video, while another request runs, or when no frame is available.
    pub fn begin_analyze(&mut self) -> Option<AssistRequest> {
        if self.source.is_none() || self.in_flight.is_some() {
            return None;
        }
        self.playback.pause();
        let image = self.capture_frame()?;
        self.active_timestamp = Some(self.playback.current_time());
        self.in_flight = Some(AssistKind::Analyze);
        Some(AssistRequest {
            epoch: self.epoch,
            payload: AssistPayload::Analyze(image),
        })
    }

    pub fn begin_refine(&mut self) -> Option<AssistRequest> {
        if self.draft.text.trim().is_empty() || self.in_flight.is_some() {
            return None;
        }
        self.in_flight = Some(AssistKind::Refine);
        Some(AssistRequest {
            epoch: self.epoch,
            payload: AssistPayload::Refine(self.draft.text.clone()),
        })
    }

    /// Apply an assistant result. Returns `false` for responses issued
    /// before the video changed.
    pub fn complete(&mut self, response: AssistResponse) -> bool {
        if response.epoch != self.epoch {
            debug!(
                "discarding {:?} response from epoch {} (now {})",
                response.kind, response.epoch, self.epoch
            );
            return false;
        }
        self.in_flight = None;
        match response.result {
            Ok(text) => {
                self.draft.ai_assisted = !text.trim().is_empty();
                self.draft.text = text;
            }
            Err(err) => {
                let message = match response.kind {
                    AssistKind::Analyze => ANALYZE_FAILED,
                    AssistKind::Refine => REFINE_FAILED,
                };
                error!("{:?} request failed: {err}", response.kind);
                self.notification = Some(message.to_string());
            }
        }
        true
    }

    pub async fn analyze_with(&mut self, assistant: &dyn AnnotationAssistant) -> bool {
        match self.begin_analyze() {
            Some(request) => {
                let response = request.run(assistant).await;
                self.complete(response)
            }
            None => false,
        }
    }

    pub async fn refine_with(&mut self, assistant: &dyn AnnotationAssistant) -> bool {
        match self.begin_refine() {
            Some(request) => {
                let response = request.run(assistant).await;
                self.complete(response)
            }
            None => false,
        }
    }

    /// Commit the draft at the pinned (or current) timestamp with a
    /// thumbnail of the current frame.
    pub fn add_note(&mut self) -> Option<Note> {
        if self.draft.text.trim().is_empty() {
            return None;
        }
        let timestamp = self.pending_timestamp();
        let thumbnail = self.capture_frame().map(|image| image.to_data_url());
        let draft = std::mem::take(&mut self.draft);
        self.active_timestamp = None;
        let note = self.notes.add_note_with(NewNote {
            text: draft.text,
            timestamp,
            thumbnail,
            ai_generated: draft.ai_assisted,
        })?;
        debug!("added note {} at {:.2}s", note.id, note.timestamp);
        Some(note)
    }

    pub fn discard_draft(&mut self) {
        self.draft = Draft::default();
        self.active_timestamp = None;
    }

    pub fn delete_note(&mut self, id: &NoteId) -> Option<Note> {
        self.notes.delete_note(id)
    }

    /// `None` without a video or notes.
    pub fn export(&self) -> Option<NoteExport> {
        let name = self.video_name()?;
        if self.notes.is_empty() {
            return None;
        }
        match self.notes.export_notes() {
            Ok(contents) => Some(NoteExport {
                file_name: export_file_name(name),
                contents,
            }),
            Err(err) => {
                error!("export failed: {err}");
                None
            }
        }
    }
}
