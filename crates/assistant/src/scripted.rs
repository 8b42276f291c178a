use crate::{AnnotationAssistant, AssistantError};
use async_trait::async_trait;
use media_io::EncodedImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

type Scripted = Result<String, String>;

/// Deterministic assistant that replays queued replies.
///
/// When a queue runs dry, analysis answers with an empty description and
/// refinement echoes its input. Queued `Err` entries surface as
/// [`AssistantError::InvalidResponse`].
#[derive(Default)]
pub struct ScriptedAssistant {
    descriptions: Mutex<VecDeque<Scripted>>,
    refinements: Mutex<VecDeque<Scripted>>,
    analyze_calls: AtomicUsize,
    refine_calls: AtomicUsize,
}

fn locked<T>(queue: &Mutex<T>) -> MutexGuard<'_, T> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(self, text: impl Into<String>) -> Self {
        locked(&self.descriptions).push_back(Ok(text.into()));
        self
    }

    pub fn with_analyze_failure(self, message: impl Into<String>) -> Self {
        locked(&self.descriptions).push_back(Err(message.into()));
        self
    }

    pub fn with_refinement(self, text: impl Into<String>) -> Self {
        locked(&self.refinements).push_back(Ok(text.into()));
        self
    }

    pub fn with_refine_failure(self, message: impl Into<String>) -> Self {
        locked(&self.refinements).push_back(Err(message.into()));
        self
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn refine_calls(&self) -> usize {
        self.refine_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnnotationAssistant for ScriptedAssistant {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn analyze_frame(&self, _image: &EncodedImage) -> Result<String, AssistantError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        match locked(&self.descriptions).pop_front() {
            Some(Ok(text)) => Ok(text.trim().to_string()),
            Some(Err(message)) => Err(AssistantError::InvalidResponse(message)),
            None => Ok(String::new()),
        }
    }

    async fn refine_note_text(&self, text: &str) -> Result<String, AssistantError> {
        self.refine_calls.fetch_add(1, Ordering::SeqCst);
        match locked(&self.refinements).pop_front() {
            Some(Ok(refined)) if !refined.trim().is_empty() => Ok(refined.trim().to_string()),
            Some(Ok(_)) | None => Ok(text.to_string()),
            Some(Err(message)) => Err(AssistantError::InvalidResponse(message)),
        }
    }
}
