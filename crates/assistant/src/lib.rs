//! Frame description and note refinement backed by a generative model.

mod config;
mod gemini;
mod scripted;

pub use config::{
    AssistantConfig, DEFAULT_API_BASE, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL,
};
pub use gemini::GeminiAssistant;
pub use scripted::ScriptedAssistant;

use async_trait::async_trait;
use media_io::EncodedImage;
use thiserror::Error;

pub const DESCRIBE_FRAME_PROMPT: &str = "Describe exactly what is happening in this video frame in one short sentence. Focus on key actions or visual elements.";

const REFINE_NOTE_PROMPT: &str = "Fix grammar, improve clarity, and make the following note more concise suitable for a video annotation. Keep the tone neutral and professional. Only return the refined text.";

/// Instruction sent with a draft note for refinement
pub fn refine_prompt(text: &str) -> String {
    format!("{REFINE_NOTE_PROMPT} Note: \"{text}\"")
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("no API key configured for the assistant")]
    MissingCredential,
    #[error("assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("assistant returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid assistant response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait AnnotationAssistant: Send + Sync {
    fn name(&self) -> &str;

    /// One-sentence description of the frame. Empty when the model says nothing.
    async fn analyze_frame(&self, image: &EncodedImage) -> Result<String, AssistantError>;

    /// Cleaned-up version of `text`, or `text` itself when the model says nothing.
    async fn refine_note_text(&self, text: &str) -> Result<String, AssistantError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refine_prompt_quotes_the_draft() {
        let prompt = refine_prompt("guy walk in door");
        assert!(prompt.starts_with("Fix grammar, improve clarity"));
        assert!(prompt.ends_with("Only return the refined text. Note: \"guy walk in door\""));
    }
}
