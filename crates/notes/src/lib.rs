use thiserror::Error;

mod note;
pub use note::*;
mod store;
pub use store::*;
mod timecode;
pub use timecode::*;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),
}
