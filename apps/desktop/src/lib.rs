//! VideoNote desktop: session state machine, playback and the egui front end.

pub mod app;
pub mod assist;
mod clock;
pub mod config;
pub mod playback;
pub mod preview;
pub mod session;

pub use app::VideoNoteApp;
pub use assist::AssistDispatcher;
pub use config::{config_path, AppConfig, ConfigError};
pub use playback::PlaybackController;
pub use session::{
    AssistKind, AssistPayload, AssistRequest, AssistResponse, Draft, NoteExport, Session,
};
