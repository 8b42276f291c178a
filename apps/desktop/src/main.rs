use anyhow::{anyhow, Result};
use assistant::GeminiAssistant;
use eframe::{egui, NativeOptions};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use videonote::{AppConfig, AssistDispatcher, VideoNoteApp};

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let config = AppConfig::load();
    if !config.assistant.has_credential() {
        warn!("no Gemini API key configured; set GEMINI_API_KEY to enable frame analysis");
    }
    info!("assistant config: {:?}", config.assistant);
    let dispatcher = AssistDispatcher::new(Arc::new(GeminiAssistant::new(config.assistant)))?;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("VideoNote AI")
            .with_inner_size([1280.0, 800.0])
            .with_drag_and_drop(true),
        ..NativeOptions::default()
    };
    eframe::run_native(
        "VideoNote AI",
        options,
        Box::new(move |_cc| Ok(Box::new(VideoNoteApp::new(dispatcher)))),
    )
    .map_err(|err| anyhow!("eframe: {err}"))
}
