use crate::assist::AssistDispatcher;
use crate::preview::PreviewWorker;
use crate::session::{AssistRequest, Session};
use eframe::egui::{self, Color32, ColorImage, Id, Key, Modifiers, TextureHandle, TextureOptions};
use media_io::{EncodedImage, RgbaFrame, SUPPORTED_EXTENSIONS};
use notes::{format_time, parse_time, NoteId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

const DRAFT_EDITOR_ID: &str = "draft_editor";
const ACCENT: Color32 = Color32::from_rgb(99, 102, 241);

enum UiAction {
    OpenDialog,
    Open(PathBuf),
    ChangeVideo,
    TogglePlay,
    Seek(f64),
    GoTo,
    Analyze,
    Refine,
    EditDraft(String),
    AddNote,
    Discard,
    Delete(NoteId),
    Export,
    Dismiss,
}

pub struct VideoNoteApp {
    session: Session,
    dispatcher: AssistDispatcher,
    preview: Option<PreviewWorker>,
    frame_texture: Option<TextureHandle>,
    thumbnails: HashMap<NoteId, Option<TextureHandle>>,
    last_requested: Option<f64>,
    goto_input: String,
}

impl VideoNoteApp {
    pub fn new(dispatcher: AssistDispatcher) -> Self {
        Self {
            session: Session::new(),
            dispatcher,
            preview: None,
            frame_texture: None,
            thumbnails: HashMap::new(),
            last_requested: None,
            goto_input: String::new(),
        }
    }

    fn open(&mut self, ctx: &egui::Context, path: PathBuf) {
        if self.session.load_video(&path).is_err() {
            return;
        }
        // Stop the old decoder before starting one for the new file.
        self.preview = None;
        self.frame_texture = None;
        self.thumbnails.clear();
        self.last_requested = None;

        let repaint_ctx = ctx.clone();
        match PreviewWorker::spawn(path, move || repaint_ctx.request_repaint()) {
            Ok(worker) => self.preview = Some(worker),
            Err(err) => {
                error!("failed to start preview worker: {err}");
                self.session
                    .notify(format!("Could not start video preview: {err}"));
            }
        }
    }

    fn close(&mut self) {
        self.preview = None;
        self.frame_texture = None;
        self.thumbnails.clear();
        self.last_requested = None;
        self.session.unload_video();
    }

    fn dispatch(&self, ctx: &egui::Context, request: Option<AssistRequest>) {
        let Some(request) = request else {
            return;
        };
        let repaint_ctx = ctx.clone();
        self.dispatcher
            .dispatch(request, move || repaint_ctx.request_repaint());
    }

    fn export(&mut self) {
        let Some(export) = self.session.export() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&export.file_name)
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        match std::fs::write(&path, export.contents) {
            Ok(()) => info!(
                "exported {} notes to {}",
                self.session.notes().len(),
                path.display()
            ),
            Err(err) => {
                error!("export to {} failed: {err}", path.display());
                self.session.notify(format!("Export failed: {err}"));
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: UiAction) {
        match action {
            UiAction::OpenDialog => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Video", SUPPORTED_EXTENSIONS)
                    .pick_file()
                {
                    self.open(ctx, path);
                }
            }
            UiAction::Open(path) => self.open(ctx, path),
            UiAction::ChangeVideo => self.close(),
            UiAction::TogglePlay => self.session.playback_mut().toggle(),
            UiAction::Seek(t) => {
                self.session.seek_to(t);
            }
            UiAction::GoTo => match parse_time(&self.goto_input) {
                Ok(t) => {
                    self.session.seek_to(t);
                    self.goto_input.clear();
                }
                Err(err) => self.session.notify(err),
            },
            UiAction::Analyze => {
                let request = self.session.begin_analyze();
                self.dispatch(ctx, request);
            }
            UiAction::Refine => {
                let request = self.session.begin_refine();
                self.dispatch(ctx, request);
            }
            UiAction::EditDraft(text) => *self.session.draft_text_mut() = text,
            UiAction::AddNote => {
                self.session.add_note();
            }
            UiAction::Discard => self.session.discard_draft(),
            UiAction::Delete(id) => {
                self.session.delete_note(&id);
                self.thumbnails.remove(&id);
            }
            UiAction::Export => self.export(),
            UiAction::Dismiss => self.session.dismiss_notification(),
        }
    }

    /// Drain worker output into the session.
    fn poll_workers(&mut self, ctx: &egui::Context) {
        while let Some(response) = self.dispatcher.try_recv() {
            self.session.complete(response);
        }

        if let Some(t) = self.session.playback_mut().tick() {
            if let Some(preview) = &self.preview {
                preview.show(t);
                self.last_requested = Some(t);
            }
        }
        if self.session.playback().is_playing() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }

        let Some(shown) = self.preview.as_ref().and_then(|p| p.latest()) else {
            return;
        };
        if !shown.frame.is_valid() {
            return;
        }
        let image = color_image(&shown.frame);
        match &mut self.frame_texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.frame_texture =
                    Some(ctx.load_texture("video-frame", image, TextureOptions::LINEAR))
            }
        }
        self.session.present_frame(shown.frame);
    }

    fn request_preview(&mut self) {
        let t = self.session.playback().current_time();
        if self.last_requested.is_some_and(|last| (last - t).abs() < 1e-3) {
            return;
        }
        if let Some(preview) = &self.preview {
            preview.show(t);
            self.last_requested = Some(t);
        }
    }

    fn cache_thumbnails(&mut self, ctx: &egui::Context) {
        for note in self.session.notes().list_notes() {
            if self.thumbnails.contains_key(&note.id) {
                continue;
            }
            let texture = note
                .thumbnail
                .as_deref()
                .and_then(decode_thumbnail)
                .map(|image| {
                    ctx.load_texture(format!("thumb-{}", note.id), image, TextureOptions::LINEAR)
                });
            self.thumbnails.insert(note.id, texture);
        }
    }

    fn notification_ui(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let Some(message) = self.session.notification() else {
            return;
        };
        egui::TopBottomPanel::top("notification").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(Color32::from_rgb(248, 113, 113), message);
                if ui.small_button("Dismiss").clicked() {
                    actions.push(UiAction::Dismiss);
                }
            });
        });
    }

    fn upload_ui(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                ui.heading(egui::RichText::new("VideoNote AI").size(32.0).strong());
                ui.label("Upload a video to start annotating with AI-powered insights.");
                ui.add_space(16.0);
                if ui
                    .add(egui::Button::new("Open Video").fill(ACCENT).min_size(egui::vec2(160.0, 36.0)))
                    .clicked()
                {
                    actions.push(UiAction::OpenDialog);
                }
                ui.add_space(8.0);
                ui.weak("MP4, WebM, Ogg supported. You can also drop a file here.");
            });
        });
    }

    fn header_ui(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(self.session.video_name().unwrap_or_default());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Change Video").clicked() {
                        actions.push(UiAction::ChangeVideo);
                    }
                });
            });
        });
    }

    fn transport_ui(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::bottom("transport").show(ctx, |ui| {
            let playback = self.session.playback();
            ui.horizontal(|ui| {
                let label = if playback.is_playing() { "⏸" } else { "▶" };
                if ui.button(label).clicked() {
                    actions.push(UiAction::TogglePlay);
                }

                let mut position = playback.current_time();
                let slider = egui::Slider::new(&mut position, 0.0..=playback.duration())
                    .show_value(false);
                if ui.add(slider).changed() {
                    actions.push(UiAction::Seek(position));
                }
                ui.monospace(format!(
                    "{} / {}",
                    format_time(playback.current_time()),
                    format_time(playback.duration())
                ));

                ui.separator();
                let goto = ui.add(
                    egui::TextEdit::singleline(&mut self.goto_input)
                        .hint_text("MM:SS")
                        .desired_width(60.0),
                );
                let submitted = goto.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
                if ui.button("Go").clicked() || submitted {
                    actions.push(UiAction::GoTo);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let export = ui.add_enabled(
                        !self.session.notes().is_empty(),
                        egui::Button::new("Export JSON"),
                    );
                    if export.clicked() {
                        actions.push(UiAction::Export);
                    }
                });
            });
        });
    }

    fn notes_ui(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::SidePanel::right("notes")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("Notes");
                ui.separator();
                self.draft_ui(ui, actions);
                ui.separator();
                self.note_list_ui(ui, actions);
            });
    }

    fn draft_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let processing = self.session.is_processing();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!processing, egui::Button::new("Analyze Frame"))
                .on_hover_text("Describe the current frame with AI")
                .clicked()
            {
                actions.push(UiAction::Analyze);
            }
            if processing {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.monospace(format_time(self.session.pending_timestamp()));
                ui.label("At:");
            });
        });

        // Enter commits, Shift+Enter falls through to the editor as a newline.
        let editor_id = Id::new(DRAFT_EDITOR_ID);
        let focused = ui.memory(|m| m.has_focus(editor_id));
        if focused
            && ui.input_mut(|i| !i.modifiers.shift && i.consume_key(Modifiers::NONE, Key::Enter))
        {
            actions.push(UiAction::AddNote);
        }

        let mut text = self.session.draft().text.clone();
        let editor = ui.add(
            egui::TextEdit::multiline(&mut text)
                .id(editor_id)
                .hint_text("Type your note here...")
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );
        if editor.changed() {
            actions.push(UiAction::EditDraft(text));
        }

        let has_text = !self.session.draft().text.trim().is_empty();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(has_text, egui::Button::new("Add Note"))
                .clicked()
            {
                actions.push(UiAction::AddNote);
            }
            if ui
                .add_enabled(has_text && !processing, egui::Button::new("Refine"))
                .on_hover_text("Refine with AI")
                .clicked()
            {
                actions.push(UiAction::Refine);
            }
            let can_discard = has_text || self.session.active_timestamp().is_some();
            if ui
                .add_enabled(can_discard, egui::Button::new("Discard"))
                .clicked()
            {
                actions.push(UiAction::Discard);
            }
        });
    }

    fn note_list_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let notes = self.session.notes().list_notes();
        if notes.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.weak("No notes yet.");
                ui.small("Pause the video and start typing!");
            });
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            for note in notes {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        let stamp = egui::RichText::new(format!("▶ {}", format_time(note.timestamp)))
                            .monospace()
                            .color(ACCENT);
                        if ui.button(stamp).clicked() {
                            actions.push(UiAction::Seek(note.timestamp));
                        }
                        if note.ai_generated {
                            ui.small("AI");
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("🗑").on_hover_text("Delete note").clicked() {
                                actions.push(UiAction::Delete(note.id));
                            }
                        });
                    });
                    ui.horizontal(|ui| {
                        if let Some(Some(texture)) = self.thumbnails.get(&note.id) {
                            ui.add(egui::Image::new(texture).max_width(96.0));
                        }
                        ui.add(egui::Label::new(&note.text).wrap());
                    });
                });
            }
        });
    }

    fn preview_ui(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| match &self.frame_texture {
                    Some(texture) => {
                        ui.add(
                            egui::Image::new(texture)
                                .max_size(ui.available_size())
                                .maintain_aspect_ratio(true),
                        );
                    }
                    None => {
                        ui.weak("Loading frame...");
                    }
                });
            });
    }
}

impl eframe::App for VideoNoteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_workers(ctx);
        self.cache_thumbnails(ctx);

        let mut actions = Vec::new();
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .find_map(|file| file.path.clone())
        });
        if let Some(path) = dropped {
            actions.push(UiAction::Open(path));
        }

        self.notification_ui(ctx, &mut actions);
        if self.session.is_loaded() {
            let typing = ctx.memory(|m| m.focused().is_some());
            if !typing && ctx.input(|i| i.key_pressed(Key::Space)) {
                actions.push(UiAction::TogglePlay);
            }
            self.header_ui(ctx, &mut actions);
            self.transport_ui(ctx, &mut actions);
            self.notes_ui(ctx, &mut actions);
            self.preview_ui(ctx);
        } else {
            self.upload_ui(ctx, &mut actions);
        }

        for action in actions {
            self.apply(ctx, action);
        }
        self.request_preview();
    }
}

fn color_image(frame: &RgbaFrame) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [frame.width as usize, frame.height as usize],
        &frame.data,
    )
}

/// Decode a note's `data:` URL thumbnail for display.
fn decode_thumbnail(data_url: &str) -> Option<ColorImage> {
    let encoded = EncodedImage::parse_data_url(data_url)?;
    let bytes = encoded
        .decode_bytes()
        .map_err(|err| warn!("bad thumbnail payload: {err}"))
        .ok()?;
    let image = image::load_from_memory(&bytes)
        .map_err(|err| warn!("bad thumbnail image: {err}"))
        .ok()?
        .to_rgba8();
    Some(ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.as_raw(),
    ))
}
