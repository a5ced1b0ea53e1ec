// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app owns a [`MediaEditor`] plus the interactive models for the open
//! document. Pointer input goes to the crop selection and trim timeline;
//! their change notifications are drained every frame into the session.
//! Loading and exporting run on background threads and are polled here.

use crate::ui::{canvas, properties, timeline, toolbar};
use clipcrop::io::media::{self, LoadedImage};
use clipcrop::io::serialization;
use clipcrop::{
    CropSelection, Dimension, EditDescriptor, EditorError, ExportConfig, MediaDocument,
    MediaEditor, MediaType, SelectionEvent, TrimRange, TrimTimeline,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Result of background media loading.
struct LoadedMedia {
    document: MediaDocument,
    preview: LoadedImage,
    descriptor: Option<EditDescriptor>,
}

/// Line shown in the status bar.
enum Status {
    Info(String),
    Error(String),
}

/// Interaction models for the open document.
struct EditView {
    selection: CropSelection,
    selection_events: Receiver<SelectionEvent>,
    timeline: Option<TrimTimeline>,
    trim_events: Option<Receiver<TrimRange>>,
}

impl EditView {
    fn new(source: Dimension, duration_sec: Option<f64>) -> Self {
        // Preview size is corrected on the first canvas layout
        let mut selection = CropSelection::new(source, source);
        let selection_events = selection.subscribe();
        let (timeline, trim_events) = match duration_sec {
            Some(duration) => {
                let mut timeline = TrimTimeline::new(duration, 1.0);
                let events = timeline.subscribe();
                (Some(timeline), Some(events))
            }
            None => (None, None),
        };
        Self {
            selection,
            selection_events,
            timeline,
            trim_events,
        }
    }
}

/// Main application state.
pub struct ClipCropApp {
    editor: MediaEditor,

    /// Name of the selected export preset
    preset: &'static str,

    preview_texture: Option<egui::TextureHandle>,
    view: Option<EditView>,

    /// Background loader receiver
    media_loader: Option<Receiver<clipcrop::Result<LoadedMedia>>>,
    loading_message: Option<String>,

    status: Option<Status>,

    /// File given on the command line, opened on the first frame
    pending_open: Option<PathBuf>,
}

impl ClipCropApp {
    pub fn new(initial: Option<PathBuf>) -> Self {
        Self {
            editor: MediaEditor::new(),
            preset: "default",
            preview_texture: None,
            view: None,
            media_loader: None,
            loading_message: None,
            status: None,
            pending_open: initial,
        }
    }

    /// Open a media file (asynchronously).
    fn open_media(&mut self, path: PathBuf) {
        let probe = self.editor.probe();
        let tools = self.editor.tools().clone();
        let message = format!("Loading {}...", path.display());
        self.start_loading(message, move || {
            let document = MediaDocument::open(&path, probe.as_ref())?;
            let preview = media::load_preview(&document, &tools)?;
            Ok(LoadedMedia {
                document,
                preview,
                descriptor: None,
            })
        });
    }

    /// Load edit settings and the media they name (asynchronously).
    fn open_edit_settings(&mut self, path: PathBuf) {
        let probe = self.editor.probe();
        let tools = self.editor.tools().clone();
        self.start_loading("Loading edit settings...".to_string(), move || {
            let descriptor = serialization::load_descriptor(&path)?;
            let document = MediaDocument::open(&descriptor.media_file, probe.as_ref())?;
            let preview = media::load_preview(&document, &tools)?;
            Ok(LoadedMedia {
                document,
                preview,
                descriptor: Some(descriptor),
            })
        });
    }

    fn start_loading<F>(&mut self, message: String, job: F)
    where
        F: FnOnce() -> clipcrop::Result<LoadedMedia> + Send + 'static,
    {
        // Opening replaces the current file even if the new one fails to load
        self.close_media();
        let (sender, receiver) = channel();
        self.media_loader = Some(receiver);
        self.loading_message = Some(message);

        std::thread::spawn(move || {
            let _ = sender.send(job());
        });
    }

    fn close_media(&mut self) {
        self.editor.close();
        self.view = None;
        self.preview_texture = None;
    }

    fn finish_loading(&mut self, ctx: &egui::Context, loaded: LoadedMedia) {
        let LoadedMedia {
            document,
            preview,
            descriptor,
        } = loaded;

        let size = [preview.width as usize, preview.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &preview.pixels);
        self.preview_texture = Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));

        let name = document.file_name();
        self.view = Some(EditView::new(document.source_dim, document.duration_sec));
        self.editor.install(document);
        self.status = Some(Status::Info(format!("Opened {name}")));

        if let Some(descriptor) = descriptor {
            match self.editor.apply_descriptor(&descriptor) {
                Ok(()) => self.restore_view(),
                Err(e) => self.report_error("Could not apply edit settings", &e),
            }
        }
    }

    /// Mirror the session's crop and trim into the interaction models.
    fn restore_view(&mut self) {
        let (Some(view), Some(document)) = (self.view.as_mut(), self.editor.document()) else {
            return;
        };
        match &document.crop {
            Some(rect) => view.selection.restore(rect),
            None => view.selection.clear(),
        }
        if let (Some(timeline), Some(trim)) = (view.timeline.as_mut(), document.trim) {
            timeline.set_range(trim.start_sec, trim.end_sec);
        }
    }

    /// Push model notifications into the session.
    fn apply_view_events(&mut self) {
        let Some(view) = &self.view else {
            return;
        };
        let mut result = Ok(());
        for event in view.selection_events.try_iter() {
            result = result.and(match event {
                SelectionEvent::Committed { source, .. } => self.editor.set_crop(source),
                SelectionEvent::Cleared => self.editor.clear_crop(),
            });
        }
        if let Some(events) = &view.trim_events {
            for range in events.try_iter() {
                result = result.and(self.editor.set_trim(range));
            }
        }
        if let Err(e) = result {
            self.report_error("Edit rejected", &e);
        }
    }

    fn handle_canvas(&mut self, output: canvas::CanvasOutput) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        if let Some(preview) = output.preview {
            view.selection.resize_preview(preview);
        }
        match output.action {
            canvas::CanvasAction::BeginDrag(point) => {
                view.selection.begin_drag(point);
                // A new drag drops the old crop even if it ends up a click
                if let Err(e) = self.editor.clear_crop() {
                    self.report_error("Edit rejected", &e);
                }
            }
            canvas::CanvasAction::UpdateDrag(point) => {
                view.selection.update_drag(point);
            }
            canvas::CanvasAction::EndDrag(point) => {
                view.selection.end_drag(point);
            }
            canvas::CanvasAction::PointerLeft(point) => {
                view.selection.pointer_left(point);
            }
            canvas::CanvasAction::None => {}
        }
    }

    fn clear_crop(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.selection.clear();
        }
    }

    fn reset_trim(&mut self) {
        if let Some(timeline) = self.view.as_mut().and_then(|v| v.timeline.as_mut()) {
            timeline.reset();
        }
    }

    fn select_preset(&mut self, name: &'static str) {
        if let Some(config) = ExportConfig::preset(name) {
            log::info!("Export preset set to {}", name);
            self.editor.set_config(config);
            self.preset = name;
        }
    }

    /// Ask for an output path and start a background export.
    fn save_as(&mut self) {
        let Some(document) = self.editor.document() else {
            return;
        };
        let label = match document.media_type {
            MediaType::Image => "Images",
            MediaType::Video => "Videos",
        };
        let mut dialog = rfd::FileDialog::new()
            .add_filter(label, document.media_type.extensions())
            .set_file_name(default_output_name(&document.file_path));
        if let Some(dir) = document.file_path.parent() {
            dialog = dialog.set_directory(dir);
        }

        if let Some(path) = dialog.save_file() {
            match self.editor.spawn_export(path.clone()) {
                Ok(()) => {
                    self.status = Some(Status::Info(format!("Exporting to {}...", path.display())));
                }
                Err(e) => self.report_error("Export failed", &e),
            }
        }
    }

    fn save_edit_settings(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Edit settings", &["yaml", "yml", "json"])
            .set_file_name("edit.yaml")
            .save_file()
        {
            match self.editor.save_descriptor(&path) {
                Ok(()) => self.status = Some(Status::Info(format!("Saved {}", path.display()))),
                Err(e) => self.report_error("Could not save edit settings", &e),
            }
        }
    }

    fn report_error(&mut self, context: &str, error: &EditorError) {
        log::error!("{}: {} ({})", context, error, error.category());
        self.status = Some(Status::Error(error.user_message()));
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        if let Some(ref receiver) = self.media_loader {
            if let Ok(result) = receiver.try_recv() {
                self.media_loader = None;
                self.loading_message = None;
                match result {
                    Ok(loaded) => self.finish_loading(ctx, loaded),
                    Err(e) => self.report_error("Failed to open media", &e),
                }
            }
        }

        if let Some(result) = self.editor.poll_export() {
            match result {
                Ok(path) => self.status = Some(Status::Info(format!("Saved {}", path.display()))),
                Err(e) => self.report_error("Export failed", &e),
            }
        }

        if self.loading_message.is_some() {
            ctx.request_repaint();
        } else if self.editor.is_exporting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let loaded = self.editor.document().is_some();
        let can_export = loaded && !self.editor.is_exporting();
        let is_video = self.editor.document().is_some_and(MediaDocument::is_video);

        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open...").clicked() {
                    let all: Vec<&str> = MediaType::Image
                        .extensions()
                        .iter()
                        .chain(MediaType::Video.extensions())
                        .copied()
                        .collect();
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Media", &all)
                        .add_filter("Images", MediaType::Image.extensions())
                        .add_filter("Videos", MediaType::Video.extensions())
                        .pick_file()
                    {
                        self.open_media(path);
                    }
                    ui.close_menu();
                }
                if ui.add_enabled(can_export, egui::Button::new("Save As...")).clicked() {
                    self.save_as();
                    ui.close_menu();
                }
                ui.separator();
                if ui.add_enabled(loaded, egui::Button::new("Save Edit Settings...")).clicked() {
                    self.save_edit_settings();
                    ui.close_menu();
                }
                if ui.button("Load Edit Settings...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Edit settings", &["yaml", "yml", "json"])
                        .pick_file()
                    {
                        self.open_edit_settings(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui.add_enabled(loaded, egui::Button::new("Clear Crop (Esc)")).clicked() {
                    self.clear_crop();
                    ui.close_menu();
                }
                if ui.add_enabled(is_video, egui::Button::new("Reset Trim")).clicked() {
                    self.reset_trim();
                    ui.close_menu();
                }
            });
        });
    }
}

/// `clip.mp4` becomes `clip_edited.mp4`.
fn default_output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    match input.extension() {
        Some(ext) => format!("{stem}_edited.{}", ext.to_string_lossy()),
        None => format!("{stem}_edited"),
    }
}

impl eframe::App for ClipCropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(path) = self.pending_open.take() {
            self.open_media(path);
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.open_media(path);
        }

        self.poll_background(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ctx, ui));

        let has_crop = self.editor.document().is_some_and(|d| d.crop.is_some());
        let is_video = self.editor.document().is_some_and(MediaDocument::is_video);
        let can_export = self.editor.document().is_some() && !self.editor.is_exporting();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, has_crop, is_video, can_export))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::ClearCrop => self.clear_crop(),
            toolbar::ToolbarAction::ResetTrim => self.reset_trim(),
            toolbar::ToolbarAction::SaveAs => self.save_as(),
            toolbar::ToolbarAction::None => {}
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(target) = self.editor.export_target() {
                    ui.spinner();
                    ui.label(format!("Exporting {}", target.display()));
                    ui.separator();
                }
                match &self.status {
                    Some(Status::Info(text)) => {
                        ui.label(text);
                    }
                    Some(Status::Error(text)) => {
                        ui.colored_label(egui::Color32::from_rgb(230, 90, 80), text);
                    }
                    None => {
                        ui.label(egui::RichText::new("No file loaded").weak());
                    }
                }
            });
        });

        if let Some(trim) = self.view.as_mut().and_then(|v| v.timeline.as_mut()) {
            let action = egui::TopBottomPanel::bottom("timeline")
                .show(ctx, |ui| timeline::show(ui, trim))
                .inner;
            match action {
                timeline::TimelineAction::Press(handle) => trim.press(handle),
                timeline::TimelineAction::Move(offset) => {
                    trim.pointer_moved(offset);
                }
                timeline::TimelineAction::Release => trim.release(),
                timeline::TimelineAction::None => {}
            }
            // Drags can end anywhere in the window, not only over the track
            if ctx.input(|i| i.pointer.any_released()) {
                trim.release();
            }
        }

        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                properties::show(ui, self.editor.document(), self.editor.config(), self.preset)
            })
            .inner;
        if let properties::PropertiesAction::SelectPreset(name) = properties_action {
            self.select_preset(name);
        }

        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.clear_crop();
        }

        let canvas_output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    None
                } else {
                    Some(canvas::show(
                        ui,
                        self.preview_texture.as_ref(),
                        self.view.as_ref().map(|v| &v.selection),
                    ))
                }
            })
            .inner;
        if let Some(output) = canvas_output {
            self.handle_canvas(output);
        }

        self.apply_view_events();
    }
}
