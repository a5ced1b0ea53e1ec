// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Properties panel showing the open file, its edits and export settings.

use clipcrop::util::time::format_timestamp;
use clipcrop::{ExportConfig, MediaDocument, PixelRect};

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    SelectPreset(&'static str),
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    document: Option<&MediaDocument>,
    config: &ExportConfig,
    preset: &str,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Media");
    ui.separator();

    let Some(document) = document else {
        ui.label(egui::RichText::new("No file loaded").weak());
        return action;
    };

    egui::Grid::new("media_properties")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            ui.label("File");
            ui.label(document.file_name());
            ui.end_row();

            ui.label("Type");
            ui.label(document.media_type.as_str());
            ui.end_row();

            ui.label("Size");
            ui.label(document.source_dim.to_string());
            ui.end_row();

            if let Some(duration) = document.duration_sec {
                ui.label("Duration");
                ui.label(format_timestamp(duration));
                ui.end_row();

                ui.label("Audio");
                ui.label(if document.has_audio { "yes" } else { "none" });
                ui.end_row();
            }
        });

    ui.add_space(12.0);
    ui.heading("Edit");
    ui.separator();

    match document.crop {
        Some(rect) => {
            let pixels = PixelRect::from_rect(&rect, document.source_dim);
            ui.label(format!(
                "Crop {}x{} at ({}, {})",
                pixels.width, pixels.height, pixels.x, pixels.y
            ));
        }
        None => {
            ui.label(egui::RichText::new("Crop: full frame").weak());
        }
    }
    if document.is_video() {
        match document.trim.filter(|t| !t.is_full()) {
            Some(trim) => {
                ui.label(format!(
                    "Trim {} – {}",
                    format_timestamp(trim.start_sec),
                    format_timestamp(trim.end_sec)
                ));
            }
            None => {
                ui.label(egui::RichText::new("Trim: whole video").weak());
            }
        }
    }

    ui.add_space(12.0);
    ui.heading("Export");
    ui.separator();

    if document.is_video() {
        egui::ComboBox::from_label("Preset")
            .selected_text(preset)
            .show_ui(ui, |ui| {
                for name in ExportConfig::PRESET_NAMES {
                    if ui.selectable_label(*name == preset, *name).clicked() {
                        action = PropertiesAction::SelectPreset(*name);
                    }
                }
            });
        ui.label(
            egui::RichText::new(format!(
                "{} / {}, CRF {}, {}",
                config.video_codec, config.audio_codec, config.crf, config.preset
            ))
            .weak(),
        );
    } else {
        ui.label(egui::RichText::new("Format follows the file extension").weak());
    }

    action
}
