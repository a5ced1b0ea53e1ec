// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the edit actions.

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    ClearCrop,
    ResetTrim,
    SaveAs,
}

/// Display the toolbar. Buttons are disabled when there is nothing to act on.
pub fn show(ui: &mut egui::Ui, has_crop: bool, is_video: bool, can_export: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(has_crop, egui::Button::new("✂ Clear Crop")).clicked() {
            action = ToolbarAction::ClearCrop;
        }
        if ui.add_enabled(is_video, egui::Button::new("⟲ Reset Trim")).clicked() {
            action = ToolbarAction::ResetTrim;
        }

        ui.separator();

        if ui.add_enabled(can_export, egui::Button::new("💾 Save As...")).clicked() {
            action = ToolbarAction::SaveAs;
        }

        ui.separator();

        let hint = if is_video {
            "Drag on the frame to crop, drag the timeline handles to trim"
        } else {
            "Drag on the image to select the crop region"
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
