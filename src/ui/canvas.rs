// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Preview canvas with the crop overlay.
//!
//! The preview is letterboxed into the available space and pointer drags on
//! it are reported in preview pixels, origin at the preview's top-left.

use clipcrop::{fit_preview_dimension, CropSelection, Dimension, Point, Rect};

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    BeginDrag(Point),
    UpdateDrag(Point),
    EndDrag(Point),
    /// Pointer left the preview while dragging
    PointerLeft(Point),
}

/// What the canvas laid out this frame.
pub struct CanvasOutput {
    pub action: CanvasAction,
    /// Letterboxed preview size, when something is shown
    pub preview: Option<Dimension>,
}

/// Display the preview and crop overlay, and turn pointer input into
/// [`CanvasAction`]s.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    selection: Option<&CropSelection>,
) -> CanvasOutput {
    let mut output = CanvasOutput {
        action: CanvasAction::None,
        preview: None,
    };
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);
    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(selection)) = (texture, selection) else {
            show_welcome(ui);
            return;
        };

        let available = ui.available_size();
        let container = Dimension::new(available.x.max(1.0) as u32, available.y.max(1.0) as u32);
        let preview = fit_preview_dimension(selection.source_dimension(), container);
        output.preview = Some(preview);

        // Center the preview
        let size = egui::vec2(preview.width as f32, preview.height as f32);
        let offset = (available - size) / 2.0;
        let image_rect = egui::Rect::from_min_size(ui.min_rect().min + offset, size);

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::drag());
        if let Some(pos) = response.interact_pointer_pos() {
            let point = preview_point(image_rect, pos);
            if response.drag_started() {
                let origin = ui.input(|i| i.pointer.press_origin());
                output.action = CanvasAction::BeginDrag(drag_anchor(image_rect, origin, pos));
            } else if response.drag_stopped() {
                output.action = CanvasAction::EndDrag(point);
            } else if response.dragged() {
                output.action = if image_rect.contains(pos) {
                    CanvasAction::UpdateDrag(point)
                } else {
                    CanvasAction::PointerLeft(point)
                };
            }
        }
        if response.hovered() || response.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }

        if let Some(rect) = selection.visible_rect() {
            // Geometry is in the previous frame's preview space until the app
            // applies this frame's size
            let scale = egui::vec2(
                size.x / selection.preview_dimension().width as f32,
                size.y / selection.preview_dimension().height as f32,
            );
            draw_selection(ui.painter(), image_rect, &rect, scale, selection.is_drawing());
        }
    });

    output
}

fn preview_point(image_rect: egui::Rect, pos: egui::Pos2) -> Point {
    Point::new((pos.x - image_rect.min.x) as f64, (pos.y - image_rect.min.y) as f64)
}

/// egui reports a drag only once the pointer has moved past a threshold;
/// the selection starts where the button went down.
fn drag_anchor(image_rect: egui::Rect, press_origin: Option<egui::Pos2>, pos: egui::Pos2) -> Point {
    preview_point(image_rect, press_origin.unwrap_or(pos))
}

fn draw_selection(
    painter: &egui::Painter,
    image_rect: egui::Rect,
    rect: &Rect,
    scale: egui::Vec2,
    in_progress: bool,
) {
    let min = image_rect.min + egui::vec2(rect.x as f32 * scale.x, rect.y as f32 * scale.y);
    let crop = egui::Rect::from_min_size(
        min,
        egui::vec2(rect.width as f32 * scale.x, rect.height as f32 * scale.y),
    );

    // Shade everything outside the crop
    let shade = egui::Color32::from_black_alpha(140);
    let outside = [
        egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, crop.min.y)),
        egui::Rect::from_min_max(egui::pos2(image_rect.min.x, crop.max.y), image_rect.max),
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, crop.min.y),
            egui::pos2(crop.min.x, crop.max.y),
        ),
        egui::Rect::from_min_max(
            egui::pos2(crop.max.x, crop.min.y),
            egui::pos2(image_rect.max.x, crop.max.y),
        ),
    ];
    for region in outside {
        if region.is_positive() {
            painter.rect_filled(region, 0.0, shade);
        }
    }

    let color = if in_progress {
        egui::Color32::LIGHT_BLUE
    } else {
        egui::Color32::YELLOW
    };
    painter.rect_stroke(crop, 0.0, egui::Stroke::new(2.0, color));
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("ClipCrop")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open an image or video to crop and trim it")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
