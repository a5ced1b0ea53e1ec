// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Trim timeline with start and end handles.

use clipcrop::util::time::format_timestamp;
use clipcrop::{Handle, TrimTimeline};

const TRACK_HEIGHT: f32 = 28.0;
const HANDLE_WIDTH: f32 = 8.0;

/// Result of timeline interaction.
pub enum TimelineAction {
    None,
    Press(Handle),
    /// Pointer x offset from the left of the track
    Move(f64),
    Release,
}

/// Draw the timeline and report handle drags. Lays the track out at the
/// available width and updates `timeline` to match.
pub fn show(ui: &mut egui::Ui, timeline: &mut TrimTimeline) -> TimelineAction {
    let mut action = TimelineAction::None;

    ui.horizontal(|ui| {
        ui.label(format!("In {}", format_timestamp(timeline.start_sec())));
        ui.separator();
        ui.label(format!("Out {}", format_timestamp(timeline.end_sec())));
        ui.separator();
        ui.label(
            egui::RichText::new(format!(
                "Length {} of {}",
                format_timestamp(timeline.end_sec() - timeline.start_sec()),
                format_timestamp(timeline.duration_sec())
            ))
            .weak(),
        );
    });

    let width = ui.available_width().max(1.0);
    let (track, response) =
        ui.allocate_exact_size(egui::vec2(width, TRACK_HEIGHT), egui::Sense::drag());
    timeline.set_width(track.width() as f64);

    let start_x = track.min.x + timeline.time_to_pixel(timeline.start_sec()) as f32;
    let end_x = track.min.x + timeline.time_to_pixel(timeline.end_sec()) as f32;

    let painter = ui.painter();
    painter.rect_filled(track, 3.0, egui::Color32::from_gray(60));
    painter.rect_filled(
        egui::Rect::from_x_y_ranges(start_x..=end_x, track.y_range()),
        0.0,
        egui::Color32::from_rgb(70, 120, 180),
    );
    for (x, handle) in [(start_x, Handle::Start), (end_x, Handle::End)] {
        let active = timeline.active_handle() == Some(handle);
        let color = if active {
            egui::Color32::WHITE
        } else {
            egui::Color32::from_gray(200)
        };
        painter.rect_filled(
            egui::Rect::from_center_size(
                egui::pos2(x, track.center().y),
                egui::vec2(HANDLE_WIDTH, TRACK_HEIGHT),
            ),
            2.0,
            color,
        );
    }

    if let Some(pos) = response.interact_pointer_pos() {
        let offset = (pos.x - track.min.x) as f64;
        if response.drag_started() {
            // Grab whichever handle is closer; coincident handles split by side
            let handle = if pos.x < start_x {
                Handle::Start
            } else if pos.x > end_x {
                Handle::End
            } else if (pos.x - start_x) <= (end_x - pos.x) {
                Handle::Start
            } else {
                Handle::End
            };
            action = TimelineAction::Press(handle);
        } else if response.dragged() {
            action = TimelineAction::Move(offset);
        }
    }
    if response.drag_stopped() {
        action = TimelineAction::Release;
    }
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
    }

    action
}
