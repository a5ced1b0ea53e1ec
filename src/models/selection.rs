// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rubber-band crop selection over the preview.
//!
//! A drag may start and end anywhere and in any direction; the points are
//! clamped into the preview and normalized into a rectangle with a
//! top-left origin. Committed rectangles are published in source space.

use crate::models::notify::Notifier;
use crate::util::geometry::{
    preview_rect_to_source_rect, source_rect_to_preview_rect, Dimension, Point, Rect,
};
use std::sync::mpsc::Receiver;

/// Rectangle spanned by two arbitrary corner points.
///
/// Swapping `p1` and `p2` yields the same rectangle.
pub fn normalize_rect(p1: Point, p2: Point) -> Rect {
    Rect {
        x: p1.x.min(p2.x),
        y: p1.y.min(p2.y),
        width: (p1.x - p2.x).abs(),
        height: (p1.y - p2.y).abs(),
    }
}

/// Drag state of the selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Idle,
    Drawing { anchor: Point, current: Point },
}

/// Published when the committed selection changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    Committed { preview: Rect, source: Rect },
    Cleared,
}

/// Crop selection for one preview of one source frame.
#[derive(Debug)]
pub struct CropSelection {
    preview: Dimension,
    source: Dimension,
    state: SelectionState,
    /// Last committed rectangle, preview space
    committed: Option<Rect>,
    notifier: Notifier<SelectionEvent>,
}

impl CropSelection {
    /// Create an idle selection. `preview` should come from
    /// [`crate::util::geometry::fit_preview_dimension`].
    pub fn new(preview: Dimension, source: Dimension) -> Self {
        Self {
            preview,
            source,
            state: SelectionState::Idle,
            committed: None,
            notifier: Notifier::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<SelectionEvent> {
        self.notifier.subscribe()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, SelectionState::Drawing { .. })
    }

    pub fn preview_dimension(&self) -> Dimension {
        self.preview
    }

    pub fn source_dimension(&self) -> Dimension {
        self.source
    }

    /// Committed rectangle in preview space.
    pub fn committed(&self) -> Option<Rect> {
        self.committed
    }

    /// Committed rectangle in source space.
    pub fn committed_source(&self) -> Option<Rect> {
        self.committed
            .map(|rect| preview_rect_to_source_rect(&rect, self.preview, self.source))
    }

    /// The in-progress rectangle while drawing.
    pub fn live_rect(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Drawing { anchor, current } => Some(normalize_rect(anchor, current)),
            SelectionState::Idle => None,
        }
    }

    /// Rectangle the user should currently see: live while drawing, else committed.
    pub fn visible_rect(&self) -> Option<Rect> {
        self.live_rect().or(self.committed)
    }

    /// Start a fresh selection at `point`, discarding any previous one.
    pub fn begin_drag(&mut self, point: Point) {
        let anchor = point.clamp_to(self.preview);
        self.committed = None;
        self.state = SelectionState::Drawing {
            anchor,
            current: anchor,
        };
        log::debug!("Crop drag started at ({:.1}, {:.1})", anchor.x, anchor.y);
    }

    /// Move the free corner. Ignored unless a drag is in progress.
    pub fn update_drag(&mut self, point: Point) -> Option<Rect> {
        match &mut self.state {
            SelectionState::Drawing { current, .. } => {
                *current = point.clamp_to(self.preview);
            }
            SelectionState::Idle => return None,
        }
        self.live_rect()
    }

    /// Finish the drag at `point`.
    ///
    /// Commits and returns the source-space rectangle when it has area. A
    /// zero-area drag (a click) leaves nothing selected and emits nothing.
    pub fn end_drag(&mut self, point: Point) -> Option<Rect> {
        let SelectionState::Drawing { anchor, .. } = self.state else {
            return None;
        };
        self.state = SelectionState::Idle;

        let rect = normalize_rect(anchor, point.clamp_to(self.preview));
        if rect.is_empty() {
            log::debug!("Crop drag ended without area, selection discarded");
            return None;
        }

        let source = preview_rect_to_source_rect(&rect, self.preview, self.source);
        if source.is_empty() {
            // Sub-pixel selection on a heavily upscaled preview
            log::debug!("Crop selection collapsed to zero source pixels, discarded");
            return None;
        }

        self.committed = Some(rect);
        log::info!("Crop committed: preview {} -> source {}", rect, source);
        self.notifier.emit(SelectionEvent::Committed {
            preview: rect,
            source,
        });
        Some(source)
    }

    /// The pointer left the preview mid-drag; treated as the end of the drag.
    pub fn pointer_left(&mut self, point: Point) -> Option<Rect> {
        self.end_drag(point)
    }

    /// Drop any committed or in-progress selection.
    pub fn clear(&mut self) {
        let had_selection = self.committed.is_some() || self.is_drawing();
        self.state = SelectionState::Idle;
        self.committed = None;
        if had_selection {
            self.notifier.emit(SelectionEvent::Cleared);
        }
    }

    /// Restore a committed selection from a source-space rectangle, e.g. from
    /// saved edit settings. Nothing is committed for an empty rectangle.
    pub fn restore(&mut self, source_rect: &Rect) {
        self.state = SelectionState::Idle;
        let preview = source_rect_to_preview_rect(source_rect, self.preview, self.source);
        self.committed = (!preview.is_empty()).then_some(preview);
    }

    /// The preview was resized (window resize). Keeps the committed region
    /// anchored to the same source pixels.
    pub fn resize_preview(&mut self, preview: Dimension) {
        if preview == self.preview || preview.is_empty() {
            return;
        }
        let source_rect = self.committed_source();
        self.preview = preview;
        self.state = SelectionState::Idle;
        self.committed = None;
        if let Some(rect) = source_rect {
            self.restore(&rect);
        }
    }
}
