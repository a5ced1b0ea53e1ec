// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video trim range and the two-handle timeline that edits it.
//!
//! Whatever the pointer does, `0 <= start <= end <= duration` holds after
//! every update: pixel positions are clamped to the timeline, and each
//! handle stops at the other one instead of crossing it.

use crate::error::{EditorError, Result};
use crate::models::notify::Notifier;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// Tolerance when deciding whether a range covers the whole video.
const FULL_RANGE_EPSILON: f64 = 1e-6;

/// Selected time span of a video, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start_sec: f64,
    pub end_sec: f64,
    pub duration_sec: f64,
}

impl TrimRange {
    /// The whole video.
    pub fn full(duration_sec: f64) -> Self {
        let duration_sec = sanitize_duration(duration_sec);
        Self {
            start_sec: 0.0,
            end_sec: duration_sec,
            duration_sec,
        }
    }

    /// Build a range, clamping into `[0, duration]` and ordering the ends.
    pub fn clamped(start_sec: f64, end_sec: f64, duration_sec: f64) -> Self {
        let duration_sec = sanitize_duration(duration_sec);
        let start = clamp_time(start_sec, duration_sec);
        let end = clamp_time(end_sec, duration_sec).max(start);
        Self {
            start_sec: start,
            end_sec: end,
            duration_sec,
        }
    }

    pub fn length(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// True if the range selects the whole video.
    pub fn is_full(&self) -> bool {
        self.start_sec <= FULL_RANGE_EPSILON
            && (self.duration_sec - self.end_sec) <= FULL_RANGE_EPSILON
    }

    /// Check the range against a video of `duration_sec` seconds. A range
    /// with no length cannot be exported and is rejected as well.
    pub fn validate(&self, duration_sec: f64) -> Result<()> {
        let values = [self.start_sec, self.end_sec, duration_sec];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EditorError::InvalidTrimRange(format!(
                "non-finite value in {:.3}..{:.3} of {:.3}s",
                self.start_sec, self.end_sec, duration_sec
            )));
        }
        if self.start_sec < 0.0 || self.end_sec > duration_sec + FULL_RANGE_EPSILON {
            return Err(EditorError::InvalidTrimRange(format!(
                "{:.3}s..{:.3}s is outside 0..{:.3}s",
                self.start_sec, self.end_sec, duration_sec
            )));
        }
        if self.end_sec <= self.start_sec {
            return Err(EditorError::InvalidTrimRange(format!(
                "end {:.3}s is not after start {:.3}s",
                self.end_sec, self.start_sec
            )));
        }
        Ok(())
    }
}

/// One of the two timeline handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

/// Two-handle trim control over `[0, duration]`.
#[derive(Debug)]
pub struct TrimTimeline {
    duration_sec: f64,
    width_px: f64,
    start_sec: f64,
    end_sec: f64,
    dragging_start: bool,
    dragging_end: bool,
    notifier: Notifier<TrimRange>,
}

impl TrimTimeline {
    /// Full range selected.
    pub fn new(duration_sec: f64, width_px: f64) -> Self {
        let duration_sec = sanitize_duration(duration_sec);
        Self {
            duration_sec,
            width_px: sanitize_width(width_px),
            start_sec: 0.0,
            end_sec: duration_sec,
            dragging_start: false,
            dragging_end: false,
            notifier: Notifier::new(),
        }
    }

    /// Start from an existing range (clamped into the duration).
    pub fn with_range(range: TrimRange, width_px: f64) -> Self {
        let mut timeline = Self::new(range.duration_sec, width_px);
        let clamped = TrimRange::clamped(range.start_sec, range.end_sec, range.duration_sec);
        timeline.start_sec = clamped.start_sec;
        timeline.end_sec = clamped.end_sec;
        timeline
    }

    pub fn subscribe(&mut self) -> Receiver<TrimRange> {
        self.notifier.subscribe()
    }

    pub fn range(&self) -> TrimRange {
        TrimRange {
            start_sec: self.start_sec,
            end_sec: self.end_sec,
            duration_sec: self.duration_sec,
        }
    }

    pub fn start_sec(&self) -> f64 {
        self.start_sec
    }

    pub fn end_sec(&self) -> f64 {
        self.end_sec
    }

    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    /// The timeline was laid out at a new width. Times are unaffected.
    pub fn set_width(&mut self, width_px: f64) {
        self.width_px = sanitize_width(width_px);
    }

    /// Seconds at a pixel offset, clamped to the timeline.
    pub fn pixel_to_time(&self, pixel: f64) -> f64 {
        if self.width_px <= 0.0 {
            return 0.0;
        }
        let pixel = if pixel.is_nan() { 0.0 } else { pixel };
        pixel.clamp(0.0, self.width_px) / self.width_px * self.duration_sec
    }

    /// Pixel offset of a time, for drawing handles.
    pub fn time_to_pixel(&self, seconds: f64) -> f64 {
        if self.duration_sec <= 0.0 {
            return 0.0;
        }
        clamp_time(seconds, self.duration_sec) / self.duration_sec * self.width_px
    }

    /// Move the start handle to a pixel position. It stops at the end handle.
    pub fn drag_start(&mut self, pixel: f64) -> TrimRange {
        let time = self.pixel_to_time(pixel);
        self.start_sec = clamp_time(time.min(self.end_sec), self.duration_sec);
        self.changed()
    }

    /// Move the end handle to a pixel position. It stops at the start handle.
    pub fn drag_end(&mut self, pixel: f64) -> TrimRange {
        let time = self.pixel_to_time(pixel);
        self.end_sec = clamp_time(time.max(self.start_sec), self.duration_sec);
        self.changed()
    }

    /// Pointer went down on a handle.
    pub fn press(&mut self, handle: Handle) {
        match handle {
            Handle::Start => self.dragging_start = true,
            Handle::End => self.dragging_end = true,
        }
    }

    /// Handle currently being dragged, if any.
    pub fn active_handle(&self) -> Option<Handle> {
        if self.dragging_start {
            Some(Handle::Start)
        } else if self.dragging_end {
            Some(Handle::End)
        } else {
            None
        }
    }

    /// Pointer moved; forwards to whichever handle is held.
    pub fn pointer_moved(&mut self, pixel: f64) -> Option<TrimRange> {
        match self.active_handle()? {
            Handle::Start => Some(self.drag_start(pixel)),
            Handle::End => Some(self.drag_end(pixel)),
        }
    }

    /// Pointer released anywhere: both handles let go.
    pub fn release(&mut self) {
        self.dragging_start = false;
        self.dragging_end = false;
    }

    /// Select the whole video again.
    pub fn reset(&mut self) -> TrimRange {
        self.start_sec = 0.0;
        self.end_sec = self.duration_sec;
        self.release();
        self.changed()
    }

    /// Replace the range (e.g. from saved settings), clamped.
    pub fn set_range(&mut self, start_sec: f64, end_sec: f64) -> TrimRange {
        let clamped = TrimRange::clamped(start_sec, end_sec, self.duration_sec);
        self.start_sec = clamped.start_sec;
        self.end_sec = clamped.end_sec;
        self.changed()
    }

    fn changed(&mut self) -> TrimRange {
        debug_assert!(0.0 <= self.start_sec);
        debug_assert!(self.start_sec <= self.end_sec);
        debug_assert!(self.end_sec <= self.duration_sec);
        let range = self.range();
        self.notifier.emit(range);
        range
    }
}

fn sanitize_duration(duration_sec: f64) -> f64 {
    if duration_sec.is_finite() && duration_sec > 0.0 {
        duration_sec
    } else {
        0.0
    }
}

fn sanitize_width(width_px: f64) -> f64 {
    if width_px.is_finite() && width_px > 0.0 {
        width_px
    } else {
        0.0
    }
}

fn clamp_time(seconds: f64, duration_sec: f64) -> f64 {
    if seconds.is_nan() {
        0.0
    } else {
        seconds.clamp(0.0, duration_sec)
    }
}
