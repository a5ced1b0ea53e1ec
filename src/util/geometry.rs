// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between preview
//! space (the letterboxed, scaled picture shown on screen) and source space
//! (pixels of the original file). Preview and source rectangles share the
//! [`Rect`] type; they are only ever converted through the functions here.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a frame or container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp the point into `[0, width] x [0, height]`. Non-finite
    /// coordinates collapse onto the nearest edge (NaN onto zero).
    pub fn clamp_to(&self, dim: Dimension) -> Point {
        Point {
            x: clamp_axis(self.x, dim.width as f64),
            y: clamp_axis(self.y, dim.height as f64),
        }
    }
}

/// Axis-aligned rectangle, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering a whole frame.
    pub fn full(dim: Dimension) -> Self {
        Self::new(0.0, 0.0, dim.width as f64, dim.height as f64)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True if either side has no extent.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Check the rectangle lies inside `[0, dim]` with non-negative size.
    pub fn fits_within(&self, dim: Dimension) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= dim.width as f64
            && self.bottom() <= dim.height as f64
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Whole-pixel rectangle handed to pixel and encoder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Snap a rectangle that already fits `dim` onto the pixel grid.
    /// Edges are floored, so the result never grows past the input.
    pub fn from_rect(rect: &Rect, dim: Dimension) -> PixelRect {
        let x0 = floor_within(rect.x, dim.width);
        let y0 = floor_within(rect.y, dim.height);
        let x1 = floor_within(rect.right(), dim.width).max(x0);
        let y1 = floor_within(rect.bottom(), dim.height).max(y0);
        PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// The whole frame.
    pub fn full(dim: Dimension) -> PixelRect {
        PixelRect {
            x: 0,
            y: 0,
            width: dim.width,
            height: dim.height,
        }
    }

    pub fn is_full(&self, dim: Dimension) -> bool {
        self.x == 0 && self.y == 0 && self.width == dim.width && self.height == dim.height
    }
}

/// Largest size with `source`'s aspect ratio that fits inside `container`.
///
/// Computed in integer arithmetic so exact ratios (1920x1080 into 640x480)
/// come out exact (640x360). Sides are never smaller than one pixel.
pub fn fit_preview_dimension(source: Dimension, container: Dimension) -> Dimension {
    if source.is_empty() || container.is_empty() {
        return Dimension::new(container.width.max(1), container.height.max(1));
    }

    let (sw, sh) = (source.width as u64, source.height as u64);
    let (cw, ch) = (container.width as u64, container.height as u64);

    // Compare sw/sh against cw/ch without division.
    let (width, height) = if sw * ch >= sh * cw {
        // Source is wider: fit to width, letterbox top/bottom
        (cw, sh * cw / sw)
    } else {
        // Source is taller: fit to height, pillarbox left/right
        (sw * ch / sh, ch)
    };

    Dimension::new((width.max(1)) as u32, (height.max(1)) as u32)
}

/// Map a preview-space rectangle onto source pixels.
///
/// Horizontal and vertical scale factors are applied independently. Edges
/// are floored and the result is clamped into `source`, so a rectangle that
/// touches the preview's right/bottom edge maps exactly onto the source's.
///
/// Precondition: `preview` has non-zero sides.
pub fn preview_rect_to_source_rect(rect: &Rect, preview: Dimension, source: Dimension) -> Rect {
    let scale_x = |v: f64| scale_floor(v, preview.width, source.width);
    let scale_y = |v: f64| scale_floor(v, preview.height, source.height);

    let x0 = scale_x(rect.x);
    let y0 = scale_y(rect.y);
    let x1 = scale_x(rect.right()).max(x0);
    let y1 = scale_y(rect.bottom()).max(y0);

    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Inverse of [`preview_rect_to_source_rect`], without rounding. Used to draw
/// a source-space crop back over the preview.
pub fn source_rect_to_preview_rect(rect: &Rect, preview: Dimension, source: Dimension) -> Rect {
    if source.is_empty() {
        return Rect::default();
    }
    let scale_x = |v: f64| scale_clamped(v, source.width, preview.width);
    let scale_y = |v: f64| scale_clamped(v, source.height, preview.height);

    let x0 = scale_x(rect.x);
    let y0 = scale_y(rect.y);
    let x1 = scale_x(rect.right()).max(x0);
    let y1 = scale_y(rect.bottom()).max(y0);

    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

fn clamp_axis(v: f64, max: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, max)
    }
}

fn floor_within(v: f64, max: u32) -> u32 {
    clamp_axis(v, max as f64).floor() as u32
}

/// `v * to / from`, clamped to `[0, to]`.
fn scale_clamped(v: f64, from: u32, to: u32) -> f64 {
    clamp_axis(v * to as f64 / from as f64, to as f64)
}

/// `floor(v * to / from)`, clamped to `[0, to]`. Multiplying before dividing
/// keeps exact ratios exact.
fn scale_floor(v: f64, from: u32, to: u32) -> f64 {
    if from == 0 {
        return 0.0;
    }
    let v = clamp_axis(v, from as f64);
    ((v * to as f64) / from as f64).floor().clamp(0.0, to as f64)
}
