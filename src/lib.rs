// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ClipCrop - crop and trim engine for images and videos.
//!
//! The engine keeps a single open document, maps drag gestures on a scaled
//! preview to source pixels, tracks a trim range on a timeline, and exports
//! the result: images are cropped in-process, videos are re-encoded with
//! ffmpeg.
//!
//! ```no_run
//! use clipcrop::{MediaEditor, Rect, TrimRange};
//! use std::path::Path;
//!
//! # fn main() -> clipcrop::Result<()> {
//! let mut editor = MediaEditor::new();
//! editor.load_media(Path::new("holiday.mp4"))?;
//! editor.set_crop(Rect::new(100.0, 100.0, 400.0, 300.0))?;
//! editor.set_trim(TrimRange::clamped(3.0, 9.0, 10.0))?;
//! editor.export_video(Path::new("holiday_edited.mp4"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod models;
pub mod util;

pub use config::{ExportConfig, ToolPaths};
pub use editor::{ExportHandle, MediaEditor};
pub use error::{EditorError, Result};
pub use io::export::{EncodeJob, Encoder, FfmpegEncoder};
pub use io::probe::{FfprobeProbe, MetadataProbe, VideoMetadata};
pub use io::serialization::EditDescriptor;
pub use models::selection::{normalize_rect, CropSelection, SelectionEvent, SelectionState};
pub use models::session::{MediaDocument, MediaSession, MediaType, SessionEvent};
pub use models::timeline::{Handle, TrimRange, TrimTimeline};
pub use util::geometry::{
    fit_preview_dimension, preview_rect_to_source_rect, source_rect_to_preview_rect, Dimension,
    PixelRect, Point, Rect,
};
