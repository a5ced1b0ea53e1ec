// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error taxonomy for loading, editing and exporting media.
//!
//! Every failure the editor can report is a variant of [`EditorError`].
//! None of them invalidate the current session: after a failed export the
//! session is still loaded and editable.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

/// All errors surfaced to the shell.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The file extension is not one of the supported image/video types.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An operation needed a loaded file but the session is empty.
    #[error("no media loaded")]
    NoMediaLoaded,

    /// The operation does not apply to the kind of media that is loaded.
    #[error("expected {expected} media, but {actual} is loaded")]
    WrongMediaType {
        expected: &'static str,
        actual: &'static str,
    },

    /// The file could not be inspected for duration/dimensions.
    #[error("metadata probe failed for {path}: {reason}")]
    MetadataProbe { path: PathBuf, reason: String },

    /// Crop rectangle lies (partly) outside the source frame or is empty.
    #[error("invalid crop rectangle: {0}")]
    InvalidCropRect(String),

    /// Trim range lies outside `[0, duration]` or is empty.
    #[error("invalid trim range: {0}")]
    InvalidTrimRange(String),

    /// The external encoder failed; carries its diagnostic output.
    #[error("encoder failed: {0}")]
    EncoderFailure(String),

    /// A second export was requested while one is still running.
    #[error("an export is already in progress")]
    ExportInProgress,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode/encode failure: {0}")]
    Image(#[from] image::ImageError),

    /// Edit descriptor files could not be read or written.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EditorError {
    pub(crate) fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        EditorError::MetadataProbe {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short category name used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            EditorError::UnsupportedFormat(_) | EditorError::WrongMediaType { .. } => "Format",
            EditorError::NoMediaLoaded => "Session",
            EditorError::MetadataProbe { .. } => "Probe",
            EditorError::InvalidCropRect(_) | EditorError::InvalidTrimRange(_) => "Validation",
            EditorError::EncoderFailure(_) | EditorError::ExportInProgress => "Export",
            EditorError::Io(_) | EditorError::Image(_) | EditorError::Serialization(_) => "FileSystem",
        }
    }

    /// Human-readable message for the status line. Each variant reads differently
    /// so the user can tell failures apart.
    pub fn user_message(&self) -> String {
        match self {
            EditorError::UnsupportedFormat(what) => format!(
                "Unsupported file type ({what}). Use png, jpg, jpeg, bmp, gif, mp4, mov or mkv."
            ),
            EditorError::NoMediaLoaded => "Open an image or video first.".to_string(),
            EditorError::WrongMediaType { expected, actual } => {
                format!("This action needs a {expected}, but a {actual} is open.")
            }
            EditorError::MetadataProbe { path, reason } => format!(
                "Could not read {}: {reason}",
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            ),
            EditorError::InvalidCropRect(detail) => {
                format!("The crop area is outside the picture ({detail}).")
            }
            EditorError::InvalidTrimRange(detail) => {
                format!("The trim range is outside the video ({detail}).")
            }
            EditorError::EncoderFailure(diagnostics) => {
                let last_line = diagnostics.lines().last().unwrap_or("no diagnostics");
                format!("Video encoding failed: {last_line}")
            }
            EditorError::ExportInProgress => {
                "An export is still running. Wait for it to finish.".to_string()
            }
            EditorError::Io(e) => format!("Could not read or write a file: {e}"),
            EditorError::Image(e) => format!("Could not process the image: {e}"),
            EditorError::Serialization(detail) => {
                format!("Could not read or write edit settings: {detail}")
            }
        }
    }
}
