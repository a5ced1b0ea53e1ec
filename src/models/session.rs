// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media session state management.
//!
//! This module holds the one open document: what file it is, its source
//! dimensions and duration, and the optional crop and trim edits. A session
//! is either empty or fully loaded; a failed load leaves it empty.

use crate::error::{EditorError, Result};
use crate::io::probe::{probe_image_dimension, MetadataProbe};
use crate::models::notify::Notifier;
use crate::models::timeline::TrimRange;
use crate::util::geometry::{Dimension, Rect};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

/// Extensions opened as still images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Extensions opened as videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv"];

/// Kind of media in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaType::Image => IMAGE_EXTENSIONS,
            MediaType::Video => VIDEO_EXTENSIONS,
        }
    }
}

/// Lower-cased extension of the last path component.
///
/// Both `/` and `\` count as separators, so Windows-style paths resolve the
/// same on every platform. Dot-files such as `.png` have no extension.
pub fn file_extension(path: &str) -> Option<String> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => Some(name[dot + 1..].to_ascii_lowercase()),
        _ => None,
    }
}

/// Decide the media type from a file name.
pub fn route_by_extension(path: &str) -> Result<MediaType> {
    let extension = file_extension(path)
        .ok_or_else(|| EditorError::UnsupportedFormat("file has no extension".to_string()))?;

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(MediaType::Image)
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Ok(MediaType::Video)
    } else {
        Err(EditorError::UnsupportedFormat(format!(".{extension}")))
    }
}

/// A fully resolved open file plus its edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDocument {
    pub file_path: PathBuf,
    pub media_type: MediaType,
    pub source_dim: Dimension,
    /// Seconds; videos only
    pub duration_sec: Option<f64>,
    /// Whether the source carries an audio stream; videos only
    pub has_audio: bool,
    /// Source-space crop; `None` means the full frame
    pub crop: Option<Rect>,
    /// `None` means the full duration
    pub trim: Option<TrimRange>,
}

impl MediaDocument {
    /// Resolve type, dimensions and (for video) duration of `path`.
    ///
    /// Blocks on the probe for videos. Safe to call off the UI thread.
    pub fn open(path: &Path, probe: &dyn MetadataProbe) -> Result<MediaDocument> {
        let media_type = route_by_extension(&path.to_string_lossy())?;

        let (source_dim, duration_sec, has_audio) = match media_type {
            MediaType::Image => (probe_image_dimension(path)?, None, false),
            MediaType::Video => {
                let metadata = probe.probe(path)?;
                (
                    Dimension::new(metadata.width, metadata.height),
                    Some(metadata.duration_sec),
                    metadata.has_audio,
                )
            }
        };

        Ok(MediaDocument {
            file_path: path.to_path_buf(),
            media_type,
            source_dim,
            duration_sec,
            has_audio,
            crop: None,
            trim: None,
        })
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.display().to_string())
    }
}

/// Published whenever the session changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Loaded { path: PathBuf, media_type: MediaType },
    CropChanged(Option<Rect>),
    TrimChanged(Option<TrimRange>),
    Cleared,
}

/// Owner of the currently open document.
#[derive(Debug, Default)]
pub struct MediaSession {
    document: Option<MediaDocument>,
    notifier: Notifier<SessionEvent>,
}

impl MediaSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that already holds `document`.
    pub fn with_document(document: MediaDocument) -> Self {
        Self {
            document: Some(document),
            notifier: Notifier::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    pub fn document(&self) -> Option<&MediaDocument> {
        self.document.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// The loaded document or [`EditorError::NoMediaLoaded`].
    pub fn require(&self) -> Result<&MediaDocument> {
        self.document.as_ref().ok_or(EditorError::NoMediaLoaded)
    }

    fn require_mut(&mut self) -> Result<&mut MediaDocument> {
        self.document.as_mut().ok_or(EditorError::NoMediaLoaded)
    }

    /// Open `path`, replacing whatever was loaded. On failure the session is
    /// left empty.
    pub fn load_media(&mut self, path: &Path, probe: &dyn MetadataProbe) -> Result<&MediaDocument> {
        self.clear();
        let document = match MediaDocument::open(path, probe) {
            Ok(document) => document,
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                return Err(e);
            }
        };
        Ok(self.install(document))
    }

    /// Take ownership of a document resolved elsewhere (e.g. by a background
    /// loader). Any previous document and its edits are dropped.
    pub fn install(&mut self, document: MediaDocument) -> &MediaDocument {
        log::info!(
            "Loaded {} {} ({}{})",
            document.media_type.as_str(),
            document.file_path.display(),
            document.source_dim,
            document
                .duration_sec
                .map(|d| format!(", {d:.3}s"))
                .unwrap_or_default()
        );
        self.notifier.emit(SessionEvent::Loaded {
            path: document.file_path.clone(),
            media_type: document.media_type,
        });
        self.document.insert(document)
    }

    /// Set or remove the source-space crop. Bounds are checked at export.
    pub fn set_crop(&mut self, crop: Option<Rect>) -> Result<()> {
        let document = self.require_mut()?;
        document.crop = crop;
        log::debug!("Crop set to {:?}", crop);
        self.notifier.emit(SessionEvent::CropChanged(crop));
        Ok(())
    }

    /// Set or remove the trim range. Only videos have a timeline.
    pub fn set_trim(&mut self, trim: Option<TrimRange>) -> Result<()> {
        let document = self.require_mut()?;
        if trim.is_some() && !document.is_video() {
            return Err(EditorError::InvalidTrimRange(
                "images have no timeline".to_string(),
            ));
        }
        document.trim = trim;
        log::debug!("Trim set to {:?}", trim);
        self.notifier.emit(SessionEvent::TrimChanged(trim));
        Ok(())
    }

    /// Close the document.
    pub fn clear(&mut self) {
        if self.document.take().is_some() {
            self.notifier.emit(SessionEvent::Cleared);
        }
    }
}
