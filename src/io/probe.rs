// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media metadata probing.
//!
//! Videos are inspected with `ffprobe` (JSON output) before the editor can
//! set up the timeline and preview transform. Images only need their header
//! decoded.

use crate::config::ToolPaths;
use crate::error::{EditorError, Result};
use crate::util::geometry::Dimension;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Duration and frame size of a video file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration_sec: f64,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
}

/// Something that can inspect a video file. Blocking.
pub trait MetadataProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<VideoMetadata>;
}

/// [`MetadataProbe`] backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: PathBuf,
}

impl FfprobeProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_tools(tools: &ToolPaths) -> Self {
        Self::new(&tools.ffprobe)
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::from_tools(&ToolPaths::from_env())
    }
}

impl MetadataProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        if !path.is_file() {
            return Err(EditorError::probe(path, "file does not exist"));
        }

        log::debug!("Probing {} with {}", path.display(), self.program.display());
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "stream=codec_type,width,height,duration",
                "-show_entries",
                "format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                EditorError::probe(path, format!("failed to run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EditorError::probe(path, stderr.trim().to_string()));
        }

        let metadata = parse_ffprobe_json(&String::from_utf8_lossy(&output.stdout))
            .map_err(|reason| EditorError::probe(path, reason))?;
        log::info!(
            "Probed {}: {}x{}, {:.3}s, audio: {}",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.duration_sec,
            metadata.has_audio
        );
        Ok(metadata)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Extract [`VideoMetadata`] from `ffprobe -of json` output.
///
/// The first video stream supplies the frame size. Its duration is used
/// when present, otherwise the container's.
pub fn parse_ffprobe_json(json: &str) -> std::result::Result<VideoMetadata, String> {
    let parsed: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| format!("unreadable ffprobe output: {e}"))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| "no video stream found".to_string())?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err("video stream has no frame size".to_string()),
    };

    let duration_sec = video
        .duration
        .as_deref()
        .and_then(parse_seconds)
        .or_else(|| {
            parsed
                .format
                .as_ref()
                .and_then(|f| f.duration.as_deref())
                .and_then(parse_seconds)
        })
        .ok_or_else(|| "duration not found".to_string())?;

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoMetadata {
        duration_sec,
        width,
        height,
        has_audio,
    })
}

fn parse_seconds(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Image size from the file header, without decoding pixels.
pub fn probe_image_dimension(path: &Path) -> Result<Dimension> {
    let (width, height) = image::image_dimensions(path).map_err(|e| match e {
        image::ImageError::IoError(io) => EditorError::Io(io),
        other => EditorError::probe(path, other.to_string()),
    })?;
    if width == 0 || height == 0 {
        return Err(EditorError::probe(path, "image has no pixels"));
    }
    Ok(Dimension::new(width, height))
}
