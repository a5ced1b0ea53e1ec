// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading for display.
//!
//! Images are decoded with the `image` crate. For videos a single poster
//! frame is pulled through ffmpeg so the crop can be drawn over it. Both end
//! up as RGBA8 buffers ready for an egui texture.

use crate::config::ToolPaths;
use crate::error::{EditorError, Result};
use crate::models::session::{MediaDocument, MediaType};
use crate::util::time::format_timestamp;
use std::path::Path;
use std::process::{Command, Stdio};

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LoadedImage {
    fn from_dynamic(image: image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        }
    }
}

/// Load an image file from disk.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image = image::open(path)?;
    log::debug!("Decoded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(LoadedImage::from_dynamic(image))
}

/// Grab the frame at `at_sec` from a video as PNG over a pipe.
pub fn extract_poster_frame(tools: &ToolPaths, path: &Path, at_sec: f64) -> Result<LoadedImage> {
    let at_sec = if at_sec.is_finite() { at_sec.max(0.0) } else { 0.0 };
    let output = Command::new(&tools.ffmpeg)
        .args(["-hide_banner", "-nostdin", "-v", "error", "-ss"])
        .arg(format_timestamp(at_sec))
        .arg("-i")
        .arg(path)
        .args(["-frames:v", "1", "-f", "image2pipe", "-c:v", "png", "-"])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            EditorError::probe(path, format!("failed to run {}: {e}", tools.ffmpeg.display()))
        })?;

    if !output.status.success() || output.stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() {
            "no frame could be decoded".to_string()
        } else {
            stderr
        };
        return Err(EditorError::probe(path, reason));
    }

    let image = image::load_from_memory_with_format(&output.stdout, image::ImageFormat::Png)?;
    Ok(LoadedImage::from_dynamic(image))
}

/// Pixels shown under the crop overlay: the image itself, or an early
/// frame of a video.
pub fn load_preview(document: &MediaDocument, tools: &ToolPaths) -> Result<LoadedImage> {
    match document.media_type {
        MediaType::Image => load_image(&document.file_path),
        MediaType::Video => {
            // Skip fade-ins without seeking far into long files
            let at_sec = document
                .duration_sec
                .map(|duration| (duration * 0.1).min(1.0))
                .unwrap_or(0.0);
            extract_poster_frame(tools, &document.file_path, at_sec)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::testing::{ffmpeg_tools, make_test_video, solid_image};
    use crate::util::geometry::Dimension;
    use tempfile::TempDir;

    #[test]
    fn test_load_image_is_rgba() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("red.png");
        solid_image(3, 2, [255, 0, 0]).save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(loaded.pixels.len(), 3 * 2 * 4);
        assert_eq!(&loaded.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_load_missing_image() {
        assert!(load_image(Path::new("/no/such/image.png")).is_err());
    }

    #[test]
    fn test_poster_frame_without_ffmpeg() {
        let tools = ToolPaths {
            ffmpeg: "/nonexistent/ffmpeg-binary".into(),
            ffprobe: "/nonexistent/ffprobe-binary".into(),
        };
        let result = extract_poster_frame(&tools, Path::new("clip.mp4"), 0.0);
        assert!(matches!(result, Err(EditorError::MetadataProbe { .. })));
    }

    #[test]
    #[ignore = "needs ffmpeg with libx264"]
    fn test_video_preview_frame() {
        let tools = ffmpeg_tools();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        make_test_video(&tools, &path, 2.0, 160, 120).unwrap();

        let document = MediaDocument {
            file_path: path,
            media_type: MediaType::Video,
            source_dim: Dimension::new(160, 120),
            duration_sec: Some(2.0),
            has_audio: true,
            crop: None,
            trim: None,
        };
        let frame = load_preview(&document, &tools).unwrap();
        assert_eq!((frame.width, frame.height), (160, 120));
    }
}
