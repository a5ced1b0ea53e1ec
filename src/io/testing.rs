// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Fixtures shared by unit tests that touch real files.

use crate::config::{Tool, ToolPaths};
use crate::error::{EditorError, Result};
use crate::io::export::{EncodeJob, Encoder};
use crate::io::probe::{MetadataProbe, VideoMetadata};
use image::{DynamicImage, ImageBuffer, Rgb};
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

/// Probe double answering every call with the same metadata or reason.
pub struct FixedProbe(pub std::result::Result<VideoMetadata, String>);

impl FixedProbe {
    pub fn video(duration_sec: f64, width: u32, height: u32) -> Self {
        FixedProbe(Ok(VideoMetadata {
            duration_sec,
            width,
            height,
            has_audio: true,
        }))
    }
}

impl MetadataProbe for FixedProbe {
    fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        self.0.clone().map_err(|reason| EditorError::probe(path, reason))
    }
}

/// Encoder double. Records every job, then fails, writes nothing, or writes
/// a stub output file.
#[derive(Default)]
pub struct RecordingEncoder {
    jobs: Mutex<Vec<EncodeJob>>,
    fail_with: Option<String>,
    write_nothing: bool,
}

impl RecordingEncoder {
    /// Rejects every job with `message` as the diagnostic text.
    pub fn failing(message: &str) -> Self {
        RecordingEncoder {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Reports success without producing an output file.
    pub fn silent() -> Self {
        RecordingEncoder {
            write_nothing: true,
            ..Default::default()
        }
    }

    pub fn jobs(&self) -> Vec<EncodeJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl Encoder for RecordingEncoder {
    fn encode(&self, job: &EncodeJob) -> Result<()> {
        self.jobs.lock().unwrap().push(job.clone());
        if let Some(message) = &self.fail_with {
            return Err(EditorError::EncoderFailure(message.clone()));
        }
        if !self.write_nothing {
            std::fs::write(&job.output, b"encoded")?;
        }
        Ok(())
    }
}

/// Tool paths for tests marked `#[ignore]` that drive the real ffmpeg and
/// ffprobe. Panics when they (or libx264) are missing so an explicit
/// `--ignored` run cannot pass vacuously.
pub fn ffmpeg_tools() -> ToolPaths {
    let tools = ToolPaths::from_env();
    assert!(
        tools.is_available(Tool::Ffmpeg) && tools.is_available(Tool::Ffprobe),
        "ffmpeg and ffprobe must be installed (or set CLIPCROP_FFMPEG/CLIPCROP_FFPROBE)"
    );
    assert!(
        has_encoder(&tools, "libx264"),
        "ffmpeg was built without libx264"
    );
    tools
}

fn has_encoder(tools: &ToolPaths, name: &str) -> bool {
    Command::new(&tools.ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|output| String::from_utf8_lossy(&output.stdout).contains(name))
        .unwrap_or(false)
}

/// Solid-colour RGB test image.
pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(color)))
}

/// Synthesize a test-pattern video with a sine audio track. Every frame is a
/// keyframe so trims land exactly.
pub fn make_test_video(
    tools: &ToolPaths,
    path: &Path,
    duration_sec: f64,
    width: u32,
    height: u32,
) -> std::result::Result<(), String> {
    let output = Command::new(&tools.ffmpeg)
        .args(["-y", "-v", "error", "-f", "lavfi", "-i"])
        .arg(format!(
            "testsrc=duration={duration_sec}:size={width}x{height}:rate=30"
        ))
        .args(["-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=440:duration={duration_sec}"))
        .args(["-pix_fmt", "yuv420p", "-g", "1", "-shortest"])
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run ffmpeg: {e}"))?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).into_owned());
    }
    Ok(())
}
