// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export settings and external tool locations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Environment variable overriding the ffmpeg executable.
pub const FFMPEG_ENV: &str = "CLIPCROP_FFMPEG";

/// Environment variable overriding the ffprobe executable.
pub const FFPROBE_ENV: &str = "CLIPCROP_FFPROBE";

/// Encoding parameters for an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub video_codec: String,
    pub audio_codec: String,
    /// Constant rate factor; lower is better quality
    pub crf: u8,
    /// Encoder speed/efficiency preset
    pub preset: String,
    /// Image format used when the output path has no extension
    pub image_format: String,
}

impl Default for ExportConfig {
    /// H.264 + AAC at CRF 23: visually near-lossless at a moderate size.
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            image_format: "png".to_string(),
        }
    }
}

impl ExportConfig {
    /// Names accepted by [`ExportConfig::preset`].
    pub const PRESET_NAMES: &'static [&'static str] = &["default", "high_quality_video", "mobile_video"];

    /// Look up a named preset.
    pub fn preset(name: &str) -> Option<ExportConfig> {
        let base = ExportConfig::default();
        match name {
            "default" => Some(base),
            "high_quality_video" => Some(ExportConfig {
                crf: 18,
                preset: "slow".to_string(),
                ..base
            }),
            "mobile_video" => Some(ExportConfig {
                video_codec: "libx265".to_string(),
                crf: 28,
                preset: "fast".to_string(),
                ..base
            }),
            _ => None,
        }
    }
}

/// External programs used for probing and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Which external program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl ToolPaths {
    /// Bare program names (resolved through `PATH`) unless overridden by
    /// [`FFMPEG_ENV`] / [`FFPROBE_ENV`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let lookup = |var: &str, fallback: PathBuf| {
            std::env::var_os(var)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .unwrap_or(fallback)
        };
        Self {
            ffmpeg: lookup(FFMPEG_ENV, defaults.ffmpeg),
            ffprobe: lookup(FFPROBE_ENV, defaults.ffprobe),
        }
    }

    pub fn path(&self, tool: Tool) -> &PathBuf {
        match tool {
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::Ffprobe => &self.ffprobe,
        }
    }

    /// True if the program starts and answers `-version`.
    pub fn is_available(&self, tool: Tool) -> bool {
        Command::new(self.path(tool))
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.video_codec, "libx264");
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.crf, 23);
        assert_eq!(config.image_format, "png");
    }

    #[test]
    fn test_presets() {
        for name in ExportConfig::PRESET_NAMES {
            assert!(ExportConfig::preset(name).is_some(), "{name}");
        }
        let mobile = ExportConfig::preset("mobile_video").unwrap();
        assert_eq!(mobile.video_codec, "libx265");
        assert_eq!(mobile.crf, 28);
        assert!(ExportConfig::preset("nope").is_none());
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let tools = ToolPaths {
            ffmpeg: PathBuf::from("/nonexistent/ffmpeg-binary"),
            ffprobe: PathBuf::from("/nonexistent/ffprobe-binary"),
        };
        assert!(!tools.is_available(Tool::Ffmpeg));
        assert!(!tools.is_available(Tool::Ffprobe));
    }
}
