// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export of the edited media.
//!
//! Images are cropped in-process with the `image` crate. Videos are handed to
//! an [`Encoder`] (ffmpeg by default) as a single job combining the optional
//! crop filter and trim window; even an unedited video is re-encoded.
//!
//! Validation runs before any work: a loaded document, then the crop
//! against the source frame, then the trim against the duration, then the
//! output format. Output goes to a temporary sibling file that is renamed
//! over the destination only on success.

use crate::config::{ExportConfig, ToolPaths};
use crate::error::{EditorError, Result};
use crate::models::session::{file_extension, MediaDocument, MediaSession, MediaType};
use crate::models::timeline::TrimRange;
use crate::util::geometry::{Dimension, PixelRect, Rect};
use crate::util::time::format_timestamp;
use image::{DynamicImage, ImageFormat};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempPath;

/// One encoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Pixel region kept in every frame
    pub crop: Option<PixelRect>,
    /// Time window kept; `None` keeps the whole video
    pub trim: Option<TrimRange>,
    pub has_audio: bool,
    pub config: ExportConfig,
}

/// Runs an [`EncodeJob`] to completion. Blocking; call it off the UI thread.
pub trait Encoder: Send + Sync {
    fn encode(&self, job: &EncodeJob) -> Result<()>;
}

/// [`Encoder`] that shells out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_tools(tools: &ToolPaths) -> Self {
        Self::new(&tools.ffmpeg)
    }

    /// Command line for `job`, without the program name.
    pub fn arguments(job: &EncodeJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-nostdin", "-v", "error", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(job.input.clone().into_os_string());

        // Seeking after -i decodes from the start: slower, but frame accurate
        if let Some(trim) = &job.trim {
            args.extend(
                [
                    "-ss".to_string(),
                    format_timestamp(trim.start_sec),
                    "-t".to_string(),
                    format_timestamp(trim.length()),
                    "-avoid_negative_ts".to_string(),
                    "make_zero".to_string(),
                ]
                .map(OsString::from),
            );
        }

        if let Some(crop) = &job.crop {
            args.push("-vf".into());
            args.push(
                format!("crop={}:{}:{}:{}", crop.width, crop.height, crop.x, crop.y).into(),
            );
        }

        args.extend(["-map", "0:v:0"].map(OsString::from));
        if job.has_audio {
            args.extend(["-map", "0:a:0?", "-c:a"].map(OsString::from));
            args.push(job.config.audio_codec.clone().into());
        } else {
            args.push("-an".into());
        }

        args.extend(
            [
                "-c:v".to_string(),
                job.config.video_codec.clone(),
                "-preset".to_string(),
                job.config.preset.clone(),
                "-crf".to_string(),
                job.config.crf.to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
            ]
            .map(OsString::from),
        );

        let container = job
            .output
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        if matches!(container.as_deref(), Some("mp4") | Some("mov")) {
            args.extend(["-movflags", "+faststart"].map(OsString::from));
        }

        args.push(job.output.clone().into_os_string());
        args
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::from_tools(&ToolPaths::from_env())
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, job: &EncodeJob) -> Result<()> {
        let args = Self::arguments(job);
        log::debug!("{} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                EditorError::EncoderFailure(format!(
                    "failed to run {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let diagnostics = if stderr.is_empty() {
                format!("{} exited with {}", self.program.display(), output.status)
            } else {
                stderr
            };
            return Err(EditorError::EncoderFailure(diagnostics));
        }
        Ok(())
    }
}

/// Export whatever the session holds to `output`.
pub fn export(
    session: &MediaSession,
    output: &Path,
    config: &ExportConfig,
    encoder: &dyn Encoder,
) -> Result<()> {
    let document = session.require()?;
    export_document(document, output, config, encoder)
}

/// Export a document snapshot, dispatching on its media type.
pub fn export_document(
    document: &MediaDocument,
    output: &Path,
    config: &ExportConfig,
    encoder: &dyn Encoder,
) -> Result<()> {
    match document.media_type {
        MediaType::Image => export_image(document, output, config),
        MediaType::Video => export_video(document, output, config, encoder),
    }
}

/// Check a source-space crop against the frame and snap it to pixels.
/// `None` in, `None` out: no crop means the full frame.
pub fn validate_crop(crop: Option<&Rect>, source: Dimension) -> Result<Option<PixelRect>> {
    let Some(rect) = crop else {
        return Ok(None);
    };
    if !rect.fits_within(source) {
        log::warn!("Rejected crop {} for {} frame", rect, source);
        return Err(EditorError::InvalidCropRect(format!(
            "{rect} does not fit in {source}"
        )));
    }
    let pixels = PixelRect::from_rect(rect, source);
    if pixels.width == 0 || pixels.height == 0 {
        log::warn!("Rejected empty crop {}", rect);
        return Err(EditorError::InvalidCropRect(format!("{rect} selects no pixels")));
    }
    Ok(Some(pixels))
}

/// Check a trim range against the duration. A range covering the whole
/// video is the same as no trim and yields `None`.
pub fn validate_trim(trim: Option<&TrimRange>, duration_sec: Option<f64>) -> Result<Option<TrimRange>> {
    let Some(range) = trim else {
        return Ok(None);
    };
    let Some(duration_sec) = duration_sec else {
        return Err(EditorError::InvalidTrimRange(
            "media has no duration".to_string(),
        ));
    };
    if let Err(e) = range.validate(duration_sec) {
        log::warn!("Rejected trim {:?} for {:.3}s video", range, duration_sec);
        return Err(e);
    }
    let range = TrimRange {
        duration_sec,
        ..*range
    };
    Ok((!range.is_full()).then_some(range))
}

/// Crop (or copy) an image document to `output`.
pub fn export_image(document: &MediaDocument, output: &Path, config: &ExportConfig) -> Result<()> {
    let crop = validate_crop(document.crop.as_ref(), document.source_dim)?;
    validate_trim(document.trim.as_ref(), document.duration_sec)?;
    let (format, extension) = image_output_format(output, config)?;

    let image = image::open(&document.file_path)?;
    let actual = Dimension::new(image.width(), image.height());
    let region = crop.unwrap_or_else(|| PixelRect::full(actual));
    if actual != document.source_dim {
        // File changed on disk since it was loaded
        log::warn!(
            "{} is now {} (loaded as {})",
            document.file_path.display(),
            actual,
            document.source_dim
        );
        let fits = region.x + region.width <= actual.width
            && region.y + region.height <= actual.height;
        if !fits {
            return Err(EditorError::InvalidCropRect(format!(
                "{}x{}+{}+{} does not fit in {actual}",
                region.width, region.height, region.x, region.y
            )));
        }
    }

    log::info!(
        "Exporting image {} -> {} (region {}x{}+{}+{}, {:?})",
        document.file_path.display(),
        output.display(),
        region.width,
        region.height,
        region.x,
        region.y,
        format
    );

    let cropped = image.crop_imm(region.x, region.y, region.width, region.height);
    let encodable = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(cropped.to_rgb8()),
        ImageFormat::Gif | ImageFormat::Bmp => DynamicImage::ImageRgba8(cropped.to_rgba8()),
        _ => cropped,
    };

    let temp = temp_sibling(output, &extension)?;
    encodable.save_with_format(&temp, format)?;
    finish(temp, output)
}

/// Re-encode a video document to `output`, applying crop and trim.
pub fn export_video(
    document: &MediaDocument,
    output: &Path,
    config: &ExportConfig,
    encoder: &dyn Encoder,
) -> Result<()> {
    // An uncropped odd-sized source still has to be trimmed to even sides
    let region = validate_crop(document.crop.as_ref(), document.source_dim)?
        .unwrap_or_else(|| PixelRect::full(document.source_dim));
    let crop = Some(even_crop(region)?).filter(|region| !region.is_full(document.source_dim));
    let trim = validate_trim(document.trim.as_ref(), document.duration_sec)?;

    let extension = file_extension(&output.to_string_lossy())
        .filter(|ext| MediaType::Video.extensions().contains(&ext.as_str()))
        .ok_or_else(|| {
            EditorError::UnsupportedFormat(format!(
                "video output {} must end in .mp4, .mov or .mkv",
                output.display()
            ))
        })?;

    let temp = temp_sibling(output, &extension)?;
    let job = EncodeJob {
        input: document.file_path.clone(),
        output: temp.to_path_buf(),
        crop,
        trim,
        has_audio: document.has_audio,
        config: config.clone(),
    };

    log::info!(
        "Exporting video {} -> {} (crop: {:?}, trim: {:?})",
        document.file_path.display(),
        output.display(),
        job.crop,
        job.trim.map(|t| (t.start_sec, t.end_sec))
    );
    if let Err(e) = encoder.encode(&job) {
        log::error!("Export of {} failed: {}", document.file_path.display(), e);
        return Err(e);
    }
    finish(temp, output)
}

/// yuv420p needs even frame sides; round the crop size down.
fn even_crop(region: PixelRect) -> Result<PixelRect> {
    if region.width < 2 || region.height < 2 {
        return Err(EditorError::InvalidCropRect(format!(
            "{}x{} is too small for video, need at least 2x2",
            region.width, region.height
        )));
    }
    Ok(PixelRect {
        width: region.width & !1,
        height: region.height & !1,
        ..region
    })
}

/// Encoding format and file extension for an image export. A path without
/// an extension falls back to the configured format.
fn image_output_format(output: &Path, config: &ExportConfig) -> Result<(ImageFormat, String)> {
    let extension = file_extension(&output.to_string_lossy())
        .unwrap_or_else(|| config.image_format.to_ascii_lowercase());
    let format = MediaType::Image
        .extensions()
        .contains(&extension.as_str())
        .then(|| ImageFormat::from_extension(&extension))
        .flatten()
        .ok_or_else(|| EditorError::UnsupportedFormat(format!("image output .{extension}")))?;
    Ok((format, extension))
}

/// Empty temporary file next to `output` so the final rename stays on one
/// filesystem.
fn temp_sibling(output: &Path, extension: &str) -> Result<TempPath> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = tempfile::Builder::new()
        .prefix(".clipcrop-")
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}

/// Move a completed temporary file over `output`. An empty file means the
/// encoder wrote nothing.
fn finish(temp: TempPath, output: &Path) -> Result<()> {
    let written = std::fs::metadata(&temp).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        return Err(EditorError::EncoderFailure(format!(
            "no output was written for {}",
            output.display()
        )));
    }
    temp.persist(output).map_err(|e| EditorError::Io(e.error))?;
    log::info!("Wrote {} ({} bytes)", output.display(), written);
    Ok(())
}
