// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The editor facade used by the shell.
//!
//! [`MediaEditor`] owns the session and the probe/encoder backends and
//! exposes the operations behind the Open and Save As menu actions. Exports
//! can run inline or on a worker thread; a worker gets a snapshot of the
//! document, so the session stays editable while it encodes.

use crate::config::{ExportConfig, ToolPaths};
use crate::error::{EditorError, Result};
use crate::io::export::{self, Encoder, FfmpegEncoder};
use crate::io::probe::{FfprobeProbe, MetadataProbe};
use crate::io::serialization::{self, EditDescriptor};
use crate::models::session::{MediaDocument, MediaSession, MediaType, SessionEvent};
use crate::models::timeline::TrimRange;
use crate::util::geometry::Rect;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// A running background export.
pub struct ExportHandle {
    output: PathBuf,
    receiver: Receiver<Result<PathBuf>>,
}

impl ExportHandle {
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Non-blocking check for the result.
    pub fn try_result(&self) -> Option<Result<PathBuf>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    /// Block until the export finishes.
    pub fn wait(self) -> Result<PathBuf> {
        self.receiver.recv().unwrap_or_else(|_| Err(worker_lost()))
    }
}

fn worker_lost() -> EditorError {
    EditorError::EncoderFailure("export worker stopped without reporting a result".to_string())
}

/// Single-document crop/trim editor.
pub struct MediaEditor {
    session: MediaSession,
    config: ExportConfig,
    tools: ToolPaths,
    probe: Arc<dyn MetadataProbe>,
    encoder: Arc<dyn Encoder>,
    export_job: Option<ExportHandle>,
}

impl Default for MediaEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaEditor {
    /// Editor using ffprobe/ffmpeg as found by [`ToolPaths::from_env`].
    pub fn new() -> Self {
        Self::with_tools(ToolPaths::from_env())
    }

    pub fn with_tools(tools: ToolPaths) -> Self {
        let probe = Arc::new(FfprobeProbe::from_tools(&tools));
        let encoder = Arc::new(FfmpegEncoder::from_tools(&tools));
        Self::assemble(tools, probe, encoder)
    }

    /// Editor with custom probe and encoder backends.
    pub fn with_backends(probe: Arc<dyn MetadataProbe>, encoder: Arc<dyn Encoder>) -> Self {
        Self::assemble(ToolPaths::from_env(), probe, encoder)
    }

    fn assemble(tools: ToolPaths, probe: Arc<dyn MetadataProbe>, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            session: MediaSession::new(),
            config: ExportConfig::default(),
            tools,
            probe,
            encoder,
            export_job: None,
        }
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ExportConfig) {
        self.config = config;
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Shared probe, for loading on another thread.
    pub fn probe(&self) -> Arc<dyn MetadataProbe> {
        Arc::clone(&self.probe)
    }

    pub fn session(&self) -> &MediaSession {
        &self.session
    }

    pub fn document(&self) -> Option<&MediaDocument> {
        self.session.document()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.session.subscribe()
    }

    /// Open `path`. Blocks while a video is probed.
    pub fn load_media(&mut self, path: &Path) -> Result<&MediaDocument> {
        let probe = Arc::clone(&self.probe);
        self.session.load_media(path, probe.as_ref())
    }

    /// Drop the open document and its edits. A running background export
    /// keeps its own copy and still completes.
    pub fn close(&mut self) {
        self.session.clear();
    }

    /// Adopt a document opened with [`MediaDocument::open`] elsewhere.
    pub fn install(&mut self, document: MediaDocument) -> &MediaDocument {
        self.session.install(document)
    }

    /// Set the crop in source pixels. Checked against the frame at export.
    pub fn set_crop(&mut self, rect: Rect) -> Result<()> {
        self.session.set_crop(Some(rect))
    }

    pub fn clear_crop(&mut self) -> Result<()> {
        self.session.set_crop(None)
    }

    pub fn set_trim(&mut self, range: TrimRange) -> Result<()> {
        self.session.set_trim(Some(range))
    }

    pub fn clear_trim(&mut self) -> Result<()> {
        self.session.set_trim(None)
    }

    /// Export the open image. Fails with `WrongMediaType` for a video.
    pub fn export_image(&self, output: &Path) -> Result<()> {
        let document = self.require_type(MediaType::Image)?;
        export::export_image(document, output, &self.config)
    }

    /// Export the open video. Blocks for the whole encode.
    pub fn export_video(&self, output: &Path) -> Result<()> {
        let document = self.require_type(MediaType::Video)?;
        export::export_video(document, output, &self.config, self.encoder.as_ref())
    }

    /// Export whatever is open.
    pub fn export(&self, output: &Path) -> Result<()> {
        export::export(&self.session, output, &self.config, self.encoder.as_ref())
    }

    /// Start exporting on a worker thread. Only one export runs at a time;
    /// collect the result with [`MediaEditor::poll_export`] before starting
    /// another.
    pub fn spawn_export(&mut self, output: PathBuf) -> Result<()> {
        if self.export_job.is_some() {
            log::warn!("Export to {} rejected: another export is running", output.display());
            return Err(EditorError::ExportInProgress);
        }
        let document = self.session.require()?.clone();
        let config = self.config.clone();
        let encoder = Arc::clone(&self.encoder);
        let (sender, receiver) = channel();
        let target = output.clone();

        thread::Builder::new()
            .name("clipcrop-export".to_string())
            .spawn(move || {
                let result = export::export_document(&document, &target, &config, encoder.as_ref())
                    .map(|()| target);
                // Receiver gone means the editor was dropped; nothing to report to
                let _ = sender.send(result);
            })?;

        log::info!("Started background export to {}", output.display());
        self.export_job = Some(ExportHandle { output, receiver });
        Ok(())
    }

    pub fn is_exporting(&self) -> bool {
        self.export_job.is_some()
    }

    /// Output path of the running export, if any.
    pub fn export_target(&self) -> Option<&Path> {
        self.export_job.as_ref().map(ExportHandle::output)
    }

    /// Result of the background export once it has finished.
    pub fn poll_export(&mut self) -> Option<Result<PathBuf>> {
        let result = self.export_job.as_ref()?.try_result()?;
        self.export_job = None;
        Some(result)
    }

    /// Block until the background export finishes.
    pub fn wait_export(&mut self) -> Option<Result<PathBuf>> {
        self.export_job.take().map(ExportHandle::wait)
    }

    /// Current edit as a saveable descriptor.
    pub fn descriptor(&self) -> Result<EditDescriptor> {
        Ok(EditDescriptor::from_document(self.session.require()?))
    }

    pub fn save_descriptor(&self, path: &Path) -> Result<()> {
        serialization::save_descriptor(&self.descriptor()?, path)
    }

    /// Open the media a descriptor names and reapply its edits.
    pub fn load_descriptor(&mut self, path: &Path) -> Result<&MediaDocument> {
        let descriptor = serialization::load_descriptor(path)?;
        self.load_media(&descriptor.media_file)?;
        self.apply_descriptor(&descriptor)?;
        self.session.require()
    }

    /// Apply a descriptor's crop and trim to the open document. Both are
    /// checked against the document first; nothing changes on failure.
    pub fn apply_descriptor(&mut self, descriptor: &EditDescriptor) -> Result<()> {
        let document = self.session.require()?;
        export::validate_crop(descriptor.crop.as_ref(), document.source_dim)?;
        export::validate_trim(descriptor.trim.as_ref(), document.duration_sec)?;
        let trim = descriptor.trim.map(|range| TrimRange {
            duration_sec: document.duration_sec.unwrap_or(range.duration_sec),
            ..range
        });

        self.session.set_crop(descriptor.crop)?;
        self.session.set_trim(trim)?;
        Ok(())
    }

    fn require_type(&self, expected: MediaType) -> Result<&MediaDocument> {
        let document = self.session.require()?;
        if document.media_type != expected {
            return Err(EditorError::WrongMediaType {
                expected: expected.as_str(),
                actual: document.media_type.as_str(),
            });
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::testing::{solid_image, FixedProbe, RecordingEncoder};
    use crate::util::geometry::Dimension;
    use tempfile::TempDir;

    fn editor(encoder: Arc<RecordingEncoder>) -> MediaEditor {
        MediaEditor::with_backends(Arc::new(FixedProbe::video(10.0, 640, 480)), encoder)
    }

    fn touch_video(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"stub").unwrap();
        path
    }

    #[test]
    fn test_load_and_export_video() {
        let dir = TempDir::new().unwrap();
        let encoder = Arc::new(RecordingEncoder::default());
        let mut editor = editor(encoder.clone());

        let document = editor.load_media(&touch_video(&dir)).unwrap();
        assert_eq!(document.source_dim, Dimension::new(640, 480));
        editor.set_crop(Rect::new(100.0, 100.0, 400.0, 300.0)).unwrap();
        editor.set_trim(TrimRange::clamped(3.0, 9.0, 10.0)).unwrap();

        let output = dir.path().join("out.mp4");
        editor.export_video(&output).unwrap();

        assert!(output.exists());
        let job = &encoder.jobs()[0];
        assert!(job.crop.is_some());
        assert!(job.trim.is_some());
    }

    #[test]
    fn test_export_without_media() {
        let editor = editor(Arc::new(RecordingEncoder::default()));
        let result = editor.export_image(Path::new("out.png"));
        assert!(matches!(result, Err(EditorError::NoMediaLoaded)));
    }

    #[test]
    fn test_export_wrong_media_type() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        editor.load_media(&touch_video(&dir)).unwrap();

        let result = editor.export_image(&dir.path().join("out.png"));
        assert!(matches!(
            result,
            Err(EditorError::WrongMediaType { expected: "image", actual: "video" })
        ));
    }

    #[test]
    fn test_clear_crop_exports_full_image() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.png");
        solid_image(80, 60, [0, 0, 255]).save(&input).unwrap();
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        editor.load_media(&input).unwrap();
        editor.set_crop(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        editor.clear_crop().unwrap();

        let output = dir.path().join("copy.png");
        editor.export(&output).unwrap();
        assert_eq!(image::image_dimensions(&output).unwrap(), (80, 60));
    }

    #[test]
    fn test_failed_load_after_success_leaves_editor_empty() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("a.png");
        solid_image(32, 32, [0, 0, 255]).save(&image).unwrap();
        let broken = dir.path().join("broken.mp4");
        std::fs::write(&broken, b"not a video").unwrap();

        let mut editor = MediaEditor::with_backends(
            Arc::new(FixedProbe(Err("moov atom not found".to_string()))),
            Arc::new(RecordingEncoder::default()),
        );
        editor.load_media(&image).unwrap();
        editor.set_crop(Rect::new(0.0, 0.0, 16.0, 16.0)).unwrap();

        let err = editor.load_media(&broken).unwrap_err();
        assert!(matches!(err, EditorError::MetadataProbe { .. }));
        assert!(editor.document().is_none());
        assert!(matches!(
            editor.export(&dir.path().join("out.png")),
            Err(EditorError::NoMediaLoaded)
        ));
    }

    #[test]
    fn test_close_drops_document() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        let events = editor.subscribe();
        editor.load_media(&touch_video(&dir)).unwrap();

        editor.close();

        assert!(editor.document().is_none());
        assert!(events.try_iter().any(|e| matches!(e, SessionEvent::Cleared)));
        assert!(matches!(
            editor.spawn_export(dir.path().join("out.mp4")),
            Err(EditorError::NoMediaLoaded)
        ));
    }

    #[test]
    fn test_failed_export_keeps_session() {
        let dir = TempDir::new().unwrap();
        let encoder = Arc::new(RecordingEncoder::failing("Conversion failed!"));
        let mut editor = editor(encoder);
        editor.load_media(&touch_video(&dir)).unwrap();
        editor.set_crop(Rect::new(0.0, 0.0, 64.0, 64.0)).unwrap();

        let result = editor.export_video(&dir.path().join("out.mp4"));
        assert!(matches!(result, Err(EditorError::EncoderFailure(_))));
        assert_eq!(editor.document().unwrap().crop, Some(Rect::new(0.0, 0.0, 64.0, 64.0)));
    }

    #[test]
    fn test_second_background_export_rejected() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        editor.load_media(&touch_video(&dir)).unwrap();

        editor.spawn_export(dir.path().join("first.mp4")).unwrap();
        assert!(editor.is_exporting());
        let second = editor.spawn_export(dir.path().join("second.mp4"));
        assert!(matches!(second, Err(EditorError::ExportInProgress)));

        let finished = editor.wait_export().unwrap().unwrap();
        assert_eq!(finished, dir.path().join("first.mp4"));
        assert!(!editor.is_exporting());
        editor.spawn_export(dir.path().join("second.mp4")).unwrap();
        assert!(editor.wait_export().unwrap().is_ok());
    }

    #[test]
    fn test_background_export_uses_snapshot() {
        let dir = TempDir::new().unwrap();
        let encoder = Arc::new(RecordingEncoder::default());
        let mut editor = editor(encoder.clone());
        editor.load_media(&touch_video(&dir)).unwrap();
        editor.set_crop(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();

        editor.spawn_export(dir.path().join("out.mp4")).unwrap();
        editor.set_crop(Rect::new(0.0, 0.0, 200.0, 200.0)).unwrap();
        editor.wait_export().unwrap().unwrap();

        assert_eq!(encoder.jobs()[0].crop.map(|c| c.width), Some(100));
    }

    #[test]
    fn test_poll_export_until_done() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        editor.load_media(&touch_video(&dir)).unwrap();
        editor.spawn_export(dir.path().join("out.mkv")).unwrap();

        let result = loop {
            if let Some(result) = editor.poll_export() {
                break result;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(result.is_ok());
        assert!(editor.poll_export().is_none());
    }

    #[test]
    fn test_spawn_export_without_media() {
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        let result = editor.spawn_export(PathBuf::from("out.mp4"));
        assert!(matches!(result, Err(EditorError::NoMediaLoaded)));
        assert!(!editor.is_exporting());
    }

    #[test]
    fn test_descriptor_roundtrip_through_file() {
        let dir = TempDir::new().unwrap();
        let video = touch_video(&dir);
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        editor.load_media(&video).unwrap();
        editor.set_crop(Rect::new(10.0, 20.0, 30.0, 40.0)).unwrap();
        editor.set_trim(TrimRange::clamped(1.0, 2.0, 10.0)).unwrap();
        let settings = dir.path().join("edit.yaml");
        editor.save_descriptor(&settings).unwrap();

        let mut reopened = MediaEditor::with_backends(
            Arc::new(FixedProbe::video(10.0, 640, 480)),
            Arc::new(RecordingEncoder::default()),
        );
        let document = reopened.load_descriptor(&settings).unwrap();
        assert_eq!(document.file_path, video);
        assert_eq!(document.crop, Some(Rect::new(10.0, 20.0, 30.0, 40.0)));
        assert_eq!(document.trim.map(|t| (t.start_sec, t.end_sec)), Some((1.0, 2.0)));
    }

    #[test]
    fn test_descriptor_revalidated_against_media() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor(Arc::new(RecordingEncoder::default()));
        editor.load_media(&touch_video(&dir)).unwrap();

        let oversized = EditDescriptor {
            media_file: dir.path().join("clip.mp4"),
            crop: Some(Rect::new(0.0, 0.0, 1920.0, 1080.0)),
            trim: None,
        };
        let result = editor.apply_descriptor(&oversized);
        assert!(matches!(result, Err(EditorError::InvalidCropRect(_))));
        assert_eq!(editor.document().unwrap().crop, None);

        let too_long = EditDescriptor {
            crop: None,
            trim: Some(TrimRange::clamped(0.0, 30.0, 30.0)),
            ..oversized
        };
        assert!(matches!(
            editor.apply_descriptor(&too_long),
            Err(EditorError::InvalidTrimRange(_))
        ));
    }
}
