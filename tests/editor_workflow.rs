// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! End-to-end editing through the public API: open, select, trim, export.

use clipcrop::config::Tool;
use clipcrop::{
    fit_preview_dimension, CropSelection, Dimension, EditorError, MediaEditor, MediaType,
    MetadataProbe, Point, Rect, SelectionEvent, ToolPaths, TrimTimeline,
};
use image::{GenericImageView, ImageBuffer, Rgb};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Left half red, right half green.
fn write_split_image(path: &Path, width: u32, height: u32) {
    let image = ImageBuffer::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255u8, 0, 0])
        } else {
            Rgb([0u8, 255, 0])
        }
    });
    image.save(path).unwrap();
}

fn ffmpeg_tools() -> ToolPaths {
    let tools = ToolPaths::from_env();
    let has_x264 = Command::new(&tools.ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains("libx264"))
        .unwrap_or(false);
    assert!(
        tools.is_available(Tool::Ffmpeg) && tools.is_available(Tool::Ffprobe) && has_x264,
        "ffmpeg with libx264 and ffprobe must be installed"
    );
    tools
}

fn make_video(tools: &ToolPaths, path: &Path, seconds: u32, width: u32, height: u32) {
    let status = Command::new(&tools.ffmpeg)
        .args(["-y", "-v", "error", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=duration={seconds}:size={width}x{height}:rate=25"))
        .args(["-pix_fmt", "yuv420p", "-g", "1"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn crop_image_by_dragging_on_preview() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("split.png");
    write_split_image(&input, 1920, 1080);

    let mut editor = MediaEditor::new();
    let document = editor.load_media(&input).unwrap();
    assert_eq!(document.media_type, MediaType::Image);
    let source = document.source_dim;

    // 1920x1080 letterboxed into a 640x480 canvas
    let preview = fit_preview_dimension(source, Dimension::new(640, 480));
    assert_eq!(preview, Dimension::new(640, 360));

    // Drag right-to-left, bottom-to-top, over the right half only
    let mut selection = CropSelection::new(preview, source);
    let events = selection.subscribe();
    selection.begin_drag(Point::new(640.0, 300.0));
    selection.update_drag(Point::new(500.0, 200.0));
    let committed = selection.end_drag(Point::new(320.0, 60.0)).unwrap();
    assert_eq!(committed, Rect::new(960.0, 180.0, 960.0, 720.0));

    match events.try_recv().unwrap() {
        SelectionEvent::Committed { source, .. } => editor.set_crop(source).unwrap(),
        other => panic!("unexpected {other:?}"),
    }

    let output = dir.path().join("right_half.png");
    editor.export_image(&output).unwrap();

    let written = image::open(&output).unwrap();
    assert_eq!(written.dimensions(), (960, 720));
    assert_eq!(written.get_pixel(10, 10).0[..3], [0, 255, 0]);
}

#[test]
fn out_of_bounds_crop_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("small.png");
    write_split_image(&input, 100, 100);

    let mut editor = MediaEditor::new();
    editor.load_media(&input).unwrap();
    editor.set_crop(Rect::new(50.0, 50.0, 100.0, 10.0)).unwrap();

    let output = dir.path().join("never.png");
    let err = editor.export(&output).unwrap_err();
    assert!(matches!(err, EditorError::InvalidCropRect(_)));
    assert!(!output.exists());
    // Session still usable
    assert!(editor.document().is_some());
}

#[test]
fn unsupported_file_leaves_session_empty() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "hello").unwrap();

    let mut editor = MediaEditor::new();
    let err = editor.load_media(&input).unwrap_err();
    assert!(matches!(err, EditorError::UnsupportedFormat(_)));
    assert!(editor.document().is_none());
    assert!(matches!(
        editor.export(&dir.path().join("out.png")),
        Err(EditorError::NoMediaLoaded)
    ));
}

#[test]
fn edit_settings_reopen_the_same_crop() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.png");
    write_split_image(&input, 200, 100);

    let mut editor = MediaEditor::new();
    editor.load_media(&input).unwrap();
    editor.set_crop(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let settings = dir.path().join("photo.json");
    editor.save_descriptor(&settings).unwrap();

    let mut reopened = MediaEditor::new();
    reopened.load_descriptor(&settings).unwrap();
    let output = dir.path().join("left.png");
    reopened.export_image(&output).unwrap();

    let written = image::open(&output).unwrap();
    assert_eq!(written.dimensions(), (100, 100));
    assert_eq!(written.get_pixel(99, 50).0[..3], [255, 0, 0]);
}

#[test]
#[ignore = "needs ffmpeg with libx264"]
fn crop_and_trim_video_in_background() {
    let tools = ffmpeg_tools();
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("clip.mp4");
    make_video(&tools, &input, 10, 640, 480);

    let mut editor = MediaEditor::with_tools(tools.clone());
    let document = editor.load_media(&input).unwrap();
    let duration = document.duration_sec.unwrap();
    assert!((duration - 10.0).abs() < 0.5);
    assert!(!document.has_audio);

    // Trim 3s..9s by dragging handles on a 1000px timeline
    let mut timeline = TrimTimeline::new(duration, 1000.0);
    timeline.drag_start(timeline.time_to_pixel(3.0));
    let range = timeline.drag_end(timeline.time_to_pixel(9.0));
    editor.set_trim(range).unwrap();
    editor.set_crop(Rect::new(100.0, 100.0, 400.0, 300.0)).unwrap();

    let output = dir.path().join("clip_edited.mp4");
    editor.spawn_export(output.clone()).unwrap();
    assert!(matches!(
        editor.spawn_export(dir.path().join("again.mp4")),
        Err(EditorError::ExportInProgress)
    ));
    assert_eq!(editor.wait_export().unwrap().unwrap(), output);

    let probed = clipcrop::FfprobeProbe::from_tools(&tools).probe(&output).unwrap();
    assert_eq!((probed.width, probed.height), (400, 300));
    assert!((probed.duration_sec - 6.0).abs() < 0.5, "{}", probed.duration_sec);
}
