// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ClipCrop desktop application.
//!
//! Open an image or video, drag out a crop region, set the trim handles and
//! save the edited copy.

mod app;
mod ui;

use anyhow::Result;
use app::ClipCropApp;

fn main() -> Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ClipCrop"),
        ..Default::default()
    };

    // Files named on the command line are opened at startup
    let initial = std::env::args_os().nth(1).map(std::path::PathBuf::from);

    eframe::run_native(
        "ClipCrop",
        options,
        Box::new(|_cc| Ok(Box::new(ClipCropApp::new(initial)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
