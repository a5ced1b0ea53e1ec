// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timestamp formatting for encoder arguments and the timeline readout.

/// Format seconds as `HH:MM:SS.mmm`, the syntax ffmpeg accepts for `-ss`/`-t`.
/// Negative and non-finite input is treated as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let total_millis = (seconds * 1000.0).round() as u64;

    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let secs = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;

    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}
