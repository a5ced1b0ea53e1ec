// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Edit descriptor serialization.
//!
//! An edit descriptor records which file was opened and the crop/trim
//! applied to it, so the same edit can be loaded and exported again later.
//! Stored as YAML or JSON depending on the file extension.

use crate::error::{EditorError, Result};
use crate::models::session::{file_extension, MediaDocument};
use crate::models::timeline::TrimRange;
use crate::util::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Saved edit for one media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditDescriptor {
    pub media_file: PathBuf,
    /// Source-space crop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<TrimRange>,
}

impl EditDescriptor {
    pub fn from_document(document: &MediaDocument) -> Self {
        Self {
            media_file: document.file_path.clone(),
            crop: document.crop,
            trim: document.trim,
        }
    }
}

/// On-disk encoding of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Yaml,
    Json,
}

impl DescriptorFormat {
    /// Pick the encoding from `path`'s extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match file_extension(&path.to_string_lossy()).as_deref() {
            Some("yaml") | Some("yml") => Ok(DescriptorFormat::Yaml),
            Some("json") => Ok(DescriptorFormat::Json),
            other => Err(EditorError::UnsupportedFormat(format!(
                "edit settings must be .yaml, .yml or .json, not {}",
                other.map(|ext| format!(".{ext}")).unwrap_or_else(|| "no extension".to_string())
            ))),
        }
    }
}

/// Write a descriptor as YAML.
pub fn export_yaml(descriptor: &EditDescriptor, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(descriptor).map_err(|e| EditorError::Serialization(e.to_string()))?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Write a descriptor as pretty-printed JSON.
pub fn export_json(descriptor: &EditDescriptor, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(descriptor)
        .map_err(|e| EditorError::Serialization(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn import_yaml(path: &Path) -> Result<EditDescriptor> {
    let yaml = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&yaml).map_err(|e| EditorError::Serialization(e.to_string()))
}

pub fn import_json(path: &Path) -> Result<EditDescriptor> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| EditorError::Serialization(e.to_string()))
}

/// Save in the format implied by `path`.
pub fn save_descriptor(descriptor: &EditDescriptor, path: &Path) -> Result<()> {
    match DescriptorFormat::from_path(path)? {
        DescriptorFormat::Yaml => export_yaml(descriptor, path)?,
        DescriptorFormat::Json => export_json(descriptor, path)?,
    }
    log::info!("Saved edit settings to {}", path.display());
    Ok(())
}

/// Load in the format implied by `path`.
pub fn load_descriptor(path: &Path) -> Result<EditDescriptor> {
    let descriptor = match DescriptorFormat::from_path(path)? {
        DescriptorFormat::Yaml => import_yaml(path)?,
        DescriptorFormat::Json => import_json(path)?,
    };
    log::info!(
        "Loaded edit settings for {} from {}",
        descriptor.media_file.display(),
        path.display()
    );
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn descriptor() -> EditDescriptor {
        EditDescriptor {
            media_file: PathBuf::from("/videos/holiday.mp4"),
            crop: Some(Rect::new(100.0, 100.0, 400.0, 300.0)),
            trim: Some(TrimRange::clamped(3.0, 9.0, 10.0)),
        }
    }

    #[test]
    fn test_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edit.yaml");
        save_descriptor(&descriptor(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("media_file: /videos/holiday.mp4"));
        assert_eq!(load_descriptor(&path).unwrap(), descriptor());
    }

    #[test]
    fn test_json_omits_missing_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edit.json");
        let plain = EditDescriptor {
            media_file: PathBuf::from("photo.png"),
            crop: None,
            trim: None,
        };
        save_descriptor(&plain, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("crop"));
        assert!(!text.contains("trim"));
        assert_eq!(load_descriptor(&path).unwrap(), plain);
    }

    #[test]
    fn test_hand_written_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edit.json");
        std::fs::write(
            &path,
            r#"{"media_file": "a.png", "crop": {"x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0}}"#,
        )
        .unwrap();

        let loaded = load_descriptor(&path).unwrap();
        assert_eq!(loaded.crop, Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(loaded.trim, None);
    }

    #[test]
    fn test_unknown_extension() {
        let result = save_descriptor(&descriptor(), Path::new("edit.toml"));
        assert!(matches!(result, Err(EditorError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edit.yml");
        std::fs::write(&path, "crop: [this is: not a descriptor").unwrap();
        assert!(matches!(load_descriptor(&path), Err(EditorError::Serialization(_))));
    }
}
