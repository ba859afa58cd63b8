// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/upload.rs
//
// Upload items, client-side file constraints and progress arithmetic.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fl;

/// A file picked or dropped by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl FileInfo {
    /// Stat a file on disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Type allow-list and size limit checked before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileConstraints {
    /// Lowercase extensions; empty accepts everything.
    pub accepted_extensions: Vec<String>,
    pub max_size: Option<u64>,
}

impl FileConstraints {
    pub fn check(&self, file: &FileInfo) -> Result<(), String> {
        if !self.accepted_extensions.is_empty() {
            let accepted = file
                .extension()
                .is_some_and(|ext| self.accepted_extensions.iter().any(|a| a == &ext));
            if !accepted {
                return Err(fl!("file-type-not-allowed", name = file.name.clone()));
            }
        }
        if let Some(max) = self.max_size
            && file.size > max
        {
            return Err(fl!("file-too-large", max = format_size(max)));
        }
        Ok(())
    }
}

/// Human readable byte size (`10.0 MB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Queued,
    Uploading,
    Success,
    Failure,
}

/// One row of the upload list.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadItem {
    pub id: u64,
    pub file: FileInfo,
    pub status: UploadStatus,
    /// Per-file progress in percent.
    pub progress: u8,
    /// Metadata edit form returned by the server after a successful upload.
    pub form: Option<String>,
    pub error: Option<String>,
}

impl UploadItem {
    pub fn new(id: u64, file: FileInfo) -> Self {
        Self {
            id,
            file,
            status: UploadStatus::Queued,
            progress: 0,
            form: None,
            error: None,
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = UploadStatus::Failure;
        self.error = Some(message.into());
    }
}

/// JSON body answered by the upload, finalize and delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// `floor(loaded / total * 100)`, capped at 100.
pub fn percent(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (u128::from(loaded) * 100 / u128::from(total)).min(100);
    u8::try_from(pct).unwrap_or(100)
}

/// Title suggested for an upload: file name without extension, `_` and `-`
/// turned into spaces.
pub fn human_readable_title(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot)
            if dot + 1 < file_name.len()
                && file_name[dot + 1..].chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            &file_name[..dot]
        }
        _ => file_name,
    };
    stem.replace(['_', '-'], " ")
}

/// Last path segment of a browser file widget value (`C:\fakepath\a.jpg`).
pub fn file_name_from_widget(value: &str) -> &str {
    value.rsplit(['\\', '/']).next().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64) -> FileInfo {
        FileInfo {
            path: PathBuf::from(name),
            name: name.to_string(),
            size,
        }
    }

    #[test]
    fn constraints_check_type_then_size() {
        let constraints = FileConstraints {
            accepted_extensions: vec!["jpg".to_string(), "png".to_string()],
            max_size: Some(1000),
        };
        assert!(constraints.check(&file("a.JPG", 10)).is_ok());
        assert!(constraints.check(&file("a.gif", 10)).is_err());
        assert!(constraints.check(&file("noext", 10)).is_err());
        assert!(constraints.check(&file("a.png", 1001)).is_err());
        assert!(FileConstraints::default().check(&file("a.exe", u64::MAX)).is_ok());
    }

    #[test]
    fn percent_floors() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(5, 3), 100);
    }

    #[test]
    fn titles_are_humanised() {
        assert_eq!(human_readable_title("my_holiday-photo.jpeg"), "my holiday photo");
        assert_eq!(human_readable_title("archive.tar.gz"), "archive.tar");
        assert_eq!(human_readable_title("report.v2"), "report.v2");
        assert_eq!(file_name_from_widget("C:\\fakepath\\image.jpg"), "image.jpg");
    }

    #[test]
    fn sizes_format() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn response_fields_are_optional() {
        let response: UploadResponse = serde_json::from_str(r#"{"success": false, "error_message": "bad"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.error_message.as_deref(), Some("bad"));
        assert_eq!(response.form, None);
    }
}
