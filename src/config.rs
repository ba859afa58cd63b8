// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// Global configuration for the application, persisted as JSON.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::constant;
use crate::domain::choice::ModalKind;
use crate::domain::upload::FileConstraints;

/// Global configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Admin base URL, e.g. `https://cms.example.org/admin`.
    pub base_url: String,
    /// Image chooser path relative to `base_url`.
    pub image_chooser_path: String,
    /// Document chooser path relative to `base_url`.
    pub document_chooser_path: String,
    /// External link chooser path relative to `base_url`.
    pub link_chooser_path: String,
    /// Multiple upload endpoint relative to `base_url`.
    pub upload_path: String,
    pub image_search_debounce_ms: u64,
    pub document_search_debounce_ms: u64,
    pub request_timeout_ms: u64,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
    /// Accepted upload extensions (lowercase, without dot).
    pub accepted_file_types: Vec<String>,
    /// Value sent as `Cookie` header (authenticated admin session).
    pub session_cookie: Option<String>,
    /// Where preview windows are written; defaults to the user cache dir.
    pub cache_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/admin".to_string(),
            image_chooser_path: "/images/chooser/".to_string(),
            document_chooser_path: "/documents/chooser/".to_string(),
            link_chooser_path: "/choose-external-link/".to_string(),
            upload_path: "/images/multiple/add/".to_string(),
            image_search_debounce_ms: constant::IMAGE_SEARCH_DEBOUNCE_MS,
            document_search_debounce_ms: constant::DOCUMENT_SEARCH_DEBOUNCE_MS,
            request_timeout_ms: constant::REQUEST_TIMEOUT_MS,
            max_upload_size: constant::MAX_UPLOAD_SIZE,
            accepted_file_types: constant::ACCEPTED_FILE_TYPES
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            session_cookie: None,
            cache_dir: None,
        }
    }
}

impl AppConfig {
    /// Default location of the config file.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constant::CACHE_DIR).join("config.json"))
    }

    /// Load the config from disk, falling back to defaults when no file exists.
    pub fn load() -> anyhow::Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Join a configured path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn chooser_url(&self, kind: ModalKind) -> String {
        match kind {
            ModalKind::Image => self.url(&self.image_chooser_path),
            ModalKind::Document => self.url(&self.document_chooser_path),
            ModalKind::Link => self.url(&self.link_chooser_path),
        }
    }

    pub fn search_debounce(&self, kind: ModalKind) -> Duration {
        let ms = match kind {
            ModalKind::Document => self.document_search_debounce_ms,
            ModalKind::Image | ModalKind::Link => self.image_search_debounce_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn file_constraints(&self) -> FileConstraints {
        FileConstraints {
            accepted_extensions: self.accepted_file_types.clone(),
            max_size: Some(self.max_upload_size),
        }
    }

    /// Directory where preview output is written.
    pub fn preview_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(constant::CACHE_DIR)))
            .unwrap_or_else(std::env::temp_dir)
    }
}
