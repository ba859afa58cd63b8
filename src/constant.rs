// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Application constants that should not be changed by the user.

/// Debounce delay for image chooser search input in milliseconds.
pub const IMAGE_SEARCH_DEBOUNCE_MS: u64 = 200;

/// Debounce delay for document chooser search input in milliseconds.
pub const DOCUMENT_SEARCH_DEBOUNCE_MS: u64 = 50;

/// Default request timeout in milliseconds.
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default maximum upload size in bytes (10 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Default accepted upload extensions.
pub const ACCEPTED_FILE_TYPES: &[&str] = &["gif", "jpg", "jpeg", "png", "webp"];

/// Multipart field name used by the multiple-upload endpoint.
pub const UPLOAD_FIELD: &str = "files[]";

/// Chunk size used when streaming upload bodies (progress granularity).
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Response header set by the server on a successful preview render.
pub const PREVIEW_HEADER: &str = "X-Wagtail-Preview";

/// Value of [`PREVIEW_HEADER`] meaning "rendered fine".
pub const PREVIEW_HEADER_OK: &str = "ok";

/// HTTP status returned when the request body is too large.
pub const STATUS_PAYLOAD_TOO_LARGE: u16 = 413;

/// Ratio choices offered by the cropper when the server does not send any.
pub const DEFAULT_RATIOS: &[&str] = &["1:1", "4:3", "16:9", "2:1", "free"];

/// Ratio choice meaning "unconstrained".
pub const FREE_RATIO: &str = "free";

/// Cache directory name (preview output).
pub const CACHE_DIR: &str = "modalflow";

/// Preview output file extension.
pub const PREVIEW_EXT: &str = "html";

/// Placeholder markup written into a freshly opened preview window.
pub const PREVIEW_PLACEHOLDER: &str = "<!DOCTYPE html><title>Preview</title><p>Loading preview…</p>";
