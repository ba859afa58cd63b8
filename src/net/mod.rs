// SPDX-License-Identifier: GPL-3.0-or-later
// src/net/mod.rs
//
// Transport seam: request/response types and the `Transport` trait.

pub mod http;
#[cfg(test)]
pub mod mock;

use std::future::Future;
use std::sync::Arc;

use crate::domain::upload::FileInfo;

pub use http::HttpTransport;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    /// `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` with one file part.
    Multipart {
        fields: Vec<(String, String)>,
        file_field: String,
        file: FileInfo,
    },
}

/// One AJAX request as issued by a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
}

impl Request {
    pub fn get(url: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query,
            body: Body::Empty,
        }
    }

    pub fn post_form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            body: Body::Form(fields),
        }
    }

    pub fn post_file(
        url: impl Into<String>,
        file_field: impl Into<String>,
        file: FileInfo,
        fields: Vec<(String, String)>,
    ) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            body: Body::Multipart {
                fields,
                file_field: file_field.into(),
                file,
            },
        }
    }

    #[cfg(test)]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// What came back, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub status: u16,
    pub reason: String,
    /// Whether the preview header said the page rendered.
    pub preview_ok: bool,
    pub body: String,
}

impl Reply {
    #[cfg(test)]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            preview_ok: false,
            body: body.into(),
        }
    }

    #[cfg(test)]
    pub fn error(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            preview_ok: false,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("could not read {path}: {reason}")]
    File { path: String, reason: String },
}

/// Receives `(bytes sent, bytes total)` while a request body streams out.
pub type ProgressSink = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Performs requests. The runtime owns one and spawns each call.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: Request,
        progress: Option<ProgressSink>,
    ) -> impl Future<Output = Result<Reply, TransportError>> + Send;
}
