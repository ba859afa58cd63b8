// SPDX-License-Identifier: GPL-3.0-or-later
// src/net/http.rs
//
// reqwest-backed transport.

use std::future::Future;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};

use super::{Body, Method, ProgressSink, Reply, Request, Transport, TransportError};
use crate::config::AppConfig;
use crate::constant::{PREVIEW_HEADER, PREVIEW_HEADER_OK, UPLOAD_CHUNK_SIZE};
use crate::domain::upload::FileInfo;

/// Shared HTTP client carrying the admin session.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        // The admin views only answer fragment requests made "via AJAX".
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        if let Some(cookie) = &config.session_cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: Request,
        progress: Option<ProgressSink>,
    ) -> impl Future<Output = Result<Reply, TransportError>> + Send {
        let client = self.client.clone();
        async move {
            log::debug!("{:?} {} {:?}", request.method, request.url, request.query);
            let mut builder = match request.method {
                Method::Get => client.get(&request.url),
                Method::Post => client.post(&request.url),
            };
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            builder = match request.body {
                Body::Empty => builder,
                Body::Form(fields) => builder.form(&fields),
                Body::Multipart {
                    fields,
                    file_field,
                    file,
                } => builder.multipart(multipart_form(fields, file_field, file, progress).await?),
            };

            let response = builder.send().await.map_err(map_error)?;
            let status = response.status();
            let preview_ok = response
                .headers()
                .get(PREVIEW_HEADER)
                .and_then(|value| value.to_str().ok())
                == Some(PREVIEW_HEADER_OK);
            let body = response.text().await.map_err(map_error)?;

            Ok(Reply {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                preview_ok,
                body,
            })
        }
    }
}

/// Build the multipart body, streaming the file in chunks so progress can
/// be reported as it goes out.
async fn multipart_form(
    fields: Vec<(String, String)>,
    file_field: String,
    file: FileInfo,
    progress: Option<ProgressSink>,
) -> Result<Form, TransportError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| TransportError::File {
            path: file.path.display().to_string(),
            reason: e.to_string(),
        })?;
    let total = bytes.len() as u64;
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();

    let mut sent = 0_u64;
    let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(report) = &progress {
            report(sent, total);
        }
        Ok::<_, std::io::Error>(chunk)
    }));

    let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
        .file_name(file.name.clone());

    let form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    Ok(form.part(file_field, part))
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(error.to_string())
    }
}
