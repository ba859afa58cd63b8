// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/choice.rs
//
// Payloads a chooser modal hands back to the page that opened it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which chooser a modal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalKind {
    #[default]
    Image,
    Document,
    Link,
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Document => write!(f, "document"),
            Self::Link => write!(f, "link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Chosen image or rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageChoice {
    pub id: u64,
    pub title: String,
    pub preview: Preview,
    /// Source image of a rendition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<u64>,
    /// Filter spec of a rendition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChoice {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkChoice {
    pub url: String,
    pub title: String,
    pub new_window: bool,
}

/// Terminal result of a chooser modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Choice {
    #[serde(rename = "imageChosen")]
    Image(ImageChoice),
    #[serde(rename = "documentChosen")]
    Document(DocumentChoice),
    #[serde(rename = "pageChosen")]
    Link(LinkChoice),
}

impl Choice {
    /// Name of the response callback the opener registers for this result.
    pub fn event(&self) -> &'static str {
        match self {
            Self::Image(_) => "imageChosen",
            Self::Document(_) => "documentChosen",
            Self::Link(_) => "pageChosen",
        }
    }
}
