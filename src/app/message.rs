// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/message.rs
//
// Application messages: user actions, replies and internal signals.

use crate::domain::choice::ModalKind;
use crate::domain::crop::{DragHandle, SelectionRect};
use crate::domain::upload::FileInfo;
use crate::net::{Reply, RequestId, TransportError};

#[derive(Debug, Clone)]
pub enum AppMessage {
    // Chooser field.
    OpenChooser,
    OpenRecrop,
    #[allow(dead_code)]
    ClearChoice,

    // Modal navigation.
    OpenModal { kind: ModalKind, url: String },
    #[allow(dead_code)]
    LoadUrl(String),
    #[allow(dead_code)]
    CloseModal,

    // Chooser search.
    SearchInput(String),
    SearchSubmit,
    CollectionChanged(Option<String>),
    TagClicked(String),
    PageClicked(u32),
    ResultClicked(String),
    DebounceElapsed(u64),

    // Chooser forms.
    ChooserUpload {
        file: FileInfo,
        fields: Vec<(String, String)>,
    },
    SubmitForm(Vec<(String, String)>),

    // Crop tool.
    CropSelect(SelectionRect),
    #[allow(dead_code)]
    CropDragStart {
        x: f64,
        y: f64,
        handle: DragHandle,
    },
    #[allow(dead_code)]
    CropDragMove {
        x: f64,
        y: f64,
    },
    #[allow(dead_code)]
    CropDragEnd,
    CropWidthInput(String),
    CropHeightInput(String),
    CropRatioChanged(String),
    #[allow(dead_code)]
    ApplyCrop,
    #[allow(dead_code)]
    SkipCrop,
    #[allow(dead_code)]
    ReleaseCrop,
    SubmitCrop,

    // Multiple upload.
    FilesAdded(Vec<FileInfo>),
    UploadProgress {
        id: RequestId,
        loaded: u64,
        total: u64,
    },
    FinalizeItem {
        item: u64,
        fields: Vec<(String, String)>,
    },
    DeleteItem(u64),

    // Preview.
    RequestPreview {
        action: String,
        fields: Vec<(String, String)>,
    },

    // Transport.
    Completed {
        id: RequestId,
        outcome: Result<Reply, TransportError>,
    },

    // Fallback.
    #[allow(dead_code)]
    NoOp,
}
