// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/model.rs
//
// Application state.

use super::chooser_field::ChooserField;
use super::effect::Dispatcher;
use super::modal::ModalSession;
use super::preview::PreviewState;
use super::uploader::UploadWidget;
use crate::config::AppConfig;

pub struct AppModel {
    pub config: AppConfig,

    // Widgets.
    pub field: Option<ChooserField>,
    pub modal: Option<ModalSession>,
    pub uploader: UploadWidget,
    pub preview: PreviewState,

    // Requests.
    pub dispatcher: Dispatcher,

    // UI state.
    pub error: Option<String>,
}

impl AppModel {
    pub fn new(config: AppConfig) -> Self {
        let uploader = UploadWidget::new(
            config.url(&config.upload_path),
            config.file_constraints(),
            false,
        );
        Self {
            config,
            field: None,
            modal: None,
            uploader,
            preview: PreviewState::default(),
            dispatcher: Dispatcher::default(),
            error: None,
        }
    }

    /// Attach a chooser field; its buttons open modals.
    pub fn with_field(mut self, field: ChooserField) -> Self {
        self.field = Some(field);
        self
    }

    pub fn modal_is_open(&self) -> bool {
        self.modal.as_ref().is_some_and(|modal| !modal.is_closed())
    }
}
