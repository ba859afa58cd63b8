// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/update.rs
//
// Message handling: state transitions plus the effects they request.

use super::effect::{Dispatcher, Effect, HostEvent, Purpose};
use super::message::AppMessage;
use super::modal::ModalSession;
use super::model::AppModel;
use crate::domain::choice::ModalKind;
use crate::domain::crop::CropSynchronizer;

pub fn update(model: &mut AppModel, message: AppMessage) -> Vec<Effect> {
    match message {
        // Chooser field.
        AppMessage::OpenChooser => {
            let Some(field) = &model.field else {
                return Vec::new();
            };
            let (kind, url) = (field.kind, field.choose_url());
            open_modal(model, kind, url)
        }
        AppMessage::OpenRecrop => {
            let Some((kind, url)) = model
                .field
                .as_ref()
                .and_then(|field| Some((field.kind, field.recrop_url()?)))
            else {
                log::debug!("nothing to recrop");
                return Vec::new();
            };
            open_modal(model, kind, url)
        }
        AppMessage::ClearChoice => {
            if let Some(field) = &mut model.field {
                field.clear();
            }
            Vec::new()
        }

        // Modal navigation.
        AppMessage::OpenModal { kind, url } => open_modal(model, kind, url),
        AppMessage::LoadUrl(url) => with_modal(model, |modal, d| modal.load_url(&url, d)),
        AppMessage::CloseModal => with_modal(model, |modal, d| modal.close(d)),

        // Chooser search.
        AppMessage::SearchInput(text) => with_modal(model, |modal, d| modal.search_input(&text, d)),
        AppMessage::SearchSubmit => with_modal(model, |modal, d| modal.search(d)),
        AppMessage::CollectionChanged(id) => {
            with_modal(model, |modal, d| modal.collection_changed(id, d))
        }
        AppMessage::TagClicked(tag) => with_modal(model, |modal, d| modal.choose_tag(&tag, d)),
        AppMessage::PageClicked(page) => with_modal(model, |modal, d| modal.set_page(page, d)),
        AppMessage::ResultClicked(href) => with_modal(model, |modal, d| modal.click_result(&href, d)),
        AppMessage::DebounceElapsed(generation) => {
            with_modal(model, |modal, d| modal.debounce_elapsed(generation, d))
        }

        // Chooser forms.
        AppMessage::ChooserUpload { file, fields } => {
            if let Err(message) = model.config.file_constraints().check(&file) {
                log::info!("rejected {}: {message}", file.name);
                model.error = Some(message);
                return Vec::new();
            }
            with_modal(model, |modal, d| modal.upload(file, fields, d))
        }
        AppMessage::SubmitForm(fields) => with_modal(model, |modal, d| modal.submit_form(fields, d)),

        // Crop tool.
        AppMessage::CropSelect(rect) => with_crop(model, |crop| crop.select(rect)),
        AppMessage::CropDragStart { x, y, handle } => {
            with_crop(model, |crop| crop.drag_start(handle, x, y))
        }
        AppMessage::CropDragMove { x, y } => with_crop(model, |crop| crop.drag_move(x, y)),
        AppMessage::CropDragEnd => with_crop(model, CropSynchronizer::drag_end),
        AppMessage::CropWidthInput(text) => with_crop(model, |crop| crop.on_width_input(&text)),
        AppMessage::CropHeightInput(text) => with_crop(model, |crop| crop.on_height_input(&text)),
        AppMessage::CropRatioChanged(value) => with_crop(model, |crop| crop.on_ratio_change(&value)),
        AppMessage::ApplyCrop => with_crop(model, CropSynchronizer::apply),
        AppMessage::SkipCrop => with_crop(model, CropSynchronizer::skip),
        AppMessage::ReleaseCrop => with_crop(model, CropSynchronizer::release),
        AppMessage::SubmitCrop => with_modal(model, |modal, d| modal.submit_crop(d)),

        // Multiple upload.
        AppMessage::FilesAdded(files) => model.uploader.add_files(files, &mut model.dispatcher),
        AppMessage::UploadProgress { id, loaded, total } => {
            if let Some(Purpose::Upload(item)) = model.dispatcher.purpose(id) {
                model.uploader.on_progress(item, loaded, total);
            }
            Vec::new()
        }
        AppMessage::FinalizeItem { item, fields } => {
            model.uploader.finalize(item, fields, &mut model.dispatcher)
        }
        AppMessage::DeleteItem(item) => model.uploader.delete(item, &mut model.dispatcher),

        // Preview.
        AppMessage::RequestPreview { action, fields } => {
            model.preview.request(action, fields, &mut model.dispatcher)
        }

        // Transport.
        AppMessage::Completed { id, outcome } => {
            let Some(purpose) = model.dispatcher.complete(id) else {
                log::debug!("ignoring reply {id} for a cancelled request");
                return Vec::new();
            };
            match purpose {
                Purpose::ModalLoad => with_modal(model, |modal, _| modal.on_loaded(outcome)),
                Purpose::Search => with_modal(model, |modal, _| modal.on_search_reply(id, outcome)),
                Purpose::ChooserUpload => with_modal(model, |modal, _| modal.on_upload_reply(outcome)),
                Purpose::Upload(item) => {
                    model
                        .uploader
                        .on_upload_reply(item, outcome, &mut model.dispatcher)
                }
                Purpose::Finalize(item) => {
                    model.uploader.on_finalize_reply(item, outcome);
                    Vec::new()
                }
                Purpose::Delete(item) => {
                    model.uploader.on_delete_reply(item, outcome);
                    Vec::new()
                }
                Purpose::Preview => model.preview.on_reply(id, outcome),
            }
        }

        AppMessage::NoOp => Vec::new(),
    }
}

/// Open a modal, closing one that is still open.
fn open_modal(model: &mut AppModel, kind: ModalKind, url: String) -> Vec<Effect> {
    let mut effects = match &mut model.modal {
        Some(modal) => modal.close(&mut model.dispatcher),
        None => Vec::new(),
    };
    let url = model.config.url(&url);
    let debounce = model.config.search_debounce(kind);
    let (session, opened) = ModalSession::open(kind, url, debounce, &mut model.dispatcher);
    model.modal = Some(session);
    effects.extend(opened);
    effects
}

/// Run `handle` on the open modal. A chosen result also lands in the
/// chooser field.
fn with_modal(
    model: &mut AppModel,
    handle: impl FnOnce(&mut ModalSession, &mut Dispatcher) -> Vec<Effect>,
) -> Vec<Effect> {
    let AppModel {
        modal,
        dispatcher,
        field,
        ..
    } = model;
    let Some(modal) = modal.as_mut() else {
        log::debug!("no modal open");
        return Vec::new();
    };
    let effects = handle(modal, dispatcher);
    if let Some(field) = field {
        for effect in &effects {
            if let Effect::Emit(HostEvent::Chosen(choice)) = effect {
                field.apply(choice);
            }
        }
    }
    effects
}

fn with_crop(model: &mut AppModel, handle: impl FnOnce(&mut CropSynchronizer)) -> Vec<Effect> {
    match model.modal.as_mut().and_then(ModalSession::crop_mut) {
        Some(crop) => handle(crop),
        None => log::debug!("no crop tool active"),
    }
    Vec::new()
}
