// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/uploader.rs
//
// Multiple-upload widget: validation, a strictly sequential queue, per-item
// metadata forms and deletion.

use std::collections::VecDeque;

use super::effect::{Dispatcher, Effect, Purpose};
use super::fragment::{Fragment, resolve_url};
use crate::constant::{STATUS_PAYLOAD_TOO_LARGE, UPLOAD_FIELD};
use crate::domain::upload::{
    FileConstraints, FileInfo, UploadItem, UploadResponse, UploadStatus, percent,
};
use crate::fl;
use crate::net::{Reply, Request, TransportError};

#[derive(Debug, Default)]
pub struct UploadWidget {
    /// Upload endpoint; item form actions resolve against it.
    pub url: String,
    /// Extra fields sent with every upload (CSRF token).
    pub fields: Vec<(String, String)>,
    pub constraints: FileConstraints,
    /// Accept one file at a time.
    pub single_file: bool,
    pub items: Vec<UploadItem>,
    pub drop_zone_visible: bool,
    /// Aggregate progress of the running batch; back to 0 once it hits 100.
    pub overall_progress: u8,
    batch: Vec<u64>,
    queue: VecDeque<u64>,
    in_flight: Option<u64>,
    next_item: u64,
}

impl UploadWidget {
    pub fn new(url: impl Into<String>, constraints: FileConstraints, single_file: bool) -> Self {
        Self {
            url: url.into(),
            constraints,
            single_file,
            drop_zone_visible: true,
            ..Self::default()
        }
    }

    pub fn item(&self, id: u64) -> Option<&UploadItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: u64) -> Option<&mut UploadItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Metadata form of an uploaded item, with its bindings.
    pub fn item_form(&self, id: u64) -> Option<Fragment> {
        self.item(id)?.form.as_deref().map(Fragment::new)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.queue.is_empty()
    }

    /// Files picked or dropped. Rejected files show up as failed items and
    /// are never sent.
    pub fn add_files(&mut self, files: Vec<FileInfo>, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        for file in files {
            if self.single_file && !self.drop_zone_visible {
                log::debug!("ignoring {}: single file widget is busy", file.name);
                continue;
            }
            self.next_item += 1;
            let mut item = UploadItem::new(self.next_item, file);
            if let Err(message) = self.constraints.check(&item.file) {
                log::info!("rejected {}: {message}", item.file.name);
                item.fail(message);
                self.items.push(item);
                continue;
            }
            if self.single_file {
                self.items.clear();
                self.drop_zone_visible = false;
            }
            self.queue.push_back(item.id);
            self.batch.push(item.id);
            self.items.push(item);
        }
        self.refresh_overall();
        self.pump(dispatcher)
    }

    /// Start the next queued upload unless one is running.
    fn pump(&mut self, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        if self.in_flight.is_some() {
            return Vec::new();
        }
        let Some(id) = self.queue.pop_front() else {
            return Vec::new();
        };
        let url = self.url.clone();
        let fields = self.fields.clone();
        let Some(item) = self.item_mut(id) else {
            return Vec::new();
        };
        item.status = UploadStatus::Uploading;
        let request = Request::post_file(url, UPLOAD_FIELD, item.file.clone(), fields);
        let (_, effect) = dispatcher.send(Purpose::Upload(id), request);
        self.in_flight = Some(id);
        vec![effect]
    }

    pub fn on_progress(&mut self, id: u64, loaded: u64, total: u64) {
        if let Some(item) = self.item_mut(id) {
            item.progress = percent(loaded, total);
        }
        self.refresh_overall();
    }

    fn refresh_overall(&mut self) {
        if self.batch.is_empty() {
            self.overall_progress = 0;
            return;
        }
        let sum: u32 = self
            .batch
            .iter()
            .map(|id| match self.item(*id) {
                Some(item) if item.status == UploadStatus::Failure => 100,
                Some(item) => u32::from(item.progress),
                None => 100,
            })
            .sum();
        let count = u32::try_from(self.batch.len()).unwrap_or(u32::MAX);
        self.overall_progress = u8::try_from(sum / count).unwrap_or(100);
        if self.overall_progress >= 100 && self.is_idle() {
            self.batch.clear();
            self.overall_progress = 0;
        }
    }

    /// The upload of `id` finished; the next one starts.
    pub fn on_upload_reply(
        &mut self,
        id: u64,
        outcome: Result<Reply, TransportError>,
        dispatcher: &mut Dispatcher,
    ) -> Vec<Effect> {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
        let result = match outcome {
            Ok(reply) if reply.is_success() => match serde_json::from_str::<UploadResponse>(&reply.body) {
                Ok(response) if response.success => Ok(response.form),
                Ok(response) => Err(response
                    .error_message
                    .unwrap_or_else(|| fl!("upload-failed", reason = reply.reason))),
                Err(e) => Err(fl!("upload-failed", reason = e.to_string())),
            },
            Ok(reply) if reply.status == STATUS_PAYLOAD_TOO_LARGE => Err(fl!("image-too-large")),
            Ok(reply) => Err(fl!("request-failed", status = reply.status, reason = reply.reason)),
            Err(e) => Err(fl!("upload-failed", reason = e.to_string())),
        };

        let single_file = self.single_file;
        let mut reopen = false;
        if let Some(item) = self.item_mut(id) {
            match result {
                Ok(form) => {
                    item.status = UploadStatus::Success;
                    item.progress = 100;
                    item.form = form;
                    log::info!("uploaded {}", item.file.name);
                }
                Err(message) => {
                    log::warn!("upload of {} failed: {message}", item.file.name);
                    item.fail(message);
                    reopen = single_file;
                }
            }
        }
        if reopen {
            self.drop_zone_visible = true;
        }
        let effects = self.pump(dispatcher);
        self.refresh_overall();
        effects
    }

    fn form_action(&self, form: &Fragment) -> Option<(String, Vec<(String, String)>)> {
        let binding = form.bindings().forms.first()?;
        let action = binding
            .action
            .as_deref()
            .map_or_else(|| self.url.clone(), |action| resolve_url(&self.url, action));
        Some((action, binding.fields.clone()))
    }

    /// Save the metadata form of an uploaded item.
    pub fn finalize(
        &mut self,
        id: u64,
        overrides: Vec<(String, String)>,
        dispatcher: &mut Dispatcher,
    ) -> Vec<Effect> {
        let Some((action, mut fields)) = self.item_form(id).and_then(|form| self.form_action(&form)) else {
            log::warn!("item {id} has no form to submit");
            return Vec::new();
        };
        for (name, value) in overrides {
            match fields.iter_mut().find(|(key, _)| *key == name) {
                Some(field) => field.1 = value,
                None => fields.push((name, value)),
            }
        }
        let (_, effect) = dispatcher.send(Purpose::Finalize(id), Request::post_form(action, fields));
        vec![effect]
    }

    /// Saved items leave the list; a rejected form replaces the old one.
    pub fn on_finalize_reply(&mut self, id: u64, outcome: Result<Reply, TransportError>) {
        match parse_response(outcome) {
            Ok(response) if response.success => self.remove(id),
            Ok(response) => {
                if let Some(item) = self.item_mut(id) {
                    if response.form.is_some() {
                        item.form = response.form;
                    }
                    item.error = response.error_message;
                }
            }
            Err(message) => {
                if let Some(item) = self.item_mut(id) {
                    item.error = Some(message);
                }
            }
        }
    }

    /// Delete an uploaded item through its form's delete link.
    pub fn delete(&mut self, id: u64, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let Some(form) = self.item_form(id) else {
            return Vec::new();
        };
        let Some(link) = form.bindings().delete_links.first() else {
            log::warn!("item {id} has no delete link");
            return Vec::new();
        };
        let url = resolve_url(&self.url, link);
        let csrf: Vec<(String, String)> = form
            .bindings()
            .forms
            .iter()
            .flat_map(|f| f.fields.iter())
            .chain(self.fields.iter())
            .filter(|(key, _)| key == "csrfmiddlewaretoken")
            .take(1)
            .cloned()
            .collect();
        let (_, effect) = dispatcher.send(Purpose::Delete(id), Request::post_form(url, csrf));
        vec![effect]
    }

    pub fn on_delete_reply(&mut self, id: u64, outcome: Result<Reply, TransportError>) {
        match parse_response(outcome) {
            Ok(response) if response.success => self.remove(id),
            Ok(response) => {
                if let Some(item) = self.item_mut(id) {
                    item.error = response.error_message;
                }
            }
            Err(message) => {
                if let Some(item) = self.item_mut(id) {
                    item.error = Some(message);
                }
            }
        }
    }

    fn remove(&mut self, id: u64) {
        self.items.retain(|item| item.id != id);
        if self.single_file && self.items.is_empty() {
            self.drop_zone_visible = true;
        }
    }
}

fn parse_response(outcome: Result<Reply, TransportError>) -> Result<UploadResponse, String> {
    match outcome {
        Ok(reply) if reply.is_success() => {
            serde_json::from_str(&reply.body).map_err(|e| fl!("upload-failed", reason = e.to_string()))
        }
        Ok(reply) => Err(fl!("request-failed", status = reply.status, reason = reply.reason)),
        Err(e) => Err(fl!("upload-failed", reason = e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Body;

    const EDIT_FORM: &str = r#"<form action="/admin/images/multiple/7/" method="POST">
        <input type="hidden" name="csrfmiddlewaretoken" value="tok">
        <input type="text" name="image-7-title" value="cat">
        <a class="delete" href="/admin/images/multiple/7/delete/">Delete</a>
    </form>"#;

    fn file(name: &str, size: u64) -> FileInfo {
        FileInfo {
            path: name.into(),
            name: name.to_string(),
            size,
        }
    }

    fn widget(single_file: bool) -> UploadWidget {
        UploadWidget::new(
            "http://cms/admin/images/multiple/add/",
            FileConstraints {
                accepted_extensions: vec!["jpg".to_string()],
                max_size: Some(1000),
            },
            single_file,
        )
    }

    fn uploads(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send {
                    request: Request { body: Body::Multipart { file, .. }, .. },
                    ..
                } => Some(file.name.clone()),
                _ => None,
            })
            .collect()
    }

    fn success(form: &str) -> Result<Reply, TransportError> {
        Ok(Reply::ok(serde_json::json!({"success": true, "form": form}).to_string()))
    }

    #[test]
    fn uploads_run_one_at_a_time_in_order() {
        let mut dispatcher = Dispatcher::default();
        let mut widget = widget(false);
        let effects = widget.add_files(vec![file("a.jpg", 10), file("b.jpg", 10), file("c.jpg", 10)], &mut dispatcher);
        assert_eq!(uploads(&effects), vec!["a.jpg"]);
        assert_eq!(widget.in_flight, Some(1));

        let effects = widget.on_upload_reply(1, success(EDIT_FORM), &mut dispatcher);
        assert_eq!(uploads(&effects), vec!["b.jpg"]);
        let effects = widget.on_upload_reply(2, Ok(Reply::error(413, "Payload Too Large", "")), &mut dispatcher);
        assert_eq!(uploads(&effects), vec!["c.jpg"]);
        let effects = widget.on_upload_reply(3, success(EDIT_FORM), &mut dispatcher);
        assert!(effects.is_empty());
        assert!(widget.is_idle());

        let statuses: Vec<UploadStatus> = widget.items.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![UploadStatus::Success, UploadStatus::Failure, UploadStatus::Success]
        );
        assert_eq!(
            widget.item(2).unwrap().error.as_deref(),
            Some("The image is too large, please upload a smaller file.")
        );
        assert_eq!(widget.overall_progress, 0);
    }

    #[test]
    fn invalid_files_are_never_sent() {
        let mut dispatcher = Dispatcher::default();
        let mut widget = widget(false);
        let effects = widget.add_files(vec![file("a.gif", 10), file("b.jpg", 5000)], &mut dispatcher);
        assert!(effects.is_empty());
        assert!(widget.items.iter().all(|i| i.status == UploadStatus::Failure));
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn overall_progress_tracks_batch() {
        let mut dispatcher = Dispatcher::default();
        let mut widget = widget(false);
        widget.add_files(vec![file("a.jpg", 100), file("b.jpg", 100)], &mut dispatcher);
        widget.on_progress(1, 50, 100);
        assert_eq!(widget.item(1).unwrap().progress, 50);
        assert_eq!(widget.overall_progress, 25);
    }

    #[test]
    fn single_file_mode_hides_drop_zone_until_failure() {
        let mut dispatcher = Dispatcher::default();
        let mut widget = widget(true);
        let effects = widget.add_files(vec![file("a.jpg", 10), file("b.jpg", 10)], &mut dispatcher);
        assert_eq!(uploads(&effects), vec!["a.jpg"]);
        assert_eq!(widget.items.len(), 1);
        assert!(!widget.drop_zone_visible);
        assert!(widget.add_files(vec![file("c.jpg", 10)], &mut dispatcher).is_empty());

        widget.on_upload_reply(1, Err(TransportError::Timeout), &mut dispatcher);
        assert!(widget.drop_zone_visible);
        let effects = widget.add_files(vec![file("d.jpg", 10)], &mut dispatcher);
        assert_eq!(uploads(&effects), vec!["d.jpg"]);
        assert_eq!(widget.items.len(), 1);
    }

    #[test]
    fn finalize_and_delete_use_item_form() {
        let mut dispatcher = Dispatcher::default();
        let mut widget = widget(false);
        widget.add_files(vec![file("a.jpg", 10), file("b.jpg", 10)], &mut dispatcher);
        widget.on_upload_reply(1, success(EDIT_FORM), &mut dispatcher);
        widget.on_upload_reply(2, success(EDIT_FORM), &mut dispatcher);

        let effects = widget.finalize(1, vec![("image-7-title".to_string(), "Kitten".to_string())], &mut dispatcher);
        let Effect::Send { request, .. } = &effects[0] else {
            panic!("expected a request")
        };
        assert_eq!(request.url, "http://cms/admin/images/multiple/7/");
        assert_eq!(
            request.body,
            Body::Form(vec![
                ("csrfmiddlewaretoken".to_string(), "tok".to_string()),
                ("image-7-title".to_string(), "Kitten".to_string()),
            ])
        );

        widget.on_finalize_reply(
            1,
            Ok(Reply::ok(
                serde_json::json!({"success": false, "form": "<form><input name=\"t\"></form>"}).to_string(),
            )),
        );
        assert!(widget.item(1).unwrap().form.as_deref().unwrap().contains("name=\"t\""));
        widget.on_finalize_reply(1, Ok(Reply::ok(r#"{"success": true}"#)));
        assert!(widget.item(1).is_none());

        let effects = widget.delete(2, &mut dispatcher);
        let Effect::Send { request, .. } = &effects[0] else {
            panic!("expected a request")
        };
        assert_eq!(request.url, "http://cms/admin/images/multiple/7/delete/");
        widget.on_delete_reply(2, Ok(Reply::ok(r#"{"success": true}"#)));
        assert!(widget.items.is_empty());
    }
}
