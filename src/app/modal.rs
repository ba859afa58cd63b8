// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/modal.rs
//
// Chooser modal controller: step lookup, search, drill-down and the final
// response to the opener.

use std::time::Duration;

use serde::Deserialize;

use super::effect::{Dispatcher, Effect, HostEvent, Purpose};
use super::fragment::{Fragment, resolve_url};
use crate::constant::STATUS_PAYLOAD_TOO_LARGE;
use crate::domain::choice::{Choice, DocumentChoice, ImageChoice, LinkChoice, ModalKind};
use crate::domain::crop::CropSynchronizer;
use crate::domain::search::SearchQuery;
use crate::domain::upload::{FileInfo, file_name_from_widget, human_readable_title};
use crate::fl;
use crate::net::{Reply, Request, RequestId, TransportError};

/// JSON envelope every modal view answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ModalResponse {
    #[serde(default)]
    pub html: Option<String>,
    pub step: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    #[error("malformed modal response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{kind} chooser has no step `{step}`")]
    UnknownStep { kind: ModalKind, step: String },
    #[error("step `{0}` came without markup")]
    MissingHtml(String),
    #[error("step `{0}` came without a result")]
    MissingResult(String),
}

/// The steps a modal can be in, as announced by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalStep {
    Chooser(String),
    SelectFormat(String),
    SelectRendition(String),
    Chosen(Choice),
}

impl ModalStep {
    /// Map a server step name onto the steps `kind` supports.
    pub fn lookup(kind: ModalKind, response: ModalResponse) -> Result<Self, ModalError> {
        let ModalResponse { html, step, result } = response;
        let html_for = |step: &str, html: Option<String>| html.ok_or_else(|| ModalError::MissingHtml(step.to_string()));
        let result_for = |step: &str, result: Option<serde_json::Value>| {
            result.ok_or_else(|| ModalError::MissingResult(step.to_string()))
        };

        match (kind, step.as_str()) {
            (_, "chooser") => Ok(Self::Chooser(html_for(&step, html)?)),
            (ModalKind::Image, "select_format") => Ok(Self::SelectFormat(html_for(&step, html)?)),
            (ModalKind::Image, "select_rendition") => {
                Ok(Self::SelectRendition(html_for(&step, html)?))
            }
            (ModalKind::Image, "image_chosen") => {
                let choice: ImageChoice = serde_json::from_value(result_for(&step, result)?)?;
                Ok(Self::Chosen(Choice::Image(choice)))
            }
            (ModalKind::Document, "document_chosen") => {
                let choice: DocumentChoice = serde_json::from_value(result_for(&step, result)?)?;
                Ok(Self::Chosen(Choice::Document(choice)))
            }
            (ModalKind::Link, "external_link_chosen") => {
                let choice: LinkChoice = serde_json::from_value(result_for(&step, result)?)?;
                Ok(Self::Chosen(Choice::Link(choice)))
            }
            _ => Err(ModalError::UnknownStep {
                kind,
                step: step.clone(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Chooser(_) => "chooser",
            Self::SelectFormat(_) => "select_format",
            Self::SelectRendition(_) => "select_rendition",
            Self::Chosen(Choice::Image(_)) => "image_chosen",
            Self::Chosen(Choice::Document(_)) => "document_chosen",
            Self::Chosen(Choice::Link(_)) => "external_link_chosen",
        }
    }
}

/// Search state of the `chooser` step.
#[derive(Debug, Clone, Default)]
pub struct ChooserState {
    pub query: SearchQuery,
    /// Content of the results container.
    pub results: Fragment,
    /// Bumped on each keystroke; only the newest debounce timer searches.
    pub generation: u64,
    pub in_flight: Option<RequestId>,
    /// Error shown on the upload form's file field.
    pub upload_error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum StepState {
    Loading,
    Chooser(ChooserState),
    SelectFormat,
    SelectRendition(Box<CropSynchronizer>),
    Closed,
}

/// One open chooser modal.
#[derive(Debug, Clone)]
pub struct ModalSession {
    pub kind: ModalKind,
    /// URL the current body was loaded from; relative links resolve here.
    pub url: String,
    pub body: Fragment,
    pub state: StepState,
    pub debounce: Duration,
    /// Request that will replace the body (navigation, form or upload).
    loading: Option<RequestId>,
}

impl ModalSession {
    /// Open a modal on `url`.
    pub fn open(
        kind: ModalKind,
        url: impl Into<String>,
        debounce: Duration,
        dispatcher: &mut Dispatcher,
    ) -> (Self, Vec<Effect>) {
        let mut session = Self {
            kind,
            url: url.into(),
            body: Fragment::default(),
            state: StepState::Loading,
            debounce,
            loading: None,
        };
        let url = session.url.clone();
        let effects = session.load_url(&url, dispatcher);
        (session, effects)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, StepState::Closed)
    }

    /// Replace the body with whatever `href` renders.
    pub fn load_url(&mut self, href: &str, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        if self.is_closed() {
            return Vec::new();
        }
        self.url = resolve_url(&self.url, href);
        let request = Request::get(self.url.clone(), Vec::new());
        self.begin_load(Purpose::ModalLoad, request, dispatcher)
    }

    /// Send a request whose reply replaces the body; an older one is dropped.
    fn begin_load(&mut self, purpose: Purpose, request: Request, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(stale) = self.loading.take() {
            effects.push(dispatcher.cancel(stale));
        }
        let (id, effect) = dispatcher.send(purpose, request);
        self.loading = Some(id);
        effects.push(effect);
        effects
    }

    /// A `ModalLoad` request finished.
    pub fn on_loaded(&mut self, outcome: Result<Reply, TransportError>) -> Vec<Effect> {
        self.loading = None;
        if self.is_closed() {
            return Vec::new();
        }
        let reply = match outcome {
            Ok(reply) if reply.is_success() => reply,
            Ok(reply) => {
                log::warn!("modal load failed: {} {}", reply.status, reply.reason);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("modal load failed: {e}");
                return Vec::new();
            }
        };
        let step = serde_json::from_str::<ModalResponse>(&reply.body)
            .map_err(ModalError::from)
            .and_then(|response| ModalStep::lookup(self.kind, response));
        match step {
            Ok(step) => self.enter(step),
            Err(e) => {
                log::warn!("ignoring modal response: {e}");
                Vec::new()
            }
        }
    }

    /// Run the handler for `step`.
    pub fn enter(&mut self, step: ModalStep) -> Vec<Effect> {
        let name = step.name().to_string();
        match step {
            ModalStep::Chooser(html) => {
                self.body = Fragment::new(html);
                let collection = self
                    .body
                    .bindings()
                    .forms
                    .iter()
                    .find_map(|form| form.field("collection_id"))
                    .map(String::from);
                let mut query = SearchQuery::default();
                query.set_collection(collection);
                self.state = StepState::Chooser(ChooserState {
                    query,
                    results: self.body.clone(),
                    ..ChooserState::default()
                });
            }
            ModalStep::SelectFormat(html) => {
                self.body = Fragment::new(html);
                self.state = StepState::SelectFormat;
            }
            ModalStep::SelectRendition(html) => {
                self.body = Fragment::new(html);
                let crop = CropSynchronizer::new(self.body.bindings().crop_initial());
                self.state = StepState::SelectRendition(Box::new(crop));
            }
            ModalStep::Chosen(choice) => return self.respond(choice),
        }
        vec![Effect::Emit(HostEvent::ModalStep(name))]
    }

    /// Hand `choice` to the opener and close. Only the first call counts.
    pub fn respond(&mut self, choice: Choice) -> Vec<Effect> {
        if self.is_closed() {
            return Vec::new();
        }
        self.state = StepState::Closed;
        vec![
            Effect::Emit(HostEvent::Chosen(choice)),
            Effect::Emit(HostEvent::ModalClosed),
        ]
    }

    /// Close without a result, dropping any running search.
    pub fn close(&mut self, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        if self.is_closed() {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(id) = self.loading.take() {
            effects.push(dispatcher.cancel(id));
        }
        if let StepState::Chooser(chooser) = &mut self.state
            && let Some(id) = chooser.in_flight.take()
        {
            effects.push(dispatcher.cancel(id));
        }
        self.state = StepState::Closed;
        effects.push(Effect::Emit(HostEvent::ModalClosed));
        effects
    }

    pub fn chooser(&self) -> Option<&ChooserState> {
        match &self.state {
            StepState::Chooser(chooser) => Some(chooser),
            _ => None,
        }
    }

    pub fn crop(&self) -> Option<&CropSynchronizer> {
        match &self.state {
            StepState::SelectRendition(crop) => Some(&**crop),
            _ => None,
        }
    }

    pub fn crop_mut(&mut self) -> Option<&mut CropSynchronizer> {
        match &mut self.state {
            StepState::SelectRendition(crop) => Some(&mut **crop),
            _ => None,
        }
    }

    fn search_url(&self) -> String {
        match &self.body.bindings().search_action {
            Some(action) => resolve_url(&self.url, action),
            None => self.url.clone(),
        }
    }

    /// Text typed into the search box: (re)start the debounce timer and
    /// abort the running search.
    pub fn search_input(&mut self, text: &str, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let delay = self.debounce;
        let StepState::Chooser(chooser) = &mut self.state else {
            return Vec::new();
        };
        chooser.query.text = text.to_string();
        chooser.generation += 1;
        let mut effects = Vec::new();
        if let Some(id) = chooser.in_flight.take() {
            effects.push(dispatcher.cancel(id));
        }
        effects.push(Effect::Debounce {
            generation: chooser.generation,
            delay,
        });
        effects
    }

    /// A debounce timer fired; only the newest one searches.
    pub fn debounce_elapsed(&mut self, generation: u64, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let current = matches!(&self.state, StepState::Chooser(c) if c.generation == generation);
        if current {
            self.search(dispatcher)
        } else {
            Vec::new()
        }
    }

    pub fn search(&mut self, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let StepState::Chooser(chooser) = &mut self.state else {
            return Vec::new();
        };
        let params = chooser.query.search();
        self.fetch_results(params, dispatcher)
    }

    pub fn collection_changed(&mut self, collection: Option<String>, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let StepState::Chooser(chooser) = &mut self.state else {
            return Vec::new();
        };
        chooser.query.set_collection(collection);
        self.search(dispatcher)
    }

    pub fn choose_tag(&mut self, tag: &str, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let StepState::Chooser(chooser) = &mut self.state else {
            return Vec::new();
        };
        let params = chooser.query.choose_tag(tag);
        self.fetch_results(params, dispatcher)
    }

    /// Follow a pagination link present in the current results.
    pub fn set_page(&mut self, page: u32, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let StepState::Chooser(chooser) = &mut self.state else {
            return Vec::new();
        };
        if !chooser.results.bindings().pages.contains(&page) {
            log::debug!("page {page} is not linked from the current results");
            return Vec::new();
        }
        let params = chooser.query.set_page(page);
        self.fetch_results(params, dispatcher)
    }

    /// Drill down into a result link present in the current results.
    pub fn click_result(&mut self, href: &str, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let Some(chooser) = self.chooser() else {
            return Vec::new();
        };
        if !chooser.results.bindings().result_links.iter().any(|link| link == href) {
            log::debug!("{href} is not a result link");
            return Vec::new();
        }
        self.load_url(href, dispatcher)
    }

    fn fetch_results(&mut self, params: Vec<(String, String)>, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let url = self.search_url();
        let StepState::Chooser(chooser) = &mut self.state else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if let Some(stale) = chooser.in_flight.take() {
            effects.push(dispatcher.cancel(stale));
        }
        let (id, effect) = dispatcher.send(Purpose::Search, Request::get(url, params));
        chooser.in_flight = Some(id);
        effects.push(effect);
        effects
    }

    /// A search reply arrived. Stale replies and failures leave the
    /// results alone.
    pub fn on_search_reply(&mut self, id: RequestId, outcome: Result<Reply, TransportError>) -> Vec<Effect> {
        let StepState::Chooser(chooser) = &mut self.state else {
            return Vec::new();
        };
        if chooser.in_flight != Some(id) {
            log::debug!("dropping stale search reply {id}");
            return Vec::new();
        }
        chooser.in_flight = None;
        match outcome {
            Ok(reply) if reply.is_success() => chooser.results = Fragment::new(reply.body),
            Ok(reply) => log::debug!("search failed: {} {}", reply.status, reply.reason),
            Err(e) => log::debug!("search failed: {e}"),
        }
        Vec::new()
    }

    /// Submit the rendition form with the cropper's fields.
    pub fn submit_crop(&mut self, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let Some(crop) = self.crop() else {
            return Vec::new();
        };
        let crop_fields = crop.form_fields();
        self.submit_form(crop_fields, dispatcher)
    }

    /// POST the body's form, with `overrides` replacing rendered values.
    pub fn submit_form(&mut self, overrides: Vec<(String, String)>, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        if self.is_closed() {
            return Vec::new();
        }
        let Some(mut form) = self.body.bindings().forms.first().cloned() else {
            log::warn!("no form to submit in the current step");
            return Vec::new();
        };
        for (name, value) in overrides {
            form.set_field(&name, value);
        }
        let action = form
            .action
            .as_deref()
            .map_or_else(|| self.url.clone(), |action| resolve_url(&self.url, action));
        self.begin_load(Purpose::ModalLoad, Request::post_form(action, form.fields), dispatcher)
    }

    /// Upload a file through the chooser's own upload form. An empty title
    /// is filled in from the file name.
    pub fn upload(&mut self, file: FileInfo, overrides: Vec<(String, String)>, dispatcher: &mut Dispatcher) -> Vec<Effect> {
        let bindings = self.body.bindings();
        let Some(mut form) = ["image-select", "doc-select", "image-upload", "document-upload"]
            .into_iter()
            .find_map(|class| bindings.form_with_class(class))
            .cloned()
        else {
            log::warn!("chooser has no upload form");
            return Vec::new();
        };
        for (name, value) in overrides {
            form.set_field(&name, value);
        }
        let title = human_readable_title(file_name_from_widget(&file.name));
        for field in form.fields.iter_mut() {
            if field.0.ends_with("title") && field.1.is_empty() {
                field.1 = title.clone();
            }
        }
        let file_field = form.file_fields.first().cloned().unwrap_or_else(|| "file".to_string());
        let action = form
            .action
            .as_deref()
            .map_or_else(|| self.url.clone(), |action| resolve_url(&self.url, action));
        if let StepState::Chooser(chooser) = &mut self.state {
            chooser.upload_error = None;
        }
        let request = Request::post_file(action, file_field, file, form.fields);
        self.begin_load(Purpose::ChooserUpload, request, dispatcher)
    }

    /// The chooser upload finished: success continues like a navigation,
    /// failures are written next to the file field.
    pub fn on_upload_reply(&mut self, outcome: Result<Reply, TransportError>) -> Vec<Effect> {
        self.loading = None;
        if matches!(&outcome, Ok(reply) if reply.is_success()) {
            return self.on_loaded(outcome);
        }
        let message = match &outcome {
            Ok(reply) if reply.status == STATUS_PAYLOAD_TOO_LARGE => match self.kind {
                ModalKind::Document => fl!("document-too-large"),
                _ => fl!("image-too-large"),
            },
            Ok(reply) => fl!("request-failed", status = reply.status, reason = reply.reason.clone()),
            Err(e) => fl!("upload-failed", reason = e.to_string()),
        };
        if let StepState::Chooser(chooser) = &mut self.state {
            chooser.upload_error = Some(message);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Body;

    const CHOOSER_HTML: &str = r##"
        <form class="image-search" action="/admin/images/chooser/"><input name="q" value=""></form>
        <div id="image-results"><ul class="listing"><li><a href="/admin/images/chooser/1/">One</a></li></ul>
        <ul class="pagination"><li><a href="#" data-page="2">2</a></li></ul></div>
        <form class="image-upload" action="/admin/images/chooser/upload/" method="POST" enctype="multipart/form-data">
            <input type="text" name="image-chooser-upload-title" value="">
            <input type="file" name="image-chooser-upload-file">
        </form>"##;

    fn chooser_response() -> String {
        serde_json::json!({"html": CHOOSER_HTML, "step": "chooser"}).to_string()
    }

    fn open_chooser(dispatcher: &mut Dispatcher) -> ModalSession {
        let (mut session, effects) = ModalSession::open(
            ModalKind::Image,
            "http://cms/admin/images/chooser/",
            Duration::from_millis(200),
            dispatcher,
        );
        assert_eq!(effects.len(), 1);
        let Effect::Send { id, .. } = effects[0] else {
            panic!("expected a request")
        };
        assert_eq!(dispatcher.complete(id), Some(Purpose::ModalLoad));
        session.on_loaded(Ok(Reply::ok(chooser_response())));
        session
    }

    fn sent_requests(effects: &[Effect]) -> Vec<(RequestId, Request)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send { id, request, .. } => Some((*id, request.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn lookup_rejects_steps_of_other_kinds() {
        let response = ModalResponse {
            html: None,
            step: "document_chosen".to_string(),
            result: Some(serde_json::json!({"id": 1, "title": "x"})),
        };
        assert!(matches!(
            ModalStep::lookup(ModalKind::Image, response.clone()),
            Err(ModalError::UnknownStep { .. })
        ));
        assert!(matches!(
            ModalStep::lookup(ModalKind::Document, response),
            Ok(ModalStep::Chosen(Choice::Document(_)))
        ));
    }

    #[test]
    fn lookup_requires_markup_for_views() {
        let response = ModalResponse {
            html: None,
            step: "chooser".to_string(),
            result: None,
        };
        assert!(matches!(
            ModalStep::lookup(ModalKind::Image, response),
            Err(ModalError::MissingHtml(_))
        ));
    }

    #[test]
    fn keystrokes_debounce_into_one_search_with_final_text() {
        let mut dispatcher = Dispatcher::default();
        let mut session = open_chooser(&mut dispatcher);

        let mut timers = Vec::new();
        for text in ["c", "ca", "cat"] {
            for effect in session.search_input(text, &mut dispatcher) {
                if let Effect::Debounce { generation, delay } = effect {
                    assert_eq!(delay, Duration::from_millis(200));
                    timers.push(generation);
                }
            }
        }
        let mut requests = Vec::new();
        for generation in timers {
            requests.extend(sent_requests(&session.debounce_elapsed(generation, &mut dispatcher)));
        }
        assert_eq!(requests.len(), 1);
        let request = &requests[0].1;
        assert_eq!(request.url, "http://cms/admin/images/chooser/");
        assert_eq!(request.query_value("q"), Some("cat"));
    }

    #[test]
    fn new_input_cancels_running_search_and_stale_reply_is_ignored() {
        let mut dispatcher = Dispatcher::default();
        let mut session = open_chooser(&mut dispatcher);

        let effects = session.search(&mut dispatcher);
        let (first, _) = sent_requests(&effects)[0].clone();
        let effects = session.search_input("dog", &mut dispatcher);
        assert!(effects.contains(&Effect::Cancel(first)));

        session.on_search_reply(first, Ok(Reply::ok(r#"<ul class="listing"><li><a href="/stale/">S</a></li></ul>"#)));
        let chooser = session.chooser().unwrap();
        assert_eq!(chooser.results.bindings().result_links, vec!["/admin/images/chooser/1/"]);
    }

    #[test]
    fn results_are_replaced_and_rebound() {
        let mut dispatcher = Dispatcher::default();
        let mut session = open_chooser(&mut dispatcher);
        let effects = session.set_page(2, &mut dispatcher);
        let (id, request) = sent_requests(&effects)[0].clone();
        assert_eq!(request.query_value("p"), Some("2"));

        session.on_search_reply(
            id,
            Ok(Reply::ok(
                r#"<ul class="listing"><li><a href="/admin/images/chooser/9/">Nine</a></li></ul>
                   <ul class="pagination"><li><a data-page="1">1</a></li></ul>"#,
            )),
        );
        let links = session.chooser().unwrap().results.bindings().result_links.clone();
        assert_eq!(links, vec!["/admin/images/chooser/9/"]);
        assert!(session.click_result("/admin/images/chooser/1/", &mut dispatcher).is_empty());
        let effects = session.click_result("/admin/images/chooser/9/", &mut dispatcher);
        assert_eq!(sent_requests(&effects)[0].1.url, "http://cms/admin/images/chooser/9/");
    }

    #[test]
    fn failed_search_keeps_results() {
        let mut dispatcher = Dispatcher::default();
        let mut session = open_chooser(&mut dispatcher);
        let effects = session.search(&mut dispatcher);
        let (id, _) = sent_requests(&effects)[0].clone();
        session.on_search_reply(id, Ok(Reply::error(500, "Internal Server Error", "boom")));
        let chooser = session.chooser().unwrap();
        assert_eq!(chooser.results.bindings().result_links.len(), 1);
        assert_eq!(chooser.in_flight, None);
    }

    #[test]
    fn chosen_responds_exactly_once() {
        let mut dispatcher = Dispatcher::default();
        let mut session = open_chooser(&mut dispatcher);
        let chosen = serde_json::json!({
            "step": "image_chosen",
            "result": {"id": 7, "title": "Cat", "preview": {"url": "/m/c.jpg", "width": 165, "height": 100}}
        })
        .to_string();
        let effects = session.on_loaded(Ok(Reply::ok(chosen.clone())));
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[0], Effect::Emit(HostEvent::Chosen(Choice::Image(c))) if c.id == 7));
        assert_eq!(effects[1], Effect::Emit(HostEvent::ModalClosed));
        assert!(session.on_loaded(Ok(Reply::ok(chosen))).is_empty());
        assert!(session.close(&mut dispatcher).is_empty());
        assert!(session.search_input("x", &mut dispatcher).is_empty());
    }

    #[test]
    fn rendition_step_builds_cropper_and_submits_fields() {
        let mut dispatcher = Dispatcher::default();
        let mut session = open_chooser(&mut dispatcher);
        let html = r#"<div class="crop-image"><img width="1920" height="1080"></div>
            <form action="/admin/images/chooser/7/select_rendition/" method="POST">
              <input type="hidden" name="csrfmiddlewaretoken" value="tok">
              <input type="hidden" name="left"><input type="hidden" name="top">
              <input type="hidden" name="right"><input type="hidden" name="bottom">
              <input type="hidden" name="force_selection" value="False">
              <input name="width"><input name="height">
              <input type="radio" name="aspect-ratio" value="16:9" checked>
            </form>"#;
        session.on_loaded(Ok(Reply::ok(
            serde_json::json!({"html": html, "step": "select_rendition"}).to_string(),
        )));
        let crop = session.crop_mut().unwrap();
        assert_eq!(crop.size.width, 1920);
        crop.on_width_input("1920");
        assert_eq!(crop.height, Some(1080));

        let effects = session.submit_crop(&mut dispatcher);
        let (_, request) = sent_requests(&effects)[0].clone();
        assert_eq!(request.url, "http://cms/admin/images/chooser/7/select_rendition/");
        let Body::Form(fields) = request.body else {
            panic!("expected a form body")
        };
        let get = |name: &str| fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());
        assert_eq!(get("csrfmiddlewaretoken"), Some("tok"));
        assert_eq!(get("width"), Some("1920"));
        assert_eq!(get("height"), Some("1080"));
        assert_eq!(get("left"), Some(""));
        assert_eq!(get("aspect-ratio"), Some("16:9"));
    }

    #[test]
    fn upload_prefills_title_and_maps_413() {
        let mut dispatcher = Dispatcher::default();
        let mut session = open_chooser(&mut dispatcher);
        let file = FileInfo {
            path: "/tmp/my_cat-photo.jpg".into(),
            name: "my_cat-photo.jpg".to_string(),
            size: 10,
        };
        let effects = session.upload(file, Vec::new(), &mut dispatcher);
        let (_, request) = sent_requests(&effects)[0].clone();
        let Body::Multipart { fields, file_field, .. } = request.body else {
            panic!("expected multipart")
        };
        assert_eq!(file_field, "image-chooser-upload-file");
        assert_eq!(fields[0].1, "my cat photo");

        session.on_upload_reply(Ok(Reply::error(413, "Payload Too Large", "")));
        assert_eq!(
            session.chooser().unwrap().upload_error.as_deref(),
            Some("The image is too large, please upload a smaller file.")
        );
    }
}
