// SPDX-License-Identifier: GPL-3.0-or-later
// src/runtime.rs
//
// Event loop: feeds messages through `update` and carries out the effects
// it returns on tokio.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;

use crate::app::{AppMessage, AppModel, Effect, HostEvent, update};
use crate::net::{ProgressSink, RequestId, Transport};

pub struct Runtime<T: Transport> {
    transport: Arc<T>,
    sender: UnboundedSender<AppMessage>,
    receiver: UnboundedReceiver<AppMessage>,
    /// Running requests.
    tasks: HashMap<RequestId, AbortHandle>,
    /// The one live debounce timer and its generation.
    timer: Option<(u64, AbortHandle)>,
    events: Vec<HostEvent>,
}

impl<T: Transport> Runtime<T> {
    pub fn new(transport: T) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            transport: Arc::new(transport),
            sender,
            receiver,
            tasks: HashMap::new(),
            timer: None,
            events: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.timer.is_none()
    }

    /// Handle one message and start whatever it asks for.
    pub fn dispatch(&mut self, model: &mut AppModel, message: AppMessage) {
        match &message {
            AppMessage::Completed { id, .. } => {
                self.tasks.remove(id);
            }
            AppMessage::DebounceElapsed(generation) => {
                if self.timer.as_ref().is_some_and(|(live, _)| live == generation) {
                    self.timer = None;
                }
            }
            _ => {}
        }
        let effects = update(model, message);
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Send {
                id,
                request,
                track_progress,
            } => {
                let transport = Arc::clone(&self.transport);
                let sender = self.sender.clone();
                let progress: Option<ProgressSink> = track_progress.then(|| {
                    let sender = sender.clone();
                    let sink: ProgressSink = Arc::new(move |loaded, total| {
                        let _ = sender.send(AppMessage::UploadProgress { id, loaded, total });
                    });
                    sink
                });
                let handle = tokio::spawn(async move {
                    let outcome = transport.send(request, progress).await;
                    let _ = sender.send(AppMessage::Completed { id, outcome });
                });
                self.tasks.insert(id, handle.abort_handle());
            }
            Effect::Cancel(id) => {
                if let Some(handle) = self.tasks.remove(&id) {
                    log::debug!("aborting request {id}");
                    handle.abort();
                }
            }
            Effect::Debounce { generation, delay } => {
                if let Some((_, previous)) = self.timer.take() {
                    previous.abort();
                }
                let sender = self.sender.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = sender.send(AppMessage::DebounceElapsed(generation));
                });
                self.timer = Some((generation, handle.abort_handle()));
            }
            Effect::Emit(event) => {
                log::debug!("host event: {event:?}");
                self.events.push(event);
            }
        }
    }

    /// Process messages until no request or timer is outstanding, then
    /// return the host events raised meanwhile.
    pub async fn run_until_idle(&mut self, model: &mut AppModel) -> Vec<HostEvent> {
        while !self.is_idle() {
            let Some(message) = self.receiver.recv().await else {
                break;
            };
            self.dispatch(model, message);
        }
        while let Ok(message) = self.receiver.try_recv() {
            self.dispatch(model, message);
        }
        if model.dispatcher.pending() > 0 {
            log::debug!("{} replies still expected", model.dispatcher.pending());
        }
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::choice::ModalKind;
    use crate::domain::upload::{FileInfo, UploadStatus};
    use crate::net::mock::MockTransport;
    use crate::net::{Body, Reply};

    const CHOOSER: &str = r#"<form class="image-search" action="/admin/images/chooser/"><input name="q"></form>
        <ul class="listing"><li><a href="/admin/images/chooser/1/">One</a></li></ul>"#;

    fn config() -> AppConfig {
        AppConfig {
            base_url: "http://cms/admin".to_string(),
            image_search_debounce_ms: 30,
            ..AppConfig::default()
        }
    }

    fn chooser_site() -> MockTransport {
        MockTransport::new(|request| {
            if request.query_value("q").is_some() {
                Ok(Reply::ok(r#"<ul class="listing"><li><a href="/admin/images/chooser/9/">Cat</a></li></ul>"#))
            } else {
                Ok(Reply::ok(serde_json::json!({"html": CHOOSER, "step": "chooser"}).to_string()))
            }
        })
    }

    #[tokio::test]
    async fn typing_sends_one_search_with_final_text() {
        let mut model = AppModel::new(config());
        let mut runtime = Runtime::new(chooser_site());
        let url = model.config.chooser_url(ModalKind::Image);
        runtime.dispatch(&mut model, AppMessage::OpenModal { kind: ModalKind::Image, url });
        let events = runtime.run_until_idle(&mut model).await;
        assert_eq!(events, vec![HostEvent::ModalStep("chooser".to_string())]);

        for text in ["c", "ca", "cat"] {
            runtime.dispatch(&mut model, AppMessage::SearchInput(text.to_string()));
        }
        runtime.run_until_idle(&mut model).await;

        let searches: Vec<_> = runtime
            .transport
            .requests()
            .into_iter()
            .filter(|r| r.query_value("q").is_some())
            .collect();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].query_value("q"), Some("cat"));
        let modal = model.modal.as_ref().unwrap();
        assert_eq!(
            modal.chooser().unwrap().results.bindings().result_links,
            vec!["/admin/images/chooser/9/"]
        );
    }

    #[tokio::test]
    async fn uploads_never_overlap() {
        let mut model = AppModel::new(config());
        let transport = MockTransport::new(|request| {
            let Body::Multipart { file, .. } = &request.body else {
                return Ok(Reply::error(400, "Bad Request", ""));
            };
            let form = format!("<form action=\"/admin/images/multiple/{}/\"></form>", file.name);
            Ok(Reply::ok(serde_json::json!({"success": true, "form": form}).to_string()))
        })
        .with_delay(Duration::from_millis(10));
        let mut runtime = Runtime::new(transport);

        let files = ["a.jpg", "b.jpg", "c.jpg"]
            .into_iter()
            .map(|name| FileInfo {
                path: name.into(),
                name: name.to_string(),
                size: 100,
            })
            .collect();
        runtime.dispatch(&mut model, AppMessage::FilesAdded(files));
        runtime.run_until_idle(&mut model).await;

        assert_eq!(runtime.transport.max_in_flight.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(*runtime.transport.completed.lock().unwrap(), vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert!(
            model
                .uploader
                .items
                .iter()
                .all(|item| item.status == UploadStatus::Success && item.progress == 100)
        );
        assert_eq!(model.uploader.overall_progress, 0);
    }

    #[tokio::test]
    async fn closing_modal_aborts_its_load() {
        let mut model = AppModel::new(config());
        let mut runtime = Runtime::new(chooser_site().with_delay(Duration::from_millis(50)));
        let url = model.config.chooser_url(ModalKind::Image);
        runtime.dispatch(&mut model, AppMessage::OpenModal { kind: ModalKind::Image, url });
        runtime.dispatch(&mut model, AppMessage::CloseModal);
        assert!(runtime.is_idle());
        let events = runtime.run_until_idle(&mut model).await;
        assert_eq!(events, vec![HostEvent::ModalClosed]);
        assert!(!model.modal_is_open());
    }
}
