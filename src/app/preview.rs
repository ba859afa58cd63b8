// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/preview.rs
//
// "Preview" button: render the edit form server-side into a new window.

use super::effect::{Dispatcher, Effect, HostEvent, Purpose};
use crate::net::{Reply, Request, RequestId, TransportError};

#[derive(Debug, Default)]
pub struct PreviewState {
    pub window_open: bool,
    pub in_flight: Option<RequestId>,
}

impl PreviewState {
    /// Open the window and POST the form to the preview action.
    pub fn request(
        &mut self,
        action: impl Into<String>,
        fields: Vec<(String, String)>,
        dispatcher: &mut Dispatcher,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.window_open {
            self.window_open = true;
            effects.push(Effect::Emit(HostEvent::PreviewOpened));
        }
        if let Some(stale) = self.in_flight.take() {
            effects.push(dispatcher.cancel(stale));
        }
        let (id, effect) = dispatcher.send(Purpose::Preview, Request::post_form(action, fields));
        self.in_flight = Some(id);
        effects.push(effect);
        effects
    }

    /// A rendered page goes into the window. Anything else means the form
    /// did not validate: the window closes and the answer replaces the
    /// editor. Server errors are shown raw in the window.
    pub fn on_reply(&mut self, id: RequestId, outcome: Result<Reply, TransportError>) -> Vec<Effect> {
        if self.in_flight != Some(id) {
            return Vec::new();
        }
        self.in_flight = None;
        match outcome {
            Ok(reply) if reply.is_success() && reply.preview_ok => {
                vec![Effect::Emit(HostEvent::PreviewWrite(reply.body))]
            }
            Ok(reply) if reply.is_success() => {
                self.window_open = false;
                vec![
                    Effect::Emit(HostEvent::PreviewClosed),
                    Effect::Emit(HostEvent::DocumentReplaced(reply.body)),
                ]
            }
            Ok(reply) => {
                log::warn!("preview failed: {} {}", reply.status, reply.reason);
                vec![Effect::Emit(HostEvent::PreviewWrite(reply.body))]
            }
            Err(e) => {
                log::warn!("preview failed: {e}");
                vec![Effect::Emit(HostEvent::PreviewWrite(e.to_string()))]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(state: &mut PreviewState, dispatcher: &mut Dispatcher) -> RequestId {
        let effects = state.request("http://cms/admin/pages/3/edit/preview/", Vec::new(), dispatcher);
        assert_eq!(effects[0], Effect::Emit(HostEvent::PreviewOpened));
        match effects[1] {
            Effect::Send { id, .. } => id,
            _ => panic!("expected a request"),
        }
    }

    #[test]
    fn rendered_page_is_written_to_window() {
        let mut dispatcher = Dispatcher::default();
        let mut state = PreviewState::default();
        let id = start(&mut state, &mut dispatcher);
        let reply = Reply {
            preview_ok: true,
            ..Reply::ok("<html>page</html>")
        };
        assert_eq!(
            state.on_reply(id, Ok(reply)),
            vec![Effect::Emit(HostEvent::PreviewWrite("<html>page</html>".to_string()))]
        );
        assert!(state.window_open);
    }

    #[test]
    fn invalid_form_replaces_editor() {
        let mut dispatcher = Dispatcher::default();
        let mut state = PreviewState::default();
        let id = start(&mut state, &mut dispatcher);
        let effects = state.on_reply(id, Ok(Reply::ok("<form>errors</form>")));
        assert_eq!(
            effects,
            vec![
                Effect::Emit(HostEvent::PreviewClosed),
                Effect::Emit(HostEvent::DocumentReplaced("<form>errors</form>".to_string())),
            ]
        );
        assert!(!state.window_open);
    }

    #[test]
    fn server_error_is_shown_raw() {
        let mut dispatcher = Dispatcher::default();
        let mut state = PreviewState::default();
        let id = start(&mut state, &mut dispatcher);
        let effects = state.on_reply(id, Ok(Reply::error(500, "Internal Server Error", "Traceback")));
        assert_eq!(effects, vec![Effect::Emit(HostEvent::PreviewWrite("Traceback".to_string()))]);
    }
}
