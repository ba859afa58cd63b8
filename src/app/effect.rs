// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/effect.rs
//
// Side effects requested by `update`, and the bookkeeping that routes
// replies back to whoever asked.

use std::collections::HashMap;
use std::time::Duration;

use crate::domain::choice::Choice;
use crate::net::{Request, RequestId};

/// Who a request belongs to; decides how its reply is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Navigate the modal (`loadUrl`, crop submit, form submit).
    ModalLoad,
    /// Chooser search or pagination; the body only replaces the results.
    Search,
    /// Upload form inside the chooser modal.
    ChooserUpload,
    /// Multiple-upload widget: upload of one item.
    Upload(u64),
    Finalize(u64),
    Delete(u64),
    Preview,
}

/// Something the page outside the widgets should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The modal responded to its opener.
    Chosen(Choice),
    ModalClosed,
    /// The modal body was replaced; carries the step name.
    ModalStep(String),
    PreviewOpened,
    /// Markup to show in the preview window.
    PreviewWrite(String),
    PreviewClosed,
    /// Markup replacing the editor page itself.
    DocumentReplaced(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send {
        id: RequestId,
        request: Request,
        track_progress: bool,
    },
    Cancel(RequestId),
    /// Fire `DebounceElapsed(generation)` after `delay`.
    Debounce {
        generation: u64,
        delay: Duration,
    },
    Emit(HostEvent),
}

/// Allocates request ids and remembers their purpose until they complete
/// or get cancelled.
#[derive(Debug, Default)]
pub struct Dispatcher {
    next_id: RequestId,
    pending: HashMap<RequestId, Purpose>,
}

impl Dispatcher {
    pub fn send(&mut self, purpose: Purpose, request: Request) -> (RequestId, Effect) {
        self.next_id += 1;
        let id = self.next_id;
        self.pending.insert(id, purpose);
        let track_progress = matches!(purpose, Purpose::Upload(_));
        (
            id,
            Effect::Send {
                id,
                request,
                track_progress,
            },
        )
    }

    pub fn cancel(&mut self, id: RequestId) -> Effect {
        self.pending.remove(&id);
        Effect::Cancel(id)
    }

    /// Purpose of a finished request; `None` for cancelled or unknown ids.
    pub fn complete(&mut self, id: RequestId) -> Option<Purpose> {
        self.pending.remove(&id)
    }

    pub fn purpose(&self, id: RequestId) -> Option<Purpose> {
        self.pending.get(&id).copied()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
