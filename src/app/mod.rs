// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/mod.rs
//
// Widget state machines driven by messages.

pub mod chooser_field;
pub mod effect;
pub mod fragment;
pub mod message;
pub mod modal;
pub mod model;
pub mod preview;
pub mod update;
pub mod uploader;

pub use effect::{Effect, HostEvent};
pub use message::AppMessage;
pub use model::AppModel;
pub use update::update;
