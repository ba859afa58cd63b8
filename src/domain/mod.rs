// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Pure domain models: no transport, no event loop.

pub mod choice;
pub mod crop;
pub mod filter_spec;
pub mod search;
pub mod upload;
