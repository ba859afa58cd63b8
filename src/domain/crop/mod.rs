// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/mod.rs
//
// Crop module: rectangle geometry, aspect ratios, selection tool and the
// form synchronizer.
// Selection handling inspired by cosmic-viewer (https://codeberg.org/bhh by Bryan Hyland

mod ratio;
mod rect;
mod selection;
mod sync;

pub use rect::{CropRect, ImageSize, SelectionRect, parse_leading_int};
pub use selection::DragHandle;
pub use sync::{CropInitial, CropSynchronizer};
