// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/sync.rs
//
// Keeps the rendition form's coordinate and size fields consistent with the
// live crop selection and the locked aspect ratio.

use super::ratio::{self, AspectRatio};
use super::rect::{CropRect, ImageSize, SelectionRect, parse_leading_int};
use super::selection::{CropSelection, DragHandle};
use crate::constant;
use crate::fl;

/// Initial cropper state, either rendered into the form by the server or
/// derived from the cropper URL parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CropInitial {
    pub size: Option<ImageSize>,
    pub crop: Option<CropRect>,
    pub fit: Option<(u32, u32)>,
    pub ratios: Vec<String>,
    pub ratio_choice: Option<String>,
    pub force_selection: bool,
}

/// Rendition form state bound to a crop selection tool.
#[derive(Debug, Clone)]
pub struct CropSynchronizer {
    pub size: ImageSize,
    pub selection: CropSelection,
    /// The `left`/`top`/`right`/`bottom` fields; `None` means all blank.
    pub coords: Option<CropRect>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub ratios: Vec<String>,
    pub ratio_choice: String,
    pub ratio: Option<AspectRatio>,
    pub force_selection: bool,
}

impl CropSynchronizer {
    pub fn new(initial: CropInitial) -> Self {
        let size = initial.size.unwrap_or(ImageSize::new(0, 0));
        let ratios = if initial.ratios.is_empty() {
            constant::DEFAULT_RATIOS.iter().map(|r| (*r).to_string()).collect()
        } else {
            initial.ratios
        };
        let ratio_choice = initial
            .ratio_choice
            .unwrap_or_else(|| constant::FREE_RATIO.to_string());
        let ratio = AspectRatio::parse(&ratio_choice);

        let mut selection = CropSelection::new(size);
        selection.set_aspect_ratio(ratio.map(|r| r.value()));

        let mut sync = Self {
            size,
            selection,
            coords: None,
            width: initial.fit.map(|(w, _)| w).filter(|w| *w > 0),
            height: initial.fit.map(|(_, h)| h).filter(|h| *h > 0),
            ratios,
            ratio_choice,
            ratio,
            force_selection: initial.force_selection,
        };

        if let Some(crop) = initial.crop {
            sync.selection.set_select(crop.as_selection());
            if sync.selection.has_selection() {
                sync.coords = Some(sync.selection.tell_select().rounded());
            } else {
                log::debug!("discarding zero-area pre-selection {crop:?}");
                sync.selection.release();
            }
        }
        if sync.force_selection && !sync.selection.has_selection() {
            sync.selection.set_select(CropRect::full(size).as_selection());
            sync.coords = Some(CropRect::full(size));
        }
        sync
    }

    /// Replace the selection, as reported by the selection tool.
    pub fn select(&mut self, rect: SelectionRect) {
        if rect.is_empty() {
            self.selection.release();
        } else {
            self.selection.set_select(rect);
        }
        self.on_selection_change();
    }

    pub fn drag_start(&mut self, handle: DragHandle, x: f64, y: f64) {
        if handle == DragHandle::None {
            self.selection.start_new_selection(x, y);
        } else {
            self.selection.start_handle_drag(handle, x, y);
        }
        self.on_selection_change();
    }

    pub fn drag_move(&mut self, x: f64, y: f64) {
        self.selection.update_drag(x, y);
        self.on_selection_change();
    }

    pub fn drag_end(&mut self) {
        self.selection.end_drag();
        self.on_selection_change();
    }

    /// Copy the live selection into the coordinate fields.
    ///
    /// A zero-width or zero-height selection clears all four fields.
    pub fn on_selection_change(&mut self) {
        let rect = self.selection.tell_select();
        if rect.is_empty() {
            self.coords = None;
        } else {
            self.coords = Some(rect.rounded());
            self.rederive_height();
        }
    }

    /// Re-read the selection (the "crop" button).
    pub fn apply(&mut self) {
        self.on_selection_change();
    }

    /// Clear the coordinate fields without touching the selection (the
    /// "skip" button).
    pub fn skip(&mut self) {
        self.coords = None;
    }

    /// Drop the selection. Under forced selection it snaps back to the full
    /// image instead.
    pub fn release(&mut self) {
        if self.force_selection {
            let full = CropRect::full(self.size);
            self.selection.set_select(full.as_selection());
            self.coords = Some(full);
        } else {
            self.selection.release();
            self.coords = None;
        }
    }

    /// Ratio to size the output with: the locked ratio, or the shape of the
    /// current selection when unconstrained.
    pub fn effective_ratio(&self) -> Option<f64> {
        if let Some(ratio) = self.ratio {
            return Some(ratio.value());
        }
        let rect = self.selection.tell_select();
        (!rect.is_empty()).then(|| rect.w / rect.h)
    }

    pub fn on_width_input(&mut self, text: &str) {
        match positive_int(text) {
            None => self.blank_size(),
            Some(width) => {
                self.width = Some(width);
                if let Some(ratio) = self.effective_ratio() {
                    self.height = Some(ratio::height_for(width, ratio));
                }
            }
        }
    }

    pub fn on_height_input(&mut self, text: &str) {
        match positive_int(text) {
            None => self.blank_size(),
            Some(height) => {
                self.height = Some(height);
                if let Some(ratio) = self.effective_ratio() {
                    self.width = Some(ratio::width_for(height, ratio));
                }
            }
        }
    }

    /// Select a ratio choice; anything without an `N:D` literal unlocks.
    /// Values the selector does not offer are ignored.
    pub fn on_ratio_change(&mut self, value: &str) {
        if !self.ratios.iter().any(|offered| offered == value) {
            log::warn!("ratio `{value}` is not one of {:?}", self.ratios);
            return;
        }
        self.ratio_choice = value.to_string();
        self.ratio = AspectRatio::parse(value);
        self.selection.set_aspect_ratio(self.ratio.map(|r| r.value()));
        if self.selection.has_selection() {
            self.coords = Some(self.selection.tell_select().rounded());
        }
        self.rederive_height();
    }

    /// Recompute the height from the current width, or blank both when the
    /// width is unset.
    fn rederive_height(&mut self) {
        match self.width {
            None => self.blank_size(),
            Some(width) => {
                if let Some(ratio) = self.effective_ratio() {
                    self.height = Some(ratio::height_for(width, ratio));
                }
            }
        }
    }

    fn blank_size(&mut self) {
        self.width = None;
        self.height = None;
    }

    /// `W x H` of the live selection, or `n/a`.
    pub fn area_label(&self) -> String {
        let rect = self.selection.tell_select();
        if rect.is_empty() {
            fl!("area-none")
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let (width, height) = (rect.w.trunc() as i64, rect.h.trunc() as i64);
            fl!("area-size", width = width, height = height)
        }
    }

    /// Form-encoded fields posted back to the rendition endpoint.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let edge = |pick: fn(&CropRect) -> u32| {
            self.coords
                .as_ref()
                .map(|c| pick(c).to_string())
                .unwrap_or_default()
        };
        let size = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();
        vec![
            ("left".to_string(), edge(|c| c.left)),
            ("top".to_string(), edge(|c| c.top)),
            ("right".to_string(), edge(|c| c.right)),
            ("bottom".to_string(), edge(|c| c.bottom)),
            ("width".to_string(), size(self.width)),
            ("height".to_string(), size(self.height)),
            ("aspect-ratio".to_string(), self.ratio_choice.clone()),
            (
                "force_selection".to_string(),
                if self.force_selection { "True" } else { "False" }.to_string(),
            ),
        ]
    }

    /// Rendition filter spec the server will build from this form.
    pub fn filter_spec(&self, post_processing: Option<&str>) -> Option<String> {
        let crop = self.coords?;
        let fit = self.width.zip(self.height);
        Some(crate::domain::filter_spec::rendition_spec(
            crop,
            fit,
            post_processing,
        ))
    }
}

/// `parseInt` truthiness: zero, negatives and garbage all count as unset.
fn positive_int(text: &str) -> Option<u32> {
    parse_leading_int(text)
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}
