// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/selection.rs
//
// Crop selection tool: drag handles, bounds clamping and aspect locking.

use super::rect::{ImageSize, SelectionRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragHandle {
    #[default]
    None,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Move,
}

/// Selection state of the crop tool, in true image coordinates.
///
/// Regions are `(x, y, w, h)`.
#[derive(Debug, Clone)]
pub struct CropSelection {
    pub bounds: ImageSize,
    pub region: Option<(f64, f64, f64, f64)>,
    pub aspect_ratio: Option<f64>,
    pub is_dragging: bool,
    pub drag_handle: DragHandle,
    pub drag_start: Option<(f64, f64)>,
    pub drag_start_region: Option<(f64, f64, f64, f64)>,
}

impl CropSelection {
    pub fn new(bounds: ImageSize) -> Self {
        Self {
            bounds,
            region: None,
            aspect_ratio: None,
            is_dragging: false,
            drag_handle: DragHandle::None,
            drag_start: None,
            drag_start_region: None,
        }
    }

    fn img_width(&self) -> f64 {
        f64::from(self.bounds.width)
    }

    fn img_height(&self) -> f64 {
        f64::from(self.bounds.height)
    }

    /// Report the current selection; an absent one is all zeros.
    pub fn tell_select(&self) -> SelectionRect {
        self.region
            .map(|(x, y, w, h)| SelectionRect::from_origin(x, y, w, h))
            .unwrap_or_default()
    }

    /// Programmatically select `rect`, clamped to the image.
    pub fn set_select(&mut self, rect: SelectionRect) {
        let x = rect.x.clamp(0.0, self.img_width());
        let y = rect.y.clamp(0.0, self.img_height());
        let x2 = rect.x2.clamp(x, self.img_width());
        let y2 = rect.y2.clamp(y, self.img_height());
        self.region = Some((x, y, x2 - x, y2 - y));
        self.constrain();
    }

    /// Change the locked ratio and re-fit the current region to it.
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) {
        self.aspect_ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
        self.constrain();
    }

    /// Shrink the region (anchored top-left) until it honours the locked
    /// ratio and the image bounds.
    fn constrain(&mut self) {
        let (Some(ratio), Some((x, y, w, h))) = (self.aspect_ratio, self.region) else {
            return;
        };
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let max_w = self.img_width() - x;
        let max_h = self.img_height() - y;
        let mut new_w = w.min(max_w);
        let mut new_h = new_w / ratio;
        if new_h > h.min(max_h) {
            new_h = h.min(max_h);
            new_w = new_h * ratio;
        }
        self.region = Some((x, y, new_w, new_h));
    }

    pub fn start_new_selection(&mut self, x: f64, y: f64) {
        self.region = Some((x, y, 0.0, 0.0));
        self.is_dragging = true;
        self.drag_handle = DragHandle::None;
        self.drag_start = Some((x, y));
        self.drag_start_region = None;
    }

    pub fn start_handle_drag(&mut self, handle: DragHandle, x: f64, y: f64) {
        self.is_dragging = true;
        self.drag_handle = handle;
        self.drag_start = Some((x, y));
        self.drag_start_region = self.region;
    }

    pub fn update_drag(&mut self, x: f64, y: f64) {
        if !self.is_dragging {
            return;
        }
        let (img_width, img_height) = (self.img_width(), self.img_height());

        match self.drag_handle {
            DragHandle::None => {
                if let Some((start_x, start_y)) = self.drag_start {
                    let min_x = start_x.min(x).max(0.0);
                    let min_y = start_y.min(y).max(0.0);
                    let max_x = start_x.max(x).min(img_width);
                    let max_y = start_y.max(y).min(img_height);

                    self.region = Some((min_x, min_y, max_x - min_x, max_y - min_y));
                    self.lock_ratio();
                }
            }
            DragHandle::Move => {
                if let (Some((start_x, start_y)), Some((rx, ry, rw, rh))) =
                    (self.drag_start, self.drag_start_region)
                {
                    let new_x = (rx + x - start_x).max(0.0).min(img_width - rw);
                    let new_y = (ry + y - start_y).max(0.0).min(img_height - rh);
                    self.region = Some((new_x, new_y, rw, rh));
                }
            }
            _ => {
                if let (Some((start_x, start_y)), Some(region)) =
                    (self.drag_start, self.drag_start_region)
                {
                    self.region = Some(self.resize_region(region, x - start_x, y - start_y));
                    self.lock_ratio();
                }
            }
        }
    }

    /// Re-fit the region to a locked ratio after a drag.
    ///
    /// Top and bottom edges drive the height, every other handle drives the
    /// width. The corner or edge opposite the dragged handle stays put.
    fn lock_ratio(&mut self) {
        let (Some(ratio), Some((x, y, w, h))) = (self.aspect_ratio, self.region) else {
            return;
        };
        let handle = self.drag_handle;
        let right = x + w;
        let bottom = y + h;
        let anchor_right = matches!(
            handle,
            DragHandle::TopLeft | DragHandle::BottomLeft | DragHandle::Left
        );
        let anchor_bottom = matches!(
            handle,
            DragHandle::TopLeft | DragHandle::TopRight | DragHandle::Top
        );
        let max_w = if anchor_right { right } else { self.img_width() - x };
        let max_h = if anchor_bottom { bottom } else { self.img_height() - y };

        let (mut w, mut h) = if matches!(handle, DragHandle::Top | DragHandle::Bottom) {
            (h * ratio, h)
        } else {
            (w, w / ratio)
        };
        if w > max_w {
            w = max_w;
            h = w / ratio;
        }
        if h > max_h {
            h = max_h;
            w = h * ratio;
        }

        let x = if anchor_right { right - w } else { x };
        let y = if anchor_bottom { bottom - h } else { y };
        self.region = Some((x, y, w, h));
    }

    fn resize_region(&self, region: (f64, f64, f64, f64), dx: f64, dy: f64) -> (f64, f64, f64, f64) {
        const MIN_SIZE: f64 = 1.0;
        let (rx, ry, rw, rh) = region;
        let (img_width, img_height) = (self.img_width(), self.img_height());
        let right = rx + rw;
        let bottom = ry + rh;

        match self.drag_handle {
            DragHandle::TopLeft => {
                let new_rx = (rx + dx).max(0.0).min(right - MIN_SIZE);
                let new_ry = (ry + dy).max(0.0).min(bottom - MIN_SIZE);
                (new_rx, new_ry, right - new_rx, bottom - new_ry)
            }
            DragHandle::TopRight => {
                let new_right = (right + dx).max(rx + MIN_SIZE).min(img_width);
                let new_ry = (ry + dy).max(0.0).min(bottom - MIN_SIZE);
                (rx, new_ry, new_right - rx, bottom - new_ry)
            }
            DragHandle::BottomLeft => {
                let new_rx = (rx + dx).max(0.0).min(right - MIN_SIZE);
                let new_bottom = (bottom + dy).max(ry + MIN_SIZE).min(img_height);
                (new_rx, ry, right - new_rx, new_bottom - ry)
            }
            DragHandle::BottomRight => {
                let new_right = (right + dx).max(rx + MIN_SIZE).min(img_width);
                let new_bottom = (bottom + dy).max(ry + MIN_SIZE).min(img_height);
                (rx, ry, new_right - rx, new_bottom - ry)
            }
            DragHandle::Top => {
                let new_ry = (ry + dy).max(0.0).min(bottom - MIN_SIZE);
                (rx, new_ry, rw, bottom - new_ry)
            }
            DragHandle::Bottom => {
                let new_bottom = (bottom + dy).max(ry + MIN_SIZE).min(img_height);
                (rx, ry, rw, new_bottom - ry)
            }
            DragHandle::Left => {
                let new_rx = (rx + dx).max(0.0).min(right - MIN_SIZE);
                (new_rx, ry, right - new_rx, rh)
            }
            DragHandle::Right => {
                let new_right = (right + dx).max(rx + MIN_SIZE).min(img_width);
                (rx, ry, new_right - rx, rh)
            }
            DragHandle::None | DragHandle::Move => region,
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
        self.drag_start = None;
        self.drag_start_region = None;
    }

    /// Drop the selection entirely.
    pub fn release(&mut self) {
        self.region = None;
        self.end_drag();
        self.drag_handle = DragHandle::None;
    }

    pub fn has_selection(&self) -> bool {
        self.region.is_some_and(|(_, _, w, h)| w > 0.0 && h > 0.0)
    }
}
