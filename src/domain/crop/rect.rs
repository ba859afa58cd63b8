// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/rect.rs
//
// Crop rectangle and selection geometry.

/// Crop rectangle in source image pixel coordinates.
///
/// Edges rather than origin + size: this is what the rendition form posts
/// back (`left`, `top`, `right`, `bottom`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole image.
    pub fn full(size: ImageSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Check `0 <= left < right <= W` and `0 <= top < bottom <= H`.
    pub fn is_valid_for(&self, size: ImageSize) -> bool {
        self.left < self.right
            && self.right <= size.width
            && self.top < self.bottom
            && self.bottom <= size.height
    }

    /// `crop-l,t:r,b` filter spec fragment.
    pub fn filter(&self) -> String {
        format!(
            "crop-{},{}:{},{}",
            self.left, self.top, self.right, self.bottom
        )
    }

    /// `l,t,r,b` as used by the `crop` URL parameter.
    pub fn as_param(&self) -> String {
        format!("{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }

    /// Parse the four comma separated edges of a `crop` parameter.
    pub fn parse_param(value: &str) -> Option<Self> {
        let parts: Vec<u32> = value
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect::<Option<_>>()?;
        match parts.as_slice() {
            [left, top, right, bottom] => Some(Self::new(*left, *top, *right, *bottom)),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> SelectionRect {
        SelectionRect::from_edges(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
    }
}

/// True (unscaled) image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse `WxH`.
    pub fn parse(value: &str) -> Option<Self> {
        let (w, h) = value.split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

/// Live rectangle reported by the selection tool, in fractional pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
    pub w: f64,
    pub h: f64,
}

impl SelectionRect {
    pub fn from_edges(x: f64, y: f64, x2: f64, y2: f64) -> Self {
        Self {
            x,
            y,
            x2,
            y2,
            w: x2 - x,
            h: y2 - y,
        }
    }

    pub fn from_origin(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::from_edges(x, y, x + w, y + h)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0.0 || self.h == 0.0
    }

    /// Round every edge the way the browser does (`Math.round`).
    pub fn rounded(&self) -> CropRect {
        CropRect::new(
            round_half_up(self.x),
            round_half_up(self.y),
            round_half_up(self.x2),
            round_half_up(self.y2),
        )
    }
}

/// `Math.round` semantics: halves round towards positive infinity.
pub fn round_half_up(value: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = (value + 0.5).floor().max(0.0) as u32;
    rounded
}

/// `parseInt` semantics for form inputs: leading whitespace, optional sign,
/// then as many digits as present. Anything else yields `None`.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let number: i64 = digits[..end].parse().ok()?;
    Some(if negative { -number } else { number })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_respects_image_bounds() {
        let size = ImageSize::new(100, 50);
        assert!(CropRect::new(0, 0, 100, 50).is_valid_for(size));
        assert!(!CropRect::new(0, 0, 101, 50).is_valid_for(size));
        assert!(!CropRect::new(10, 0, 10, 50).is_valid_for(size));
    }

    #[test]
    fn crop_param_parsing() {
        assert_eq!(
            CropRect::parse_param("1,2,3,4"),
            Some(CropRect::new(1, 2, 3, 4))
        );
        assert_eq!(CropRect::parse_param("1,2,3"), None);
        assert_eq!(CropRect::parse_param("a,2,3,4"), None);
    }

    #[test]
    fn rounding_matches_browser() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-0.4), 0);
    }

    #[test]
    fn lenient_integer_parsing() {
        assert_eq!(parse_leading_int("1920"), Some(1920));
        assert_eq!(parse_leading_int(" 12px"), Some(12));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-5"), Some(-5));
    }

    #[test]
    fn image_size_parsing() {
        assert_eq!(ImageSize::parse("1920x1080"), Some(ImageSize::new(1920, 1080)));
        assert_eq!(ImageSize::parse("1920"), None);
    }
}
