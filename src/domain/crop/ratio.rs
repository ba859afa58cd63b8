// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/ratio.rs
//
// Aspect ratio constraint parsed from the ratio selector.

use std::fmt;

use super::rect::round_half_up;

/// Locked aspect ratio `numerator / denominator` (width over height).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub numerator: u32,
    pub denominator: u32,
}

impl AspectRatio {
    /// Build a ratio; zero terms would make it meaningless.
    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        (numerator > 0 && denominator > 0).then_some(Self {
            numerator,
            denominator,
        })
    }

    /// Find the first `N:D` literal in a selector value.
    ///
    /// Values such as `free` or garbage mean "unconstrained" (`None`).
    pub fn parse(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        let mut start = 0;
        while start < bytes.len() {
            if !bytes[start].is_ascii_digit() {
                start += 1;
                continue;
            }
            let colon = start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
            let after = colon + 1;
            let denom_len = bytes
                .get(after..)
                .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count());
            if bytes.get(colon) == Some(&b':') && denom_len > 0 {
                let numerator = value[start..colon].parse().ok()?;
                let denominator = value[after..after + denom_len].parse().ok()?;
                return Self::new(numerator, denominator);
            }
            start = colon;
        }
        None
    }

    pub fn value(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

/// `round(width / ratio)`.
pub fn height_for(width: u32, ratio: f64) -> u32 {
    round_half_up(f64::from(width) / ratio)
}

/// `round(height * ratio)`.
pub fn width_for(height: u32, ratio: f64) -> u32 {
    round_half_up(f64::from(height) * ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ratio_literals() {
        assert_eq!(AspectRatio::parse("16:9"), AspectRatio::new(16, 9));
        assert_eq!(AspectRatio::parse("ratio 4:3"), AspectRatio::new(4, 3));
        assert_eq!(AspectRatio::parse("free"), None);
        assert_eq!(AspectRatio::parse("16:"), None);
        assert_eq!(AspectRatio::parse("0:9"), None);
        assert_eq!(AspectRatio::parse("12 3:2"), AspectRatio::new(3, 2));
    }

    #[test]
    fn sixteen_by_nine_at_1920_is_1080() {
        let ratio = AspectRatio::parse("16:9").unwrap().value();
        assert_eq!(height_for(1920, ratio), 1080);
        assert_eq!(width_for(1080, ratio), 1920);
    }

    #[test]
    fn recomputation_converges_after_first_application() {
        for ratio in ["1:1", "4:3", "16:9", "2:1", "3:7"] {
            let value = AspectRatio::parse(ratio).unwrap().value();
            for width in [1_u32, 7, 99, 640, 1001, 4096] {
                let height = height_for(width, value);
                let width2 = width_for(height, value);
                let height2 = height_for(width2, value);
                let width3 = width_for(height2, value);
                assert_eq!(width2, width3, "ratio {ratio} width {width}");
                assert_eq!(height2, height_for(width3, value));
            }
        }
    }
}
