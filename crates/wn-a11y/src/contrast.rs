//! Color contrast
//!
//! WCAG relative luminance and contrast ratio over computed color strings.

use std::sync::LazyLock;

use regex::Regex;

static RGB_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rgba?\((\d+),\s*(\d+),\s*(\d+)").expect("static rgb pattern"));

/// Opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Read the channels of an `rgb(...)`/`rgba(...)` computed value.
    ///
    /// Anything else (named colors, hex, garbage) silently falls back to
    /// opaque white. Alpha is ignored.
    pub fn parse(color: &str) -> Self {
        let Some(caps) = RGB_PATTERN.captures(color) else {
            return Self::WHITE;
        };
        let channel = |i: usize| {
            caps[i]
                .parse::<u32>()
                .map(|v| v.min(255) as u8)
                .unwrap_or(u8::MAX)
        };
        Self::new(channel(1), channel(2), channel(3))
    }

    pub fn luminance(&self) -> f64 {
        ContrastChecker::luminance(self.r, self.g, self.b)
    }
}

/// Contrast checker
pub struct ContrastChecker;

impl ContrastChecker {
    /// Calculate relative luminance
    pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        }
        0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
    }

    /// Calculate contrast ratio between two luminances
    pub fn contrast_ratio(l1: f64, l2: f64) -> f64 {
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Contrast ratio between two colors
    pub fn ratio(fg: Rgb, bg: Rgb) -> f64 {
        Self::contrast_ratio(fg.luminance(), bg.luminance())
    }

    /// Minimum ratio for text of the given size (px) and weight.
    ///
    /// Large text (18.66px and up, or 14px bold) needs 3:1, everything else 4.5:1.
    pub fn required_ratio(font_size_px: f64, font_weight: Option<f64>) -> f64 {
        let bold = font_weight.is_some_and(|w| w >= 700.0);
        if font_size_px >= 18.66 || (font_size_px >= 14.0 && bold) {
            3.0
        } else {
            4.5
        }
    }
}

/// Contrast ratio between two computed color strings
pub fn contrast_ratio(fg: &str, bg: &str) -> f64 {
    ContrastChecker::ratio(Rgb::parse(fg), Rgb::parse(bg))
}
