//! Color values
//!
//! Normalizes authored colors (`#fff`, `lavender`, `hsl(...)`, `oklch(...)`)
//! into the serialized form browsers report from computed style.

use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, RGBA};

/// sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0.0 };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Convert a parsed lightningcss color to sRGB.
    ///
    /// `currentcolor`, `light-dark()` and system colors depend on context
    /// and yield `None`.
    pub fn from_css_color(color: &CssColor) -> Option<Self> {
        let rgba = match color {
            CssColor::RGBA(rgba) => *rgba,
            other => RGBA::try_from(other).ok()?,
        };
        // Alpha is stored in a byte; keep three decimals so 0.4 stays 0.4
        let a = (rgba.alpha_f32() * 1000.0).round() / 1000.0;
        Some(Self {
            r: rgba.red,
            g: rgba.green,
            b: rgba.blue,
            a,
        })
    }

    /// Computed-style serialization: `rgb(r, g, b)` or `rgba(r, g, b, a)`
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Parse an authored color value
pub fn parse_color(value: &str) -> Option<Rgba> {
    let color = CssColor::parse_string(value.trim()).ok()?;
    Rgba::from_css_color(&color)
}
