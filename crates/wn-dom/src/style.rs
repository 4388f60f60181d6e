//! Computed style snapshot
//!
//! Values are kept in their serialized computed form (`"rgb(0, 0, 0)"`,
//! `"16px"`, `"400"`) because that is what the audit rules compare against.

/// Resolved style of one element
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub color: String,
    pub background_color: String,
    pub font_size: String,
    pub font_weight: String,
    pub opacity: String,
    pub visibility: String,
    pub display: String,
    pub position: String,
    pub clip: String,
    pub clip_path: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            color: "rgb(0, 0, 0)".into(),
            background_color: "rgba(0, 0, 0, 0)".into(),
            font_size: "16px".into(),
            font_weight: "400".into(),
            opacity: "1".into(),
            visibility: "visible".into(),
            display: "inline".into(),
            position: "static".into(),
            clip: "auto".into(),
            clip_path: "none".into(),
        }
    }
}

impl ComputedStyle {
    /// Font size in px, 0 when unparseable
    pub fn font_size_px(&self) -> f64 {
        leading_number(&self.font_size).unwrap_or(0.0)
    }

    /// Numeric font weight, `None` for keywords
    pub fn font_weight_value(&self) -> Option<f64> {
        leading_number(&self.font_weight)
    }

    /// Opacity as a number, 1 when unparseable
    pub fn opacity_value(&self) -> f64 {
        leading_number(&self.opacity).unwrap_or(1.0)
    }

    pub fn is_display_none(&self) -> bool {
        self.display == "none"
    }

    /// Out-of-flow positioning
    pub fn is_out_of_flow(&self) -> bool {
        matches!(self.position.as_str(), "absolute" | "fixed")
    }
}

/// Parse the numeric prefix of a CSS value, like JavaScript's `parseFloat`.
///
/// `"18.66px"` gives `18.66`, `"bold"` gives `None`.
pub fn leading_number(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, ch) in value.char_indices() {
        match ch {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + ch.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    value[..end].trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("16px"), Some(16.0));
        assert_eq!(leading_number("18.66px"), Some(18.66));
        assert_eq!(leading_number("-5000px"), Some(-5000.0));
        assert_eq!(leading_number(" 0.5"), Some(0.5));
        assert_eq!(leading_number("700"), Some(700.0));
        assert_eq!(leading_number("bold"), None);
        assert_eq!(leading_number(""), None);
        assert_eq!(leading_number("-"), None);
    }

    #[test]
    fn test_defaults() {
        let style = ComputedStyle::default();
        assert_eq!(style.font_size_px(), 16.0);
        assert_eq!(style.font_weight_value(), Some(400.0));
        assert_eq!(style.opacity_value(), 1.0);
        assert!(!style.is_display_none());
        assert!(!style.is_out_of_flow());
    }
}
