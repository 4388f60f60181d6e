//! Stylesheet validation using lightningcss

use lightningcss::stylesheet::{ParserOptions, StyleSheet};

use crate::CssError;

/// Parse `css` and report the number of top-level rules.
///
/// The text itself is never rewritten; callers inject it verbatim once it
/// is known to parse.
pub fn validate_stylesheet(css: &str) -> Result<usize, CssError> {
    let stylesheet = StyleSheet::parse(css, ParserOptions::default()).map_err(|e| {
        let (line, column) = e.loc.as_ref().map(|l| (l.line + 1, l.column)).unwrap_or((0, 0));
        CssError::ParseError {
            line,
            column,
            message: e.to_string(),
        }
    })?;

    let rules = stylesheet.rules.0.len();
    tracing::debug!("Validated stylesheet: {} rules", rules);
    Ok(rules)
}
