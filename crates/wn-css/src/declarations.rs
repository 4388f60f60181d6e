//! Inline declaration blocks (`style="..."`)

use lightningcss::properties::Property;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute};

use crate::color::Rgba;

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    /// Serialized value as lightningcss prints it
    pub value: String,
    /// Color set by `color`, `background-color` or the `background` shorthand
    pub color: Option<Rgba>,
    pub important: bool,
}

/// Parse a `style` attribute with lightningcss.
///
/// Invalid declarations are dropped like a browser would, the rest of the
/// block still applies.
pub fn parse_inline_style(block: &str) -> Vec<Declaration> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let attr = match StyleAttribute::parse(block, options) {
        Ok(attr) => attr,
        Err(e) => {
            tracing::debug!("Ignoring style attribute: {}", e);
            return Vec::new();
        }
    };

    let decls = &attr.declarations;
    decls
        .declarations
        .iter()
        .map(|p| (p, false))
        .chain(decls.important_declarations.iter().map(|p| (p, true)))
        .filter_map(|(property, important)| convert_declaration(property, important))
        .collect()
}

fn convert_declaration(property: &Property, important: bool) -> Option<Declaration> {
    let value = property.value_to_css_string(PrinterOptions::default()).ok()?;
    if value.trim().is_empty() {
        return None;
    }
    let color = match property {
        Property::Color(color) | Property::BackgroundColor(color) => Rgba::from_css_color(color),
        // The color lives on the final layer
        Property::Background(layers) => layers.last().and_then(|l| Rgba::from_css_color(&l.color)),
        _ => None,
    };
    Some(Declaration {
        property: property.property_id().name().to_ascii_lowercase(),
        value,
        color,
        important,
    })
}
