//! Wonder Nest HTML loader
//!
//! Parses HTML5 with html5ever and hands back a `wn_dom::Document` whose
//! elements already carry computed styles and layout boxes, and writes
//! documents back out as markup.

mod parser;
mod serialize;

use std::path::Path;

pub use parser::HtmlParser;
pub use serialize::to_html;
use wn_dom::Document;

/// Parse an HTML string with the default parser settings
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Read and parse an HTML file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document, ParseError> {
    HtmlParser::new().parse_file(path)
}

/// HTML loading error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no <body> element")]
    MissingBody,
}
