//! Wonder Nest CSS
//!
//! Style system over `wn-dom`:
//! - inline declaration and color parsing via lightningcss
//! - `StyleResolver`: inheritance, UA defaults and a synthetic block layout
//! - selector parsing and matching for `querySelectorAll`
//! - stylesheet validation

mod cascade;
mod color;
mod declarations;
mod selectors;
mod stylesheet;

pub use cascade::StyleResolver;
pub use color::{Rgba, parse_color};
pub use declarations::{Declaration, parse_inline_style};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList, query_selector_all,
};
pub use stylesheet::validate_stylesheet;

/// CSS parsing error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: u32,
        column: u32,
        message: String,
    },
}

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken { found: char, offset: usize },

    #[error("unexpected end of selector")]
    UnexpectedEnd,

    #[error("unsupported pseudo selector `{0}`")]
    UnsupportedPseudo(String),

    #[error("combinator without a following selector")]
    DanglingCombinator,
}
