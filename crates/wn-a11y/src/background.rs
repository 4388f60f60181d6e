//! Effective background resolution

use wn_css::parse_color;

use crate::render_tree::RenderTree;

/// Painted background assumed when nothing in the ancestry has one
pub const DEFAULT_BACKGROUND: &str = "rgb(255, 255, 255)";

/// Whether a computed background paints nothing
pub fn is_transparent(background: &str) -> bool {
    let background = background.trim();
    background.eq_ignore_ascii_case("transparent")
        || parse_color(background).is_some_and(|c| c.a == 0.0)
}

/// Background color actually painted behind `node`: its own or the nearest
/// ancestor's non-transparent `background-color`, else opaque white.
///
/// Semi-transparent backgrounds are taken as they are, without compositing.
pub fn effective_background<T: RenderTree + ?Sized>(tree: &T, node: T::Node) -> String {
    std::iter::successors(Some(node), |&n| tree.parent_element(n))
        .map(|n| tree.computed_style(n).background_color)
        .find(|bg| !is_transparent(bg))
        .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string())
}
