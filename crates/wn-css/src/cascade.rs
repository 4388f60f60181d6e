//! Style resolution
//!
//! Computes a `ComputedStyle` for every element from inheritance, user-agent
//! defaults and the inline `style` attribute, then assigns a synthetic
//! block-flow layout so that each element has a plausible bounding box.
//! The layout is deliberately coarse: it only has to distinguish rendered,
//! empty, hidden and far-off-screen boxes.

use wn_dom::{ComputedStyle, DOMRect, Document, DomTree, NodeId, leading_number};

use crate::declarations::{Declaration, parse_inline_style};

const BLOCK_TAGS: &[&str] = &[
    "html", "body", "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "section", "header",
    "footer", "nav", "main", "article", "aside", "ul", "ol", "li", "form", "figure",
    "figcaption", "table", "thead", "tbody", "tr", "address", "blockquote", "dl", "dt", "dd",
    "fieldset", "hr", "pre", "details", "summary",
];

const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "title", "meta", "link", "template", "base",
];

const HEADING_SCALE: &[(&str, f64)] = &[
    ("h1", 2.0),
    ("h2", 1.5),
    ("h3", 1.17),
    ("h4", 1.0),
    ("h5", 0.83),
    ("h6", 0.67),
];

const ROOT_FONT_PX: f64 = 16.0;

/// Box-related declarations that only feed layout
#[derive(Debug, Default, Clone, Copy)]
struct LayoutHints {
    width: Option<f64>,
    height: Option<f64>,
    left: Option<f64>,
    top: Option<f64>,
    margin_left: Option<f64>,
}

/// Style resolver
#[derive(Debug, Clone)]
pub struct StyleResolver {
    /// Line box height as a multiple of the font size
    line_height: f64,
    /// Average glyph advance as a multiple of the font size
    glyph_advance: f64,
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Element whose children are still being resolved
struct Frame {
    id: NodeId,
    tag: String,
    style: ComputedStyle,
    hints: LayoutHints,
    hidden: bool,
    containing: DOMRect,
    /// Containing block handed to children
    inner: DOMRect,
    child_cursor: f64,
    children: std::vec::IntoIter<NodeId>,
    child_rects: Vec<DOMRect>,
}

impl Frame {
    /// In-flow boxes push the parent's flow cursor down
    fn advances_cursor(&self) -> bool {
        !self.hidden && !self.style.is_out_of_flow()
    }
}

impl StyleResolver {
    pub fn new() -> Self {
        Self {
            line_height: 1.2,
            glyph_advance: 0.5,
        }
    }

    /// Compute styles and boxes for every connected element
    pub fn resolve(&self, doc: &mut Document) {
        let viewport = DOMRect::from_xywh(0.0, 0.0, doc.viewport_width(), doc.viewport_height());
        let root_style = ComputedStyle::default();
        let tree = doc.tree_mut();
        let children = element_children(tree, tree.root());

        let mut cursor = 0.0;
        for child in children {
            self.resolve_subtree(tree, child, &root_style, viewport, &mut cursor);
        }
        tracing::debug!("Resolved styles for {} nodes", tree.len());
    }

    /// Resolve `id` and its descendants depth-first with an explicit stack.
    ///
    /// Children are resolved before their parent's box is sized, and each
    /// in-flow child advances its parent's flow cursor.
    fn resolve_subtree(
        &self,
        tree: &mut DomTree,
        id: NodeId,
        parent_style: &ComputedStyle,
        containing: DOMRect,
        cursor: &mut f64,
    ) -> DOMRect {
        let Some(first) = self.enter(tree, id, parent_style, containing, false, *cursor) else {
            return DOMRect::default();
        };
        let mut stack = vec![first];

        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.children.next() {
                if let Some(frame) =
                    self.enter(tree, child, &top.style, top.inner, top.hidden, top.child_cursor)
                {
                    stack.push(frame);
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let rect = self.finish(tree, &frame);
            match stack.last_mut() {
                Some(parent) => {
                    if frame.advances_cursor() {
                        parent.child_cursor = parent.child_cursor.max(rect.bottom());
                    }
                    parent.child_rects.push(rect);
                }
                None => {
                    if frame.advances_cursor() {
                        *cursor = cursor.max(rect.bottom());
                    }
                    return rect;
                }
            }
        }
        DOMRect::default()
    }

    /// Compute the style of `id` and place its origin
    fn enter(
        &self,
        tree: &DomTree,
        id: NodeId,
        parent_style: &ComputedStyle,
        containing: DOMRect,
        parent_hidden: bool,
        cursor: f64,
    ) -> Option<Frame> {
        let elem = tree.element(id)?;
        let tag = elem.tag.clone();
        let declarations = elem.get_attr("style").map(parse_inline_style).unwrap_or_default();

        let mut style = inherit(parent_style, &tag);
        apply_ua_defaults(&tag, &mut style, parent_style);
        if elem.has_attr("hidden") {
            style.display = "none".into();
        }
        let mut hints = LayoutHints::default();
        // Important declarations win over normal ones regardless of order
        for important in [false, true] {
            for decl in declarations.iter().filter(|d| d.important == important) {
                apply_declaration(&mut style, &mut hints, decl, parent_style);
            }
        }

        let hidden = parent_hidden || style.is_display_none();
        let children = element_children(tree, id).into_iter();
        if hidden {
            return Some(Frame {
                id,
                tag,
                style,
                hints,
                hidden,
                containing: DOMRect::default(),
                inner: DOMRect::default(),
                child_cursor: 0.0,
                children,
                child_rects: Vec::new(),
            });
        }

        let fixed = style.position == "fixed";
        let out_of_flow = style.is_out_of_flow();
        let origin_x = if fixed { 0.0 } else { containing.x };
        let origin_y = match (fixed, out_of_flow) {
            (true, _) => 0.0,
            (false, true) => containing.y,
            (false, false) => cursor,
        };
        let x = origin_x + hints.left.filter(|_| out_of_flow).unwrap_or(0.0)
            + hints.margin_left.unwrap_or(0.0);
        let y = origin_y + hints.top.filter(|_| out_of_flow).unwrap_or(0.0);
        let inner = DOMRect::from_xywh(x, y, hints.width.unwrap_or(containing.width), 0.0);

        Some(Frame {
            id,
            tag,
            style,
            hints,
            hidden,
            containing,
            inner,
            child_cursor: y,
            children,
            child_rects: Vec::new(),
        })
    }

    /// Size the box once every child is resolved, then store style and box
    fn finish(&self, tree: &mut DomTree, frame: &Frame) -> DOMRect {
        let rect = if frame.hidden {
            DOMRect::default()
        } else {
            self.size_box(tree, frame)
        };
        if let Some(elem) = tree.element_mut(frame.id) {
            elem.style = frame.style.clone();
            elem.rect = rect;
        }
        rect
    }

    fn size_box(&self, tree: &DomTree, frame: &Frame) -> DOMRect {
        let Frame {
            id,
            style,
            hints,
            inner,
            containing,
            child_rects,
            ..
        } = frame;
        let font_px = style.font_size_px();
        let line = font_px * self.line_height;
        let block = is_block_display(&style.display) && !style.is_out_of_flow();
        let (x, y) = (inner.x, inner.y);

        let text_chars = direct_text(tree, *id).chars().count() as f64;
        let text_width = text_chars * font_px * self.glyph_advance;
        let inline_children_width: f64 = child_rects.iter().map(|r| r.width).sum();
        let tallest_child = child_rects.iter().map(|r| r.height).fold(0.0, f64::max);

        let (width, height) = if block {
            let flow_height = frame.child_cursor - y;
            let has_line = text_chars > 0.0 || tallest_child > 0.0;
            let content = if has_line { flow_height.max(line) } else { flow_height };
            (containing.width, content)
        } else {
            match frame.tag.as_str() {
                "img" => (
                    attr_px(tree, *id, "width").unwrap_or(100.0),
                    attr_px(tree, *id, "height").unwrap_or(100.0),
                ),
                "input" | "select" | "textarea" => (150.0, line + 4.0),
                "button" => (text_width + inline_children_width + 16.0, line + 4.0),
                _ => {
                    let width = text_width + inline_children_width;
                    let height = if width > 0.0 { line.max(tallest_child) } else { 0.0 };
                    (width, height)
                }
            }
        };

        DOMRect::from_xywh(
            x,
            y,
            hints.width.unwrap_or(width),
            hints.height.unwrap_or(height),
        )
    }
}

fn element_children(tree: &DomTree, id: NodeId) -> Vec<NodeId> {
    tree.children(id)
        .filter(|(_, n)| n.is_element())
        .map(|(c, _)| c)
        .collect()
}

fn direct_text(tree: &DomTree, id: NodeId) -> String {
    let text: String = tree.children(id).filter_map(|(_, n)| n.as_text()).collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn attr_px(tree: &DomTree, id: NodeId, name: &str) -> Option<f64> {
    tree.attr(id, name).and_then(leading_number)
}

fn is_block_display(display: &str) -> bool {
    matches!(display, "block" | "flex" | "grid" | "list-item" | "table" | "flow-root")
}

fn default_display(tag: &str) -> &'static str {
    if NON_RENDERED_TAGS.contains(&tag) {
        "none"
    } else if BLOCK_TAGS.contains(&tag) {
        "block"
    } else if matches!(tag, "button" | "input" | "select" | "textarea") {
        "inline-block"
    } else {
        "inline"
    }
}

/// Start from the parent's inherited properties and initial values
fn inherit(parent: &ComputedStyle, tag: &str) -> ComputedStyle {
    ComputedStyle {
        color: parent.color.clone(),
        font_size: parent.font_size.clone(),
        font_weight: parent.font_weight.clone(),
        visibility: parent.visibility.clone(),
        display: default_display(tag).into(),
        ..ComputedStyle::default()
    }
}

fn apply_ua_defaults(tag: &str, style: &mut ComputedStyle, parent: &ComputedStyle) {
    if let Some(&(_, scale)) = HEADING_SCALE.iter().find(|(t, _)| *t == tag) {
        style.font_size = px(parent.font_size_px() * scale);
        style.font_weight = "700".into();
    }
    match tag {
        "b" | "strong" | "th" => style.font_weight = "700".into(),
        "small" => style.font_size = px(parent.font_size_px() * 0.833),
        "a" => style.color = "rgb(0, 0, 238)".into(),
        "button" => {
            style.color = "rgb(0, 0, 0)".into();
            style.background_color = "rgb(239, 239, 239)".into();
        }
        "input" | "select" | "textarea" => {
            style.color = "rgb(0, 0, 0)".into();
            style.background_color = "rgb(255, 255, 255)".into();
        }
        _ => {}
    }
}

fn apply_declaration(
    style: &mut ComputedStyle,
    hints: &mut LayoutHints,
    decl: &Declaration,
    parent: &ComputedStyle,
) {
    let value = decl.value.as_str();
    let lower = value.to_ascii_lowercase();
    let font_px = style.font_size_px();

    match decl.property.as_str() {
        "color" => {
            if let Some(color) = decl.color {
                style.color = color.to_css();
            } else if matches!(lower.as_str(), "inherit" | "currentcolor") {
                style.color = parent.color.clone();
            }
        }
        "background-color" | "background" => {
            if let Some(color) = decl.color {
                style.background_color = color.to_css();
            } else if lower == "currentcolor" {
                style.background_color = style.color.clone();
            }
        }
        "font-size" => {
            if let Some(size) = font_size(&lower, parent.font_size_px()) {
                style.font_size = px(size);
            }
        }
        "font-weight" => {
            let parent_weight = parent.font_weight_value().unwrap_or(400.0);
            let weight = match lower.as_str() {
                "normal" => Some(400.0),
                "bold" => Some(700.0),
                "bolder" => Some((parent_weight + 300.0).min(900.0)),
                "lighter" => Some((parent_weight - 300.0).max(100.0)),
                other => other.parse::<f64>().ok().filter(|w| (1.0..=1000.0).contains(w)),
            };
            if let Some(weight) = weight {
                style.font_weight = weight.to_string();
            }
        }
        "opacity" => {
            let parsed = match lower.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p / 100.0),
                None => lower.parse::<f64>().ok(),
            };
            if let Some(opacity) = parsed {
                style.opacity = opacity.clamp(0.0, 1.0).to_string();
            }
        }
        "visibility" => style.visibility = lower,
        "display" => style.display = lower,
        "position" => style.position = lower,
        "clip" => style.clip = normalize_clip(&lower),
        "clip-path" => style.clip_path = lower.split_whitespace().collect::<Vec<_>>().join(" "),
        "width" => hints.width = length_px(&lower, font_px),
        "height" => hints.height = length_px(&lower, font_px),
        "left" => hints.left = length_px(&lower, font_px),
        "top" => hints.top = length_px(&lower, font_px),
        "margin-left" => hints.margin_left = length_px(&lower, font_px),
        _ => {}
    }
}

fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}px", rounded)
}

fn length_px(value: &str, font_px: f64) -> Option<f64> {
    let value = value.trim();
    if value == "0" {
        return Some(0.0);
    }
    let number = leading_number(value)?;
    if value.ends_with("rem") {
        Some(number * ROOT_FONT_PX)
    } else if value.ends_with("em") {
        Some(number * font_px)
    } else if value.ends_with("px") {
        Some(number)
    } else {
        None
    }
}

fn font_size(value: &str, parent_px: f64) -> Option<f64> {
    let keyword = match value {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_px * 0.833),
        "larger" => Some(parent_px * 1.2),
        "inherit" => Some(parent_px),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }
    let number = leading_number(value)?;
    if value.ends_with('%') {
        Some(parent_px * number / 100.0)
    } else if value.ends_with("pt") {
        Some(number * 4.0 / 3.0)
    } else {
        length_px(value, parent_px)
    }
}

/// Browsers serialize `rect(0,0,0,0)` as `rect(0px, 0px, 0px, 0px)`
fn normalize_clip(value: &str) -> String {
    let Some(args) = value
        .trim()
        .strip_prefix("rect(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return value.trim().to_string();
    };
    let parts: Vec<String> = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| match leading_number(p) {
            Some(n) if p == "0" || p.ends_with("px") => format!("{}px", n),
            _ => p.to_string(),
        })
        .collect();
    format!("rect({})", parts.join(", "))
}
