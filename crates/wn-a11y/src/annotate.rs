//! Annotation renderer
//!
//! Flagged elements get a marker class plus `data-wn-*` attributes; one
//! injected style sheet turns those into a dashed outline with a hover
//! tooltip built from `attr(...)`. Clearing enumerates elements by their
//! audit id attribute, so nodes added or moved since the run are handled.

use crate::render_tree::RenderTree;
use crate::rules::Annotation;

pub const MARKER_CLASS: &str = "wn-audit-target";
pub const ATTR_AUDIT_ID: &str = "data-wn-audit-id";
pub const ATTR_TAG: &str = "data-wn-tag";
pub const ATTR_ERROR: &str = "data-wn-audit-error";
pub const ATTR_WCAG: &str = "data-wn-wcag";
pub const ATTR_SUGGESTION: &str = "data-wn-suggestion";

const ANNOTATION_ATTRS: &[&str] = &[ATTR_ERROR, ATTR_WCAG, ATTR_SUGGESTION, ATTR_AUDIT_ID, ATTR_TAG];

const HIGHLIGHT_CSS: &str = r#"
.wn-audit-target {
  outline: 3px dashed #f43f5e !important;
  outline-offset: 4px !important;
  position: relative !important;
  z-index: 40 !important;
  box-shadow: 0 0 15px rgba(244, 63, 94, 0.4) !important;
  transition: transform 0.3s cubic-bezier(0.4, 0, 0.2, 1), box-shadow 0.3s ease !important;
}
.wn-audit-target:hover {
  transform: scale(1.02) !important;
  box-shadow: 0 0 30px rgba(244, 63, 94, 0.7) !important;
  z-index: 1000 !important;
}
.wn-audit-target::after {
  content: attr(data-wn-tag) ": " attr(data-wn-audit-error) " [" attr(data-wn-wcag) "]" "\A" attr(data-wn-suggestion);
  white-space: pre-wrap;
  position: absolute;
  bottom: calc(100% + 15px);
  left: 50%;
  transform: translateX(-50%);
  background: #0f172a;
  color: white;
  padding: 12px 18px;
  border-radius: 12px;
  font-size: 11px;
  font-weight: 700;
  min-width: 240px;
  max-width: 350px;
  word-wrap: break-word;
  box-shadow: 0 20px 40px -5px rgba(0, 0, 0, 0.8);
  pointer-events: none;
  letter-spacing: 0.02em;
  border: 1px solid #f43f5e;
  z-index: 2147483647;
  opacity: 0;
  visibility: hidden;
  transition: opacity 0.25s ease, visibility 0.25s ease, transform 0.25s ease;
  line-height: 1.6;
  text-align: center;
}
.wn-audit-target:hover::after {
  opacity: 1;
  visibility: visible;
  transform: translateX(-50%) translateY(-5px);
}
"#;

/// Writes and removes audit highlights
#[derive(Debug, Clone)]
pub struct AnnotationRenderer {
    style_node_id: String,
}

impl AnnotationRenderer {
    pub fn new(style_node_id: impl Into<String>) -> Self {
        Self {
            style_node_id: style_node_id.into(),
        }
    }

    pub fn style_node_id(&self) -> &str {
        &self.style_node_id
    }

    /// Highlight style sheet with `custom_css` appended verbatim
    pub fn style_sheet(&self, custom_css: Option<&str>) -> String {
        let mut css = HIGHLIGHT_CSS.to_string();
        if let Some(custom) = custom_css.filter(|c| !c.trim().is_empty()) {
            if let Err(e) = wn_css::validate_stylesheet(custom) {
                tracing::warn!("Custom audit CSS does not parse, appending anyway: {}", e);
            }
            css.push_str(custom);
            css.push('\n');
        }
        css
    }

    /// Stamp an inspected element with its run id and tag name
    pub fn tag_element<T: RenderTree + ?Sized>(&self, tree: &mut T, node: T::Node, audit_id: &str, tag: &str) {
        tree.set_attribute(node, ATTR_AUDIT_ID, audit_id);
        tree.set_attribute(node, ATTR_TAG, tag);
    }

    /// Write annotations for every flagged element and inject the style sheet
    pub fn render<T: RenderTree + ?Sized>(
        &self,
        tree: &mut T,
        flagged: &[(T::Node, Annotation)],
        custom_css: Option<&str>,
    ) {
        for (node, annotation) in flagged {
            tree.add_class(*node, MARKER_CLASS);
            tree.set_attribute(*node, ATTR_ERROR, &annotation.error);
            tree.set_attribute(*node, ATTR_WCAG, annotation.wcag);
            if let Some(suggestion) = &annotation.suggestion {
                tree.set_attribute(*node, ATTR_SUGGESTION, suggestion);
            }
        }
        tree.remove_style_sheet(&self.style_node_id);
        tree.insert_style_sheet(&self.style_node_id, &self.style_sheet(custom_css));
        tracing::debug!("Annotated {} elements", flagged.len());
    }

    /// Remove the style sheet and every annotation attribute/class.
    ///
    /// Returns the number of elements cleaned. Safe on an untouched tree.
    pub fn clear<T: RenderTree + ?Sized>(&self, tree: &mut T) -> usize {
        tree.remove_style_sheet(&self.style_node_id);
        let marked = tree.elements_with_attribute(ATTR_AUDIT_ID);
        for &node in &marked {
            for attr in ANNOTATION_ATTRS {
                tree.remove_attribute(node, attr);
            }
            tree.remove_class(node, MARKER_CLASS);
        }
        if !marked.is_empty() {
            tracing::debug!("Cleared annotations from {} elements", marked.len());
        }
        marked.len()
    }
}

impl Default for AnnotationRenderer {
    fn default() -> Self {
        Self::new("wn-audit-styles")
    }
}
