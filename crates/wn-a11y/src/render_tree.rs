//! Render tree access
//!
//! The auditor reads and annotates the page only through `RenderTree`, so the
//! rules can run against any styled tree. `wn_dom::Document` implements it.

use wn_css::{SelectorList, query_selector_all};
use wn_dom::{ComputedStyle, DOMRect, Document, NodeId};

use crate::AuditError;

/// Narrow read/write view of a live, styled document
pub trait RenderTree {
    /// Element handle
    type Node: Copy + Eq + std::fmt::Debug;

    /// Elements whose tag is one of `tags`, in document order
    fn elements_by_tag(&self, tags: &[&str]) -> Vec<Self::Node>;

    /// `querySelectorAll` over the whole document
    fn select_all(&self, selectors: &str) -> Result<Vec<Self::Node>, AuditError>;

    /// Elements carrying attribute `name`, in document order
    fn elements_with_attribute(&self, name: &str) -> Vec<Self::Node>;

    /// First element whose attribute `name` equals `value`
    fn find_by_attribute(&self, name: &str, value: &str) -> Option<Self::Node>;

    /// Lowercase tag name
    fn tag_name(&self, node: Self::Node) -> String;

    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Nearest inclusive ancestor with the given tag
    fn closest(&self, node: Self::Node, tag: &str) -> Option<Self::Node>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    fn has_class(&self, node: Self::Node, class: &str) -> bool;
    fn add_class(&mut self, node: Self::Node, class: &str);
    fn remove_class(&mut self, node: Self::Node, class: &str);

    /// `getComputedStyle` snapshot
    fn computed_style(&self, node: Self::Node) -> ComputedStyle;

    /// `getBoundingClientRect`
    fn bounding_rect(&self, node: Self::Node) -> DOMRect;

    /// Whether `offsetParent` is non-null
    fn has_offset_parent(&self, node: Self::Node) -> bool;

    /// Rendered text (`innerText`)
    fn inner_text(&self, node: Self::Node) -> String;

    fn viewport_width(&self) -> f64;

    /// Append a `<style>` element with the given id
    fn insert_style_sheet(&mut self, id: &str, css: &str);

    /// Remove the `<style>` element with the given id, if present
    fn remove_style_sheet(&mut self, id: &str) -> bool;

    /// Text of the style element with the given id
    fn style_sheet(&self, id: &str) -> Option<String>;
}

impl RenderTree for Document {
    type Node = NodeId;

    fn elements_by_tag(&self, tags: &[&str]) -> Vec<NodeId> {
        Document::elements_by_tag(self, tags)
    }

    fn select_all(&self, selectors: &str) -> Result<Vec<NodeId>, AuditError> {
        let list = SelectorList::parse(selectors).map_err(|source| AuditError::InvalidSelector {
            selector: selectors.to_string(),
            source,
        })?;
        Ok(query_selector_all(self.tree(), self.tree().root(), &list))
    }

    fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.elements_with_attr(name)
    }

    fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.find_by_attr(name, value)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.tree().tag_name(node).unwrap_or_default().to_string()
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.tree().parent_element(node)
    }

    fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        Document::closest(self, node, tag)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree().attr(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.tree_mut().set_attr(node, name, value);
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.tree_mut().remove_attr(node, name);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree().element(node).is_some_and(|e| e.has_class(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(elem) = self.tree_mut().element_mut(node) {
            elem.add_class(class);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(elem) = self.tree_mut().element_mut(node) {
            elem.remove_class(class);
        }
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.tree()
            .element(node)
            .map(|e| e.style.clone())
            .unwrap_or_default()
    }

    fn bounding_rect(&self, node: NodeId) -> DOMRect {
        self.tree().element(node).map(|e| e.rect).unwrap_or_default()
    }

    fn has_offset_parent(&self, node: NodeId) -> bool {
        self.offset_parent(node).is_some()
    }

    fn inner_text(&self, node: NodeId) -> String {
        // Like innerText, a non-rendered element reports its raw text content
        if self.computed_style(node).is_display_none() {
            return self.tree().text_content(node);
        }
        self.tree().text_content_where(node, |n| {
            n.as_element().is_none_or(|e| !e.style.is_display_none())
        })
    }

    fn viewport_width(&self) -> f64 {
        Document::viewport_width(self)
    }

    fn insert_style_sheet(&mut self, id: &str, css: &str) {
        self.insert_style_element(id, css);
    }

    fn remove_style_sheet(&mut self, id: &str) -> bool {
        self.remove_element_by_id(id)
    }

    fn style_sheet(&self, id: &str) -> Option<String> {
        self.get_element_by_id(id)
            .filter(|&n| self.tree().tag_name(n) == Some("style"))
            .map(|n| self.tree().text_content(n))
    }
}
