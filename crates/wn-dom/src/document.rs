//! Document - High-level document API

use crate::{DomTree, NodeId, NodeData};

/// Default viewport used when the host does not provide one
const DEFAULT_VIEWPORT: (f64, f64) = (1280.0, 800.0);

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// Viewport size in CSS px
    viewport: (f64, f64),
}

impl Document {
    /// Create a new document with html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            viewport: DEFAULT_VIEWPORT,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            viewport: DEFAULT_VIEWPORT,
        }
    }

    /// Locate html/head/body after the tree was built externally
    pub fn finalize(&mut self) {
        self.html_element = self
            .tree
            .children(self.tree.root())
            .find(|(_, n)| n.as_element().is_some_and(|e| e.tag == "html"))
            .map(|(id, _)| id)
            .unwrap_or(NodeId::NONE);

        let (mut head, mut body) = (NodeId::NONE, NodeId::NONE);
        for (id, node) in self.tree.children(self.html_element) {
            match node.as_element().map(|e| e.tag.as_str()) {
                Some("head") if !head.is_valid() => head = id,
                Some("body") if !body.is_valid() => body = id,
                _ => {}
            }
        }
        self.head_element = head;
        self.body_element = body;
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first <title> in <head>
    pub fn title(&self) -> String {
        self.tree
            .children(self.head_element)
            .find(|(_, n)| n.as_element().is_some_and(|e| e.tag == "title"))
            .map(|(id, _)| self.tree.text_content(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Viewport width in CSS px
    pub fn viewport_width(&self) -> f64 {
        self.viewport.0
    }

    /// Viewport height in CSS px
    pub fn viewport_height(&self) -> f64 {
        self.viewport.1
    }

    /// Resize the viewport. Layout must be recomputed by the caller.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// All connected elements in document order
    pub fn elements(&self) -> Vec<NodeId> {
        self.tree.descendant_elements(self.tree.root())
    }

    /// Connected elements whose tag is in `tags`, in document order
    pub fn elements_by_tag(&self, tags: &[&str]) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.tree.tag_name(id).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    /// Connected elements carrying attribute `name`, in document order
    pub fn elements_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.tree.element(id).is_some_and(|e| e.has_attr(name)))
            .collect()
    }

    /// First connected element whose attribute `name` equals `value`
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&id| self.tree.attr(id, name) == Some(value))
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_attr("id", id)
    }

    /// Closest inclusive ancestor with the given tag
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .find(|&n| self.tree.tag_name(n) == Some(tag))
    }

    /// Equivalent of `HTMLElement.offsetParent`.
    ///
    /// `None` when the element or an ancestor is not rendered, when the
    /// element is fixed-positioned, or for the root and body elements.
    pub fn offset_parent(&self, id: NodeId) -> Option<NodeId> {
        let elem = self.tree.element(id)?;
        if !self.tree.is_connected(id)
            || id == self.html_element
            || id == self.body_element
            || elem.style.position == "fixed"
        {
            return None;
        }
        if std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .any(|n| self.tree.element(n).is_some_and(|e| e.style.is_display_none()))
        {
            return None;
        }

        self.tree
            .ancestors(id)
            .find(|&n| {
                n == self.body_element
                    || self
                        .tree
                        .element(n)
                        .is_some_and(|e| e.style.position != "static")
            })
            .or_else(|| self.body_element.is_valid().then_some(self.body_element))
    }

    /// Append a `<style id=..>` element holding `css` to <head> (or the
    /// document element when there is no head).
    pub fn insert_style_element(&mut self, id: &str, css: &str) -> NodeId {
        let parent = if self.head_element.is_valid() {
            self.head_element
        } else if self.html_element.is_valid() {
            self.html_element
        } else {
            self.tree.root()
        };

        let style = self.tree.create_element("style");
        self.tree.set_attr(style, "id", id);
        if let Some(elem) = self.tree.element_mut(style) {
            elem.style.display = "none".into();
        }
        let text = self.tree.create_text(css);
        self.tree.append_child(style, text);
        self.tree.append_child(parent, style);

        tracing::debug!("Inserted <style id=\"{}\"> ({} bytes)", id, css.len());
        style
    }

    /// Detach the element with the given id. Returns whether one was found.
    pub fn remove_element_by_id(&mut self, id: &str) -> bool {
        match self.get_element_by_id(id) {
            Some(node) => {
                self.tree.detach(node);
                true
            }
            None => false,
        }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Whether the document has a doctype node
    pub fn has_doctype(&self) -> bool {
        self.tree
            .children(self.tree.root())
            .any(|(_, n)| matches!(n.data, NodeData::Doctype { .. }))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
