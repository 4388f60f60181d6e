//! DOM Node
//!
//! Nodes link to each other through `NodeId` indices instead of pointers,
//! so the whole tree lives in one `Vec` and can be mutated without
//! reference-counting.

use crate::{ComputedStyle, DOMRect, DOMTokenList, NodeId};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(TextData {
            content: content.to_string(),
        }))
    }

    /// Create a comment node
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }

    /// Create a doctype node
    pub fn doctype(name: &str) -> Self {
        Self::with_data(NodeData::Doctype {
            name: name.to_string(),
        })
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase local tag name
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<Attribute>,
    /// Resolved style snapshot
    pub style: ComputedStyle,
    /// Border box in viewport coordinates
    pub rect: DOMRect,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: ComputedStyle::default(),
            rect: DOMRect::default(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check for an attribute
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
            return;
        }
        self.attrs.push(Attribute {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
        });
    }

    /// Remove an attribute, returns whether it was present
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        before != self.attrs.len()
    }

    /// `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Token list view of the `class` attribute
    pub fn class_list(&self) -> DOMTokenList {
        DOMTokenList::from_string(self.get_attr("class").unwrap_or(""))
    }

    /// Check class membership
    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().contains(class)
    }

    /// Add a class, writing back through the `class` attribute
    pub fn add_class(&mut self, class: &str) {
        let mut list = self.class_list();
        list.add(&[class]);
        self.set_attr("class", &list.value());
    }

    /// Remove a class. The attribute stays (possibly empty) like in browsers.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_attr("class") {
            return;
        }
        let mut list = self.class_list();
        list.remove(&[class]);
        self.set_attr("class", &list.value());
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_roundtrip() {
        let mut elem = ElementData::new("IMG");
        assert_eq!(elem.tag, "img");

        elem.set_attr("alt", "Cute puppy");
        assert_eq!(elem.get_attr("alt"), Some("Cute puppy"));

        elem.set_attr("alt", "");
        assert_eq!(elem.get_attr("alt"), Some(""));
        assert_eq!(elem.attrs.len(), 1);

        assert!(elem.remove_attr("alt"));
        assert!(!elem.remove_attr("alt"));
        assert_eq!(elem.get_attr("alt"), None);
    }

    #[test]
    fn test_class_helpers() {
        let mut elem = ElementData::new("p");
        assert!(!elem.has_class("wn-audit-target"));

        elem.add_class("lead");
        elem.add_class("wn-audit-target");
        elem.add_class("wn-audit-target");
        assert_eq!(elem.get_attr("class"), Some("lead wn-audit-target"));

        elem.remove_class("wn-audit-target");
        assert_eq!(elem.get_attr("class"), Some("lead"));
        assert!(!elem.has_class("wn-audit-target"));
    }

    #[test]
    fn test_remove_class_without_attribute() {
        let mut elem = ElementData::new("span");
        elem.remove_class("anything");
        assert!(!elem.has_attr("class"));
    }
}
