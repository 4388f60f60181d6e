//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into the arena tree, then runs
//! style resolution so the document is ready for auditing.

use std::path::Path;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use wn_css::StyleResolver;
use wn_dom::{Document, DomTree, Node, NodeId};

use crate::ParseError;

const DEFAULT_URL: &str = "about:blank";

/// HTML5 parser
#[derive(Debug, Clone)]
pub struct HtmlParser {
    viewport: Option<(f64, f64)>,
    resolver: StyleResolver,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self {
            viewport: None,
            resolver: StyleResolver::new(),
        }
    }

    /// Lay documents out against a specific viewport
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Some((width, height));
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, DEFAULT_URL)
    }

    /// Read a file from disk and parse it.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD rather than rejected.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Document, ParseError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes, &format!("file://{}", path.display()))
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        self.parse_bytes(html.as_bytes(), url)
    }

    fn parse_bytes(&self, mut bytes: &[u8], url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut bytes)?;

        let mut document = Document::empty(url);
        if let Some((width, height)) = self.viewport {
            document.set_viewport(width, height);
        }
        let root = document.tree().root();
        convert_tree(&dom.document, document.tree_mut(), root);
        document.finalize();

        if !document.body().is_valid() {
            return Err(ParseError::MissingBody);
        }

        self.resolver.resolve(&mut document);
        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an RcDom tree into the arena tree.
///
/// Walks with an explicit stack so nesting depth is bounded by the heap.
fn convert_tree(document: &Handle, tree: &mut DomTree, root: NodeId) {
    let mut stack: Vec<(Handle, NodeId)> = vec![(document.clone(), root)];
    while let Some((handle, parent)) = stack.pop() {
        let Some(id) = convert_node(&handle, tree, parent) else {
            continue;
        };
        // Reversed so the first child is converted first
        for child in handle.children.borrow().iter().rev() {
            stack.push((child.clone(), id));
        }
    }
}

/// Convert one RcDom node; returns the node its children attach to
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Option<NodeId> {
    match &handle.data {
        RcNodeData::Document => Some(parent),
        RcNodeData::Doctype { name, .. } => {
            let id = tree.create_node(Node::doctype(name));
            tree.append_child(parent, id);
            None
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow();
            if !text.trim().is_empty() {
                let id = tree.create_text(&text);
                tree.append_child(parent, id);
            }
            None
        }
        RcNodeData::Comment { contents } => {
            let id = tree.create_comment(contents);
            tree.append_child(parent, id);
            None
        }
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element(&name.local);
            if let Some(elem) = tree.element_mut(id) {
                for attr in attrs.borrow().iter() {
                    elem.set_attr(&attr.name.local, &attr.value);
                }
            }
            tree.append_child(parent, id);
            Some(id)
        }
        RcNodeData::ProcessingInstruction { .. } => None,
    }
}
