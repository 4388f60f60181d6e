//! HTML serialization
//!
//! Writes a `wn_dom::Document` back out as markup, including any audit
//! annotations and injected style elements.

use wn_dom::{Document, DomTree, NodeData, NodeId};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

enum Step {
    Node { id: NodeId, raw: bool },
    Close(NodeId),
}

/// Serialize the whole document
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    let tree = doc.tree();
    let mut stack: Vec<Step> = Vec::new();
    push_children(tree, tree.root(), false, &mut stack);

    while let Some(step) = stack.pop() {
        match step {
            Step::Node { id, raw } => write_node(tree, id, raw, &mut stack, &mut out),
            Step::Close(id) => {
                if let Some(elem) = tree.element(id) {
                    out.push_str("</");
                    out.push_str(&elem.tag);
                    out.push('>');
                }
            }
        }
    }
    out
}

/// Queue the children of `id` so the first child pops first
fn push_children(tree: &DomTree, id: NodeId, raw: bool, stack: &mut Vec<Step>) {
    let mark = stack.len();
    stack.extend(tree.children(id).map(|(child, _)| Step::Node { id: child, raw }));
    stack[mark..].reverse();
}

fn write_node(tree: &DomTree, id: NodeId, raw: bool, stack: &mut Vec<Step>, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.data {
        NodeData::Document => {}
        NodeData::Doctype { name } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Text(text) => {
            if raw {
                out.push_str(&text.content);
            } else {
                escape(&text.content, false, out);
            }
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for attr in &elem.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_TAGS.contains(&elem.tag.as_str()) {
                return;
            }
            stack.push(Step::Close(id));
            push_children(tree, id, RAW_TEXT_TAGS.contains(&elem.tag.as_str()), stack);
        }
    }
}

fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_structure() {
        let html = r#"<!DOCTYPE html><html><head><title>A &amp; B</title></head><body><p class="x" data-note="say &quot;hi&quot;">1 &lt; 2<br></p><img src="a.png"></body></html>"#;
        let doc = crate::parse(html).unwrap();
        assert_eq!(to_html(&doc), html);
    }

    #[test]
    fn test_style_text_is_raw() {
        let mut doc = crate::parse("<html><head></head><body></body></html>").unwrap();
        doc.insert_style_element("s", "a > b { content: \"&\"; }");
        assert!(to_html(&doc).contains("<style id=\"s\">a > b { content: \"&\"; }</style>"));
    }
}
