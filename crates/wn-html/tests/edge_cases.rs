//! Edge case tests for wn-html
//!
//! Malformed input plus the style/layout facts the auditor depends on.

use wn_html::{HtmlParser, ParseError, parse};

fn first(doc: &wn_dom::Document, tag: &str) -> wn_dom::NodeId {
    doc.elements_by_tag(&[tag])[0]
}

// ============================================================================
// EMPTY AND MALFORMED INPUT
// ============================================================================

#[test]
fn test_parse_only_whitespace() {
    let doc = parse("   \t\n\r\n   ").unwrap();
    assert!(doc.body().is_valid());
    assert!(doc.elements_by_tag(&["p"]).is_empty());
}

#[test]
fn test_parse_only_doctype() {
    let doc = parse("<!DOCTYPE html>").unwrap();
    assert!(doc.has_doctype());
}

#[test]
fn test_parse_unclosed_tags() {
    let doc = parse("<div><p><span>text").unwrap();
    let span = first(&doc, "span");
    assert_eq!(doc.tree().text_content(span), "text");
}

#[test]
fn test_uppercase_markup_is_lowercased() {
    let doc = parse("<DIV ID=Main CLASS='A b'><IMG SRC=x.png></DIV>").unwrap();
    let div = first(&doc, "div");
    assert_eq!(doc.tree().attr(div, "id"), Some("Main"));
    assert!(doc.tree().element(div).unwrap().has_class("b"));
    assert_eq!(doc.elements_by_tag(&["img"]).len(), 1);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = HtmlParser::new().parse_file("/nonexistent/page.html").unwrap_err();
    assert!(matches!(err, ParseError::Io(_)));
}

#[test]
fn test_non_utf8_file_is_decoded_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.html");
    std::fs::write(&path, b"<p>caf\xe9 menu</p>").unwrap();
    let doc = HtmlParser::new().parse_file(&path).unwrap();
    assert_eq!(doc.tree().text_content(first(&doc, "p")), "caf\u{fffd} menu");
}

// ============================================================================
// STYLE AND LAYOUT
// ============================================================================

#[test]
fn test_hidden_attribute_and_display_none() {
    let doc = parse(r#"<p hidden>a</p><span style="display:none">b</span>"#).unwrap();
    let p = doc.tree().element(first(&doc, "p")).unwrap();
    let span = doc.tree().element(first(&doc, "span")).unwrap();
    assert_eq!(p.style.display, "none");
    assert!(span.rect.is_empty());
    assert!(doc.offset_parent(first(&doc, "span")).is_none());
}

#[test]
fn test_visually_hidden_pattern() {
    let html = r#"<a href="/skip" style="position:absolute; left:-10000px">Skip</a>"#;
    let doc = parse(html).unwrap();
    let a = first(&doc, "a");
    let rect = doc.tree().element(a).unwrap().rect;
    assert!(rect.right() < -5000.0);
    assert!(doc.offset_parent(a).is_some());
}

#[test]
fn test_nested_background_inheritance_is_not_applied() {
    let doc = parse(r#"<div style="background:#000"><p style="color:#fff">x</p></div>"#).unwrap();
    let p = doc.tree().element(first(&doc, "p")).unwrap();
    // Backgrounds do not inherit; the auditor walks ancestors itself
    assert_eq!(p.style.background_color, "rgba(0, 0, 0, 0)");
    assert_eq!(p.style.color, "rgb(255, 255, 255)");
}

#[test]
fn test_text_elements_get_boxes() {
    let doc = parse("<main><h1>Title</h1><p>Body copy</p></main>").unwrap();
    for tag in ["main", "h1", "p"] {
        let rect = doc.tree().element(first(&doc, tag)).unwrap().rect;
        assert!(!rect.is_empty(), "{} should have a box", tag);
    }
}

// ============================================================================
// DEEP NESTING
// ============================================================================

#[test]
fn test_deeply_nested_document() {
    let depth = 5000;
    let html = format!(
        "{}<p>deep <a href=\"/x\">link</a></p>{}",
        "<div>".repeat(depth),
        "</div>".repeat(depth)
    );
    let doc = parse(&html).unwrap();
    assert_eq!(doc.elements_by_tag(&["div"]).len(), depth);

    let p = first(&doc, "p");
    assert_eq!(doc.tree().ancestors(p).count(), depth + 2);
    assert_eq!(doc.tree().text_content(doc.body()), "deep link");
    assert!(!doc.tree().element(p).unwrap().rect.is_empty());

    let markup = wn_html::to_html(&doc);
    assert!(markup.contains("<p>deep <a href=\"/x\">link</a></p></div></div>"));
}
