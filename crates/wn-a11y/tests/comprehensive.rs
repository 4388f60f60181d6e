//! Comprehensive tests for wn-a11y
//!
//! Full audit runs over documents parsed with wn-html.

use wn_a11y::annotate::{ATTR_AUDIT_ID, ATTR_ERROR, ATTR_SUGGESTION, ATTR_TAG, ATTR_WCAG, MARKER_CLASS};
use wn_a11y::{
    AuditConfig, AuditScope, AuditSession, IssueType, MemoryStore, PageRegistry, RenderTree,
    Severity,
};
use wn_dom::Document;

fn load(body: &str) -> Document {
    wn_html::parse(&format!("<!DOCTYPE html><html><head><title>t</title></head><body>{}</body></html>", body))
        .unwrap()
}

fn session() -> AuditSession<MemoryStore> {
    AuditSession::start(AuditConfig::default(), MemoryStore::new())
}

fn audit(doc: &mut Document) -> AuditSession<MemoryStore> {
    let mut s = session();
    s.run_audit_blocking(doc, &AuditScope::Global, &PageRegistry::new(), None);
    s
}

fn count(s: &AuditSession<MemoryStore>, t: IssueType, sev: Severity) -> usize {
    s.issues()
        .iter()
        .filter(|i| i.issue_type == t && i.severity == sev)
        .count()
}

// ============================================================================
// RULES ON REAL DOCUMENTS
// ============================================================================

#[test]
fn test_missing_alt_text() {
    let mut doc = load(r#"<img src="a.png"><img src="b.png" alt=""><img src="c.png" alt="Cute puppy">"#);
    let s = audit(&mut doc);
    assert_eq!(s.issues().len(), 2);
    assert_eq!(count(&s, IssueType::Aria, Severity::Critical), 2);
    for issue in s.issues() {
        assert_eq!(issue.suggestion.as_deref(), Some("Add descriptive alt text"));
        assert_eq!(issue.wcag.as_deref(), Some("1.1.1"));
    }
}

#[test]
fn test_button_names() {
    let mut doc = load(r#"<button>Submit</button><button><i class="icon"></i></button>"#);
    let s = audit(&mut doc);
    assert_eq!(s.issues().len(), 1);
    let issue = &s.issues()[0];
    assert_eq!((issue.issue_type, issue.severity), (IssueType::Aria, Severity::Critical));
    assert_eq!(issue.element_name, "BUTTON");
    assert_eq!(issue.wcag.as_deref(), Some("4.1.2"));
}

#[test]
fn test_aria_label_and_title_name_a_button() {
    let mut doc = load(r#"<button aria-label="Close"></button><a href="/x" title="Home"></a>"#);
    let s = audit(&mut doc);
    assert_eq!(count(&s, IssueType::Aria, Severity::Critical), 0);
}

#[test]
fn test_hidden_focusable_link() {
    let mut doc = load(r##"<a href="#" style="display:none">Hidden</a>"##);
    let s = audit(&mut doc);
    assert_eq!(s.issues().len(), 1);
    let issue = &s.issues()[0];
    assert_eq!((issue.issue_type, issue.severity), (IssueType::Navigation, Severity::Critical));
    assert_eq!(issue.wcag.as_deref(), Some("2.4.3"));

    let mut doc = load(r##"<a href="#">Visible</a>"##);
    assert!(audit(&mut doc).issues().is_empty());
}

#[test]
fn test_skip_link_positioned_off_screen() {
    let mut doc = load(r#"<a href="/main" style="position:absolute; left:-9999px">Skip to content</a>"#);
    let s = audit(&mut doc);
    assert_eq!(count(&s, IssueType::Navigation, Severity::Critical), 1);
}

#[test]
fn test_contrast_threshold_by_text_size() {
    // #777 on white is 4.48:1: fails body text, passes large text
    let mut doc = load(
        r#"<p style="color:#777">small</p><h2 style="color:#777">large</h2><p style="color:#777; font-size:14px; font-weight:bold">bold</p>"#,
    );
    let s = audit(&mut doc);
    assert_eq!(s.issues().len(), 1);
    let issue = &s.issues()[0];
    assert_eq!(issue.issue_type, IssueType::Contrast);
    assert_eq!(issue.severity, Severity::Warning);
    assert_eq!(issue.target, Some(4.5));
    assert_eq!(issue.message, "Contrast ratio is 4.48:1 (Target 4.5:1)");
}

#[test]
fn test_contrast_uses_ancestor_background() {
    let mut doc = load(
        r#"<div style="background-color:#1e293b"><p style="color:#334155">dim on dark</p><p style="color:#f8fafc">light on dark</p></div>"#,
    );
    let s = audit(&mut doc);
    assert_eq!(s.issues().len(), 1);
    assert_eq!(s.issues()[0].severity, Severity::Critical);
}

#[test]
fn test_contrast_with_extended_color_names() {
    let mut doc = load(
        r#"<p style="color: lavender">Faint text</p><div style="background-color: midnightblue"><p>Night text</p></div>"#,
    );
    let s = audit(&mut doc);
    assert_eq!(count(&s, IssueType::Contrast, Severity::Critical), 2);
    assert!(s.issues().iter().all(|i| i.ratio.is_some_and(|r| r < 1.5)));
}

#[test]
fn test_landmarks() {
    let mut doc = load(r#"<header>h</header><nav role="navigation">n</nav><main>m</main><footer>f</footer>"#);
    let s = audit(&mut doc);
    assert_eq!(count(&s, IssueType::Aria, Severity::Info), 3);
    let suggestions: Vec<_> = s.issues().iter().filter_map(|i| i.suggestion.as_deref()).collect();
    assert_eq!(
        suggestions,
        vec!["Suggest role=\"banner\"", "Suggest role=\"main\"", "Suggest role=\"contentinfo\""]
    );
}

#[test]
fn test_section_ids_on_issues() {
    let mut doc = load(r#"<section id="hero"><img src="x.png"></section><img src="y.png">"#);
    let s = audit(&mut doc);
    let sections: Vec<_> = s.issues().iter().map(|i| i.section_id.as_deref().unwrap()).collect();
    assert_eq!(sections, vec!["hero", "layout"]);
    assert!(s.issues().iter().all(|i| i.page_id == "home"));
}

// ============================================================================
// SCORING SCENARIO
// ============================================================================

#[test]
fn test_scenario_three_images_one_faded_paragraph() {
    let mut doc = load(
        r#"<img src="1.png"><img src="2.png"><img src="3.png"><p style="color:rgb(183, 183, 183)">faded</p>"#,
    );
    let s = audit(&mut doc);
    assert_eq!(count(&s, IssueType::Aria, Severity::Critical), 3);
    assert_eq!(count(&s, IssueType::Contrast, Severity::Critical), 1);

    let ratio = s.issues().iter().find_map(|i| i.ratio).unwrap();
    assert!((ratio - 2.0).abs() < 0.05);

    let score = s.health_score().unwrap();
    assert_eq!(score.aria, 76);
    assert_eq!(score.contrast, 95);
    assert_eq!(score.semantic, 100);
    assert_eq!(score.overall, 90);
    assert_eq!(score.issues_count, 4);
    assert_eq!(score.scope, "GLOBAL");
    assert!(score.is_healthy());
}

// ============================================================================
// ANNOTATION LIFECYCLE
// ============================================================================

#[test]
fn test_annotations_written_for_flagged_elements() {
    let mut doc = load(r#"<img src="x.png"><p>fine</p>"#);
    let _s = audit(&mut doc);
    let img = doc.elements_by_tag(&["img"])[0];
    let p = doc.elements_by_tag(&["p"])[0];

    assert!(doc.has_class(img, MARKER_CLASS));
    assert_eq!(doc.attribute(img, ATTR_TAG).as_deref(), Some("IMG"));
    assert_eq!(doc.attribute(img, ATTR_ERROR).as_deref(), Some("Missing Alt Text"));
    assert_eq!(doc.attribute(img, ATTR_SUGGESTION).as_deref(), Some("Add descriptive alt text."));
    assert_eq!(doc.attribute(img, ATTR_AUDIT_ID).as_deref(), Some("audit-el-0"));

    // Inspected but clean: id and tag only
    assert_eq!(doc.attribute(p, ATTR_AUDIT_ID).as_deref(), Some("audit-el-1"));
    assert!(!doc.has_class(p, MARKER_CLASS));
    assert!(doc.attribute(p, ATTR_ERROR).is_none());

    let css = doc.style_sheet("wn-audit-styles").unwrap();
    assert!(css.contains("content: attr(data-wn-tag)"));
}

#[test]
fn test_clear_removes_everything() {
    let mut doc = load(r#"<img src="x.png"><button></button><header>h</header>"#);
    let mut s = audit(&mut doc);
    assert!(s.is_audit_active());

    s.clear_audit(&mut doc);
    assert!(!s.is_audit_active());
    assert!(s.issues().is_empty());
    assert_eq!(s.progress(), 0.0);
    assert!(doc.style_sheet("wn-audit-styles").is_none());
    for attr in [ATTR_AUDIT_ID, ATTR_TAG, ATTR_ERROR, ATTR_WCAG, ATTR_SUGGESTION] {
        assert!(doc.elements_with_attribute(attr).is_empty(), "{} left behind", attr);
    }
    assert!(doc.elements().into_iter().all(|n| !doc.has_class(n, MARKER_CLASS)));
    // Last score survives a clear
    assert!(s.health_score().is_some());
}

#[test]
fn test_rerun_leaves_one_generation() {
    let mut doc = load(r#"<img src="x.png"><p style="color:#ccc">faint</p>"#);
    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    let first_ids: Vec<_> = s.issues().iter().map(|i| i.id.clone()).collect();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);

    assert_eq!(s.health_score().unwrap().issues_count, s.issues().len());
    assert_eq!(s.issues().len(), 2);
    assert!(s.issues().iter().all(|i| !first_ids.contains(&i.id)));
    assert_eq!(doc.elements_with_attribute(ATTR_ERROR).len(), 2);
    assert_eq!(s.history().len(), 2);

    let head = doc.head();
    let styles = doc
        .tree()
        .children(head)
        .filter(|(id, _)| doc.tree().attr(*id, "id") == Some("wn-audit-styles"))
        .count();
    assert_eq!(styles, 1);
}

#[test]
fn test_custom_css_appended() {
    let mut doc = load(r#"<img src="x.png">"#);
    let mut s = session();
    let extra = ".wn-audit-target { outline-color: #2563eb !important; }";
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), Some(extra));
    assert!(doc.style_sheet("wn-audit-styles").unwrap().contains(extra));
}

// ============================================================================
// HISTORY
// ============================================================================

#[test]
fn test_history_survives_sessions() {
    let mut doc = load(r#"<img src="x.png">"#);
    let mut first = session();
    first.run_audit_blocking(&mut doc, &AuditScope::Current, &PageRegistry::new(), None);
    let store = first.stop(&mut doc);

    let second = AuditSession::start(AuditConfig::default(), store);
    assert_eq!(second.history().len(), 1);
    assert_eq!(second.history().latest().unwrap().scope, "CURRENT");
}

#[test]
fn test_history_capacity() {
    let config = AuditConfig {
        history_capacity: 3,
        progress_steps: 0,
        ..AuditConfig::default()
    };
    let mut doc = load("<p>x</p>");
    let mut s = AuditSession::start(config, MemoryStore::new());
    for _ in 0..5 {
        s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    }
    assert_eq!(s.history().len(), 3);
    assert_eq!(s.progress(), 100.0);
}
