//! Edge case tests for wn-a11y
//!
//! Scope boundaries, cancellation, issue location and odd markup.

use wn_a11y::annotate::{ATTR_AUDIT_ID, ATTR_ERROR};
use wn_a11y::session::page_path;
use wn_a11y::{
    AuditConfig, AuditScope, AuditSession, AuditState, IssueFilter, IssueTarget, IssueType,
    MemoryStore, PageRegistry, RenderTree, Severity, contrast_ratio,
};
use wn_dom::Document;

fn load(body: &str) -> Document {
    wn_html::parse(&format!("<!DOCTYPE html><html><head></head><body>{}</body></html>", body)).unwrap()
}

fn session() -> AuditSession<MemoryStore> {
    AuditSession::start(AuditConfig::default(), MemoryStore::new())
}

// ============================================================================
// CONTRAST PROPERTIES
// ============================================================================

#[test]
fn test_contrast_symmetry_and_identity() {
    let pairs = [
        ("rgb(0, 0, 0)", "rgb(255, 255, 255)"),
        ("rgb(119, 119, 119)", "rgb(30, 41, 59)"),
        ("rgba(244, 63, 94, 0.4)", "rgb(15, 23, 42)"),
    ];
    for (a, b) in pairs {
        assert!((contrast_ratio(a, b) - contrast_ratio(b, a)).abs() < 1e-12);
        assert!(contrast_ratio(a, b) >= 1.0);
        assert!((contrast_ratio(a, a) - 1.0).abs() < 1e-12);
    }
    assert!((contrast_ratio("rgb(0, 0, 0)", "rgb(255, 255, 255)") - 21.0).abs() < 1e-9);
}

#[test]
fn test_unparseable_colors_fall_back_to_white() {
    assert!((contrast_ratio("currentcolor", "rgb(255, 255, 255)") - 1.0).abs() < 1e-12);
}

// ============================================================================
// SCOPES
// ============================================================================

#[test]
fn test_empty_document_scores_perfect() {
    let mut doc = load("");
    let mut s = session();
    let score = s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    assert!(s.issues().is_empty());
    assert_eq!((score.overall, score.contrast, score.aria, score.semantic), (100, 100, 100, 100));
    assert_eq!(s.state(), AuditState::Complete);
}

#[test]
fn test_custom_scope_excluding_current_page() {
    let mut doc = load(r#"<img src="x.png"><button></button>"#);
    let mut s = session();
    let scope = AuditScope::custom(["pricing"], Vec::<String>::new());
    let score = s.run_audit_blocking(&mut doc, &scope, &PageRegistry::new(), None);
    assert!(s.issues().is_empty());
    assert_eq!(score.overall, 100);
    assert_eq!(score.scope, "CUSTOM");
    assert!(doc.elements_with_attribute(ATTR_AUDIT_ID).is_empty());
}

#[test]
fn test_custom_scope_section_filter() {
    let mut doc = load(
        r#"<section id="hero"><img src="a.png"></section><section id="faq"><img src="b.png"></section>"#,
    );
    let mut s = session();
    let registry = PageRegistry::new().with_page("home", ["hero", "faq"]);
    let scope = AuditScope::custom(["home"], ["faq"]);
    s.run_audit_blocking(&mut doc, &scope, &registry, None);

    assert_eq!(s.issues().len(), 1);
    let issue = &s.issues()[0];
    assert_eq!(issue.section_id.as_deref(), Some("faq"));
    // Index counts the unfiltered element list
    assert_eq!(issue.audit_id.as_deref(), Some("audit-el-3"));
}

#[test]
fn test_component_scope_skips_invalid_selector() {
    let mut doc = load(r#"<div class="card"><img src="a.png"></div><img src="b.png">"#);
    let mut s = session();
    let scope = AuditScope::Component {
        selectors: vec!["[[".into(), ".card".into()],
    };
    let score = s.run_audit_blocking(&mut doc, &scope, &PageRegistry::new(), None);
    assert_eq!(s.issues().len(), 1);
    assert_eq!(score.scope, "COMPONENT");

    let card_img = doc.select_all(".card img").unwrap()[0];
    assert_eq!(doc.attribute(card_img, ATTR_ERROR).as_deref(), Some("Missing Alt Text"));
}

#[test]
fn test_component_scope_overlapping_selectors() {
    let mut doc = load(r#"<div class="card"><img src="a.png"></div>"#);
    let mut s = session();
    let scope = AuditScope::component_from_input(".card, img");
    s.run_audit_blocking(&mut doc, &scope, &PageRegistry::new(), None);
    assert_eq!(s.issues().len(), 1);
}

#[test]
fn test_component_scope_includes_non_default_tags() {
    let mut doc = load(r#"<div class="widget" tabindex="0" style="display:none"><b>x</b></div>"#);
    let mut s = session();
    s.run_audit_blocking(
        &mut doc,
        &AuditScope::component_from_input(".widget"),
        &PageRegistry::new(),
        None,
    );
    assert_eq!(s.issues().len(), 1);
    assert_eq!(s.issues()[0].issue_type, IssueType::Navigation);
    assert_eq!(s.issues()[0].element_name, "DIV");
}

// ============================================================================
// CANCELLATION
// ============================================================================

#[test]
fn test_abandoned_run_is_cleaned_by_next_run() {
    let mut doc = load(r#"<img src="a.png"><p style="color:#ddd">faint</p>"#);
    let mut s = session();

    let pending = smol::block_on(smol::future::poll_once(s.run_audit(
        &mut doc,
        &AuditScope::Global,
        &PageRegistry::new(),
        None,
    )));
    assert!(pending.is_none());
    assert!(s.is_auditing());
    assert!(!s.is_audit_active());
    assert!(s.issues().is_empty());
    assert!(doc.style_sheet("wn-audit-styles").is_none());
    assert_eq!(doc.elements_with_attribute(ATTR_AUDIT_ID).len(), 2);

    let score = s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    assert_eq!(score.issues_count, 2);
    assert_eq!(s.issues().len(), 2);
    assert_eq!(s.history().len(), 1);
    assert_eq!(doc.elements_with_attribute(ATTR_AUDIT_ID).len(), 2);
}

#[test]
fn test_clear_after_abandoned_run() {
    let mut doc = load(r#"<img src="a.png">"#);
    let mut s = session();
    let _ = smol::block_on(smol::future::poll_once(s.run_audit(
        &mut doc,
        &AuditScope::Global,
        &PageRegistry::new(),
        None,
    )));
    s.clear_audit(&mut doc);
    assert_eq!(s.state(), AuditState::Idle);
    assert!(!s.is_auditing());
    assert!(doc.elements_with_attribute(ATTR_AUDIT_ID).is_empty());
}

// ============================================================================
// LOCATING ISSUES
// ============================================================================

#[test]
fn test_locate_element_then_missing_after_clear() {
    let mut doc = load(r#"<p>ok</p><img src="a.png">"#);
    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    let issue = s.issues()[0].clone();
    let img = doc.elements_by_tag(&["img"])[0];
    assert_eq!(s.locate(&doc, &issue), IssueTarget::Element(img));

    s.clear_audit(&mut doc);
    assert_eq!(s.locate(&doc, &issue), IssueTarget::Missing);
}

#[test]
fn test_locate_off_screen_issue_navigates() {
    let mut doc = load(r#"<img src="a.png">"#);
    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);

    let mut issue = s.issues()[0].clone();
    issue.is_off_screen = true;
    assert_eq!(
        s.locate(&doc, &issue),
        IssueTarget::Navigate {
            page_id: "home".into(),
            path: "/".into()
        }
    );

    issue.page_id = "pricing".into();
    assert_eq!(
        s.locate(&doc, &issue),
        IssueTarget::Navigate {
            page_id: "pricing".into(),
            path: page_path("pricing")
        }
    );
}

#[test]
fn test_filtered_issues() {
    let mut doc = load(r#"<img src="a.png"><header>top</header><p style="color:#999">meh</p>"#);
    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    assert_eq!(s.issues().len(), 3);

    let aria = s.filtered_issues(&IssueFilter::new().issue_type(IssueType::Aria));
    assert_eq!(aria.len(), 2);
    let critical_aria = s.filtered_issues(
        &IssueFilter::new()
            .issue_type(IssueType::Aria)
            .severity(Severity::Critical),
    );
    assert_eq!(critical_aria.len(), 1);
    assert!(s.filtered_issues(&IssueFilter::new().page("pricing")).is_empty());
}

// ============================================================================
// ODD MARKUP
// ============================================================================

#[test]
fn test_hidden_attribute_and_visibility() {
    let mut doc = load(
        r#"<button hidden>Go</button><p style="visibility:hidden; color:#eee">ghost</p><span style="opacity:0"><a href="/x">faded</a></span>"#,
    );
    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    // The hidden button is focusable; the invisible paragraph is skipped
    assert_eq!(s.issues().len(), 1);
    assert_eq!(s.issues()[0].element_name, "BUTTON");
}

#[test]
fn test_fixed_position_link_has_no_offset_parent() {
    let mut doc = load(r#"<a href="/top" style="position:fixed; top:0">Top</a>"#);
    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    assert_eq!(s.issues().len(), 1);
    assert_eq!(s.issues()[0].issue_type, IssueType::Navigation);
}

#[test]
fn test_uppercase_markup_and_tag_attribute() {
    let mut doc = load(r#"<IMG SRC="a.png"><BUTTON>Ok</BUTTON>"#);
    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    assert_eq!(s.issues().len(), 1);
    let img = doc.elements_by_tag(&["img"])[0];
    assert_eq!(doc.attribute(img, "data-wn-tag").as_deref(), Some("IMG"));
}

#[test]
fn test_other_session_state_is_independent() {
    let mut first_doc = load(r#"<img src="a.png">"#);
    let mut second_doc = load(r#"<p>fine</p>"#);
    let mut first = session();
    let mut second = AuditSession::start(AuditConfig::default().with_page("about"), MemoryStore::new());
    first.run_audit_blocking(&mut first_doc, &AuditScope::Global, &PageRegistry::new(), None);
    second.run_audit_blocking(&mut second_doc, &AuditScope::Global, &PageRegistry::new(), None);

    assert_eq!(first.issues().len(), 1);
    assert!(second.issues().is_empty());
    assert_eq!(first.issues()[0].page_id, "home");
    assert_eq!(second.config().current_page_id, "about");
}

#[test]
fn test_deeply_nested_button_label() {
    let depth = 5000;
    let mut doc = load(&format!(
        r#"<button>{}Save<span style="display:none"> draft</span>{}</button>"#,
        "<span>".repeat(depth),
        "</span>".repeat(depth)
    ));
    let button = doc.elements_by_tag(&["button"])[0];
    assert_eq!(doc.inner_text(button), "Save");

    let mut s = session();
    s.run_audit_blocking(&mut doc, &AuditScope::Global, &PageRegistry::new(), None);
    assert!(s.issues().iter().all(|i| i.element_name != "BUTTON"));
}
