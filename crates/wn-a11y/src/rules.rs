//! Element classifier and rule engine
//!
//! Rules run per element in a fixed order: focus visibility, then (unless
//! the element is hidden and was not flagged) contrast, image alt text,
//! accessible name and landmark role. Each element is independent of the
//! others.

use wn_dom::{ComputedStyle, DOMRect, leading_number};

use crate::background::effective_background;
use crate::config::AuditConfig;
use crate::contrast::{ContrastChecker, contrast_ratio};
use crate::issue::{Issue, IssueIds, IssueType, Severity, wcag};
use crate::render_tree::RenderTree;

const FOCUSABLE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];
const TEXT_TAGS: &[&str] = &[
    "p", "span", "h1", "h2", "h3", "h4", "h5", "h6", "button", "a", "label",
];
const NAMED_TAGS: &[&str] = &["button", "a"];
const LANDMARKS: &[(&str, &str)] = &[
    ("header", "banner"),
    ("nav", "navigation"),
    ("footer", "contentinfo"),
    ("main", "main"),
];

const IMAGE_ALT_SUGGESTION: &str = "Add descriptive alt text";

/// Everything the rules read about one element
#[derive(Debug, Clone)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,
    pub style: ComputedStyle,
    pub rect: DOMRect,
    pub has_offset_parent: bool,
    pub viewport_width: f64,
    pub inner_text: String,
    /// Effective background color behind the element
    pub background: String,
    pub alt: Option<String>,
    pub aria_label: Option<String>,
    pub title: Option<String>,
    pub aria_labelledby: Option<String>,
    pub tabindex: Option<String>,
    pub role: Option<String>,
}

impl ElementSnapshot {
    pub fn capture<T: RenderTree + ?Sized>(tree: &T, node: T::Node) -> Self {
        let tag = tree.tag_name(node);
        let background = if TEXT_TAGS.contains(&tag.as_str()) {
            effective_background(tree, node)
        } else {
            String::new()
        };
        Self {
            style: tree.computed_style(node),
            rect: tree.bounding_rect(node),
            has_offset_parent: tree.has_offset_parent(node),
            viewport_width: tree.viewport_width(),
            inner_text: tree.inner_text(node),
            background,
            alt: tree.attribute(node, "alt"),
            aria_label: tree.attribute(node, "aria-label"),
            title: tree.attribute(node, "title"),
            aria_labelledby: tree.attribute(node, "aria-labelledby"),
            tabindex: tree.attribute(node, "tabindex"),
            role: tree.attribute(node, "role"),
            tag,
        }
    }

    /// Uppercase tag as reported by `Element.tagName`
    pub fn tag_upper(&self) -> String {
        self.tag.to_ascii_uppercase()
    }

    /// Natively focusable, or opted in with a non-negative tabindex
    pub fn is_focusable(&self) -> bool {
        FOCUSABLE_TAGS.contains(&self.tag.as_str())
            || self
                .tabindex
                .as_deref()
                .and_then(leading_number)
                .is_some_and(|t| t.trunc() >= 0.0)
    }

    /// Hidden from sighted users through styling
    pub fn is_hidden(&self) -> bool {
        let style = &self.style;
        style.is_display_none()
            || style.visibility == "hidden"
            || style.opacity_value() == 0.0
            || style.clip == "rect(0px, 0px, 0px, 0px)"
            || style.clip_path == "inset(50%)"
    }

    /// Without a box, pushed past the viewport, or outside the layout flow
    pub fn is_off_screen(&self, margin: f64) -> bool {
        let rect = &self.rect;
        rect.width == 0.0
            || rect.height == 0.0
            || rect.right() < -margin
            || rect.left() > self.viewport_width + margin
            || !self.has_offset_parent
    }

    pub fn has_accessible_name(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        !self.inner_text.trim().is_empty()
            || present(&self.aria_label)
            || present(&self.title)
            || present(&self.aria_labelledby)
    }
}

/// Highlight payload for a flagged element
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Tooltip error text
    pub error: String,
    pub wcag: &'static str,
    pub suggestion: Option<String>,
}

/// Result of inspecting one element
#[derive(Debug, Default)]
pub struct Inspection {
    pub issues: Vec<Issue>,
    /// Set when at least one rule fired; the last rule's text wins
    pub annotation: Option<Annotation>,
}

impl Inspection {
    pub fn is_flagged(&self) -> bool {
        self.annotation.is_some()
    }

    fn flag(&mut self, error: String, clause: &'static str, suggestion: Option<String>) {
        let suggestion = suggestion.or_else(|| self.annotation.take().and_then(|a| a.suggestion));
        self.annotation = Some(Annotation {
            error,
            wcag: clause,
            suggestion,
        });
    }
}

/// Where the inspected element lives
#[derive(Debug, Clone, Copy)]
pub struct ElementContext<'a> {
    pub audit_id: &'a str,
    pub page_id: &'a str,
    pub section_id: &'a str,
}

/// Applies the WCAG rules to element snapshots
#[derive(Debug, Clone)]
pub struct RuleEngine {
    off_screen_margin: f64,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(&AuditConfig::default())
    }
}

impl RuleEngine {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            off_screen_margin: config.off_screen_margin,
        }
    }

    /// Evaluate every rule against one element
    pub fn inspect(&self, el: &ElementSnapshot, ctx: ElementContext<'_>, ids: &mut IssueIds) -> Inspection {
        let mut out = Inspection::default();
        let hidden = el.is_hidden();
        let tag = el.tag.as_str();
        let issue = |ids: &mut IssueIds,
                     rule: &str,
                     issue_type: IssueType,
                     severity: Severity,
                     element_name: String,
                     message: String| Issue {
            id: ids.next(rule),
            issue_type,
            severity,
            element_name,
            message,
            page_id: ctx.page_id.to_string(),
            section_id: Some(ctx.section_id.to_string()),
            ratio: None,
            target: None,
            suggestion: None,
            is_off_screen: false,
            audit_id: Some(ctx.audit_id.to_string()),
            wcag: None,
        };

        // 2.4.3: focusable but not visible
        if el.is_focusable() && (hidden || el.is_off_screen(self.off_screen_margin)) {
            let mut found = issue(
                ids,
                "nav-hidden",
                IssueType::Navigation,
                Severity::Critical,
                el.tag_upper(),
                format!(
                    "Element <{}> is focusable but visually hidden or off-screen, violating WCAG 2.4.3 (Focus Order). Keyboard users may lose their position.",
                    tag
                ),
            );
            found.wcag = Some(wcag::FOCUS_ORDER.into());
            out.issues.push(found);
            out.flag("WCAG 2.4.3: Hidden Focusable".into(), wcag::FOCUS_ORDER, None);
        }

        if hidden && !out.is_flagged() {
            return out;
        }

        // 1.4.3: text contrast against the painted background
        if TEXT_TAGS.contains(&tag) {
            let ratio = contrast_ratio(&el.style.color, &el.background);
            let target = ContrastChecker::required_ratio(el.style.font_size_px(), el.style.font_weight_value());
            if ratio < target {
                let severity = if ratio < 2.5 { Severity::Critical } else { Severity::Warning };
                let mut found = issue(
                    ids,
                    "contrast",
                    IssueType::Contrast,
                    severity,
                    el.tag_upper(),
                    format!("Contrast ratio is {:.2}:1 (Target {}:1)", ratio, target),
                );
                found.ratio = Some(ratio);
                found.target = Some(target);
                found.wcag = Some(wcag::CONTRAST_MINIMUM.into());
                out.issues.push(found);
                out.flag(format!("Low Contrast: {:.2}:1", ratio), wcag::CONTRAST_MINIMUM, None);
            }
        }

        // 1.1.1: images need alt text
        if tag == "img" && el.alt.as_deref().is_none_or(|alt| alt.trim().is_empty()) {
            let mut found = issue(
                ids,
                "aria-img",
                IssueType::Aria,
                Severity::Critical,
                "Image".into(),
                "Image is missing an alternative text description.".into(),
            );
            found.suggestion = Some(IMAGE_ALT_SUGGESTION.into());
            found.wcag = Some(wcag::NON_TEXT_CONTENT.into());
            out.issues.push(found);
            out.flag(
                "Missing Alt Text".into(),
                wcag::NON_TEXT_CONTENT,
                Some(format!("{}.", IMAGE_ALT_SUGGESTION)),
            );
        }

        // 4.1.2: interactive elements need a name
        if NAMED_TAGS.contains(&tag) && !el.has_accessible_name() {
            let mut found = issue(
                ids,
                "aria-name",
                IssueType::Aria,
                Severity::Critical,
                el.tag_upper(),
                format!("Interactive <{}> is missing an accessible name.", tag),
            );
            found.wcag = Some(wcag::NAME_ROLE_VALUE.into());
            out.issues.push(found);
            out.flag("Missing Accessible Label".into(), wcag::NAME_ROLE_VALUE, None);
        }

        // 1.3.1: landmarks without an explicit role
        let explicit_role = el.role.as_deref().is_some_and(|r| !r.is_empty());
        if let Some(&(_, role)) = LANDMARKS.iter().find(|(t, _)| *t == tag).filter(|_| !explicit_role) {
            let suggestion = format!("Suggest role=\"{}\"", role);
            let mut found = issue(
                ids,
                "aria-landmark",
                IssueType::Aria,
                Severity::Info,
                el.tag_upper(),
                format!("Landmark <{}> missing explicit role.", tag),
            );
            found.suggestion = Some(suggestion.clone());
            found.wcag = Some(wcag::INFO_AND_RELATIONSHIPS.into());
            out.issues.push(found);
            out.flag(
                format!("{} Landmark role missing", el.tag_upper()),
                wcag::INFO_AND_RELATIONSHIPS,
                Some(suggestion),
            );
        }

        if !out.issues.is_empty() {
            tracing::debug!("{} {}: {} issue(s)", ctx.audit_id, el.tag_upper(), out.issues.len());
        }
        out
    }
}
