//! Audit issues

use std::fmt;

use serde::{Deserialize, Serialize};

/// WCAG success criteria cited by the rules
pub mod wcag {
    pub const NON_TEXT_CONTENT: &str = "1.1.1";
    pub const INFO_AND_RELATIONSHIPS: &str = "1.3.1";
    pub const CONTRAST_MINIMUM: &str = "1.4.3";
    pub const FOCUS_ORDER: &str = "2.4.3";
    pub const NAME_ROLE_VALUE: &str = "4.1.2";

    /// Human title for a clause
    pub fn title(clause: &str) -> Option<&'static str> {
        match clause {
            NON_TEXT_CONTENT => Some("Non-text Content"),
            INFO_AND_RELATIONSHIPS => Some("Info and Relationships"),
            CONTRAST_MINIMUM => Some("Contrast (Minimum)"),
            FOCUS_ORDER => Some("Focus Order"),
            NAME_ROLE_VALUE => Some("Name, Role, Value"),
            _ => None,
        }
    }
}

/// Rule category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Contrast,
    Semantic,
    #[serde(rename = "ARIA")]
    Aria,
    #[serde(rename = "SEO")]
    Seo,
    Navigation,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contrast => "Contrast",
            Self::Semantic => "Semantic",
            Self::Aria => "ARIA",
            Self::Seo => "SEO",
            Self::Navigation => "Navigation",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Blocks access for some users
    Critical,
    Warning,
    /// Advisory only
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Info => "Info",
        };
        f.write_str(s)
    }
}

/// One detected violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Uppercase tag name, or a friendly label such as `Image`
    pub element_name: String,
    pub message: String,
    pub page_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// The element lives on another page and cannot be located here
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_off_screen: bool,
    /// Value of the element's `data-wn-audit-id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag: Option<String>,
}

/// Session-scoped issue id generator (`dom-<rule>-<n>`)
#[derive(Debug, Default)]
pub struct IssueIds {
    next: u64,
}

impl IssueIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, rule: &str) -> String {
        self.next += 1;
        format!("dom-{}-{}", rule, self.next)
    }
}

/// Dashboard-style issue filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    pub issue_type: Option<IssueType>,
    pub severity: Option<Severity>,
    pub page_id: Option<String>,
    pub off_screen: Option<bool>,
}

impl IssueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = Some(issue_type);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn page(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    pub fn off_screen(mut self, off_screen: bool) -> Self {
        self.off_screen = Some(off_screen);
        self
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        self.issue_type.is_none_or(|t| t == issue.issue_type)
            && self.severity.is_none_or(|s| s == issue.severity)
            && self.page_id.as_ref().is_none_or(|p| *p == issue.page_id)
            && self.off_screen.is_none_or(|o| o == issue.is_off_screen)
    }

    pub fn apply<'a>(&self, issues: &'a [Issue]) -> Vec<&'a Issue> {
        issues.iter().filter(|i| self.matches(i)).collect()
    }
}
