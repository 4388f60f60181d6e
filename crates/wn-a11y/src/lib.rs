//! Wonder Nest Accessibility Auditor
//!
//! Walks a styled document, evaluates WCAG-derived rules per element,
//! scores the page and writes highlight annotations back into the tree.
//!
//! Features:
//! - WCAG contrast math and effective-background resolution
//! - Rule engine: focus order, contrast, image alt, accessible name, landmarks
//! - Scopes: whole site, current page, page/section lists, selector lists
//! - Health scores with a bounded, persisted history
//! - Annotation renderer (marker class, data attributes, tooltip style sheet)
//! - `AuditSession` orchestrating runs with progress reporting

pub mod annotate;
pub mod background;
pub mod config;
pub mod contrast;
pub mod issue;
pub mod render_tree;
pub mod rules;
pub mod scope;
pub mod score;
pub mod session;
pub mod storage;

pub use annotate::AnnotationRenderer;
pub use background::effective_background;
pub use config::AuditConfig;
pub use contrast::{ContrastChecker, Rgb, contrast_ratio};
pub use issue::{Issue, IssueFilter, IssueIds, IssueType, Severity, wcag};
pub use render_tree::RenderTree;
pub use rules::{Annotation, ElementSnapshot, Inspection, RuleEngine};
pub use scope::{AuditScope, Candidate, PageRegistry, resolve_scope};
pub use score::{HealthScore, ScoreHistory, compute_health_score};
pub use session::{AuditObserver, AuditSession, AuditState, IssueTarget};
pub use storage::{KeyValueStore, MemoryStore};

use wn_css::SelectorError;

/// Audit error
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("invalid selector `{selector}`: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("history serialization failed: {0}")]
    History(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}
