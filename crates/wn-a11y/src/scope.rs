//! Audit scopes
//!
//! Turns a requested scope into the ordered list of elements to inspect.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::render_tree::RenderTree;

/// Tags inspected by every scope except `Component`
pub const DEFAULT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "button", "a", "img", "label", "input",
    "select", "textarea", "i", "nav", "header", "footer", "main", "section", "figcaption",
];

/// Section id used for elements outside any `<section>`
pub const LAYOUT_SECTION: &str = "layout";

/// What one audit run inspects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AuditScope {
    /// Elements of the page currently displayed
    Current,
    /// Everything reachable in the document
    Global,
    /// Selected pages, optionally narrowed to sections
    Custom {
        page_ids: BTreeSet<String>,
        #[serde(default)]
        section_ids: BTreeSet<String>,
    },
    /// Elements matching caller selectors, plus their descendants
    Component { selectors: Vec<String> },
}

impl AuditScope {
    /// Uppercase label recorded in score history
    pub fn label(&self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Global => "GLOBAL",
            Self::Custom { .. } => "CUSTOM",
            Self::Component { .. } => "COMPONENT",
        }
    }

    pub fn custom<P, S>(page_ids: P, section_ids: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self::Custom {
            page_ids: page_ids.into_iter().map(Into::into).collect(),
            section_ids: section_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Component scope from comma-separated user input.
    ///
    /// `"a, .card , "` becomes `["a", ".card"]`.
    pub fn component_from_input(input: &str) -> Self {
        Self::Component {
            selectors: input
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Page id to the ordered section ids that page renders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRegistry {
    pages: BTreeMap<String, Vec<String>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, page_id: impl Into<String>, sections: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pages
            .insert(page_id.into(), sections.into_iter().map(Into::into).collect());
    }

    pub fn with_page<I, S>(mut self, page_id: impl Into<String>, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(page_id, sections);
        self
    }

    pub fn sections(&self, page_id: &str) -> Option<&[String]> {
        self.pages.get(page_id).map(Vec::as_slice)
    }

    pub fn contains_page(&self, page_id: &str) -> bool {
        self.pages.contains_key(page_id)
    }

    pub fn contains_section(&self, section_id: &str) -> bool {
        self.pages.values().flatten().any(|s| s == section_id)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// One element selected for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<N> {
    pub node: N,
    /// Position in the scope's element list, before section filtering
    pub index: usize,
    /// Id of the nearest enclosing `<section>`, or `layout`
    pub section_id: String,
}

impl<N> Candidate<N> {
    /// Run-scoped annotation id
    pub fn audit_id(&self) -> String {
        format!("audit-el-{}", self.index)
    }
}

/// Section an element belongs to
pub fn section_of<T: RenderTree + ?Sized>(tree: &T, node: T::Node) -> String {
    tree.closest(node, "section")
        .and_then(|s| tree.attribute(s, "id"))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| LAYOUT_SECTION.to_string())
}

/// Resolve `scope` into candidates, in document order
pub fn resolve_scope<T>(
    tree: &T,
    scope: &AuditScope,
    current_page_id: &str,
    registry: &PageRegistry,
) -> Vec<Candidate<T::Node>>
where
    T: RenderTree + ?Sized,
    T::Node: Hash,
{
    let elements = match scope {
        AuditScope::Current | AuditScope::Global => tree.elements_by_tag(DEFAULT_TAGS),
        AuditScope::Custom { page_ids, .. } => {
            warn_unknown_ids(scope, registry);
            if !page_ids.contains(current_page_id) {
                tracing::debug!(
                    "Custom scope excludes current page `{}`; skipping DOM walk",
                    current_page_id
                );
                return Vec::new();
            }
            tree.elements_by_tag(DEFAULT_TAGS)
        }
        AuditScope::Component { selectors } => component_elements(tree, selectors),
    };

    let section_filter = match scope {
        AuditScope::Custom { section_ids, .. } if !section_ids.is_empty() => Some(section_ids),
        _ => None,
    };

    let candidates: Vec<_> = elements
        .into_iter()
        .enumerate()
        .map(|(index, node)| Candidate {
            node,
            index,
            section_id: section_of(tree, node),
        })
        .filter(|c| section_filter.is_none_or(|ids| ids.contains(&c.section_id)))
        .collect();

    tracing::debug!("Scope {} resolved to {} candidates", scope.label(), candidates.len());
    candidates
}

fn component_elements<T>(tree: &T, selectors: &[String]) -> Vec<T::Node>
where
    T: RenderTree + ?Sized,
    T::Node: Hash,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for selector in selectors.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match tree.select_all(&format!("{0}, {0} *", selector)) {
            Ok(nodes) => out.extend(nodes.into_iter().filter(|n| seen.insert(*n))),
            Err(e) => tracing::warn!("Skipping component selector: {}", e),
        }
    }
    out
}

fn warn_unknown_ids(scope: &AuditScope, registry: &PageRegistry) {
    let AuditScope::Custom { page_ids, section_ids } = scope else {
        return;
    };
    if registry.is_empty() {
        return;
    }
    for page in page_ids.iter().filter(|p| !registry.contains_page(p)) {
        tracing::warn!("Custom scope names unknown page `{}`", page);
    }
    for section in section_ids
        .iter()
        .filter(|s| *s != LAYOUT_SECTION && !registry.contains_section(s))
    {
        tracing::warn!("Custom scope names unknown section `{}`", section);
    }
}
