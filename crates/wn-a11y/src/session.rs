//! Audit orchestration
//!
//! `AuditSession` sequences scope resolution, rule evaluation, the progress
//! phase, annotation and scoring. It owns the current issues and score and
//! the persisted history; the render tree is borrowed per call.
//!
//! State machine: `Idle -> Scanning -> Scoring -> Complete`, and any state
//! passes through `Clearing` back to `Idle`. A run always clears leftovers
//! first, so a dropped (cancelled) run never leaks into the next one.

use std::fmt;

use crate::annotate::{ATTR_AUDIT_ID, AnnotationRenderer};
use crate::config::AuditConfig;
use crate::issue::{Issue, IssueFilter, IssueIds};
use crate::render_tree::RenderTree;
use crate::rules::{ElementContext, ElementSnapshot, RuleEngine};
use crate::scope::{AuditScope, PageRegistry, resolve_scope};
use crate::score::{HealthScore, ScoreHistory, compute_health_score, now_millis};
use crate::storage::KeyValueStore;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditState {
    Idle,
    Scanning,
    Scoring,
    Complete,
    Clearing,
}

/// Receives state and progress changes so a host UI can repaint
pub trait AuditObserver {
    fn on_state(&mut self, _state: AuditState) {}
    fn on_progress(&mut self, _percent: f64) {}
}

/// Where a dashboard should take the user for an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueTarget<N> {
    /// The element is on another page
    Navigate { page_id: String, path: String },
    /// The annotated element on the current page
    Element(N),
    /// Annotation no longer present (cleared or node removed)
    Missing,
}

/// Route for a page id
pub fn page_path(page_id: &str) -> String {
    if page_id == "home" {
        "/".to_string()
    } else {
        format!("/{}", page_id)
    }
}

/// One auditing context with its own issues, score and history
pub struct AuditSession<S: KeyValueStore> {
    config: AuditConfig,
    store: S,
    engine: RuleEngine,
    renderer: AnnotationRenderer,
    ids: IssueIds,
    issues: Vec<Issue>,
    health: Option<HealthScore>,
    history: ScoreHistory,
    state: AuditState,
    progress: f64,
    active: bool,
    observer: Option<Box<dyn AuditObserver>>,
}

impl<S: KeyValueStore> fmt::Debug for AuditSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditSession")
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("issues", &self.issues.len())
            .field("history", &self.history.len())
            .finish()
    }
}

impl<S: KeyValueStore> AuditSession<S> {
    /// Create a session, loading persisted history from `store`
    pub fn start(config: AuditConfig, store: S) -> Self {
        let history = ScoreHistory::load(&store, &config.history_key, config.history_capacity);
        tracing::debug!("Audit session started with {} history entries", history.len());
        Self {
            engine: RuleEngine::new(&config),
            renderer: AnnotationRenderer::new(config.style_node_id.clone()),
            ids: IssueIds::new(),
            issues: Vec::new(),
            health: None,
            history,
            state: AuditState::Idle,
            progress: 0.0,
            active: false,
            observer: None,
            config,
            store,
        }
    }

    /// Clear annotations from `tree`, persist history and hand back the store
    pub fn stop<T: RenderTree + ?Sized>(mut self, tree: &mut T) -> S {
        self.clear_audit(tree);
        self.persist_history();
        self.store
    }

    pub fn set_observer(&mut self, observer: impl AuditObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Run one audit over `tree`.
    ///
    /// Leftovers from a previous (or abandoned) run are cleared first. The
    /// scoring phase yields to the executor between progress ticks.
    pub async fn run_audit<T>(
        &mut self,
        tree: &mut T,
        scope: &AuditScope,
        registry: &PageRegistry,
        custom_css: Option<&str>,
    ) -> HealthScore
    where
        T: RenderTree + ?Sized,
        T::Node: std::hash::Hash,
    {
        self.clear_audit(tree);
        tracing::info!("Starting {} audit on page `{}`", scope.label(), self.config.current_page_id);

        self.set_state(AuditState::Scanning);
        let page_id = self.config.current_page_id.clone();
        let candidates = resolve_scope(&*tree, scope, &page_id, registry);

        let mut issues = Vec::new();
        let mut flagged = Vec::new();
        for candidate in &candidates {
            let audit_id = candidate.audit_id();
            let snapshot = ElementSnapshot::capture(&*tree, candidate.node);
            self.renderer
                .tag_element(tree, candidate.node, &audit_id, &snapshot.tag_upper());

            let ctx = ElementContext {
                audit_id: &audit_id,
                page_id: &page_id,
                section_id: &candidate.section_id,
            };
            let inspection = self.engine.inspect(&snapshot, ctx, &mut self.ids);
            issues.extend(inspection.issues);
            if let Some(annotation) = inspection.annotation {
                flagged.push((candidate.node, annotation));
            }
        }

        self.set_state(AuditState::Scoring);
        let steps = self.config.progress_steps;
        for step in 1..=steps {
            if self.config.step_delay.is_zero() {
                smol::future::yield_now().await;
            } else {
                smol::Timer::after(self.config.step_delay).await;
            }
            self.set_progress(step as f64 / steps as f64 * 100.0);
        }
        if steps == 0 {
            self.set_progress(100.0);
        }

        self.renderer.render(tree, &flagged, custom_css);
        self.active = true;

        let score = compute_health_score(&issues, scope.label(), now_millis());
        self.issues = issues;
        self.history.push(score.clone());
        self.health = Some(score.clone());
        self.persist_history();

        self.set_state(AuditState::Complete);
        tracing::info!(
            "{} audit complete: {} issues, overall {}%",
            scope.label(),
            score.issues_count,
            score.overall
        );
        score
    }

    /// Drive `run_audit` to completion on the current thread
    pub fn run_audit_blocking<T>(
        &mut self,
        tree: &mut T,
        scope: &AuditScope,
        registry: &PageRegistry,
        custom_css: Option<&str>,
    ) -> HealthScore
    where
        T: RenderTree + ?Sized,
        T::Node: std::hash::Hash,
    {
        smol::block_on(self.run_audit(tree, scope, registry, custom_css))
    }

    /// Remove every annotation, drop the issue list and reset progress.
    ///
    /// The last health score and the history are kept.
    pub fn clear_audit<T: RenderTree + ?Sized>(&mut self, tree: &mut T) {
        self.set_state(AuditState::Clearing);
        self.renderer.clear(tree);
        self.issues.clear();
        self.active = false;
        self.set_progress(0.0);
        self.set_state(AuditState::Idle);
    }

    /// Resolve where a click on `issue` should lead
    pub fn locate<T: RenderTree + ?Sized>(&self, tree: &T, issue: &Issue) -> IssueTarget<T::Node> {
        if issue.is_off_screen {
            return IssueTarget::Navigate {
                page_id: issue.page_id.clone(),
                path: page_path(&issue.page_id),
            };
        }
        issue
            .audit_id
            .as_deref()
            .and_then(|id| tree.find_by_attribute(ATTR_AUDIT_ID, id))
            .map_or(IssueTarget::Missing, IssueTarget::Element)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn filtered_issues(&self, filter: &IssueFilter) -> Vec<&Issue> {
        filter.apply(&self.issues)
    }

    pub fn health_score(&self) -> Option<&HealthScore> {
        self.health.as_ref()
    }

    /// Annotations are present
    pub fn is_audit_active(&self) -> bool {
        self.active
    }

    /// A run is in progress (or was abandoned mid-way)
    pub fn is_auditing(&self) -> bool {
        matches!(self.state, AuditState::Scanning | AuditState::Scoring)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> AuditState {
        self.state
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist_history(&mut self) {
        if let Err(e) = self.history.save(&mut self.store, &self.config.history_key) {
            tracing::warn!("Failed to persist audit history: {}", e);
        }
    }

    fn set_state(&mut self, state: AuditState) {
        self.state = state;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_state(state);
        }
    }

    fn set_progress(&mut self, percent: f64) {
        self.progress = percent;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_progress(percent);
        }
    }
}
