//! Auditor configuration

use std::time::Duration;

/// Audit configuration options
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Page currently displayed by the host (`"home"` for the landing page)
    pub current_page_id: String,

    /// How far past the viewport edge a box may sit before it counts as off-screen
    pub off_screen_margin: f64,

    /// Number of progress ticks reported during scoring
    pub progress_steps: u32,

    /// Pause between progress ticks
    pub step_delay: Duration,

    /// Number of health scores retained in history
    pub history_capacity: usize,

    /// Storage key for the persisted history
    pub history_key: String,

    /// Id of the injected highlight `<style>` element
    pub style_node_id: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            current_page_id: "home".into(),
            off_screen_margin: 5000.0,
            progress_steps: 15,
            step_delay: Duration::ZERO,
            history_capacity: 50,
            history_key: "wn_audit_history".into(),
            style_node_id: "wn-audit-styles".into(),
        }
    }
}

impl AuditConfig {
    /// Interactive pacing: 15 ticks of 45ms so a progress bar is visible
    pub fn cosmetic() -> Self {
        Self {
            step_delay: Duration::from_millis(45),
            ..Self::default()
        }
    }

    /// Same configuration for another page
    pub fn with_page(mut self, page_id: impl Into<String>) -> Self {
        self.current_page_id = page_id.into();
        self
    }
}
