//! Human and JSON reports

use std::fmt::Write as _;

use serde::Serialize;
use wn_a11y::{HealthScore, Issue, ScoreHistory, wcag};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub input: String,
    pub score: &'a HealthScore,
    pub issues: Vec<&'a Issue>,
    pub history: Vec<&'a HealthScore>,
}

impl<'a> Report<'a> {
    pub fn new(input: String, score: &'a HealthScore, issues: Vec<&'a Issue>, history: &'a ScoreHistory) -> Self {
        Self {
            input,
            score,
            issues,
            history: history.iter().collect(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} audit of {}: {} issue(s)",
            self.score.scope, self.input, self.score.issues_count
        );
        for issue in &self.issues {
            let _ = write!(
                out,
                "  {:<8}  {:<10}  {:<8}  {}",
                issue.severity.to_string().to_uppercase(),
                issue.issue_type.as_str(),
                issue.element_name,
                issue.message
            );
            if let Some(clause) = issue.wcag.as_deref() {
                match wcag::title(clause) {
                    Some(title) => {
                        let _ = write!(out, " [WCAG {} {}]", clause, title);
                    }
                    None => {
                        let _ = write!(out, " [WCAG {}]", clause);
                    }
                }
            }
            if let Some(suggestion) = &issue.suggestion {
                let _ = write!(out, " -> {}", suggestion);
            }
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "Health: {}% ({}) contrast {} / aria {} / semantic {}",
            self.score.overall,
            if self.score.is_healthy() { "healthy" } else { "needs work" },
            self.score.contrast,
            self.score.aria,
            self.score.semantic
        );
        if self.history.len() > 1 {
            let trend: Vec<String> = self.history.iter().map(|h| h.overall.to_string()).collect();
            let _ = writeln!(out, "History (newest first): {}", trend.join(", "));
        }
        out
    }
}
