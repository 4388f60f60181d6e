//! Health scoring and history

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::AuditError;
use crate::issue::{Issue, IssueType};
use crate::storage::KeyValueStore;

/// Score snapshot taken at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    /// 0..=100
    pub overall: i64,
    /// Not floor-clamped; goes negative past 20 contrast issues
    pub contrast: i64,
    /// No rule feeds this category yet
    pub semantic: i64,
    /// Not floor-clamped
    pub aria: i64,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Scope label, e.g. `GLOBAL`
    pub scope: String,
    pub issues_count: usize,
}

impl HealthScore {
    /// Green band of the history table
    pub fn is_healthy(&self) -> bool {
        self.overall > 85
    }
}

/// Aggregate issues into a score
pub fn compute_health_score(issues: &[Issue], scope: &str, timestamp: u64) -> HealthScore {
    let count = |t: IssueType| issues.iter().filter(|i| i.issue_type == t).count() as f64;
    HealthScore {
        overall: (100.0 - issues.len() as f64 * 2.5).max(0.0).round() as i64,
        contrast: (100.0 - count(IssueType::Contrast) * 5.0).round() as i64,
        semantic: 100,
        aria: (100.0 - count(IssueType::Aria) * 8.0).round() as i64,
        timestamp,
        scope: scope.to_string(),
        issues_count: issues.len(),
    }
}

/// Current time in epoch milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Most-recent-first, bounded score history
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistory {
    entries: VecDeque<HealthScore>,
    capacity: usize,
}

impl ScoreHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add the newest score, evicting the oldest past capacity
    pub fn push(&mut self, score: HealthScore) {
        self.entries.push_front(score);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&HealthScore> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HealthScore> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_json(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    pub fn from_json(json: &str, capacity: usize) -> Result<Self, AuditError> {
        let mut entries: VecDeque<HealthScore> = serde_json::from_str(json)?;
        entries.truncate(capacity);
        Ok(Self { entries, capacity })
    }

    /// Load from `store`; missing or corrupt data yields an empty history
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str, capacity: usize) -> Self {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(capacity),
            Err(e) => {
                tracing::warn!("Could not read audit history: {}", e);
                return Self::new(capacity);
            }
        };
        Self::from_json(&raw, capacity).unwrap_or_else(|e| {
            tracing::warn!("Discarding corrupt audit history: {}", e);
            Self::new(capacity)
        })
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S, key: &str) -> Result<(), AuditError> {
        store.set(key, self.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use crate::storage::MemoryStore;

    fn issues(kinds: &[IssueType]) -> Vec<Issue> {
        kinds
            .iter()
            .enumerate()
            .map(|(n, &issue_type)| Issue {
                id: format!("dom-test-{}", n),
                issue_type,
                severity: Severity::Critical,
                element_name: "P".into(),
                message: String::new(),
                page_id: "home".into(),
                section_id: None,
                ratio: None,
                target: None,
                suggestion: None,
                is_off_screen: false,
                audit_id: None,
                wcag: None,
            })
            .collect()
    }

    fn score(overall: i64) -> HealthScore {
        HealthScore {
            overall,
            contrast: 100,
            semantic: 100,
            aria: 100,
            timestamp: 1,
            scope: "GLOBAL".into(),
            issues_count: 0,
        }
    }

    #[test]
    fn test_scenario_scores() {
        let found = issues(&[IssueType::Aria, IssueType::Aria, IssueType::Aria, IssueType::Contrast]);
        let s = compute_health_score(&found, "GLOBAL", 0);
        assert_eq!((s.overall, s.contrast, s.semantic, s.aria), (90, 95, 100, 76));
        assert_eq!(s.issues_count, 4);
    }

    #[test]
    fn test_empty_is_perfect() {
        let s = compute_health_score(&[], "CURRENT", 0);
        assert_eq!((s.overall, s.contrast, s.aria), (100, 100, 100));
        assert!(s.is_healthy());
    }

    #[test]
    fn test_clamping_rules() {
        let found = issues(&[IssueType::Aria; 50]);
        let s = compute_health_score(&found, "GLOBAL", 0);
        assert_eq!(s.overall, 0);
        assert_eq!(s.aria, -300);

        // 100 - 3 * 2.5 = 92.5 rounds half away from zero
        let s = compute_health_score(&issues(&[IssueType::Navigation; 3]), "GLOBAL", 0);
        assert_eq!(s.overall, 93);
    }

    #[test]
    fn test_history_is_bounded_newest_first() {
        let mut history = ScoreHistory::new(3);
        for overall in 1..=5 {
            history.push(score(overall));
        }
        let kept: Vec<_> = history.iter().map(|s| s.overall).collect();
        assert_eq!(kept, vec![5, 4, 3]);
        assert_eq!(history.latest().map(|s| s.overall), Some(5));
    }

    #[test]
    fn test_history_persistence() {
        let mut store = MemoryStore::new();
        let mut history = ScoreHistory::new(50);
        history.push(score(90));
        history.save(&mut store, "wn_audit_history").unwrap();

        let raw = store.get("wn_audit_history").unwrap().unwrap();
        assert!(raw.contains("\"issuesCount\":0"));
        assert_eq!(ScoreHistory::load(&store, "wn_audit_history", 50), history);
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let mut store = MemoryStore::new();
        store.set("wn_audit_history", "{not json".into()).unwrap();
        assert!(ScoreHistory::load(&store, "wn_audit_history", 50).is_empty());
    }
}
