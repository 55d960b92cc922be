//! Edge-triggered achievements
//!
//! A tracker watches metrics and emits an id the moment a threshold is first
//! crossed. Sinks receive ids and must tolerate repeats.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// What an achievement measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Score,
    SurvivalSecs,
    LevelsCompleted,
    Repairs,
    MissionsWon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRule {
    pub id: String,
    pub metric: Metric,
    pub threshold: f32,
}

impl AchievementRule {
    pub fn new(id: &str, metric: Metric, threshold: f32) -> Self {
        Self {
            id: id.to_string(),
            metric,
            threshold,
        }
    }
}

/// Fires each rule at most once per tracker
#[derive(Debug, Clone, Default)]
pub struct AchievementTracker {
    rules: Vec<AchievementRule>,
    fired: BTreeSet<String>,
}

impl AchievementTracker {
    pub fn new(rules: Vec<AchievementRule>) -> Self {
        Self {
            rules,
            fired: BTreeSet::new(),
        }
    }

    /// Report a metric's current value; returns ids that just unlocked
    pub fn observe(&mut self, metric: Metric, value: f32) -> Vec<String> {
        let mut unlocked = Vec::new();
        for rule in self.rules.iter().filter(|r| r.metric == metric) {
            if value >= rule.threshold && !self.fired.contains(&rule.id) {
                self.fired.insert(rule.id.clone());
                log::info!("Achievement unlocked: {}", rule.id);
                unlocked.push(rule.id.clone());
            }
        }
        unlocked
    }

    pub fn has_fired(&self, id: &str) -> bool {
        self.fired.contains(id)
    }
}

/// External store for unlocked achievements. `notify` must be idempotent.
pub trait AchievementSink {
    fn notify(&mut self, id: &str);
}

/// In-memory sink
#[derive(Debug, Clone, Default)]
pub struct UnlockedSet {
    ids: BTreeSet<String>,
}

impl UnlockedSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl AchievementSink for UnlockedSet {
    fn notify(&mut self, id: &str) {
        if self.ids.insert(id.to_string()) {
            log::debug!("Stored achievement {}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_on_crossing() {
        let mut tracker = AchievementTracker::new(vec![AchievementRule::new(
            "star-fragment-hoarder",
            Metric::Score,
            200.0,
        )]);
        assert!(tracker.observe(Metric::Score, 190.0).is_empty());
        assert_eq!(tracker.observe(Metric::Score, 200.0), vec!["star-fragment-hoarder".to_string()]);
        assert!(tracker.observe(Metric::Score, 210.0).is_empty());
        assert!(tracker.observe(Metric::Score, 500.0).is_empty());
        assert!(tracker.has_fired("star-fragment-hoarder"));
    }

    #[test]
    fn test_metrics_are_independent() {
        let mut tracker = AchievementTracker::new(vec![
            AchievementRule::new("asteroid-dodger", Metric::SurvivalSecs, 60.0),
            AchievementRule::new("orbital-mechanic", Metric::LevelsCompleted, 3.0),
        ]);
        assert!(tracker.observe(Metric::Score, 1e6).is_empty());
        assert_eq!(tracker.observe(Metric::LevelsCompleted, 3.0).len(), 1);
        assert!(!tracker.has_fired("asteroid-dodger"));
    }

    #[test]
    fn test_sink_is_idempotent() {
        let mut sink = UnlockedSet::default();
        sink.notify("sun-grazer");
        sink.notify("sun-grazer");
        assert_eq!(sink.len(), 1);
        assert!(sink.contains("sun-grazer"));
    }
}
