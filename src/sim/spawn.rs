//! Difficulty scalar and probabilistic spawning
//!
//! Each rule is one Bernoulli trial per tick. The difficulty scalar grows with
//! score, level or survival time and scales spawn chance and speed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Item, ItemKind};
use super::physics::TimeStep;
use crate::polar_to_cartesian;

/// How difficulty grows within a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DifficultyCurve {
    /// `1 + score / per`
    ByScore { per: f32 },
    /// `1 + (level - 1) * step`
    ByLevel { step: f32 },
    /// `1 + survived_secs / per`
    BySurvival { per: f32 },
}

/// Inputs the difficulty scalar may depend on
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    pub score: f32,
    pub level: u32,
    pub survived_secs: f32,
}

impl DifficultyCurve {
    /// Non-decreasing in every input, never below 1
    pub fn scalar(&self, progress: Progress) -> f32 {
        let raw = match *self {
            DifficultyCurve::ByScore { per } => progress.score.max(0.0) / per.max(f32::EPSILON),
            DifficultyCurve::ByLevel { step } => progress.level.saturating_sub(1) as f32 * step.max(0.0),
            DifficultyCurve::BySurvival { per } => progress.survived_secs.max(0.0) / per.max(f32::EPSILON),
        };
        1.0 + raw
    }
}

/// Closed float interval for randomized attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(v: f32) -> Self {
        Self { min: v, max: v }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        self.min + rng.random::<f32>() * (self.max - self.min)
    }
}

/// Where new items appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Random x along the top edge, falling straight down
    TopEdge,
    /// A fixed point (fraction of the arena), heading within `heading ± spread/2`
    Point { at: Vec2, heading: f32, spread: f32 },
}

/// One row of a game's spawn table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub kind: ItemKind,
    /// Chance per nominal frame
    pub chance: f32,
    /// Multiply chance by the difficulty scalar
    #[serde(default)]
    pub chance_scales: bool,
    pub speed: Span,
    /// Multiply speed by the difficulty scalar
    #[serde(default)]
    pub speed_scales: bool,
    pub radius: Span,
    #[serde(default)]
    pub spin: f32,
    pub origin: SpawnOrigin,
    /// Rule is inactive below this level
    #[serde(default)]
    pub min_level: u32,
    /// Lifetime in ticks
    #[serde(default)]
    pub ttl: Option<f32>,
}

impl SpawnRule {
    pub fn falling(kind: ItemKind, chance: f32, speed: Span, radius: Span) -> Self {
        Self {
            kind,
            chance,
            chance_scales: false,
            speed,
            speed_scales: false,
            radius,
            spin: 0.0,
            origin: SpawnOrigin::TopEdge,
            min_level: 0,
            ttl: None,
        }
    }

    /// Per-step spawn probability for this difficulty
    pub fn probability(&self, difficulty: f32, step: TimeStep) -> f32 {
        let chance = if self.chance_scales { self.chance * difficulty } else { self.chance };
        step.scale_chance(chance)
    }

    /// Build the item this rule describes
    pub fn instantiate<R: Rng>(&self, id: u32, arena: Vec2, difficulty: f32, rng: &mut R) -> Item {
        let radius = self.radius.sample(rng);
        let mut speed = self.speed.sample(rng);
        if self.speed_scales {
            speed *= difficulty;
        }
        let (pos, vel) = match self.origin {
            SpawnOrigin::TopEdge => {
                let span = (arena.x - 2.0 * radius).max(0.0);
                let x = radius + rng.random::<f32>() * span;
                (Vec2::new(x, -radius), Vec2::new(0.0, speed))
            }
            SpawnOrigin::Point { at, heading, spread } => {
                let angle = heading + (rng.random::<f32>() - 0.5) * spread;
                (at * arena, polar_to_cartesian(speed, angle))
            }
        };
        let mut item = Item::new(id, self.kind, pos, vel, radius);
        item.rotation_speed = (rng.random::<f32>() - 0.5) * 2.0 * self.spin;
        item.ttl = self.ttl;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{CollectibleCategory, HazardCategory, HazardSpec};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    fn star_rule() -> SpawnRule {
        SpawnRule::falling(
            ItemKind::Collectible { category: CollectibleCategory::Star, points: 10.0 },
            0.021,
            Span::new(1.5, 3.5),
            Span::fixed(10.0),
        )
    }

    #[test]
    fn test_difficulty_curves() {
        let p = Progress { score: 500.0, level: 3, survived_secs: 30.0 };
        assert_eq!(DifficultyCurve::ByScore { per: 500.0 }.scalar(p), 2.0);
        assert!((DifficultyCurve::ByLevel { step: 0.2 }.scalar(p) - 1.4).abs() < 1e-6);
        assert_eq!(DifficultyCurve::BySurvival { per: 60.0 }.scalar(p), 1.5);
        assert_eq!(DifficultyCurve::ByScore { per: 1000.0 }.scalar(Progress::default()), 1.0);
    }

    #[test]
    fn test_probability_scales_and_clamps() {
        let mut rule = star_rule();
        rule.chance_scales = true;
        assert!((rule.probability(2.0, TimeStep::NOMINAL) - 0.042).abs() < 1e-6);
        rule.chance = 0.9;
        assert_eq!(rule.probability(3.0, TimeStep::NOMINAL), 1.0);
    }

    #[test]
    fn test_top_edge_spawn_inside_width() {
        let mut rng = Pcg32::seed_from_u64(7);
        let arena = Vec2::new(800.0, 450.0);
        for id in 0..100 {
            let item = star_rule().instantiate(id, arena, 1.0, &mut rng);
            assert!(item.pos.x >= 10.0 && item.pos.x <= 790.0);
            assert_eq!(item.pos.y, -10.0);
            assert!(item.vel.y >= 1.5 && item.vel.y <= 3.5);
            assert_eq!(item.vel.x, 0.0);
        }
    }

    #[test]
    fn test_point_spawn_heads_within_cone() {
        let mut rng = Pcg32::seed_from_u64(3);
        let rule = SpawnRule {
            origin: SpawnOrigin::Point { at: Vec2::new(0.1, 0.5), heading: 0.0, spread: PI / 2.0 },
            ..SpawnRule::falling(
                ItemKind::Hazard(HazardSpec::new(HazardCategory::Flare, 5.0)),
                0.01,
                Span::new(1.5, 3.0),
                Span::fixed(10.0),
            )
        };
        let arena = Vec2::new(800.0, 450.0);
        for id in 0..50 {
            let item = rule.instantiate(id, arena, 1.0, &mut rng);
            assert_eq!(item.pos, Vec2::new(80.0, 225.0));
            let angle = item.vel.y.atan2(item.vel.x);
            assert!(angle.abs() <= PI / 4.0 + 1e-5);
        }
    }

    proptest! {
        #[test]
        fn prop_difficulty_monotone_in_score(a in 0.0f32..1e6, b in 0.0f32..1e6, per in 1.0f32..2000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let curve = DifficultyCurve::ByScore { per };
            let d_lo = curve.scalar(Progress { score: lo, ..Default::default() });
            let d_hi = curve.scalar(Progress { score: hi, ..Default::default() });
            prop_assert!(d_lo <= d_hi);
            prop_assert!(d_lo >= 1.0);
        }

        #[test]
        fn prop_difficulty_monotone_in_survival(a in 0.0f32..1e5, b in 0.0f32..1e5) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let curve = DifficultyCurve::BySurvival { per: 60.0 };
            let d_lo = curve.scalar(Progress { survived_secs: lo, ..Default::default() });
            let d_hi = curve.scalar(Progress { survived_secs: hi, ..Default::default() });
            prop_assert!(d_lo <= d_hi);
        }

        #[test]
        fn prop_spawn_probability_monotone(d1 in 1.0f32..20.0, d2 in 1.0f32..20.0) {
            let mut rule = star_rule();
            rule.chance_scales = true;
            let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(rule.probability(lo, TimeStep::NOMINAL) <= rule.probability(hi, TimeStep::NOMINAL));
        }
    }
}
