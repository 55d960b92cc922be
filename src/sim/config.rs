//! Data-driven game definitions
//!
//! One `ArcadeConfig` describes a whole falling-object / dodge / defense game:
//! entity table, spawn rates, collision model, resource rules, win/lose
//! predicates and skin. The presets below are the built-in games; anything else
//! can be loaded from JSON.

use std::f32::consts::PI;

use anyhow::{Context, bail, ensure};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::achievements::{AchievementRule, Metric};
use super::collision::CollisionModel;
use super::entity::{
    AvatarShape, BurstSpec, CollectibleCategory, HazardCategory, HazardSpec, ItemKind, PowerUpKind,
};
use super::gauge::Gauge;
use super::spawn::{DifficultyCurve, Span, SpawnOrigin, SpawnRule};
use crate::consts::*;

/// Palette/shape set the renderer draws a game with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinId {
    Collector,
    Classic,
    Asteroids,
    Parker,
    Shield,
    Slingshot,
    Rescue,
    Mission,
}

/// Which axes follow the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axes {
    X,
    Both,
}

/// How the avatar follows the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Steering {
    /// Jump straight to the pointer
    Snap { axes: Axes },
    /// `pos += (target - pos) * k` per nominal frame
    Ease { k: f32, axes: Axes },
    /// Guard arc turns to face the pointer around its base
    Orbit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarSpec {
    pub shape: AvatarShape,
    pub start: Vec2,
    pub steering: Steering,
    #[serde(default)]
    pub trail: bool,
}

/// Strip near the side walls that relieves the resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub margin: f32,
    pub relief: f32,
}

/// The round's main resource (health, heat, integrity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRule {
    pub label: String,
    /// Starting value and direction
    pub gauge: Gauge,
    /// Harm per frame scaled by proximity to the top edge (the danger source)
    #[serde(default)]
    pub proximity_gain: f32,
    #[serde(default)]
    pub safe_zone: Option<SafeZone>,
    /// Relief per frame
    #[serde(default)]
    pub regen: f32,
    /// Draw the HUD bar
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

/// Score that accrues without collecting anything
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PassiveScore {
    #[default]
    None,
    /// Flat amount per frame survived
    PerTick(f32),
    /// Amount per frame scaled by proximity to the top edge
    Proximity(f32),
}

/// A defended planet with a guard arc and its threat source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseSpec {
    /// Position as a fraction of the arena
    pub at: Vec2,
    pub radius: f32,
    pub guard_power: f32,
    /// Guard power regained per frame
    pub guard_regen: f32,
    /// Threat source drawn behind everything (fraction of arena, radius)
    pub source_at: Vec2,
    pub source_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetSpec {
    pub radius: f32,
    /// Pull per frame (px)
    pub strength: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserSpec {
    /// Upward speed per frame
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub hit_points: f32,
}

/// Mid-flight burst of splitting hazards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitterSpec {
    /// Age (frames) before a splitter may burst
    pub min_age: f32,
    /// Chance per frame once old enough
    pub chance: f32,
    pub pieces: u32,
    pub fragment: HazardSpec,
    pub fragment_radius: f32,
    pub fragment_ttl: f32,
    /// Fragment velocity components are drawn from ±speed
    pub fragment_speed: f32,
}

/// Complete description of one arcade game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcadeConfig {
    pub name: String,
    pub title: String,
    pub instructions: String,
    pub lose_title: String,
    pub skin: SkinId,
    pub arena: Vec2,
    pub avatar: AvatarSpec,
    #[serde(default)]
    pub collision: CollisionModel,
    pub resource: ResourceRule,
    pub difficulty: DifficultyCurve,
    pub spawns: Vec<SpawnRule>,
    #[serde(default)]
    pub passive_score: PassiveScore,
    #[serde(default)]
    pub base: Option<BaseSpec>,
    pub magnet: MagnetSpec,
    #[serde(default)]
    pub laser: Option<LaserSpec>,
    #[serde(default)]
    pub splitter: Option<SplitterSpec>,
    pub effect_duration_ticks: u32,
    pub collect_burst: BurstSpec,
    pub hit_burst: BurstSpec,
    /// Score per level (level = score / n + 1)
    #[serde(default)]
    pub score_per_level: Option<f32>,
    /// Reaching this score wins the round
    #[serde(default)]
    pub win_score: Option<f32>,
    #[serde(default)]
    pub achievements: Vec<AchievementRule>,
}

impl ArcadeConfig {
    /// Parse and validate a JSON game definition
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("parsing arcade config")?;
        config.validate().with_context(|| format!("validating arcade config '{}'", config.name))?;
        Ok(config)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing arcade config")
    }

    /// Reject definitions the engine cannot run
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.arena.x > 0.0 && self.arena.y > 0.0,
            "arena must have positive size, got {:?}",
            self.arena
        );
        ensure!(!self.spawns.is_empty(), "spawn table is empty");
        ensure!(self.resource.gauge.max > 0.0, "resource max must be positive");
        ensure!(self.effect_duration_ticks > 0, "effect duration must be positive");

        for (i, rule) in self.spawns.iter().enumerate() {
            if !(0.0..=1.0).contains(&rule.chance) {
                bail!("spawn rule {} chance {} outside [0, 1]", i, rule.chance);
            }
            for (what, span) in [("speed", rule.speed), ("radius", rule.radius)] {
                ensure!(span.min <= span.max, "spawn rule {} {} range is inverted", i, what);
            }
            ensure!(rule.radius.min > 0.0, "spawn rule {} radius must be positive", i);
        }

        match self.avatar.steering {
            Steering::Ease { k, .. } if !(k > 0.0 && k <= 1.0) => {
                bail!("easing factor {} outside (0, 1]", k)
            }
            Steering::Orbit if self.base.is_none() => bail!("orbit steering needs a base"),
            _ => {}
        }
        if let Some(splitter) = &self.splitter {
            ensure!((0.0..=1.0).contains(&splitter.chance), "splitter chance outside [0, 1]");
        }
        if let Some(per) = self.score_per_level {
            ensure!(per > 0.0, "score per level must be positive");
        }
        Ok(())
    }

    /// Canvas-space position of the defended base
    pub fn base_center(&self) -> Option<Vec2> {
        self.base.map(|b| b.at * self.arena)
    }

    /// Catch star fragments, dodge junk (AABB collision, snap steering)
    pub fn cosmic_collector() -> Self {
        let arena = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
        Self {
            name: "cosmic-collector".into(),
            title: "Cosmic Collector".into(),
            instructions: "Move the mouse to steer. Catch stars, dodge space junk.".into(),
            lose_title: "Ship Destroyed".into(),
            skin: SkinId::Collector,
            arena,
            avatar: AvatarSpec {
                shape: AvatarShape::Rect { width: 60.0, height: 40.0 },
                start: Vec2::new(arena.x / 2.0, arena.y - 40.0),
                steering: Steering::Snap { axes: Axes::X },
                trail: false,
            },
            collision: CollisionModel::Aabb,
            resource: health(100.0),
            difficulty: DifficultyCurve::ByScore { per: 1000.0 },
            spawns: vec![
                SpawnRule {
                    speed_scales: true,
                    ..SpawnRule::falling(star(10.0), 0.021, Span::new(1.5, 3.5), Span::fixed(10.0))
                },
                SpawnRule {
                    speed_scales: true,
                    spin: 0.05,
                    ..SpawnRule::falling(
                        ItemKind::Hazard(HazardSpec::new(HazardCategory::Junk, 15.0)),
                        0.009,
                        Span::new(1.5, 3.5),
                        Span::fixed(15.0),
                    )
                },
            ],
            passive_score: PassiveScore::None,
            base: None,
            magnet: default_magnet(),
            laser: None,
            splitter: None,
            effect_duration_ticks: EFFECT_DURATION_TICKS,
            collect_burst: BurstSpec { count: 15, speed: 6.0, life: 40.0 },
            hit_burst: BurstSpec { count: 15, speed: 6.0, life: 40.0 },
            score_per_level: None,
            win_score: None,
            achievements: vec![AchievementRule::new("star-fragment-hoarder", Metric::Score, 200.0)],
        }
    }

    /// Older collector: eased steering, closest-point collision, shield and magnet
    pub fn classic_collector() -> Self {
        let base = Self::cosmic_collector();
        let falling = |kind, chance, radius| SpawnRule {
            speed_scales: true,
            ..SpawnRule::falling(kind, chance, Span::new(1.5, 3.5), Span::fixed(radius))
        };
        Self {
            name: "classic-collector".into(),
            title: "Cosmic Collector Classic".into(),
            instructions: "Steer with the mouse. Shields absorb a hit, magnets pull stars in.".into(),
            skin: SkinId::Classic,
            avatar: AvatarSpec {
                steering: Steering::Ease { k: 0.2, axes: Axes::X },
                ..base.avatar.clone()
            },
            collision: CollisionModel::ClosestPoint,
            difficulty: DifficultyCurve::ByScore { per: 500.0 },
            spawns: vec![
                falling(ItemKind::PowerUp(PowerUpKind::Shield), 0.0025, 15.0),
                falling(ItemKind::PowerUp(PowerUpKind::Magnet), 0.00475, 15.0),
                falling(star(10.0), 0.03, 12.0),
                falling(ItemKind::Hazard(HazardSpec::new(HazardCategory::Junk, 20.0)), 0.0128, 15.0),
            ],
            collect_burst: BurstSpec { count: 15, speed: 4.0, life: 30.0 },
            hit_burst: BurstSpec { count: 20, speed: 4.0, life: 30.0 },
            ..base
        }
    }

    /// Dodge a thickening asteroid belt; phase through or laser them
    pub fn asteroid_navigator() -> Self {
        let arena = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
        let asteroid = HazardSpec {
            fatal: true,
            ..HazardSpec::new(HazardCategory::Asteroid, 100.0)
        };
        let power_up = |kind| SpawnRule {
            speed_scales: true,
            ..SpawnRule::falling(ItemKind::PowerUp(kind), 0.001, Span::fixed(2.0), Span::fixed(12.0))
        };
        Self {
            name: "asteroid-navigator".into(),
            title: "Asteroid Belt Navigator".into(),
            instructions: "Use your mouse to move, click to fire laser.".into(),
            lose_title: "Ship Destroyed".into(),
            skin: SkinId::Asteroids,
            arena,
            avatar: AvatarSpec {
                shape: AvatarShape::Rect { width: 40.0, height: 50.0 },
                start: Vec2::new(arena.x / 2.0, arena.y - 60.0),
                steering: Steering::Snap { axes: Axes::X },
                trail: false,
            },
            collision: CollisionModel::Circle,
            resource: ResourceRule {
                visible: false,
                ..health(100.0)
            },
            difficulty: DifficultyCurve::ByScore { per: 1000.0 },
            spawns: vec![
                SpawnRule {
                    chance_scales: true,
                    speed_scales: true,
                    spin: 0.05,
                    ..SpawnRule::falling(ItemKind::Hazard(asteroid), 0.02, Span::new(1.0, 3.0), Span::new(10.0, 30.0))
                },
                SpawnRule {
                    speed_scales: true,
                    ..SpawnRule::falling(
                        ItemKind::Collectible { category: CollectibleCategory::Crystal, points: 50.0 },
                        0.005,
                        Span::fixed(2.0),
                        Span::fixed(10.0),
                    )
                },
                power_up(PowerUpKind::Phase),
                power_up(PowerUpKind::Laser),
            ],
            passive_score: PassiveScore::PerTick(0.1),
            base: None,
            magnet: default_magnet(),
            laser: Some(LaserSpec { speed: 15.0, width: 4.0, height: 20.0, hit_points: 10.0 }),
            splitter: None,
            effect_duration_ticks: EFFECT_DURATION_TICKS,
            collect_burst: BurstSpec { count: 15, speed: 6.0, life: 40.0 },
            hit_burst: BurstSpec { count: 30, speed: 6.0, life: 40.0 },
            score_per_level: None,
            win_score: None,
            achievements: vec![AchievementRule::new("asteroid-dodger", Metric::SurvivalSecs, 60.0)],
        }
    }

    /// Skim the sun for data without overheating
    pub fn parker_probe() -> Self {
        let arena = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
        Self {
            name: "parker-probe".into(),
            title: "Parker Solar Probe".into(),
            instructions: "Fly close to the sun to collect data, but avoid overheating! Use cooling zones on the sides.".into(),
            lose_title: "Probe Overheated".into(),
            skin: SkinId::Parker,
            arena,
            avatar: AvatarSpec {
                shape: AvatarShape::Rect { width: 30.0, height: 50.0 },
                start: Vec2::new(arena.x / 2.0, arena.y - 80.0),
                steering: Steering::Ease { k: 0.1, axes: Axes::Both },
                trail: true,
            },
            collision: CollisionModel::Circle,
            resource: ResourceRule {
                label: "HEAT".into(),
                gauge: Gauge::saturating(100.0),
                proximity_gain: 0.1,
                safe_zone: Some(SafeZone { margin: 100.0, relief: 0.25 }),
                regen: 0.0,
                visible: true,
            },
            difficulty: DifficultyCurve::BySurvival { per: 120.0 },
            spawns: vec![
                SpawnRule::falling(
                    ItemKind::Hazard(HazardSpec::new(HazardCategory::Flare, 15.0)),
                    0.05,
                    Span::new(2.0, 4.0),
                    Span::new(5.0, 15.0),
                ),
                SpawnRule::falling(
                    ItemKind::Collectible { category: CollectibleCategory::DataPacket, points: 100.0 },
                    0.02,
                    Span::fixed(3.0),
                    Span::fixed(8.0),
                ),
            ],
            passive_score: PassiveScore::Proximity(0.5),
            base: None,
            magnet: default_magnet(),
            laser: None,
            splitter: None,
            effect_duration_ticks: EFFECT_DURATION_TICKS,
            collect_burst: BurstSpec { count: 15, speed: 3.0, life: 20.0 },
            hit_burst: BurstSpec { count: 8, speed: 3.0, life: 20.0 },
            score_per_level: None,
            win_score: None,
            achievements: vec![AchievementRule::new("sun-grazer", Metric::Score, 1000.0)],
        }
    }

    /// Swing a shield arc around Earth to deflect solar flares
    pub fn solar_shield() -> Self {
        let arena = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
        let sun = Vec2::new(0.1, 0.5);
        let flare = |spec: HazardSpec, chance, radius, min_level| SpawnRule {
            chance_scales: true,
            speed_scales: true,
            origin: SpawnOrigin::Point { at: sun, heading: 0.0, spread: PI / 2.0 },
            min_level,
            ttl: Some(600.0),
            ..SpawnRule::falling(ItemKind::Hazard(spec), chance, Span::new(1.5, 3.0), Span::fixed(radius))
        };
        let guarded = |category, damage: f32, points| HazardSpec {
            block_points: points,
            guard_drain: damage,
            ..HazardSpec::new(category, damage)
        };
        Self {
            name: "solar-shield".into(),
            title: "Solar Shield Defense".into(),
            instructions: "Aim the shield with your mouse to deflect solar flares away from Earth.".into(),
            lose_title: "Earth's Defenses Failed".into(),
            skin: SkinId::Shield,
            arena,
            avatar: AvatarSpec {
                shape: AvatarShape::Guard { orbit: 70.0, thickness: 8.0, arc_width: PI / 1.5 },
                start: Vec2::new(0.8, 0.5) * arena,
                steering: Steering::Orbit,
                trail: false,
            },
            collision: CollisionModel::Circle,
            resource: ResourceRule {
                label: "EARTH".into(),
                ..health(100.0)
            },
            difficulty: DifficultyCurve::ByLevel { step: 0.2 },
            spawns: vec![
                flare(guarded(HazardCategory::Flare, 5.0, 1.0), 0.010, 10.0, 0),
                flare(
                    HazardSpec {
                        splits: true,
                        ..guarded(HazardCategory::SplitterFlare, 8.0, 2.0)
                    },
                    0.0012,
                    8.0,
                    2,
                ),
                flare(guarded(HazardCategory::MegaFlare, 15.0, 3.0), 0.0018, 15.0, 3),
            ],
            passive_score: PassiveScore::None,
            base: Some(BaseSpec {
                at: Vec2::new(0.8, 0.5),
                radius: 45.0,
                guard_power: 100.0,
                guard_regen: 0.1,
                source_at: sun,
                source_radius: 90.0,
            }),
            magnet: default_magnet(),
            laser: None,
            splitter: Some(SplitterSpec {
                min_age: 100.0,
                chance: 0.02,
                pieces: 3,
                fragment: guarded(HazardCategory::Fragment, 5.0, 1.0),
                fragment_radius: 5.0,
                fragment_ttl: 300.0,
                fragment_speed: 1.5,
            }),
            effect_duration_ticks: EFFECT_DURATION_TICKS,
            collect_burst: BurstSpec { count: 10, speed: 4.0, life: 25.0 },
            hit_burst: BurstSpec { count: 20, speed: 5.0, life: 30.0 },
            score_per_level: Some(10.0),
            win_score: None,
            achievements: vec![AchievementRule::new("planetary-protector", Metric::Score, 30.0)],
        }
    }
}

fn health(max: f32) -> ResourceRule {
    ResourceRule {
        label: "HEALTH".into(),
        gauge: Gauge::depleting(max),
        proximity_gain: 0.0,
        safe_zone: None,
        regen: 0.0,
        visible: true,
    }
}

fn star(points: f32) -> ItemKind {
    ItemKind::Collectible {
        category: CollectibleCategory::Star,
        points,
    }
}

fn default_magnet() -> MagnetSpec {
    MagnetSpec {
        radius: 150.0,
        strength: 5.0,
    }
}
