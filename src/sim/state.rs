//! Arcade game state and simulation events
//!
//! One owned state bundle per running game. Only the tick mutates it.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::achievements::AchievementTracker;
use super::arc::ArcSegment;
use super::config::ArcadeConfig;
use super::effects::{ActiveEffects, TimedEffect};
use super::entity::{Avatar, AvatarShape, Item, Particle, PowerUpKind, Projectile};
use super::gauge::Gauge;
use super::machine::{Phase, Trigger};
use super::spawn::Progress;
use crate::consts::*;

/// Things that happened during a tick (for HUD, sound, achievement sinks)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: Phase, to: Phase },
    Collected { points: f32 },
    Damaged { amount: f32, remaining: f32 },
    ShieldAbsorbed,
    PhasedThrough,
    PowerUp(PowerUpKind),
    EffectExpired(TimedEffect),
    Blocked { points: f32 },
    LaserFired,
    LaserHit { points: f32 },
    Split { pieces: u32 },
    LevelUp(u32),
    Achievement(String),
    /// Slingshot level or rescue satellite completed
    Completed,
    /// Mission deployment rejected (wrong satellite type)
    Rejected,
}

/// Complete arcade game state (deterministic given seed and inputs)
#[derive(Debug, Clone)]
pub struct ArcadeState {
    pub seed: u64,
    pub phase: Phase,
    pub score: f32,
    pub level: u32,
    /// Main resource (health, heat)
    pub resource: Gauge,
    /// Guard arc power (defense games)
    pub guard: Option<Gauge>,
    /// Heading of the guard arc around its base (radians)
    pub guard_heading: f32,
    pub avatar: Avatar,
    /// Active items (sorted by id for determinism)
    pub items: Vec<Item>,
    pub projectiles: Vec<Projectile>,
    pub effects: ActiveEffects,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub particle_cap: usize,
    pub time_ticks: u64,
    pub survived_ms: f32,
    pub achievements: AchievementTracker,
    pub rng: Pcg32,
    next_id: u32,
}

impl ArcadeState {
    /// Create a new game state with the given seed, waiting on the start screen
    pub fn new(config: &ArcadeConfig, seed: u64) -> Self {
        Self {
            seed,
            phase: Phase::Start,
            score: 0.0,
            level: 1,
            resource: config.resource.gauge,
            guard: config.base.map(|b| Gauge::depleting(b.guard_power)),
            guard_heading: std::f32::consts::PI,
            avatar: Avatar::new(config.avatar.start, config.avatar.shape, config.avatar.trail),
            items: Vec::new(),
            projectiles: Vec::new(),
            effects: ActiveEffects::default(),
            particles: Vec::new(),
            particle_cap: MAX_PARTICLES,
            time_ticks: 0,
            survived_ms: 0.0,
            achievements: AchievementTracker::new(config.achievements.clone()),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Reset score, resources and every transient collection for a new round.
    /// Achievements and the RNG stream carry over.
    pub fn reset_round(&mut self, config: &ArcadeConfig) {
        self.score = 0.0;
        self.level = 1;
        self.resource = config.resource.gauge;
        self.guard = config.base.map(|b| Gauge::depleting(b.guard_power));
        self.guard_heading = std::f32::consts::PI;
        let target = self.avatar.target;
        self.avatar = Avatar::new(config.avatar.start, config.avatar.shape, config.avatar.trail);
        self.avatar.target = target;
        self.items.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.effects = ActiveEffects::default();
        self.time_ticks = 0;
        self.survived_ms = 0.0;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn progress(&self) -> Progress {
        Progress {
            score: self.score,
            level: self.level,
            survived_secs: self.survived_ms / 1000.0,
        }
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.items.sort_by_key(|i| i.id);
        self.projectiles.sort_by_key(|p| p.id);
    }

    /// Current guard arc geometry (defense games only)
    pub fn guard_arc(&self, config: &ArcadeConfig) -> Option<ArcSegment> {
        let center = config.base_center()?;
        match self.avatar.shape {
            AvatarShape::Guard { orbit, thickness, arc_width } => Some(ArcSegment::facing(
                center,
                orbit,
                thickness,
                self.guard_heading,
                arc_width,
            )),
            _ => None,
        }
    }
}

/// Fire a trigger and record the transition if it was legal
pub fn transition(phase: &mut Phase, trigger: Trigger, events: &mut Vec<GameEvent>) -> bool {
    let from = *phase;
    if phase.fire(trigger) {
        events.push(GameEvent::PhaseChanged { from, to: *phase });
        true
    } else {
        false
    }
}
