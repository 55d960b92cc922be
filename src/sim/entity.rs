//! Entity records shared by every arcade game
//!
//! Entities are passive data. Motion lives in `physics`, outcomes in `collision`
//! and the per-game tick functions.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics::TimeStep;
use crate::consts::*;

/// Bounding shape of the player-controlled avatar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AvatarShape {
    /// Axis-aligned box centred on the avatar position
    Rect { width: f32, height: f32 },
    /// Disc centred on the avatar position
    Circle { radius: f32 },
    /// Shield arc orbiting a defended base; the avatar position is the aim point
    Guard {
        orbit: f32,
        thickness: f32,
        arc_width: f32,
    },
}

impl AvatarShape {
    /// Half extents of the shape's bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            AvatarShape::Rect { width, height } => Vec2::new(width, height) / 2.0,
            AvatarShape::Circle { radius } => Vec2::splat(radius),
            AvatarShape::Guard { .. } => Vec2::ZERO,
        }
    }

    /// Radius used by circle-distance collision models
    pub fn contact_radius(&self) -> f32 {
        match *self {
            AvatarShape::Rect { width, .. } => width / 2.0,
            AvatarShape::Circle { radius } => radius,
            AvatarShape::Guard { .. } => 0.0,
        }
    }
}

/// Bounded history of past positions, newest first
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
    /// Minimum distance between recorded points (0 records every call)
    spacing: f32,
}

impl Trail {
    pub fn new(capacity: usize, spacing: f32) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            spacing,
        }
    }

    /// Record a position, dropping the oldest point past capacity
    pub fn record(&mut self, pos: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if let Some(last) = self.points.front()
            && last.distance(pos) < self.spacing
        {
            return;
        }
        self.points.push_front(pos);
        self.points.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

/// The player-controlled entity. Exactly one per running game.
#[derive(Debug, Clone)]
pub struct Avatar {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Where steering is heading (pointer position)
    pub target: Vec2,
    pub shape: AvatarShape,
    pub trail: Option<Trail>,
}

impl Avatar {
    pub fn new(pos: Vec2, shape: AvatarShape, trail: bool) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            target: pos,
            shape,
            trail: trail.then(|| Trail::new(TRAIL_LENGTH, 0.0)),
        }
    }

    pub fn record_trail(&mut self) {
        let pos = self.pos;
        if let Some(trail) = self.trail.as_mut() {
            trail.record(pos);
        }
    }
}

/// Hazard flavours (drives skins and split behavior)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardCategory {
    Junk,
    Asteroid,
    Flare,
    MegaFlare,
    SplitterFlare,
    /// Small flare produced by a splitter bursting
    Fragment,
}

/// Collectible flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleCategory {
    Star,
    DataPacket,
    Crystal,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Pass through hazards unharmed
    Phase,
    /// One laser charge
    Laser,
    /// Absorb the next hazard
    Shield,
    /// Pull nearby collectibles in
    Magnet,
}

/// What happens when a hazard connects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardSpec {
    pub category: HazardCategory,
    /// Resource harm on contact
    pub damage: f32,
    /// Contact ends the round outright (unless phased or shielded)
    #[serde(default)]
    pub fatal: bool,
    /// Score for deflecting with a guard arc
    #[serde(default)]
    pub block_points: f32,
    /// Guard power spent deflecting it
    #[serde(default)]
    pub guard_drain: f32,
    /// Bursts into fragments mid-flight
    #[serde(default)]
    pub splits: bool,
}

impl HazardSpec {
    pub fn new(category: HazardCategory, damage: f32) -> Self {
        Self {
            category,
            damage,
            fatal: false,
            block_points: 0.0,
            guard_drain: 0.0,
            splits: false,
        }
    }
}

/// Hazards, collectibles and power-ups share one record; only the outcome differs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Collectible {
        category: CollectibleCategory,
        points: f32,
    },
    Hazard(HazardSpec),
    PowerUp(PowerUpKind),
}

/// A falling/flying item
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Remaining lifetime in ticks (None = lives until collision or culling)
    pub ttl: Option<f32>,
    /// Ticks alive
    pub age: f32,
}

impl Item {
    pub fn new(id: u32, kind: ItemKind, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            radius,
            rotation: 0.0,
            rotation_speed: 0.0,
            ttl: None,
            age: 0.0,
        }
    }

    /// Advance position, spin and lifetime by one step
    pub fn advance(&mut self, step: TimeStep) {
        self.pos += self.vel * step.factor;
        self.rotation += self.rotation_speed * step.factor;
        self.age += step.factor;
        if let Some(ttl) = self.ttl.as_mut() {
            *ttl = (*ttl - step.factor).max(0.0);
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.ttl, Some(t) if t <= 0.0)
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self.kind, ItemKind::Hazard(_))
    }

    pub fn hazard(&self) -> Option<&HazardSpec> {
        match &self.kind {
            ItemKind::Hazard(spec) => Some(spec),
            _ => None,
        }
    }
}

/// Laser bolt fired by the avatar
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
}

/// Fixed attractor for slingshot games. Contact is fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    pub pos: Vec2,
    pub radius: f32,
    pub mass: f32,
}

impl CelestialBody {
    pub fn new(name: &str, pos: Vec2, radius: f32, mass: f32) -> Self {
        Self {
            name: name.to_string(),
            pos,
            radius,
            mass,
        }
    }
}

/// Particle palette slot, resolved by the renderer's skin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleTint {
    Star,
    Debris,
    Fire,
    Data,
    Shield,
    Spark,
}

/// Purely cosmetic spark
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub radius: f32,
    pub tint: ParticleTint,
}

impl Particle {
    pub fn advance(&mut self, step: TimeStep) {
        self.pos += self.vel * step.factor;
        self.life = (self.life - step.factor).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    /// Fade: 1.0 when spawned, 0.0 at death
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Shape of a particle burst
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstSpec {
    pub count: u32,
    /// Velocity components are drawn from ±speed/2
    pub speed: f32,
    pub life: f32,
}

/// Append a burst, honoring the particle cap
pub fn spawn_burst<R: Rng>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    at: Vec2,
    burst: BurstSpec,
    tint: ParticleTint,
    cap: usize,
) {
    let room = cap.saturating_sub(particles.len());
    for _ in 0..(burst.count as usize).min(room) {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * burst.speed,
            (rng.random::<f32>() - 0.5) * burst.speed,
        );
        particles.push(Particle {
            pos: at,
            vel,
            life: burst.life,
            max_life: burst.life,
            radius: 1.0 + rng.random::<f32>() * 2.0,
            tint,
        });
    }
}

/// Advance all particles and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>, step: TimeStep) {
    for p in particles.iter_mut() {
        p.advance(step);
    }
    particles.retain(|p| !p.is_dead());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_trail_is_bounded_newest_first() {
        let mut trail = Trail::new(3, 0.0);
        for i in 0..5 {
            trail.record(Vec2::new(i as f32, 0.0));
        }
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_trail_spacing_skips_close_points() {
        let mut trail = Trail::new(10, 5.0);
        trail.record(Vec2::ZERO);
        trail.record(Vec2::new(2.0, 0.0));
        trail.record(Vec2::new(6.0, 0.0));
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_particle_fades_and_dies() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, 0.0),
            life: 4.0,
            max_life: 4.0,
            radius: 1.0,
            tint: ParticleTint::Star,
        };
        p.advance(TimeStep::NOMINAL);
        assert!((p.alpha() - 0.75).abs() < 1e-6);
        for _ in 0..3 {
            p.advance(TimeStep::NOMINAL);
        }
        assert!(p.is_dead());
        assert_eq!(p.alpha(), 0.0);
    }

    #[test]
    fn test_burst_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut particles = Vec::new();
        let burst = BurstSpec {
            count: 15,
            speed: 6.0,
            life: 40.0,
        };
        spawn_burst(&mut particles, &mut rng, Vec2::ZERO, burst, ParticleTint::Star, 10);
        assert_eq!(particles.len(), 10);
        assert!(particles.iter().all(|p| p.vel.x.abs() <= 3.0 && p.vel.y.abs() <= 3.0));
    }

    #[test]
    fn test_item_ttl_expires() {
        let mut item = Item::new(
            1,
            ItemKind::PowerUp(PowerUpKind::Magnet),
            Vec2::ZERO,
            Vec2::new(0.0, 2.0),
            10.0,
        );
        item.ttl = Some(2.0);
        item.advance(TimeStep::NOMINAL);
        assert!(!item.is_expired());
        item.advance(TimeStep::NOMINAL);
        assert!(item.is_expired());
        assert_eq!(item.pos, Vec2::new(0.0, 4.0));
    }
}
