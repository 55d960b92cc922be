//! Cosmic Arcade - a parameterized canvas mini-game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, physics, collisions, phases, puzzle)
//! - `renderer`: Pure state -> display list, replayed on a 2D canvas
//! - `game`: The `MiniGame` seam every arcade game plugs into
//! - `services`: External collaborators with fallback values
//! - `platform`: Browser/native platform abstraction

pub mod game;
pub mod platform;
pub mod renderer;
pub mod services;
pub mod settings;
pub mod sim;

pub use game::{GameKind, MiniGame};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Engine-wide constants
pub mod consts {
    /// Frame duration every per-frame constant is tuned against (60 Hz)
    pub const NOMINAL_FRAME_MS: f32 = 16.67;
    /// Largest frame factor one tick may integrate (tab switches, hitches)
    pub const MAX_FRAME_FACTOR: f32 = 4.0;

    /// Default canvas dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 450.0;

    /// Timed power-up duration (5 s at 60 fps)
    pub const EFFECT_DURATION_TICKS: u32 = 300;

    /// Avatar trail length (points)
    pub const TRAIL_LENGTH: usize = 20;

    /// Hard particle ceiling regardless of quality preset
    pub const MAX_PARTICLES: usize = 2000;

    /// Gravity distance floor (squared px) so a probe never divides by ~0
    pub const MIN_GRAVITY_DIST_SQ: f32 = 100.0;

    /// Items further than this outside the arena are culled
    pub const CULL_MARGIN: f32 = 50.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
