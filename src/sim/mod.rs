//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time arrives as an explicit `TimeStep`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod achievements;
pub mod arc;
pub mod collision;
pub mod config;
pub mod effects;
pub mod entity;
pub mod gauge;
pub mod input;
pub mod machine;
pub mod mission;
pub mod physics;
pub mod puzzle;
pub mod rescue;
pub mod slingshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use achievements::{AchievementSink, AchievementTracker, UnlockedSet};
pub use arc::ArcSegment;
pub use collision::{CollisionModel, ContactOutcome};
pub use config::{ArcadeConfig, SkinId};
pub use effects::{ActiveEffects, TimedEffect};
pub use entity::{Avatar, AvatarShape, CelestialBody, Item, ItemKind, Particle, PowerUpKind};
pub use gauge::Gauge;
pub use input::{InputAdapter, TickInput};
pub use machine::{Phase, Trigger};
pub use mission::{MissionConfig, MissionState};
pub use physics::TimeStep;
pub use puzzle::{Grid, Rotation};
pub use rescue::{RescueConfig, RescueState};
pub use slingshot::{SlingshotConfig, SlingshotState};
pub use state::{ArcadeState, GameEvent};
pub use tick::tick;
