//! Collision detection and contact outcomes
//!
//! Geometry tests are pure. `resolve_contact` turns "this item touched the
//! avatar" into exactly one outcome given the active effects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{ActiveEffects, TimedEffect};
use super::entity::{AvatarShape, ItemKind, PowerUpKind};

/// Euclidean distance against summed radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Circle vs axis-aligned rectangle via the rectangle's closest point
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect_center: Vec2, half: Vec2) -> bool {
    let closest = center.clamp(rect_center - half, rect_center + half);
    closest.distance_squared(center) < radius * radius
}

/// Axis-aligned box overlap (edge comparison)
pub fn aabb_overlap(a_center: Vec2, a_half: Vec2, b_center: Vec2, b_half: Vec2) -> bool {
    (a_center.x - b_center.x).abs() < a_half.x + b_half.x
        && (a_center.y - b_center.y).abs() < a_half.y + b_half.y
}

/// How an item is tested against the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionModel {
    /// Item's bounding square against the avatar box
    #[default]
    Aabb,
    /// Distance between centers against summed radii
    Circle,
    /// Item circle against the avatar box's closest point
    ClosestPoint,
}

/// Whether an item disc touches the avatar under the given model
pub fn avatar_hit(model: CollisionModel, avatar_pos: Vec2, shape: &AvatarShape, item_pos: Vec2, item_radius: f32) -> bool {
    if matches!(shape, AvatarShape::Guard { .. }) {
        return false;
    }
    match model {
        CollisionModel::Aabb => aabb_overlap(avatar_pos, shape.half_extents(), item_pos, Vec2::splat(item_radius)),
        CollisionModel::Circle => circles_overlap(avatar_pos, shape.contact_radius(), item_pos, item_radius),
        CollisionModel::ClosestPoint => circle_rect_overlap(item_pos, item_radius, avatar_pos, shape.half_extents()),
    }
}

/// The single outcome of an item touching the avatar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    Collect { points: f32 },
    Damage { amount: f32, fatal: bool },
    /// Shield took the hit and is spent
    Absorbed,
    /// Phase effect let the hazard pass
    PhasedThrough,
    PowerUp(PowerUpKind),
}

/// Decide what a contact does. Consumes the shield when it absorbs a hit.
pub fn resolve_contact(kind: &ItemKind, effects: &mut ActiveEffects) -> ContactOutcome {
    match kind {
        ItemKind::Collectible { points, .. } => ContactOutcome::Collect { points: *points },
        ItemKind::PowerUp(kind) => ContactOutcome::PowerUp(*kind),
        ItemKind::Hazard(spec) => {
            if effects.is_active(TimedEffect::Phase) {
                ContactOutcome::PhasedThrough
            } else if effects.is_active(TimedEffect::Shield) {
                effects.consume(TimedEffect::Shield);
                ContactOutcome::Absorbed
            } else {
                ContactOutcome::Damage {
                    amount: spec.damage,
                    fatal: spec.fatal,
                }
            }
        }
    }
}

/// Whether a point (plus radius) has left the arena by more than `margin`
pub fn out_of_bounds(pos: Vec2, radius: f32, arena: Vec2, margin: f32) -> bool {
    pos.x + radius < -margin
        || pos.x - radius > arena.x + margin
        || pos.y + radius < -margin
        || pos.y - radius > arena.y + margin
}
