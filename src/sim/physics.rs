//! Per-tick motion: delta-time scaling, linear motion, easing, gravity wells
//!
//! Every per-frame constant in the games is tuned for a 60 Hz frame. A
//! `TimeStep` rescales them to the real elapsed time so motion is frame-rate
//! independent.

use glam::Vec2;

use super::entity::CelestialBody;
use crate::consts::*;

/// Elapsed time for one tick, as a multiple of the nominal frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    pub factor: f32,
}

impl TimeStep {
    /// Exactly one nominal frame
    pub const NOMINAL: TimeStep = TimeStep { factor: 1.0 };

    /// Build from the milliseconds since the previous frame
    pub fn from_elapsed_ms(ms: f64) -> Self {
        let factor = (ms as f32 / NOMINAL_FRAME_MS).clamp(0.0, MAX_FRAME_FACTOR);
        Self {
            factor: if factor.is_finite() { factor } else { 0.0 },
        }
    }

    pub fn millis(&self) -> f32 {
        self.factor * NOMINAL_FRAME_MS
    }

    pub fn seconds(&self) -> f32 {
        self.millis() / 1000.0
    }

    /// Probability of an event within this step, given its per-frame chance
    pub fn scale_chance(&self, per_frame: f32) -> f32 {
        (per_frame * self.factor).clamp(0.0, 1.0)
    }
}

/// `pos += vel * factor`
#[inline]
pub fn integrate(pos: &mut Vec2, vel: Vec2, step: TimeStep) {
    *pos += vel * step.factor;
}

/// Eased pursuit `pos += (target - pos) * k`, compounded over the step.
///
/// The blend weight stays in [0, 1], so the result always lies on the segment
/// between `current` and `target` and never overshoots.
pub fn ease_toward(current: Vec2, target: Vec2, k: f32, step: TimeStep) -> Vec2 {
    let k = k.clamp(0.0, 1.0);
    let t = 1.0 - (1.0 - k).powf(step.factor);
    current + (target - current) * t.clamp(0.0, 1.0)
}

/// Move toward `target` by at most `speed * factor`, stopping on arrival
pub fn approach(current: Vec2, target: Vec2, speed: f32, step: TimeStep) -> Vec2 {
    let delta = target - current;
    let max = speed * step.factor;
    if delta.length() <= max {
        target
    } else {
        current + delta.normalize_or_zero() * max
    }
}

/// Summed gravitational acceleration on a point from every body
pub fn gravity_accel(pos: Vec2, bodies: &[CelestialBody], scale: f32) -> Vec2 {
    bodies.iter().fold(Vec2::ZERO, |acc, body| {
        let d = body.pos - pos;
        let dist_sq = d.length_squared().max(MIN_GRAVITY_DIST_SQ);
        acc + d.normalize_or_zero() * (body.mass * scale / dist_sq)
    })
}

/// Accumulate gravity from every body into the velocity, then move
pub fn step_gravity(pos: &mut Vec2, vel: &mut Vec2, bodies: &[CelestialBody], scale: f32, step: TimeStep) {
    *vel += gravity_accel(*pos, bodies, scale) * step.factor;
    integrate(pos, *vel, step);
}

/// Magnet pull: items within `radius` of `anchor` slide toward it
pub fn magnet_pull(pos: Vec2, anchor: Vec2, radius: f32, strength: f32, step: TimeStep) -> Vec2 {
    if pos.distance(anchor) < radius {
        approach(pos, anchor, strength, step)
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_time_step_scaling() {
        let step = TimeStep::from_elapsed_ms(33.34);
        assert!((step.factor - 2.0).abs() < 1e-3);
        assert_eq!(TimeStep::from_elapsed_ms(10_000.0).factor, MAX_FRAME_FACTOR);
        assert_eq!(TimeStep::from_elapsed_ms(-5.0).factor, 0.0);
        assert_eq!(TimeStep::from_elapsed_ms(f64::NAN).factor, 0.0);
    }

    #[test]
    fn test_integrate_scales_with_factor() {
        let mut pos = Vec2::ZERO;
        integrate(&mut pos, Vec2::new(3.0, -1.0), TimeStep { factor: 2.0 });
        assert_eq!(pos, Vec2::new(6.0, -2.0));
    }

    #[test]
    fn test_eased_pursuit_converges_without_overshoot() {
        let target = Vec2::new(300.0, 120.0);
        let mut pos = Vec2::new(400.0, 370.0);
        let mut last_dist = pos.distance(target);
        for _ in 0..120 {
            let next = ease_toward(pos, target, 0.1, TimeStep::NOMINAL);
            // Stays on the segment toward the target
            assert!(next.x >= target.x && next.x <= pos.x);
            assert!(next.y >= target.y && next.y <= pos.y);
            let dist = next.distance(target);
            assert!(dist <= last_dist);
            last_dist = dist;
            pos = next;
        }
        assert!(last_dist < 0.5);
    }

    #[test]
    fn test_gravity_pulls_toward_body() {
        let bodies = [CelestialBody::new("Jupiter", Vec2::new(400.0, 225.0), 40.0, 12000.0)];
        let accel = gravity_accel(Vec2::new(200.0, 225.0), &bodies, 0.1);
        assert!(accel.x > 0.0);
        assert!(accel.y.abs() < 1e-6);
        assert!((accel.x - 0.03).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_degenerate_distance_is_finite() {
        let bodies = [CelestialBody::new("Earth", Vec2::new(10.0, 10.0), 25.0, 3000.0)];
        let at_center = gravity_accel(Vec2::new(10.0, 10.0), &bodies, 1.0);
        assert_eq!(at_center, Vec2::ZERO);
        let close = gravity_accel(Vec2::new(10.0001, 10.0), &bodies, 1.0);
        assert!(close.is_finite());
        assert!(close.length() <= 3000.0 / MIN_GRAVITY_DIST_SQ + 1e-3);
    }

    #[test]
    fn test_magnet_pull_only_in_range() {
        let anchor = Vec2::new(100.0, 100.0);
        let near = magnet_pull(Vec2::new(100.0, 0.0), anchor, 150.0, 5.0, TimeStep::NOMINAL);
        assert_eq!(near, Vec2::new(100.0, 5.0));
        let far = magnet_pull(Vec2::new(400.0, 100.0), anchor, 150.0, 5.0, TimeStep::NOMINAL);
        assert_eq!(far, Vec2::new(400.0, 100.0));
    }

    proptest! {
        #[test]
        fn prop_ease_never_overshoots(
            cx in -500.0f32..500.0, cy in -500.0f32..500.0,
            tx in -500.0f32..500.0, ty in -500.0f32..500.0,
            k in 0.0f32..1.0, ms in 0.0f64..200.0,
        ) {
            let current = Vec2::new(cx, cy);
            let target = Vec2::new(tx, ty);
            let next = ease_toward(current, target, k, TimeStep::from_elapsed_ms(ms));
            prop_assert!(next.distance(target) <= current.distance(target) + 1e-3);
        }
    }
}
