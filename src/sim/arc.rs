//! Shield guard geometry
//!
//! A guard is a band of `thickness` around a circle of `radius` about the
//! defended base, limited to the angles from `theta_start` clockwise to
//! `theta_end` (screen space, y down).

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{cartesian_to_polar, normalize_angle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub center: Vec2,
    pub radius: f32,
    pub thickness: f32,
    /// Normalized to [-π, π)
    pub theta_start: f32,
    /// Normalized to [-π, π)
    pub theta_end: f32,
}

impl ArcSegment {
    pub fn new(center: Vec2, radius: f32, thickness: f32, theta_start: f32, theta_end: f32) -> Self {
        Self {
            center,
            radius,
            thickness,
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
        }
    }

    /// Arc of angular `width` centred on `heading`
    pub fn facing(center: Vec2, radius: f32, thickness: f32, heading: f32, width: f32) -> Self {
        let half = width / 2.0;
        Self::new(center, radius, thickness, heading - half, heading + half)
    }

    /// Radial band covered by the guard
    pub fn band(&self) -> (f32, f32) {
        let half = self.thickness / 2.0;
        (self.radius - half, self.radius + half)
    }

    pub fn angular_span(&self) -> f32 {
        (self.theta_end - self.theta_start).rem_euclid(TAU)
    }

    /// Angle lies between start and end going clockwise (wraps through ±π)
    pub fn contains_angle(&self, theta: f32) -> bool {
        (normalize_angle(theta) - self.theta_start).rem_euclid(TAU) <= self.angular_span()
    }

    /// Whether a disc at `point` touches the band
    pub fn blocks(&self, point: Vec2, radius: f32) -> bool {
        let (dist, theta) = cartesian_to_polar(point - self.center);
        let (inner, outer) = self.band();
        (inner - radius..=outer + radius).contains(&dist) && self.contains_angle(theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_quarter_arc_angles() {
        let arc = ArcSegment::new(Vec2::ZERO, 100.0, 10.0, 0.0, PI / 2.0);
        assert!(arc.contains_angle(0.1));
        assert!(arc.contains_angle(PI / 4.0));
        assert!(!arc.contains_angle(PI));
        assert!(!arc.contains_angle(-PI / 4.0));
        assert_eq!(arc.band(), (95.0, 105.0));
    }

    #[test]
    fn test_arc_through_pi() {
        // Guard facing straight left, toward the sun
        let arc = ArcSegment::facing(Vec2::ZERO, 70.0, 8.0, PI, 20.0_f32.to_radians());
        assert!(arc.contains_angle(PI));
        assert!(arc.contains_angle(-PI + 0.01));
        assert!(!arc.contains_angle(0.0));
        assert!((arc.angular_span() - 20.0_f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_blocks_uses_offset_center() {
        let earth = Vec2::new(640.0, 225.0);
        let guard = ArcSegment::facing(earth, 70.0, 8.0, PI, PI / 1.5);
        // Flare sitting on the guard band, left of Earth
        assert!(guard.blocks(earth + Vec2::new(-72.0, 0.0), 10.0));
        // Same radius but behind Earth
        assert!(!guard.blocks(earth + Vec2::new(72.0, 0.0), 10.0));
        // Left of Earth but still far out
        assert!(!guard.blocks(earth + Vec2::new(-120.0, 0.0), 10.0));
    }
}
