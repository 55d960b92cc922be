//! Bounded player resources (health, heat, guard power)

use serde::{Deserialize, Serialize};

/// Which bound ends the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaugeDirection {
    /// Harm lowers the value; losing at zero (health, integrity)
    Depleting,
    /// Harm raises the value; losing at max (heat)
    Saturating,
}

/// A resource clamped to [0, max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub value: f32,
    pub max: f32,
    pub direction: GaugeDirection,
}

impl Gauge {
    pub fn depleting(max: f32) -> Self {
        Self {
            value: max,
            max,
            direction: GaugeDirection::Depleting,
        }
    }

    pub fn saturating(max: f32) -> Self {
        Self {
            value: 0.0,
            max,
            direction: GaugeDirection::Saturating,
        }
    }

    /// Move toward the losing bound
    pub fn harm(&mut self, amount: f32) {
        let amount = amount.max(0.0);
        match self.direction {
            GaugeDirection::Depleting => self.set(self.value - amount),
            GaugeDirection::Saturating => self.set(self.value + amount),
        }
    }

    /// Move away from the losing bound (regeneration, cooling)
    pub fn relieve(&mut self, amount: f32) {
        let amount = amount.max(0.0);
        match self.direction {
            GaugeDirection::Depleting => self.set(self.value + amount),
            GaugeDirection::Saturating => self.set(self.value - amount),
        }
    }

    fn set(&mut self, value: f32) {
        self.value = if value.is_finite() { value.clamp(0.0, self.max) } else { self.value };
    }

    /// Round-ending bound reached
    pub fn at_bound(&self) -> bool {
        match self.direction {
            GaugeDirection::Depleting => self.value <= 0.0,
            GaugeDirection::Saturating => self.value >= self.max,
        }
    }

    /// Fill fraction for HUD bars
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 { 0.0 } else { self.value / self.max }
    }

    /// Within a quarter of the losing bound
    pub fn is_critical(&self) -> bool {
        match self.direction {
            GaugeDirection::Depleting => self.fraction() < 0.25,
            GaugeDirection::Saturating => self.fraction() > 0.75,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_three_hits_leave_forty() {
        let mut health = Gauge::depleting(100.0);
        for _ in 0..3 {
            health.harm(20.0);
        }
        assert_eq!(health.value, 40.0);
        assert!(!health.at_bound());
    }

    #[test]
    fn test_overkill_clamps_to_zero() {
        let mut health = Gauge::depleting(100.0);
        health.value = 15.0;
        health.harm(20.0);
        assert_eq!(health.value, 0.0);
        assert!(health.at_bound());
    }

    #[test]
    fn test_heat_saturates() {
        let mut heat = Gauge::saturating(100.0);
        heat.harm(95.0);
        heat.harm(15.0);
        assert_eq!(heat.value, 100.0);
        assert!(heat.at_bound());
        heat.relieve(0.25);
        assert!(!heat.at_bound());
        assert!(heat.is_critical());
        heat.relieve(50.0);
        assert!(!heat.is_critical());
    }

    proptest! {
        #[test]
        fn prop_depleting_harm_is_monotone_and_clamped(hits in prop::collection::vec(0.0f32..60.0, 0..50)) {
            let mut health = Gauge::depleting(100.0);
            let mut last = health.value;
            for hit in hits {
                health.harm(hit);
                prop_assert!(health.value <= last);
                prop_assert!(health.value >= 0.0 && health.value <= 100.0);
                last = health.value;
            }
        }

        #[test]
        fn prop_relief_never_exceeds_bounds(ops in prop::collection::vec((any::<bool>(), -10.0f32..50.0), 0..80)) {
            let mut heat = Gauge::saturating(100.0);
            for (harm, amount) in ops {
                if harm { heat.harm(amount) } else { heat.relieve(amount) }
                prop_assert!(heat.value >= 0.0 && heat.value <= 100.0);
            }
        }
    }
}
