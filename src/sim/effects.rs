//! Timed power-up effects
//!
//! Each effect is a countdown. An effect is active exactly while its counter is
//! non-zero, so there is no separate flag to drift out of sync.

use serde::{Deserialize, Serialize};

use super::entity::PowerUpKind;

/// Effects that run on a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimedEffect {
    Phase,
    Shield,
    Magnet,
}

impl TimedEffect {
    pub const ALL: [TimedEffect; 3] = [TimedEffect::Phase, TimedEffect::Shield, TimedEffect::Magnet];

    pub fn label(&self) -> &'static str {
        match self {
            TimedEffect::Phase => "PHASE",
            TimedEffect::Shield => "SHIELD",
            TimedEffect::Magnet => "MAGNET",
        }
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub phase_ticks: u32,
    pub shield_ticks: u32,
    pub magnet_ticks: u32,
    /// Discrete laser ammo (not timed)
    pub laser_charges: u32,
}

impl ActiveEffects {
    pub fn ticks(&self, effect: TimedEffect) -> u32 {
        match effect {
            TimedEffect::Phase => self.phase_ticks,
            TimedEffect::Shield => self.shield_ticks,
            TimedEffect::Magnet => self.magnet_ticks,
        }
    }

    fn ticks_mut(&mut self, effect: TimedEffect) -> &mut u32 {
        match effect {
            TimedEffect::Phase => &mut self.phase_ticks,
            TimedEffect::Shield => &mut self.shield_ticks,
            TimedEffect::Magnet => &mut self.magnet_ticks,
        }
    }

    #[inline]
    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.ticks(effect) > 0
    }

    /// (Re)start an effect's countdown
    pub fn arm(&mut self, effect: TimedEffect, duration_ticks: u32) {
        *self.ticks_mut(effect) = duration_ticks;
    }

    /// End an effect immediately (a shield absorbing a hit)
    pub fn consume(&mut self, effect: TimedEffect) {
        *self.ticks_mut(effect) = 0;
    }

    /// Apply a collected power-up
    pub fn apply(&mut self, kind: PowerUpKind, duration_ticks: u32) {
        match kind {
            PowerUpKind::Phase => self.arm(TimedEffect::Phase, duration_ticks),
            PowerUpKind::Shield => self.arm(TimedEffect::Shield, duration_ticks),
            PowerUpKind::Magnet => self.arm(TimedEffect::Magnet, duration_ticks),
            PowerUpKind::Laser => self.laser_charges += 1,
        }
    }

    /// Spend one laser charge if any remain
    pub fn take_laser_charge(&mut self) -> bool {
        if self.laser_charges == 0 {
            return false;
        }
        self.laser_charges -= 1;
        true
    }

    /// Count every timer down by one tick; returns effects that just ran out
    pub fn decay(&mut self) -> Vec<TimedEffect> {
        let mut expired = Vec::new();
        for effect in TimedEffect::ALL {
            let ticks = self.ticks_mut(effect);
            if *ticks > 0 {
                *ticks = ticks.saturating_sub(1);
                if *ticks == 0 {
                    expired.push(effect);
                }
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decay_reaches_zero_and_stays() {
        let mut fx = ActiveEffects::default();
        fx.arm(TimedEffect::Magnet, 3);
        assert!(fx.is_active(TimedEffect::Magnet));
        assert!(fx.decay().is_empty());
        assert!(fx.decay().is_empty());
        assert_eq!(fx.decay(), vec![TimedEffect::Magnet]);
        assert!(!fx.is_active(TimedEffect::Magnet));
        assert!(fx.decay().is_empty());
        assert_eq!(fx.magnet_ticks, 0);
    }

    #[test]
    fn test_rearm_resets_countdown() {
        let mut fx = ActiveEffects::default();
        fx.apply(PowerUpKind::Shield, 300);
        for _ in 0..200 {
            fx.decay();
        }
        fx.apply(PowerUpKind::Shield, 300);
        assert_eq!(fx.shield_ticks, 300);
    }

    #[test]
    fn test_consume_shield() {
        let mut fx = ActiveEffects::default();
        fx.apply(PowerUpKind::Shield, 300);
        fx.consume(TimedEffect::Shield);
        assert!(!fx.is_active(TimedEffect::Shield));
    }

    #[test]
    fn test_laser_is_ammo_not_timer() {
        let mut fx = ActiveEffects::default();
        assert!(!fx.take_laser_charge());
        fx.apply(PowerUpKind::Laser, 300);
        fx.decay();
        assert!(fx.take_laser_charge());
        assert!(!fx.take_laser_charge());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Arm(usize, u32),
        Consume(usize),
        Decay,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3, 0u32..20).prop_map(|(e, d)| Op::Arm(e, d)),
            (0usize..3).prop_map(Op::Consume),
            Just(Op::Decay),
        ]
    }

    proptest! {
        #[test]
        fn prop_active_iff_timer_nonzero(ops in prop::collection::vec(op(), 0..200)) {
            let mut fx = ActiveEffects::default();
            for op in ops {
                let before = fx.clone();
                match op {
                    Op::Arm(e, d) => fx.arm(TimedEffect::ALL[e], d),
                    Op::Consume(e) => fx.consume(TimedEffect::ALL[e]),
                    Op::Decay => {
                        fx.decay();
                        for effect in TimedEffect::ALL {
                            prop_assert_eq!(fx.ticks(effect), before.ticks(effect).saturating_sub(1));
                        }
                    }
                }
                for effect in TimedEffect::ALL {
                    prop_assert_eq!(fx.is_active(effect), fx.ticks(effect) > 0);
                }
            }
        }
    }
}
