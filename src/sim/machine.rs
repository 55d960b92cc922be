//! Game phase state machine shared by every mini-game
//!
//! One transition table. Games fire triggers; illegal triggers are ignored.

use serde::{Deserialize, Serialize};

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Idle, awaiting first input
    #[default]
    Start,
    /// Active simulation
    Playing,
    /// Slingshot: charging a launch
    Aiming,
    /// Slingshot: probe in free flight
    Flying,
    /// Outer loop suspended while a repair puzzle is open
    Repairing,
    Paused,
    Won,
    Lost,
}

/// Things that move a round between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Click,
    PauseToggle,
    BeginAim,
    Release,
    /// Health hit zero or heat hit its ceiling
    ResourceBound,
    OutOfBounds,
    FatalContact,
    WinReached,
    TimerExpired,
    OpenRepair,
    RepairDone,
}

impl Phase {
    /// The transition table
    pub fn on(self, trigger: Trigger) -> Option<Phase> {
        use Phase::*;
        use Trigger::*;
        match (self, trigger) {
            (Start, Click) => Some(Playing),
            (Start, BeginAim) => Some(Aiming),
            (Aiming, Release) => Some(Flying),
            (Playing, PauseToggle) => Some(Paused),
            (Paused, PauseToggle) => Some(Playing),
            (Playing | Flying | Repairing, ResourceBound | OutOfBounds | FatalContact | TimerExpired) => Some(Lost),
            (Playing | Flying, WinReached) => Some(Won),
            (Playing, OpenRepair) => Some(Repairing),
            (Repairing, RepairDone) => Some(Playing),
            (Won | Lost, Click) => Some(Start),
            _ => None,
        }
    }

    /// Apply a trigger in place; returns whether the phase changed
    pub fn fire(&mut self, trigger: Trigger) -> bool {
        match self.on(trigger) {
            Some(next) => {
                log::info!("Phase {:?} -> {:?} ({:?})", self, next, trigger);
                *self = next;
                true
            }
            None => false,
        }
    }

    /// Round is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }

    /// Simulation should advance this frame
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Playing | Phase::Aiming | Phase::Flying | Phase::Repairing)
    }

    /// Full-canvas panel drawn over the scene
    pub fn shows_overlay(&self) -> bool {
        matches!(self, Phase::Start | Phase::Won | Phase::Lost | Phase::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arcade_round_trip() {
        let mut phase = Phase::Start;
        assert!(phase.fire(Trigger::Click));
        assert_eq!(phase, Phase::Playing);
        assert!(phase.fire(Trigger::ResourceBound));
        assert_eq!(phase, Phase::Lost);
        assert!(phase.fire(Trigger::Click));
        assert_eq!(phase, Phase::Start);
    }

    #[test]
    fn test_slingshot_flow() {
        let mut phase = Phase::Start;
        assert!(phase.fire(Trigger::BeginAim));
        assert!(phase.fire(Trigger::Release));
        assert_eq!(phase, Phase::Flying);
        assert!(phase.fire(Trigger::WinReached));
        assert_eq!(phase, Phase::Won);
    }

    #[test]
    fn test_repair_suspends_and_resumes() {
        let mut phase = Phase::Playing;
        assert!(phase.fire(Trigger::OpenRepair));
        assert_eq!(phase, Phase::Repairing);
        assert!(!phase.fire(Trigger::PauseToggle));
        assert!(phase.fire(Trigger::RepairDone));
        assert_eq!(phase, Phase::Playing);
    }

    #[test]
    fn test_illegal_triggers_are_ignored() {
        assert_eq!(Phase::Start.on(Trigger::ResourceBound), None);
        assert_eq!(Phase::Won.on(Trigger::FatalContact), None);
        assert_eq!(Phase::Paused.on(Trigger::TimerExpired), None);
        assert_eq!(Phase::Aiming.on(Trigger::Click), None);
    }

    #[test]
    fn test_pause_toggles() {
        let mut phase = Phase::Playing;
        phase.fire(Trigger::PauseToggle);
        assert_eq!(phase, Phase::Paused);
        assert!(phase.shows_overlay());
        phase.fire(Trigger::PauseToggle);
        assert_eq!(phase, Phase::Playing);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(Phase::Won.is_terminal());
        assert!(Phase::Lost.is_terminal());
        assert!(!Phase::Paused.is_terminal());
        assert!(Phase::Repairing.is_running());
    }
}
