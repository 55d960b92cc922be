//! Global research mission
//!
//! Events (storms, fires, blackouts) pop up on a world map. Select a satellite
//! of the matching type and deploy it onto an event; deployed satellites scan
//! their event on a fixed cadence. Finish the research before time runs out.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::achievements::{AchievementRule, AchievementTracker, Metric};
use super::input::TickInput;
use super::machine::{Phase, Trigger};
use super::physics::TimeStep;
use super::state::{GameEvent, transition};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Weather,
    Environment,
    Comms,
}

impl EventType {
    pub const ALL: [EventType; 3] = [EventType::Weather, EventType::Environment, EventType::Comms];

    pub fn event_name(self) -> &'static str {
        match self {
            EventType::Weather => "Hurricane",
            EventType::Environment => "Wildfire",
            EventType::Comms => "Comms Blackout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    pub arena: Vec2,
    /// Height of the satellite panel above the map
    pub panel_height: f32,
    pub duration_secs: f32,
    pub max_events: usize,
    pub scan_interval_ms: f32,
    pub progress_per_scan: f32,
    pub win_progress: f32,
    pub spawn_base_ms: f32,
    pub spawn_min_ms: f32,
    /// Spawn interval shrinks by this many ms per research point
    pub spawn_ms_per_progress: f32,
    pub base_scans: u32,
    /// Past this much research, some events need an extra scan
    pub hard_after_progress: f32,
    pub hard_chance: f32,
    pub event_radius: f32,
    pub satellite_radius: f32,
    pub error_flash_ms: f32,
    pub satellites: Vec<(String, EventType)>,
    pub achievements: Vec<AchievementRule>,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            arena: Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
            panel_height: 60.0,
            duration_secs: 180.0,
            max_events: 5,
            scan_interval_ms: 2000.0,
            progress_per_scan: 5.0,
            win_progress: 100.0,
            spawn_base_ms: 8000.0,
            spawn_min_ms: 4000.0,
            spawn_ms_per_progress: 35.0,
            base_scans: 3,
            hard_after_progress: 50.0,
            hard_chance: 0.4,
            event_radius: 25.0,
            satellite_radius: 22.0,
            error_flash_ms: 500.0,
            satellites: vec![
                ("Atmo-1".into(), EventType::Weather),
                ("EcoSat".into(), EventType::Environment),
                ("LinkStar".into(), EventType::Comms),
            ],
            achievements: vec![AchievementRule::new("global-savior", Metric::MissionsWon, 1.0)],
        }
    }
}

impl MissionConfig {
    pub fn spawn_interval_ms(&self, progress: f32) -> f32 {
        (self.spawn_base_ms - progress * self.spawn_ms_per_progress).max(self.spawn_min_ms)
    }

    /// Map area below the satellite panel
    pub fn map_origin(&self) -> Vec2 {
        Vec2::new(0.0, self.panel_height)
    }

    pub fn map_size(&self) -> Vec2 {
        Vec2::new(self.arena.x, self.arena.y - self.panel_height)
    }

    /// Satellite buttons spread across the panel (15%, 50%, 85% for three)
    pub fn satellite_slot(&self, index: usize) -> Vec2 {
        let n = self.satellites.len().max(1) as f32;
        let fraction = if n <= 1.0 { 0.5 } else { 0.15 + 0.7 * index as f32 / (n - 1.0) };
        Vec2::new(self.arena.x * fraction, self.panel_height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionEvent {
    pub id: u32,
    pub kind: EventType,
    /// Position as a fraction of the map area
    pub location: Vec2,
    pub required_scans: u32,
    pub scans_done: u32,
}

impl MissionEvent {
    pub fn name(&self) -> &'static str {
        self.kind.event_name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionSatellite {
    pub id: u32,
    pub name: String,
    pub kind: EventType,
    pub deployed_to: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct MissionState {
    pub phase: Phase,
    pub time_left_ms: f32,
    pub progress: f32,
    pub events: Vec<MissionEvent>,
    pub satellites: Vec<MissionSatellite>,
    pub selected: Option<u32>,
    /// Event flashing red after a mismatched deploy, and for how long
    pub error_flash: Option<(u32, f32)>,
    pub spawn_clock_ms: f32,
    pub scan_clock_ms: f32,
    pub missions_won: u32,
    pub achievements: AchievementTracker,
    pub rng: Pcg32,
    next_id: u32,
}

impl MissionState {
    pub fn new(config: &MissionConfig, seed: u64) -> Self {
        Self {
            phase: Phase::Start,
            time_left_ms: config.duration_secs * 1000.0,
            progress: 0.0,
            events: Vec::new(),
            satellites: Vec::new(),
            selected: None,
            error_flash: None,
            spawn_clock_ms: 0.0,
            scan_clock_ms: 0.0,
            missions_won: 0,
            achievements: AchievementTracker::new(config.achievements.clone()),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn start_mission(&mut self, config: &MissionConfig) {
        self.time_left_ms = config.duration_secs * 1000.0;
        self.progress = 0.0;
        self.events.clear();
        self.satellites = config
            .satellites
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| MissionSatellite {
                id: i as u32 + 1,
                name: name.clone(),
                kind: *kind,
                deployed_to: None,
            })
            .collect();
        self.selected = None;
        self.error_flash = None;
        self.spawn_clock_ms = 0.0;
        self.scan_clock_ms = 0.0;
        self.spawn_event(config);
        log::info!("Mission started with {} satellites", self.satellites.len());
    }

    /// Canvas position of an event marker
    pub fn event_pos(&self, config: &MissionConfig, event: &MissionEvent) -> Vec2 {
        config.map_origin() + event.location * config.map_size()
    }

    pub fn time_left_secs(&self) -> u32 {
        (self.time_left_ms / 1000.0).ceil().max(0.0) as u32
    }

    fn spawn_event(&mut self, config: &MissionConfig) {
        if self.events.len() >= config.max_events {
            return;
        }
        let kind = EventType::ALL[self.rng.random_range(0..EventType::ALL.len())];
        let hard = self.progress > config.hard_after_progress && self.rng.random::<f32>() < config.hard_chance;
        let location = Vec2::new(self.rng.random_range(0.15..0.85), self.rng.random_range(0.15..0.85));
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("{} event {} spawned", kind.event_name(), id);
        self.events.push(MissionEvent {
            id,
            kind,
            location,
            required_scans: config.base_scans + u32::from(hard),
            scans_done: 0,
        });
    }

    /// One scan pass: every event with a satellite on it advances a scan.
    /// Finished events are removed and their satellites freed.
    fn scan(&mut self, config: &MissionConfig, events: &mut Vec<GameEvent>) {
        let mut progressed = false;
        let mut finished = Vec::new();
        for event in self.events.iter_mut() {
            let watched = self.satellites.iter().any(|s| s.deployed_to == Some(event.id));
            if watched && event.scans_done < event.required_scans {
                event.scans_done += 1;
                progressed = true;
                if event.scans_done >= event.required_scans {
                    finished.push(event.id);
                }
            }
        }
        if progressed {
            self.progress = (self.progress + config.progress_per_scan).min(config.win_progress);
        }
        if finished.is_empty() {
            return;
        }
        self.events.retain(|e| !finished.contains(&e.id));
        for sat in self.satellites.iter_mut() {
            if sat.deployed_to.is_some_and(|id| finished.contains(&id)) {
                sat.deployed_to = None;
            }
        }
        events.extend(finished.iter().map(|_| GameEvent::Completed));
    }

    fn click(&mut self, config: &MissionConfig, pointer: Vec2, events: &mut Vec<GameEvent>) {
        let picked = (0..self.satellites.len())
            .find(|&i| config.satellite_slot(i).distance(pointer) < config.satellite_radius);
        if let Some(i) = picked {
            let sat = &self.satellites[i];
            if sat.deployed_to.is_none() {
                self.selected = if self.selected == Some(sat.id) { None } else { Some(sat.id) };
            }
            return;
        }

        let Some(selected) = self.selected else {
            return;
        };
        let Some(event) = self
            .events
            .iter()
            .find(|e| self.event_pos(config, e).distance(pointer) < config.event_radius)
        else {
            return;
        };
        let (event_id, event_kind) = (event.id, event.kind);

        let Some(sat) = self.satellites.iter_mut().find(|s| s.id == selected) else {
            return;
        };
        if sat.kind != event_kind {
            self.error_flash = Some((event_id, config.error_flash_ms));
            events.push(GameEvent::Rejected);
            return;
        }
        sat.deployed_to = Some(event_id);
        log::debug!("{} deployed to event {}", sat.name, event_id);
        self.selected = None;
    }
}

pub fn tick(config: &MissionConfig, state: &mut MissionState, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        transition(&mut state.phase, Trigger::PauseToggle, &mut events);
    }

    match state.phase {
        Phase::Start | Phase::Won | Phase::Lost => {
            if input.clicked {
                if state.phase.is_terminal() {
                    transition(&mut state.phase, Trigger::Click, &mut events);
                }
                state.start_mission(config);
                transition(&mut state.phase, Trigger::Click, &mut events);
            }
            return events;
        }
        Phase::Playing => {}
        _ => return events,
    }

    let ms = step.millis();
    if let Some((id, left)) = state.error_flash {
        state.error_flash = (left - ms > 0.0).then_some((id, left - ms));
    }

    if input.clicked
        && let Some(pointer) = input.pointer
    {
        state.click(config, pointer, &mut events);
    }

    state.spawn_clock_ms += ms;
    let interval = config.spawn_interval_ms(state.progress);
    if state.spawn_clock_ms >= interval {
        state.spawn_clock_ms -= interval;
        state.spawn_event(config);
    }

    state.scan_clock_ms += ms;
    if state.scan_clock_ms >= config.scan_interval_ms {
        state.scan_clock_ms -= config.scan_interval_ms;
        state.scan(config, &mut events);
    }

    state.time_left_ms = (state.time_left_ms - ms).max(0.0);
    if state.progress >= config.win_progress {
        transition(&mut state.phase, Trigger::WinReached, &mut events);
        state.missions_won += 1;
        for id in state.achievements.observe(Metric::MissionsWon, state.missions_won as f32) {
            events.push(GameEvent::Achievement(id));
        }
    } else if state.time_left_ms <= 0.0 {
        transition(&mut state.phase, Trigger::TimerExpired, &mut events);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_at(p: Vec2) -> TickInput {
        TickInput { pointer: Some(p), clicked: true, ..Default::default() }
    }

    fn started(config: &MissionConfig) -> MissionState {
        let mut state = MissionState::new(config, 21);
        tick(config, &mut state, &click_at(Vec2::ZERO), TimeStep::NOMINAL);
        state
    }

    fn event_of(state: &mut MissionState, kind: EventType) -> MissionEvent {
        let event = MissionEvent {
            id: 900 + state.events.len() as u32,
            kind,
            location: Vec2::new(0.5, 0.5),
            required_scans: 3,
            scans_done: 0,
        };
        state.events = vec![event.clone()];
        event
    }

    #[test]
    fn test_start_spawns_first_event() {
        let config = MissionConfig::default();
        let state = started(&config);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.satellites.len(), 3);
        let loc = state.events[0].location;
        assert!((0.15..0.85).contains(&loc.x) && (0.15..0.85).contains(&loc.y));
    }

    #[test]
    fn test_spawn_interval_shrinks_with_progress() {
        let config = MissionConfig::default();
        assert_eq!(config.spawn_interval_ms(0.0), 8000.0);
        assert_eq!(config.spawn_interval_ms(40.0), 6600.0);
        assert_eq!(config.spawn_interval_ms(100.0), 4500.0);
        assert_eq!(config.spawn_interval_ms(115.0), 4000.0);
        assert_eq!(config.spawn_interval_ms(200.0), 4000.0);
    }

    #[test]
    fn test_select_toggles() {
        let config = MissionConfig::default();
        let mut state = started(&config);
        let slot = config.satellite_slot(1);
        tick(&config, &mut state, &click_at(slot), TimeStep::NOMINAL);
        assert_eq!(state.selected, Some(2));
        tick(&config, &mut state, &click_at(slot), TimeStep::NOMINAL);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_mismatched_deploy_flashes_error() {
        let config = MissionConfig::default();
        let mut state = started(&config);
        let event = event_of(&mut state, EventType::Comms);
        let at = state.event_pos(&config, &event);

        tick(&config, &mut state, &click_at(config.satellite_slot(0)), TimeStep::NOMINAL);
        let events = tick(&config, &mut state, &click_at(at), TimeStep::NOMINAL);
        assert!(events.contains(&GameEvent::Rejected));
        assert_eq!(state.error_flash.map(|(id, _)| id), Some(event.id));
        assert!(state.satellites[0].deployed_to.is_none());

        for _ in 0..40 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert!(state.error_flash.is_none());
    }

    #[test]
    fn test_scans_complete_event_and_free_satellite() {
        let config = MissionConfig::default();
        let mut state = started(&config);
        let event = event_of(&mut state, EventType::Weather);
        let at = state.event_pos(&config, &event);
        tick(&config, &mut state, &click_at(config.satellite_slot(0)), TimeStep::NOMINAL);
        tick(&config, &mut state, &click_at(at), TimeStep::NOMINAL);
        assert_eq!(state.satellites[0].deployed_to, Some(event.id));
        assert_eq!(state.selected, None);

        let mut completed = 0;
        for _ in 0..3 {
            state.scan_clock_ms = config.scan_interval_ms;
            let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
            completed += events.iter().filter(|e| **e == GameEvent::Completed).count();
        }
        assert_eq!(completed, 1);
        assert_eq!(state.progress, 15.0);
        assert!(state.events.iter().all(|e| e.id != event.id));
        assert!(state.satellites[0].deployed_to.is_none());
    }

    #[test]
    fn test_deployed_satellite_cannot_be_reselected() {
        let config = MissionConfig::default();
        let mut state = started(&config);
        let event = event_of(&mut state, EventType::Weather);
        state.satellites[0].deployed_to = Some(event.id);
        tick(&config, &mut state, &click_at(config.satellite_slot(0)), TimeStep::NOMINAL);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_event_cap() {
        let config = MissionConfig::default();
        let mut state = started(&config);
        for _ in 0..20 {
            state.spawn_event(&config);
        }
        assert_eq!(state.events.len(), 5);
    }

    #[test]
    fn test_full_research_wins_once() {
        let config = MissionConfig::default();
        let mut state = started(&config);
        state.progress = 100.0;
        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Won);
        assert!(events.contains(&GameEvent::Achievement("global-savior".into())));

        tick(&config, &mut state, &click_at(Vec2::ZERO), TimeStep::NOMINAL);
        state.progress = 100.0;
        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Won);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Achievement(_))));
    }

    #[test]
    fn test_countdown_expiry_loses() {
        let config = MissionConfig::default();
        let mut state = started(&config);
        state.time_left_ms = 5.0;
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Lost);
    }
}
