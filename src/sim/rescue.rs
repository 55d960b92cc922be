//! Satellite rescue
//!
//! Damaged satellites circle the planet. Click one to send the repair drone;
//! on arrival the outer game is suspended while the player solves a tile
//! puzzle. Repair every damaged satellite before the countdown runs out.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::achievements::{AchievementRule, AchievementTracker, Metric};
use super::input::TickInput;
use super::machine::{Phase, Trigger};
use super::physics::{TimeStep, approach};
use super::puzzle::Grid;
use super::state::{GameEvent, transition};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SatelliteType {
    Communication,
    Weather,
    Gps,
    Science,
}

impl SatelliteType {
    pub const ALL: [SatelliteType; 4] = [
        SatelliteType::Communication,
        SatelliteType::Weather,
        SatelliteType::Gps,
        SatelliteType::Science,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueConfig {
    pub arena: Vec2,
    pub base_satellites: u32,
    /// Extra satellites per level, up to this many
    pub max_extra_satellites: u32,
    /// Orbit radius is `min(w, h) / 2 - orbit_inset`
    pub orbit_inset: f32,
    pub damaged_chance: f32,
    pub drone_speed: f32,
    /// Click distance that selects a satellite
    pub pick_radius: f32,
    pub base_time_secs: f32,
    /// Countdown shrinks by this much per level
    pub time_per_level_secs: f32,
    pub min_time_secs: f32,
    pub puzzle_size: usize,
    pub puzzle_cell: f32,
    pub achievements: Vec<AchievementRule>,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            arena: Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
            base_satellites: 4,
            max_extra_satellites: 4,
            orbit_inset: 70.0,
            damaged_chance: 0.7,
            drone_speed: 4.0,
            pick_radius: 30.0,
            base_time_secs: 180.0,
            time_per_level_secs: 15.0,
            min_time_secs: 60.0,
            puzzle_size: 5,
            puzzle_cell: 60.0,
            achievements: vec![AchievementRule::new("satellite-savior", Metric::Repairs, 5.0)],
        }
    }
}

impl RescueConfig {
    pub fn center(&self) -> Vec2 {
        self.arena / 2.0
    }

    pub fn orbit_radius(&self) -> f32 {
        (self.arena.x.min(self.arena.y) / 2.0 - self.orbit_inset).max(0.0)
    }

    pub fn satellites_for(&self, level: u32) -> u32 {
        self.base_satellites + level.min(self.max_extra_satellites)
    }

    pub fn countdown_secs(&self, level: u32) -> f32 {
        (self.base_time_secs - level.saturating_sub(1) as f32 * self.time_per_level_secs).max(self.min_time_secs)
    }

    /// Screen placement of the repair puzzle
    pub fn puzzle_layout(&self) -> PuzzleLayout {
        let extent = self.puzzle_cell * self.puzzle_size as f32;
        PuzzleLayout {
            origin: self.center() - Vec2::splat(extent / 2.0),
            cell: self.puzzle_cell,
            size: self.puzzle_size,
        }
    }
}

/// Maps between canvas points and puzzle cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuzzleLayout {
    pub origin: Vec2,
    pub cell: f32,
    pub size: usize,
}

impl PuzzleLayout {
    /// (row, col) under a canvas point
    pub fn cell_at(&self, p: Vec2) -> Option<(usize, usize)> {
        let local = (p - self.origin) / self.cell;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (row, col) = (local.y as usize, local.x as usize);
        (row < self.size && col < self.size).then_some((row, col))
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Vec2 {
        self.origin + (Vec2::new(col as f32, row as f32) + 0.5) * self.cell
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Satellite {
    pub id: u32,
    pub pos: Vec2,
    pub angle: f32,
    pub kind: SatelliteType,
    pub damaged: bool,
    pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drone {
    pub pos: Vec2,
    pub target: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RescueState {
    pub phase: Phase,
    pub level: u32,
    pub satellites: Vec<Satellite>,
    pub drone: Drone,
    /// Puzzle for the satellite under repair
    pub puzzle: Option<Grid>,
    pub repairing: Option<u32>,
    pub repaired_this_round: u32,
    pub repaired_total: u32,
    pub time_left_ms: f32,
    pub achievements: AchievementTracker,
    pub rng: Pcg32,
}

impl RescueState {
    pub fn new(config: &RescueConfig, seed: u64) -> Self {
        Self {
            phase: Phase::Start,
            level: 1,
            satellites: Vec::new(),
            drone: Drone {
                pos: config.center(),
                target: None,
            },
            puzzle: None,
            repairing: None,
            repaired_this_round: 0,
            repaired_total: 0,
            time_left_ms: config.countdown_secs(1) * 1000.0,
            achievements: AchievementTracker::new(config.achievements.clone()),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Lay out a fresh constellation for the current level
    pub fn start_round(&mut self, config: &RescueConfig) {
        let count = config.satellites_for(self.level);
        let radius = config.orbit_radius();
        let center = config.center();
        self.satellites = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                let damaged = self.rng.random::<f32>() < config.damaged_chance;
                Satellite {
                    id: i,
                    pos: center + Vec2::from_angle(angle) * radius,
                    angle,
                    kind: SatelliteType::ALL[self.rng.random_range(0..SatelliteType::ALL.len())],
                    damaged,
                    fixed: false,
                }
            })
            .collect();
        if !self.satellites.iter().any(|s| s.damaged) && count > 0 {
            let idx = self.rng.random_range(0..self.satellites.len());
            self.satellites[idx].damaged = true;
        }

        self.drone = Drone { pos: center, target: None };
        self.puzzle = None;
        self.repairing = None;
        self.repaired_this_round = 0;
        self.time_left_ms = config.countdown_secs(self.level) * 1000.0;
        log::info!(
            "Rescue level {}: {} satellites, {} damaged",
            self.level,
            count,
            self.damaged_count()
        );
    }

    pub fn damaged_count(&self) -> usize {
        self.satellites.iter().filter(|s| s.damaged).count()
    }

    pub fn time_left_secs(&self) -> u32 {
        (self.time_left_ms / 1000.0).ceil().max(0.0) as u32
    }

    fn satellite(&self, id: u32) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.id == id)
    }
}

pub fn tick(config: &RescueConfig, state: &mut RescueState, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
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
                state.start_round(config);
                transition(&mut state.phase, Trigger::Click, &mut events);
            }
            return events;
        }
        Phase::Playing | Phase::Repairing => {}
        _ => return events,
    }

    state.time_left_ms = (state.time_left_ms - step.millis()).max(0.0);
    if state.time_left_ms <= 0.0 {
        transition(&mut state.phase, Trigger::TimerExpired, &mut events);
        return events;
    }

    if state.phase == Phase::Repairing {
        if input.clicked
            && let Some(pointer) = input.pointer
        {
            repair_click(config, state, pointer, &mut events);
        }
        return events;
    }

    if input.clicked
        && let Some(pointer) = input.pointer
        && let Some(sat) = state
            .satellites
            .iter()
            .find(|s| s.damaged && s.pos.distance(pointer) < config.pick_radius)
    {
        log::debug!("Drone dispatched to satellite {}", sat.id);
        state.drone.target = Some(sat.id);
    }

    let Some(target) = state.drone.target.and_then(|id| state.satellite(id)).cloned() else {
        return events;
    };
    state.drone.pos = approach(state.drone.pos, target.pos, config.drone_speed, step);
    if state.drone.pos == target.pos && target.damaged {
        state.puzzle = Some(Grid::generate(config.puzzle_size, &mut state.rng));
        state.repairing = Some(target.id);
        transition(&mut state.phase, Trigger::OpenRepair, &mut events);
    }
    events
}

fn repair_click(config: &RescueConfig, state: &mut RescueState, pointer: Vec2, events: &mut Vec<GameEvent>) {
    let Some((row, col)) = config.puzzle_layout().cell_at(pointer) else {
        return;
    };
    let Some(puzzle) = state.puzzle.as_mut() else {
        return;
    };
    puzzle.rotate_tile(row, col);
    if !puzzle.is_solved() {
        return;
    }

    if let Some(id) = state.repairing.take()
        && let Some(sat) = state.satellites.iter_mut().find(|s| s.id == id)
    {
        sat.damaged = false;
        sat.fixed = true;
    }
    state.puzzle = None;
    state.drone.target = None;
    state.repaired_this_round += 1;
    state.repaired_total += 1;
    events.push(GameEvent::Completed);
    for id in state.achievements.observe(Metric::Repairs, state.repaired_total as f32) {
        events.push(GameEvent::Achievement(id));
    }

    transition(&mut state.phase, Trigger::RepairDone, events);
    if state.damaged_count() == 0 {
        transition(&mut state.phase, Trigger::WinReached, events);
        state.level += 1;
        log::info!("All satellites repaired, advancing to level {}", state.level);
    }
}
