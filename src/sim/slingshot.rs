//! Gravity slingshot
//!
//! Press to start charging, move the pointer to aim, release to launch. The
//! probe then coasts under the pull of every body on the level until it
//! reaches the target, hits a body, or drifts out of the arena.

use anyhow::{Context, ensure};
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize};

use super::achievements::{AchievementRule, AchievementTracker, Metric};
use super::collision::{circles_overlap, out_of_bounds};
use super::entity::{BurstSpec, CelestialBody, Particle, ParticleTint, Trail, spawn_burst, update_particles};
use super::input::TickInput;
use super::machine::{Phase, Trigger};
use super::physics::{TimeStep, step_gravity};
use super::state::{GameEvent, transition};
use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlingshotLevel {
    pub name: String,
    pub probe_start: Vec2,
    pub target_name: String,
    pub target_pos: Vec2,
    pub target_radius: f32,
    pub bodies: Vec<CelestialBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlingshotConfig {
    pub arena: Vec2,
    /// Multiplier on `mass / dist²`
    pub gravity_scale: f32,
    pub max_power: f32,
    /// Charge time per unit of power
    pub ms_per_power: f32,
    /// Launch speed per unit of power
    pub launch_scale: f32,
    pub probe_radius: f32,
    /// Minimum spacing between recorded path points
    pub path_spacing: f32,
    pub path_capacity: usize,
    /// Never empty
    #[serde(deserialize_with = "non_empty_levels")]
    levels: Vec<SlingshotLevel>,
    pub achievements: Vec<AchievementRule>,
}

impl Default for SlingshotConfig {
    fn default() -> Self {
        Self {
            arena: Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
            gravity_scale: 0.1,
            max_power: 50.0,
            ms_per_power: 20.0,
            launch_scale: 0.2,
            probe_radius: 6.0,
            path_spacing: 5.0,
            path_capacity: 600,
            levels: default_levels(),
            achievements: vec![AchievementRule::new("orbital-mechanic", Metric::LevelsCompleted, 3.0)],
        }
    }
}

impl SlingshotConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("parsing slingshot config")?;
        ensure!(config.ms_per_power > 0.0, "ms_per_power must be positive");
        Ok(config)
    }

    /// Replace the level list
    pub fn with_levels(mut self, levels: Vec<SlingshotLevel>) -> anyhow::Result<Self> {
        ensure!(!levels.is_empty(), "slingshot config has no levels");
        self.levels = levels;
        Ok(self)
    }

    pub fn levels(&self) -> &[SlingshotLevel] {
        &self.levels
    }

    /// Level at `index`, wrapping past the last one
    pub fn level(&self, index: usize) -> &SlingshotLevel {
        &self.levels[index % self.levels.len()]
    }
}

fn non_empty_levels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SlingshotLevel>, D::Error> {
    let levels = Vec::<SlingshotLevel>::deserialize(deserializer)?;
    if levels.is_empty() {
        return Err(serde::de::Error::custom("slingshot config has no levels"));
    }
    Ok(levels)
}

fn default_levels() -> Vec<SlingshotLevel> {
    let level = |name: &str, start: (f32, f32), target: (&str, f32, f32, f32), bodies| SlingshotLevel {
        name: name.into(),
        probe_start: Vec2::new(start.0, start.1),
        target_name: target.0.into(),
        target_pos: Vec2::new(target.1, target.2),
        target_radius: target.3,
        bodies,
    };
    vec![
        level(
            "Earth to Moon",
            (150.0, 225.0),
            ("Moon", 650.0, 225.0, 15.0),
            vec![CelestialBody::new("Earth", Vec2::new(150.0, 225.0), 25.0, 3000.0)],
        ),
        level(
            "Slingshot Around Jupiter",
            (150.0, 100.0),
            ("Space Station", 150.0, 350.0, 15.0),
            vec![CelestialBody::new("Jupiter", Vec2::new(400.0, 225.0), 40.0, 12000.0)],
        ),
        level(
            "Navigate the Asteroid Field",
            (100.0, 225.0),
            ("Mars", 700.0, 225.0, 15.0),
            vec![
                CelestialBody::new("Asteroid", Vec2::new(250.0, 150.0), 15.0, 2000.0),
                CelestialBody::new("Asteroid", Vec2::new(350.0, 300.0), 20.0, 4000.0),
                CelestialBody::new("Asteroid", Vec2::new(500.0, 180.0), 18.0, 3500.0),
            ],
        ),
        level(
            "The Grand Tour",
            (100.0, 225.0),
            ("Pluto", 700.0, 225.0, 20.0),
            vec![
                CelestialBody::new("Venus", Vec2::new(200.0, 150.0), 20.0, 3000.0),
                CelestialBody::new("Saturn", Vec2::new(400.0, 300.0), 30.0, 8000.0),
                CelestialBody::new("Neptune", Vec2::new(550.0, 150.0), 25.0, 6000.0),
            ],
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct Probe {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub path: Trail,
}

#[derive(Debug, Clone)]
pub struct SlingshotState {
    pub phase: Phase,
    pub level_index: usize,
    pub probe: Probe,
    /// Aim direction (radians)
    pub aim_angle: f32,
    pub power: f32,
    pub charge_ms: f32,
    /// Body the probe sat inside at launch; ignored until the probe clears it
    pub launch_body: Option<usize>,
    /// Phase to return to when a pause ends
    pub resume: Option<Phase>,
    pub completed: u32,
    pub achievements: AchievementTracker,
    pub particles: Vec<Particle>,
    pub rng: Pcg32,
}

impl SlingshotState {
    pub fn new(config: &SlingshotConfig, seed: u64) -> Self {
        let level = config.level(0);
        Self {
            phase: Phase::Start,
            level_index: 0,
            probe: Probe {
                pos: level.probe_start,
                vel: Vec2::ZERO,
                radius: config.probe_radius,
                path: Trail::new(config.path_capacity, config.path_spacing),
            },
            aim_angle: 0.0,
            power: 0.0,
            charge_ms: 0.0,
            launch_body: None,
            resume: None,
            completed: 0,
            achievements: AchievementTracker::new(config.achievements.clone()),
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn level<'a>(&self, config: &'a SlingshotConfig) -> &'a SlingshotLevel {
        config.level(self.level_index)
    }

    /// Put the probe back on the launch point of the current level
    pub fn setup_level(&mut self, config: &SlingshotConfig) {
        let start = self.level(config).probe_start;
        self.probe.pos = start;
        self.probe.vel = Vec2::ZERO;
        self.probe.path.clear();
        self.aim_angle = 0.0;
        self.power = 0.0;
        self.charge_ms = 0.0;
        self.launch_body = None;
        self.particles.clear();
        log::info!("Slingshot level {}: {}", self.level_index + 1, self.level(config).name);
    }

    /// Where the aim indicator ends (probe + direction * power * 2)
    pub fn aim_tip(&self) -> Vec2 {
        self.probe.pos + Vec2::from_angle(self.aim_angle) * self.power * 2.0
    }
}

pub fn tick(config: &SlingshotConfig, state: &mut SlingshotState, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if input.pause {
        toggle_pause(state, &mut events);
    }
    if state.phase == Phase::Paused {
        return events;
    }
    update_particles(&mut state.particles, step);

    match state.phase {
        Phase::Won | Phase::Lost => {
            if input.clicked {
                if state.phase == Phase::Won {
                    state.level_index = (state.level_index + 1) % config.levels().len();
                }
                transition(&mut state.phase, Trigger::Click, &mut events);
                state.setup_level(config);
            }
        }
        Phase::Start => {
            if input.pressed {
                transition(&mut state.phase, Trigger::BeginAim, &mut events);
                state.charge_ms = 0.0;
                state.power = 0.0;
                aim(state, input);
                // Press and release landed in the same frame
                if input.released {
                    launch(config, state, &mut events);
                }
            }
        }
        Phase::Aiming => {
            state.charge_ms += step.millis();
            state.power = (state.charge_ms / config.ms_per_power).min(config.max_power);
            aim(state, input);
            if input.released {
                launch(config, state, &mut events);
            }
        }
        Phase::Flying => fly(config, state, step, &mut events),
        _ => {}
    }
    events
}

/// Aiming and flight pause in place and resume into the same phase
fn toggle_pause(state: &mut SlingshotState, events: &mut Vec<GameEvent>) {
    let from = state.phase;
    let to = match (from, state.resume) {
        (Phase::Aiming | Phase::Flying, _) => {
            state.resume = Some(from);
            Phase::Paused
        }
        (Phase::Paused, Some(resume)) => {
            state.resume = None;
            resume
        }
        _ => return,
    };
    log::info!("Phase {:?} -> {:?} (PauseToggle)", from, to);
    state.phase = to;
    events.push(GameEvent::PhaseChanged { from, to });
}

fn aim(state: &mut SlingshotState, input: &TickInput) {
    if let Some(pointer) = input.pointer {
        let d = pointer - state.probe.pos;
        if d.length_squared() > 0.0 {
            state.aim_angle = d.y.atan2(d.x);
        }
    }
}

fn launch(config: &SlingshotConfig, state: &mut SlingshotState, events: &mut Vec<GameEvent>) {
    let probe = &mut state.probe;
    probe.vel = Vec2::from_angle(state.aim_angle) * state.power * config.launch_scale;
    probe.path.clear();
    probe.path.record(probe.pos);
    state.launch_body = config
        .level(state.level_index)
        .bodies
        .iter()
        .position(|b| circles_overlap(b.pos, b.radius, probe.pos, probe.radius));
    log::debug!("Probe launched at power {:.1}", state.power);
    transition(&mut state.phase, Trigger::Release, events);
}

fn fly(config: &SlingshotConfig, state: &mut SlingshotState, step: TimeStep, events: &mut Vec<GameEvent>) {
    let level = config.level(state.level_index);
    let probe = &mut state.probe;
    step_gravity(&mut probe.pos, &mut probe.vel, &level.bodies, config.gravity_scale, step);
    probe.path.record(probe.pos);

    if let Some(i) = state.launch_body
        && let Some(body) = level.bodies.get(i)
        && !circles_overlap(body.pos, body.radius, probe.pos, probe.radius)
    {
        state.launch_body = None;
    }

    let (pos, radius) = (probe.pos, probe.radius);
    if circles_overlap(pos, radius, level.target_pos, level.target_radius) {
        transition(&mut state.phase, Trigger::WinReached, events);
        state.completed += 1;
        events.push(GameEvent::Completed);
        burst(state, pos, ParticleTint::Star);
        for id in state.achievements.observe(Metric::LevelsCompleted, state.completed as f32) {
            events.push(GameEvent::Achievement(id));
        }
    } else if out_of_bounds(pos, 0.0, config.arena, CULL_MARGIN) {
        transition(&mut state.phase, Trigger::OutOfBounds, events);
    } else if level
        .bodies
        .iter()
        .enumerate()
        .any(|(i, b)| Some(i) != state.launch_body && circles_overlap(b.pos, b.radius, pos, radius))
    {
        transition(&mut state.phase, Trigger::FatalContact, events);
        burst(state, pos, ParticleTint::Fire);
    }
}

fn burst(state: &mut SlingshotState, at: Vec2, tint: ParticleTint) {
    let spec = BurstSpec { count: 25, speed: 5.0, life: 40.0 };
    spawn_burst(&mut state.particles, &mut state.rng, at, spec, tint, MAX_PARTICLES);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(at: Vec2) -> TickInput {
        TickInput { pointer: Some(at), pressed: true, ..Default::default() }
    }

    fn release(at: Vec2) -> TickInput {
        TickInput { pointer: Some(at), released: true, ..Default::default() }
    }

    /// Charge for `frames` nominal frames aiming at `at`, then release
    fn launch_toward(config: &SlingshotConfig, state: &mut SlingshotState, at: Vec2, frames: u32) {
        tick(config, state, &press(at), TimeStep::NOMINAL);
        for _ in 0..frames {
            tick(config, state, &TickInput { pointer: Some(at), ..Default::default() }, TimeStep::NOMINAL);
        }
        tick(config, state, &release(at), TimeStep::NOMINAL);
    }

    #[test]
    fn test_charge_caps_power() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        tick(&config, &mut state, &press(Vec2::new(300.0, 225.0)), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Aiming);

        for _ in 0..12 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert!((state.power - 10.0).abs() < 1e-2);
        for _ in 0..100 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert_eq!(state.power, 50.0);
    }

    #[test]
    fn test_release_launches_along_aim() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        tick(&config, &mut state, &press(Vec2::new(300.0, 225.0)), TimeStep::NOMINAL);
        state.charge_ms = 1000.0 - NOMINAL_FRAME_MS;
        tick(&config, &mut state, &release(Vec2::new(300.0, 225.0)), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Flying);
        assert!((state.probe.vel - Vec2::new(10.0, 0.0)).length() < 1e-3);
        // Launched from inside Earth
        assert_eq!(state.launch_body, Some(0));
    }

    #[test]
    fn test_trajectory_bends_toward_body() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        state.level_index = 1;
        state.setup_level(&config);

        launch_toward(&config, &mut state, Vec2::new(400.0, 100.0), 10);
        let v0 = state.probe.vel;
        assert!(v0.x > 0.0 && v0.y.abs() < 1e-4);

        let jupiter = config.level(1).bodies[0].pos;
        for _ in 0..10 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert_eq!(state.phase, Phase::Flying);
        let bearing = jupiter - state.probe.pos;
        // Velocity turned the same way as the body lies
        assert!(v0.perp_dot(state.probe.vel) * v0.perp_dot(bearing) > 0.0);
        assert!(state.probe.vel.y > 0.0);
    }

    #[test]
    fn test_hitting_target_completes_level() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        state.phase = Phase::Flying;
        let level = config.level(0).clone();
        state.probe.pos = level.target_pos - Vec2::new(20.0, 0.0);
        state.probe.vel = Vec2::new(5.0, 0.0);

        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Won);
        assert_eq!(state.completed, 1);
        assert!(events.contains(&GameEvent::Completed));

        tick(&config, &mut state, &TickInput { clicked: true, ..Default::default() }, TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Start);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.probe.pos, config.level(1).probe_start);
    }

    #[test]
    fn test_leaving_arena_loses_and_retries_same_level() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        state.level_index = 2;
        state.setup_level(&config);
        state.phase = Phase::Flying;
        state.probe.pos = Vec2::new(100.0, -45.0);
        state.probe.vel = Vec2::new(0.0, -10.0);

        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Lost);
        tick(&config, &mut state, &TickInput { clicked: true, ..Default::default() }, TimeStep::NOMINAL);
        assert_eq!(state.level_index, 2);
        assert_eq!(state.phase, Phase::Start);
    }

    #[test]
    fn test_crashing_into_body_loses() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        state.level_index = 1;
        state.setup_level(&config);
        state.phase = Phase::Flying;
        state.probe.pos = Vec2::new(350.0, 225.0);
        state.probe.vel = Vec2::new(5.0, 0.0);
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Lost);
    }

    #[test]
    fn test_three_levels_unlock_orbital_mechanic_once() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        let mut unlocked = Vec::new();
        for _ in 0..4 {
            state.phase = Phase::Flying;
            let level = config.level(state.level_index).clone();
            state.launch_body = None;
            state.probe.pos = level.target_pos;
            state.probe.vel = Vec2::ZERO;
            for e in tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL) {
                if let GameEvent::Achievement(id) = e {
                    unlocked.push(id);
                }
            }
            tick(&config, &mut state, &TickInput { clicked: true, ..Default::default() }, TimeStep::NOMINAL);
        }
        assert_eq!(state.completed, 4);
        assert_eq!(unlocked, vec!["orbital-mechanic".to_string()]);
    }

    #[test]
    fn test_path_records_spaced_points() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        state.level_index = 2;
        state.setup_level(&config);
        launch_toward(&config, &mut state, Vec2::new(700.0, 225.0), 50);
        for _ in 0..20 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        let points: Vec<Vec2> = state.probe.path.iter().copied().collect();
        assert!(points.len() > 2);
        assert!(points.windows(2).all(|w| w[0].distance(w[1]) >= config.path_spacing));
    }

    #[test]
    fn test_levels_parse_from_json() {
        let json = serde_json::to_string(&SlingshotConfig::default()).unwrap();
        let config = SlingshotConfig::from_json(&json).unwrap();
        assert_eq!(config.levels().len(), 4);
        assert_eq!(config.level(5).name, "Slingshot Around Jupiter");
        assert!(SlingshotConfig::from_json(r#"{"levels": []}"#).is_err());
    }

    #[test]
    fn test_empty_levels_are_rejected() {
        let mut value = serde_json::to_value(SlingshotConfig::default()).unwrap();
        value["levels"] = serde_json::json!([]);
        let err = SlingshotConfig::from_json(&value.to_string()).unwrap_err();
        assert!(format!("{:#}", err).contains("no levels"));
        assert!(SlingshotConfig::default().with_levels(Vec::new()).is_err());

        let single = SlingshotConfig::default().levels()[3].clone();
        let config = SlingshotConfig::default().with_levels(vec![single]).unwrap();
        assert_eq!(config.level(7).name, "The Grand Tour");
    }

    #[test]
    fn test_quick_tap_launches() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        let at = Vec2::new(300.0, 225.0);
        let tap = TickInput { pointer: Some(at), pressed: true, released: true, clicked: true, ..Default::default() };
        let events = tick(&config, &mut state, &tap, TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Flying);
        assert_eq!(
            events,
            vec![
                GameEvent::PhaseChanged { from: Phase::Start, to: Phase::Aiming },
                GameEvent::PhaseChanged { from: Phase::Aiming, to: Phase::Flying },
            ]
        );
        for _ in 0..200 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert_ne!(state.phase, Phase::Aiming);
    }

    #[test]
    fn test_pause_resumes_flight() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        state.level_index = 2;
        state.setup_level(&config);
        launch_toward(&config, &mut state, Vec2::new(700.0, 225.0), 20);
        assert_eq!(state.phase, Phase::Flying);

        let pause = TickInput { pause: true, ..Default::default() };
        tick(&config, &mut state, &pause, TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Paused);
        let frozen = state.probe.pos;
        for _ in 0..30 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert_eq!(state.probe.pos, frozen);

        tick(&config, &mut state, &pause, TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Flying);
        assert_eq!(state.resume, None);
        assert_ne!(state.probe.pos, frozen);
    }

    #[test]
    fn test_pause_ignored_before_launch() {
        let config = SlingshotConfig::default();
        let mut state = SlingshotState::new(&config, 1);
        let events = tick(&config, &mut state, &TickInput { pause: true, ..Default::default() }, TimeStep::NOMINAL);
        assert!(events.is_empty());
        assert_eq!(state.phase, Phase::Start);
    }
}
