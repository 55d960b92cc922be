//! The `MiniGame` seam
//!
//! Every arcade game is a state value plus a pure tick and a pure scene
//! builder. Hosts drive any of them through this trait, so the frame loop,
//! input wiring and achievement forwarding exist once.

use glam::Vec2;

use crate::renderer::scene::{self, Backdrop, RenderOptions};
use crate::renderer::Frame;
use crate::sim::{
    ArcadeConfig, ArcadeState, GameEvent, MissionConfig, MissionState, Phase, RescueConfig, RescueState,
    SlingshotConfig, SlingshotState, TickInput, TimeStep, mission, rescue, slingshot,
};

const BACKDROP_STARS: usize = 120;

pub trait MiniGame {
    fn kind(&self) -> GameKind;
    fn title(&self) -> &str;
    fn arena(&self) -> Vec2;
    fn phase(&self) -> Phase;
    /// Advance one frame; the returned events are in occurrence order
    fn tick(&mut self, input: &TickInput, step: TimeStep) -> Vec<GameEvent>;
    fn frame(&self, opts: &RenderOptions) -> Frame;
}

/// Built-in games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    CosmicCollector,
    ClassicCollector,
    AsteroidNavigator,
    ParkerProbe,
    SolarShield,
    Slingshot,
    SatelliteRescue,
    GlobalMission,
}

impl GameKind {
    pub const ALL: [GameKind; 8] = [
        GameKind::CosmicCollector,
        GameKind::ClassicCollector,
        GameKind::AsteroidNavigator,
        GameKind::ParkerProbe,
        GameKind::SolarShield,
        GameKind::Slingshot,
        GameKind::SatelliteRescue,
        GameKind::GlobalMission,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            GameKind::CosmicCollector => "cosmic-collector",
            GameKind::ClassicCollector => "classic-collector",
            GameKind::AsteroidNavigator => "asteroid-navigator",
            GameKind::ParkerProbe => "parker-probe",
            GameKind::SolarShield => "solar-shield",
            GameKind::Slingshot => "gravity-slingshot",
            GameKind::SatelliteRescue => "satellite-rescue",
            GameKind::GlobalMission => "global-mission",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    fn arcade_config(&self) -> Option<ArcadeConfig> {
        match self {
            GameKind::CosmicCollector => Some(ArcadeConfig::cosmic_collector()),
            GameKind::ClassicCollector => Some(ArcadeConfig::classic_collector()),
            GameKind::AsteroidNavigator => Some(ArcadeConfig::asteroid_navigator()),
            GameKind::ParkerProbe => Some(ArcadeConfig::parker_probe()),
            GameKind::SolarShield => Some(ArcadeConfig::solar_shield()),
            _ => None,
        }
    }

    /// Fresh game in its Start phase
    pub fn create(&self, seed: u64) -> Box<dyn MiniGame> {
        if let Some(config) = self.arcade_config() {
            return Box::new(ArcadeGame::new(*self, config, seed));
        }
        match self {
            GameKind::Slingshot => Box::new(SlingshotGame::new(SlingshotConfig::default(), seed)),
            GameKind::SatelliteRescue => Box::new(RescueGame::new(RescueConfig::default(), seed)),
            _ => Box::new(MissionGame::new(MissionConfig::default(), seed)),
        }
    }
}

/// Any `ArcadeConfig`-driven game
pub struct ArcadeGame {
    kind: GameKind,
    config: ArcadeConfig,
    state: ArcadeState,
    backdrop: Backdrop,
}

impl ArcadeGame {
    pub fn new(kind: GameKind, config: ArcadeConfig, seed: u64) -> Self {
        let state = ArcadeState::new(&config, seed);
        let backdrop = Backdrop::new(config.arena, BACKDROP_STARS, seed);
        Self {
            kind,
            config,
            state,
            backdrop,
        }
    }

    /// Build from user-supplied JSON, rejecting invalid tuning
    pub fn from_json(kind: GameKind, json: &str, seed: u64) -> anyhow::Result<Self> {
        let config = ArcadeConfig::from_json(json)?;
        Ok(Self::new(kind, config, seed))
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn state(&self) -> &ArcadeState {
        &self.state
    }
}

impl MiniGame for ArcadeGame {
    fn kind(&self) -> GameKind {
        self.kind
    }

    fn title(&self) -> &str {
        &self.config.title
    }

    fn arena(&self) -> Vec2 {
        self.config.arena
    }

    fn phase(&self) -> Phase {
        self.state.phase
    }

    fn tick(&mut self, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
        crate::sim::tick(&self.config, &mut self.state, input, step)
    }

    fn frame(&self, opts: &RenderOptions) -> Frame {
        scene::arcade_frame(&self.config, &self.state, &self.backdrop, opts)
    }
}

pub struct SlingshotGame {
    config: SlingshotConfig,
    state: SlingshotState,
    backdrop: Backdrop,
}

impl SlingshotGame {
    pub fn new(config: SlingshotConfig, seed: u64) -> Self {
        let state = SlingshotState::new(&config, seed);
        let backdrop = Backdrop::new(config.arena, BACKDROP_STARS, seed);
        Self {
            config,
            state,
            backdrop,
        }
    }

    pub fn state(&self) -> &SlingshotState {
        &self.state
    }
}

impl MiniGame for SlingshotGame {
    fn kind(&self) -> GameKind {
        GameKind::Slingshot
    }

    fn title(&self) -> &str {
        "Gravity Slingshot"
    }

    fn arena(&self) -> Vec2 {
        self.config.arena
    }

    fn phase(&self) -> Phase {
        self.state.phase
    }

    fn tick(&mut self, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
        slingshot::tick(&self.config, &mut self.state, input, step)
    }

    fn frame(&self, opts: &RenderOptions) -> Frame {
        scene::slingshot_frame(&self.config, &self.state, &self.backdrop, opts)
    }
}

pub struct RescueGame {
    config: RescueConfig,
    state: RescueState,
    backdrop: Backdrop,
}

impl RescueGame {
    pub fn new(config: RescueConfig, seed: u64) -> Self {
        let state = RescueState::new(&config, seed);
        let backdrop = Backdrop::new(config.arena, BACKDROP_STARS, seed);
        Self {
            config,
            state,
            backdrop,
        }
    }

    pub fn state(&self) -> &RescueState {
        &self.state
    }
}

impl MiniGame for RescueGame {
    fn kind(&self) -> GameKind {
        GameKind::SatelliteRescue
    }

    fn title(&self) -> &str {
        "Satellite Rescue Mission"
    }

    fn arena(&self) -> Vec2 {
        self.config.arena
    }

    fn phase(&self) -> Phase {
        self.state.phase
    }

    fn tick(&mut self, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
        rescue::tick(&self.config, &mut self.state, input, step)
    }

    fn frame(&self, opts: &RenderOptions) -> Frame {
        scene::rescue_frame(&self.config, &self.state, &self.backdrop, opts)
    }
}

pub struct MissionGame {
    config: MissionConfig,
    state: MissionState,
    backdrop: Backdrop,
}

impl MissionGame {
    pub fn new(config: MissionConfig, seed: u64) -> Self {
        let state = MissionState::new(&config, seed);
        let backdrop = Backdrop::new(config.arena, BACKDROP_STARS, seed);
        Self {
            config,
            state,
            backdrop,
        }
    }

    pub fn state(&self) -> &MissionState {
        &self.state
    }
}

impl MiniGame for MissionGame {
    fn kind(&self) -> GameKind {
        GameKind::GlobalMission
    }

    fn title(&self) -> &str {
        "Global Mission Control"
    }

    fn arena(&self) -> Vec2 {
        self.config.arena
    }

    fn phase(&self) -> Phase {
        self.state.phase
    }

    fn tick(&mut self, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
        mission::tick(&self.config, &mut self.state, input, step)
    }

    fn frame(&self, opts: &RenderOptions) -> Frame {
        scene::mission_frame(&self.config, &self.state, &self.backdrop, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Layer;

    fn click() -> TickInput {
        TickInput {
            pressed: true,
            clicked: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_slugs_roundtrip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(GameKind::from_slug("pong"), None);
    }

    #[test]
    fn test_every_game_starts_and_runs() {
        let opts = RenderOptions::default();
        for kind in GameKind::ALL {
            let mut game = kind.create(11);
            assert_eq!(game.kind(), kind);
            assert_eq!(game.phase(), Phase::Start, "{}", kind.slug());
            let frame = game.frame(&opts);
            assert!(frame.is_layer_ordered());
            assert!(frame.texts(Layer::Overlay).contains(&game.title()) || kind == GameKind::Slingshot);

            let events = game.tick(&click(), TimeStep::NOMINAL);
            assert!(
                events.iter().any(|e| matches!(e, GameEvent::PhaseChanged { .. })),
                "{} did not leave Start",
                kind.slug()
            );
            for _ in 0..120 {
                game.tick(&TickInput::default(), TimeStep::NOMINAL);
            }
            let frame = game.frame(&opts);
            assert!(frame.is_layer_ordered());
            assert_eq!(frame.size, game.arena());
        }
    }

    #[test]
    fn test_arcade_from_json_validates() {
        let json = ArcadeConfig::parker_probe().to_json().unwrap();
        let game = ArcadeGame::from_json(GameKind::ParkerProbe, &json, 3).unwrap();
        assert_eq!(game.title(), "Parker Solar Probe");
        assert!(ArcadeGame::from_json(GameKind::ParkerProbe, "{}", 3).is_err());
    }
}
