//! Scene builders: game state -> `Frame`
//!
//! Each builder reads state only and never mutates it. Order inside a frame is
//! background, bodies, entities, particles, HUD, then the phase overlay.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::commands::{DrawCmd, Frame, Layer, Rgba, TextAlign};
use super::skin::Palette;
use crate::consts::TRAIL_LENGTH;
use crate::settings::Settings;
use crate::sim::config::{ArcadeConfig, SkinId};
use crate::sim::effects::TimedEffect;
use crate::sim::entity::{AvatarShape, HazardCategory, ItemKind, Particle};
use crate::sim::machine::Phase;
use crate::sim::mission::{EventType, MissionConfig, MissionState};
use crate::sim::puzzle::{Direction, Grid, TileKind};
use crate::sim::rescue::{RescueConfig, RescueState};
use crate::sim::slingshot::{SlingshotConfig, SlingshotState};
use crate::sim::state::ArcadeState;

const HUD_TEXT: f32 = 16.0;
const TITLE_TEXT: f32 = 36.0;
const BODY_TEXT: f32 = 18.0;

/// Settings-derived render switches
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Newest trail points drawn; 0 hides trails
    pub trail_points: usize,
    pub starfield: bool,
    pub particle_limit: usize,
    pub high_contrast: bool,
    /// Frames per second to print in the corner
    pub fps: Option<f32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            trail_points: settings.trail_points(TRAIL_LENGTH),
            starfield: settings.quality.starfield_enabled() && !settings.reduced_motion,
            particle_limit: settings.effective_max_particles(),
            high_contrast: settings.high_contrast,
            fps: None,
        }
    }

    pub fn palette(&self, skin: SkinId) -> Palette {
        Palette::for_skin(skin, self.high_contrast)
    }
}

/// Fixed star field drawn behind every game
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    stars: Vec<(Vec2, f32, f32)>,
}

impl Backdrop {
    pub fn new(arena: Vec2, count: usize, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| {
                let pos = Vec2::new(rng.random::<f32>() * arena.x, rng.random::<f32>() * arena.y);
                (pos, 0.5 + rng.random::<f32>() * 1.2, 0.3 + rng.random::<f32>() * 0.7)
            })
            .collect();
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    fn draw(&self, frame: &mut Frame, palette: &Palette, opts: &RenderOptions) {
        frame.push(Layer::Background, DrawCmd::Clear { color: palette.background });
        if !opts.starfield {
            return;
        }
        for &(center, radius, alpha) in &self.stars {
            frame.push(
                Layer::Background,
                DrawCmd::Circle {
                    center,
                    radius,
                    fill: palette.star.with_alpha(alpha),
                },
            );
        }
    }
}

fn clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Dimmed backdrop with centred title, message lines and a click prompt
fn overlay(frame: &mut Frame, palette: &Palette, title: &str, lines: &[String], prompt: &str) {
    let size = frame.size;
    frame.push(
        Layer::Overlay,
        DrawCmd::Rect {
            center: size / 2.0,
            size,
            rotation: 0.0,
            fill: palette.overlay,
        },
    );
    let mut y = size.y / 2.0 - 60.0;
    frame.text(Layer::Overlay, Vec2::new(size.x / 2.0, y), title, TITLE_TEXT, palette.accent, TextAlign::Center);
    for line in lines {
        y += 32.0;
        frame.text(Layer::Overlay, Vec2::new(size.x / 2.0, y), line.as_str(), BODY_TEXT, palette.text, TextAlign::Center);
    }
    if !prompt.is_empty() {
        frame.text(
            Layer::Overlay,
            Vec2::new(size.x / 2.0, y + 50.0),
            prompt,
            BODY_TEXT,
            palette.muted,
            TextAlign::Center,
        );
    }
}

fn paused(frame: &mut Frame, palette: &Palette) {
    overlay(frame, palette, "Paused", &[], "Press P to resume");
}

fn particles(frame: &mut Frame, palette: &Palette, particles: &[Particle], limit: usize) {
    for p in particles.iter().take(limit) {
        frame.push(
            Layer::Particles,
            DrawCmd::Circle {
                center: p.pos,
                radius: p.radius,
                fill: palette.tint(p.tint).with_alpha(p.alpha()),
            },
        );
    }
}

fn fps(frame: &mut Frame, palette: &Palette, opts: &RenderOptions) {
    if let Some(fps) = opts.fps {
        let pos = Vec2::new(frame.size.x - 10.0, frame.size.y - 10.0);
        frame.text(Layer::Hud, pos, format!("{:.0} FPS", fps), 12.0, palette.muted, TextAlign::Right);
    }
}

/// Ship silhouette filling an avatar box
fn ship(center: Vec2, size: Vec2) -> Vec<Vec2> {
    let half = size / 2.0;
    vec![
        center + Vec2::new(0.0, -half.y),
        center + Vec2::new(half.x, half.y),
        center + Vec2::new(0.0, half.y * 0.5),
        center + Vec2::new(-half.x, half.y),
    ]
}

pub fn arcade_frame(config: &ArcadeConfig, state: &ArcadeState, backdrop: &Backdrop, opts: &RenderOptions) -> Frame {
    let palette = opts.palette(config.skin);
    let mut frame = Frame::new(config.arena);
    backdrop.draw(&mut frame, &palette, opts);

    // Danger source and relief zones
    if config.resource.proximity_gain > 0.0 {
        frame.push(
            Layer::Bodies,
            DrawCmd::Circle {
                center: Vec2::new(config.arena.x / 2.0, -config.arena.y * 0.45),
                radius: config.arena.y * 0.6,
                fill: palette.accent.with_alpha(0.6),
            },
        );
    }
    if let Some(zone) = config.resource.safe_zone {
        let size = Vec2::new(zone.margin, config.arena.y);
        for x in [zone.margin / 2.0, config.arena.x - zone.margin / 2.0] {
            frame.push(
                Layer::Bodies,
                DrawCmd::Rect {
                    center: Vec2::new(x, config.arena.y / 2.0),
                    size,
                    rotation: 0.0,
                    fill: Rgba::rgb(59, 130, 246).with_alpha(0.12),
                },
            );
        }
    }
    if let Some(base) = config.base {
        frame.push(
            Layer::Bodies,
            DrawCmd::Circle {
                center: base.source_at * config.arena,
                radius: base.source_radius,
                fill: Rgba::rgb(250, 204, 21),
            },
        );
        frame.push(
            Layer::Bodies,
            DrawCmd::Circle {
                center: base.at * config.arena,
                radius: base.radius,
                fill: Rgba::rgb(59, 130, 246),
            },
        );
    }

    for item in &state.items {
        let fill = palette.item(&item.kind);
        let cmd = match item.kind {
            ItemKind::Hazard(spec) if spec.category == HazardCategory::Junk => DrawCmd::Rect {
                center: item.pos,
                size: Vec2::splat(item.radius * 2.0),
                rotation: item.rotation,
                fill,
            },
            ItemKind::PowerUp(_) => DrawCmd::Ring {
                center: item.pos,
                radius: item.radius,
                width: 3.0,
                stroke: fill,
            },
            _ => DrawCmd::Circle {
                center: item.pos,
                radius: item.radius,
                fill,
            },
        };
        frame.push(Layer::Entities, cmd);
    }
    for p in &state.projectiles {
        frame.push(
            Layer::Entities,
            DrawCmd::Rect {
                center: p.pos,
                size: p.half * 2.0,
                rotation: 0.0,
                fill: palette.danger,
            },
        );
    }

    let avatar = &state.avatar;
    if opts.trail_points > 1
        && let Some(trail) = &avatar.trail
        && trail.len() > 1
    {
        frame.push(
            Layer::Entities,
            DrawCmd::Polyline {
                points: trail.iter().take(opts.trail_points).copied().collect(),
                width: 3.0,
                stroke: palette.accent.with_alpha(0.5),
            },
        );
    }
    let phased = state.effects.is_active(TimedEffect::Phase);
    let avatar_color = palette.avatar.with_alpha(if phased { 0.5 } else { 1.0 });
    match avatar.shape {
        AvatarShape::Rect { width, height } => frame.push(
            Layer::Entities,
            DrawCmd::Polygon {
                points: ship(avatar.pos, Vec2::new(width, height)),
                fill: avatar_color,
            },
        ),
        AvatarShape::Circle { radius } => frame.push(
            Layer::Entities,
            DrawCmd::Circle {
                center: avatar.pos,
                radius,
                fill: avatar_color,
            },
        ),
        AvatarShape::Guard { .. } => {
            if let Some(arc) = state.guard_arc(config) {
                let power = state.guard.map_or(1.0, |g| g.fraction());
                frame.push(
                    Layer::Entities,
                    DrawCmd::Arc {
                        center: arc.center,
                        radius: arc.radius,
                        start: arc.theta_start,
                        end: arc.theta_end,
                        width: arc.thickness,
                        stroke: avatar_color.with_alpha(0.3 + 0.7 * power),
                    },
                );
            }
        }
    }
    if state.effects.is_active(TimedEffect::Shield) {
        frame.push(
            Layer::Entities,
            DrawCmd::Ring {
                center: avatar.pos,
                radius: avatar.shape.half_extents().max_element() + 8.0,
                width: 2.0,
                stroke: palette.power_up(crate::sim::PowerUpKind::Shield),
            },
        );
    }

    particles(&mut frame, &palette, &state.particles, opts.particle_limit);

    // HUD
    frame.text(
        Layer::Hud,
        Vec2::new(10.0, 24.0),
        format!("Score: {}", state.score.floor() as i64),
        HUD_TEXT,
        palette.text,
        TextAlign::Left,
    );
    if config.score_per_level.is_some() {
        frame.text(
            Layer::Hud,
            Vec2::new(10.0, 46.0),
            format!("Level: {}", state.level),
            HUD_TEXT,
            palette.text,
            TextAlign::Left,
        );
    }
    let bar_size = Vec2::new(160.0, 12.0);
    let mut bar_y = 16.0;
    if config.resource.visible {
        let fill = if state.resource.is_critical() {
            palette.danger
        } else {
            palette.bar_fill
        };
        let x = config.arena.x - bar_size.x - 10.0;
        frame.text(Layer::Hud, Vec2::new(x - 8.0, bar_y + 11.0), config.resource.label.as_str(), 12.0, palette.text, TextAlign::Right);
        frame.push(
            Layer::Hud,
            DrawCmd::Bar {
                pos: Vec2::new(x, bar_y),
                size: bar_size,
                fraction: state.resource.fraction(),
                fill,
                back: palette.bar_back,
            },
        );
        bar_y += 20.0;
    }
    if let Some(guard) = state.guard {
        let x = config.arena.x - bar_size.x - 10.0;
        frame.text(Layer::Hud, Vec2::new(x - 8.0, bar_y + 11.0), "SHIELD", 12.0, palette.text, TextAlign::Right);
        frame.push(
            Layer::Hud,
            DrawCmd::Bar {
                pos: Vec2::new(x, bar_y),
                size: bar_size,
                fraction: guard.fraction(),
                fill: palette.accent,
                back: palette.bar_back,
            },
        );
    }
    let mut status = Vec::new();
    for effect in TimedEffect::ALL {
        let ticks = state.effects.ticks(effect);
        if ticks > 0 {
            status.push(format!("{} {}s", effect.label(), ticks.div_ceil(60)));
        }
    }
    if state.effects.laser_charges > 0 {
        status.push(format!("LASER x{}", state.effects.laser_charges));
    }
    for (i, line) in status.iter().enumerate() {
        frame.text(
            Layer::Hud,
            Vec2::new(10.0, config.arena.y - 12.0 - 20.0 * i as f32),
            line.as_str(),
            HUD_TEXT,
            palette.accent,
            TextAlign::Left,
        );
    }
    fps(&mut frame, &palette, opts);

    let score = state.score.floor() as i64;
    match state.phase {
        Phase::Start => overlay(
            &mut frame,
            &palette,
            &config.title,
            &[config.instructions.clone()],
            "Click to start",
        ),
        Phase::Won => overlay(
            &mut frame,
            &palette,
            "You Win!",
            &[format!("Final score: {}", score)],
            "Click to play again",
        ),
        Phase::Lost => overlay(
            &mut frame,
            &palette,
            &config.lose_title,
            &[format!("Final score: {}", score)],
            "Click to restart",
        ),
        Phase::Paused => paused(&mut frame, &palette),
        _ => {}
    }
    frame.finish()
}

pub fn slingshot_frame(config: &SlingshotConfig, state: &SlingshotState, backdrop: &Backdrop, opts: &RenderOptions) -> Frame {
    let palette = opts.palette(SkinId::Slingshot);
    let level = state.level(config);
    let mut frame = Frame::new(config.arena);
    backdrop.draw(&mut frame, &palette, opts);

    for body in &level.bodies {
        frame.push(
            Layer::Bodies,
            DrawCmd::Circle {
                center: body.pos,
                radius: body.radius,
                fill: Rgba::rgb(70, 130, 180),
            },
        );
        frame.text(
            Layer::Bodies,
            body.pos + Vec2::new(0.0, body.radius + 16.0),
            body.name.as_str(),
            12.0,
            palette.muted,
            TextAlign::Center,
        );
    }
    frame.push(
        Layer::Bodies,
        DrawCmd::Circle {
            center: level.target_pos,
            radius: level.target_radius,
            fill: Rgba::rgb(250, 204, 21),
        },
    );
    frame.text(
        Layer::Bodies,
        level.target_pos + Vec2::new(0.0, level.target_radius + 16.0),
        level.target_name.as_str(),
        12.0,
        palette.muted,
        TextAlign::Center,
    );

    let probe = &state.probe;
    if probe.path.len() > 1 {
        frame.push(
            Layer::Entities,
            DrawCmd::Polyline {
                points: probe.path.iter().copied().collect(),
                width: 2.0,
                stroke: palette.accent.with_alpha(0.6),
            },
        );
    }
    if state.phase == Phase::Aiming {
        frame.push(
            Layer::Entities,
            DrawCmd::Line {
                from: probe.pos,
                to: state.aim_tip(),
                width: 3.0,
                stroke: palette.danger,
            },
        );
    }
    frame.push(
        Layer::Entities,
        DrawCmd::Circle {
            center: probe.pos,
            radius: probe.radius,
            fill: palette.avatar,
        },
    );
    particles(&mut frame, &palette, &state.particles, opts.particle_limit);

    frame.text(
        Layer::Hud,
        Vec2::new(10.0, 25.0),
        format!("Level: {}", level.name),
        HUD_TEXT,
        palette.text,
        TextAlign::Left,
    );
    frame.text(
        Layer::Hud,
        Vec2::new(config.arena.x - 10.0, 25.0),
        format!("Completed: {}/{}", state.completed, config.levels().len()),
        HUD_TEXT,
        palette.text,
        TextAlign::Right,
    );
    if state.phase == Phase::Aiming {
        frame.text(
            Layer::Hud,
            Vec2::new(config.arena.x / 2.0, config.arena.y - 14.0),
            format!("Power: {:.0} | Angle: {:.0}°", state.power, state.aim_angle.to_degrees()),
            HUD_TEXT,
            palette.accent,
            TextAlign::Center,
        );
    }
    fps(&mut frame, &palette, opts);

    match state.phase {
        Phase::Start => overlay(
            &mut frame,
            &palette,
            &level.name,
            &["Click and hold to charge power, release to launch".to_string()],
            "Reach the yellow target!",
        ),
        Phase::Won => overlay(
            &mut frame,
            &palette,
            "Target Reached!",
            &[],
            "Click to proceed to the next level",
        ),
        Phase::Lost => overlay(&mut frame, &palette, "Mission Failed", &[], "Click to try again"),
        Phase::Paused => paused(&mut frame, &palette),
        _ => {}
    }
    frame.finish()
}

/// Puzzle panel with each tile's rotated connectors drawn as spokes
fn puzzle_panel(frame: &mut Frame, palette: &Palette, config: &RescueConfig, grid: &Grid) {
    let layout = config.puzzle_layout();
    let extent = Vec2::splat(layout.cell * layout.size as f32);
    frame.push(
        Layer::Overlay,
        DrawCmd::Rect {
            center: frame.size / 2.0,
            size: frame.size,
            rotation: 0.0,
            fill: palette.overlay,
        },
    );
    frame.push(
        Layer::Overlay,
        DrawCmd::Rect {
            center: layout.origin + extent / 2.0,
            size: extent + Vec2::splat(8.0),
            rotation: 0.0,
            fill: palette.bar_back,
        },
    );
    for ((row, col), tile) in grid.iter() {
        let center = layout.cell_center(row, col);
        let fill = match tile.kind {
            TileKind::Start => Rgba::rgb(22, 101, 52),
            TileKind::End => Rgba::rgb(153, 27, 27),
            _ => Rgba::rgb(31, 41, 55),
        };
        frame.push(
            Layer::Overlay,
            DrawCmd::Rect {
                center,
                size: Vec2::splat(layout.cell - 4.0),
                rotation: 0.0,
                fill,
            },
        );
        let open = tile.effective();
        for dir in Direction::ALL {
            if !open.has(dir) {
                continue;
            }
            let offset = match dir {
                Direction::Top => Vec2::new(0.0, -0.5),
                Direction::Right => Vec2::new(0.5, 0.0),
                Direction::Bottom => Vec2::new(0.0, 0.5),
                Direction::Left => Vec2::new(-0.5, 0.0),
            };
            frame.push(
                Layer::Overlay,
                DrawCmd::Line {
                    from: center,
                    to: center + offset * layout.cell,
                    width: 8.0,
                    stroke: palette.accent,
                },
            );
        }
    }
    frame.text(
        Layer::Overlay,
        Vec2::new(frame.size.x / 2.0, layout.origin.y - 16.0),
        "Rotate tiles to create a path from the green start to the red end.",
        BODY_TEXT,
        palette.text,
        TextAlign::Center,
    );
}

pub fn rescue_frame(config: &RescueConfig, state: &RescueState, backdrop: &Backdrop, opts: &RenderOptions) -> Frame {
    let palette = opts.palette(SkinId::Rescue);
    let mut frame = Frame::new(config.arena);
    backdrop.draw(&mut frame, &palette, opts);

    let center = config.center();
    frame.push(
        Layer::Bodies,
        DrawCmd::Circle {
            center,
            radius: 50.0,
            fill: Rgba::rgb(37, 99, 235),
        },
    );
    frame.push(
        Layer::Bodies,
        DrawCmd::Ring {
            center,
            radius: config.orbit_radius(),
            width: 1.0,
            stroke: palette.muted.with_alpha(0.3),
        },
    );

    for sat in &state.satellites {
        let fill = if sat.damaged {
            palette.danger
        } else if sat.fixed {
            Rgba::rgb(74, 222, 128)
        } else {
            Rgba::rgb(203, 213, 225)
        };
        frame.push(
            Layer::Entities,
            DrawCmd::Rect {
                center: sat.pos,
                size: Vec2::new(24.0, 12.0),
                rotation: sat.angle,
                fill,
            },
        );
    }
    if let Some(target) = state.drone.target.and_then(|id| state.satellites.iter().find(|s| s.id == id)) {
        frame.push(
            Layer::Entities,
            DrawCmd::Line {
                from: state.drone.pos,
                to: target.pos,
                width: 1.0,
                stroke: palette.avatar.with_alpha(0.4),
            },
        );
    }
    frame.push(
        Layer::Entities,
        DrawCmd::Circle {
            center: state.drone.pos,
            radius: 6.0,
            fill: palette.avatar,
        },
    );

    frame.text(
        Layer::Hud,
        Vec2::new(10.0, 24.0),
        format!("Time: {}", clock(state.time_left_secs())),
        HUD_TEXT,
        palette.text,
        TextAlign::Left,
    );
    frame.text(
        Layer::Hud,
        Vec2::new(10.0, 46.0),
        format!("Repaired: {}", state.repaired_this_round),
        HUD_TEXT,
        palette.text,
        TextAlign::Left,
    );
    frame.text(
        Layer::Hud,
        Vec2::new(config.arena.x - 10.0, 24.0),
        format!("Level: {}", state.level),
        HUD_TEXT,
        palette.text,
        TextAlign::Right,
    );
    fps(&mut frame, &palette, opts);

    match state.phase {
        Phase::Repairing => {
            if let Some(grid) = &state.puzzle {
                puzzle_panel(&mut frame, &palette, config, grid);
            }
        }
        Phase::Start => overlay(
            &mut frame,
            &palette,
            "Satellite Rescue Mission",
            &[
                "A solar storm has damaged satellites in orbit!".to_string(),
                "Click on damaged satellites to repair them.".to_string(),
                "Solve the connection puzzle to restore power.".to_string(),
            ],
            "Click to start",
        ),
        Phase::Won => overlay(
            &mut frame,
            &palette,
            "ALL SATELLITES REPAIRED",
            &[
                format!("All satellites repaired with {} remaining!", clock(state.time_left_secs())),
                format!("Level reached: {}", state.level),
            ],
            "Click to restart",
        ),
        Phase::Lost => overlay(
            &mut frame,
            &palette,
            "SATELLITE NETWORK FAILURE",
            &[
                format!("Only {} satellites repaired", state.repaired_this_round),
                "The network is down.".to_string(),
            ],
            "Click to restart",
        ),
        Phase::Paused => paused(&mut frame, &palette),
        _ => {}
    }
    frame.finish()
}

fn event_color(kind: EventType) -> Rgba {
    match kind {
        EventType::Weather => Rgba::rgb(125, 211, 252),
        EventType::Environment => Rgba::rgb(74, 222, 128),
        EventType::Comms => Rgba::rgb(250, 204, 21),
    }
}

pub fn mission_frame(config: &MissionConfig, state: &MissionState, backdrop: &Backdrop, opts: &RenderOptions) -> Frame {
    let palette = opts.palette(SkinId::Mission);
    let mut frame = Frame::new(config.arena);
    backdrop.draw(&mut frame, &palette, opts);

    let map = config.map_size();
    frame.push(
        Layer::Bodies,
        DrawCmd::Rect {
            center: config.map_origin() + map / 2.0,
            size: map,
            rotation: 0.0,
            fill: Rgba::rgb(12, 74, 110).with_alpha(0.6),
        },
    );

    for (i, sat) in state.satellites.iter().enumerate() {
        let slot = config.satellite_slot(i);
        if let Some(event) = sat.deployed_to.and_then(|id| state.events.iter().find(|e| e.id == id)) {
            frame.push(
                Layer::Entities,
                DrawCmd::Line {
                    from: slot,
                    to: state.event_pos(config, event),
                    width: 2.0,
                    stroke: event_color(sat.kind).with_alpha(0.6),
                },
            );
        }
        let alpha = if sat.deployed_to.is_some() { 0.4 } else { 1.0 };
        frame.push(
            Layer::Entities,
            DrawCmd::Circle {
                center: slot,
                radius: config.satellite_radius,
                fill: event_color(sat.kind).with_alpha(alpha),
            },
        );
        if state.selected == Some(sat.id) {
            frame.push(
                Layer::Entities,
                DrawCmd::Ring {
                    center: slot,
                    radius: config.satellite_radius + 4.0,
                    width: 3.0,
                    stroke: palette.text,
                },
            );
        }
        frame.text(
            Layer::Hud,
            slot + Vec2::new(config.satellite_radius + 6.0, 5.0),
            sat.name.as_str(),
            12.0,
            palette.text,
            TextAlign::Left,
        );
    }

    for event in &state.events {
        let pos = state.event_pos(config, event);
        frame.push(
            Layer::Entities,
            DrawCmd::Circle {
                center: pos,
                radius: config.event_radius,
                fill: event_color(event.kind).with_alpha(0.5),
            },
        );
        if state.error_flash.is_some_and(|(id, _)| id == event.id) {
            frame.push(
                Layer::Entities,
                DrawCmd::Ring {
                    center: pos,
                    radius: config.event_radius + 3.0,
                    width: 4.0,
                    stroke: palette.danger,
                },
            );
        }
        frame.text(
            Layer::Hud,
            pos + Vec2::new(0.0, config.event_radius + 14.0),
            format!("{} {}/{}", event.name(), event.scans_done, event.required_scans),
            12.0,
            palette.text,
            TextAlign::Center,
        );
    }

    frame.text(
        Layer::Hud,
        Vec2::new(10.0, config.arena.y - 12.0),
        format!("Time: {}", clock(state.time_left_secs())),
        HUD_TEXT,
        palette.text,
        TextAlign::Left,
    );
    frame.push(
        Layer::Hud,
        DrawCmd::Bar {
            pos: Vec2::new(config.arena.x - 210.0, config.arena.y - 24.0),
            size: Vec2::new(200.0, 12.0),
            fraction: (state.progress / config.win_progress).clamp(0.0, 1.0),
            fill: palette.accent,
            back: palette.bar_back,
        },
    );
    fps(&mut frame, &palette, opts);

    match state.phase {
        Phase::Start => overlay(
            &mut frame,
            &palette,
            "Global Mission Control",
            &["Deploy satellites to monitor global events and complete research before time runs out.".to_string()],
            "Click to start mission",
        ),
        Phase::Won => overlay(
            &mut frame,
            &palette,
            "Mission Success!",
            &[format!(
                "You completed the research with {} seconds remaining!",
                state.time_left_secs()
            )],
            "Click to play again",
        ),
        Phase::Lost => overlay(
            &mut frame,
            &palette,
            "Mission Failed",
            &["You ran out of time.".to_string()],
            "Click to play again",
        ),
        Phase::Paused => paused(&mut frame, &palette),
        _ => {}
    }
    frame.finish()
}
