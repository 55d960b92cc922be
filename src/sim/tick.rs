//! Parameterized arcade tick
//!
//! Order within a tick: steering, effect timers, passive resources, laser,
//! spawn, motion, collision outcomes, particles, level/achievements, and
//! finally the lose/win checks.

use glam::Vec2;
use rand::Rng;

use super::achievements::Metric;
use super::collision::{ContactOutcome, aabb_overlap, avatar_hit, circles_overlap, out_of_bounds, resolve_contact};
use super::config::{ArcadeConfig, Axes, PassiveScore, Steering};
use super::effects::TimedEffect;
use super::entity::{
    BurstSpec, CollectibleCategory, HazardCategory, Item, ItemKind, ParticleTint, Projectile, spawn_burst,
    update_particles,
};
use super::input::TickInput;
use super::machine::{Phase, Trigger};
use super::physics::{TimeStep, ease_toward, magnet_pull};
use super::state::{ArcadeState, GameEvent, transition};
use crate::consts::*;

/// Advance an arcade game by one frame
pub fn tick(config: &ArcadeConfig, state: &mut ArcadeState, input: &TickInput, step: TimeStep) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if let Some(pointer) = input.pointer {
        state.avatar.target = pointer;
    }

    if input.pause {
        transition(&mut state.phase, Trigger::PauseToggle, &mut events);
    }

    match state.phase {
        Phase::Start | Phase::Won | Phase::Lost => {
            if input.clicked {
                if state.phase.is_terminal() {
                    transition(&mut state.phase, Trigger::Click, &mut events);
                }
                state.reset_round(config);
                transition(&mut state.phase, Trigger::Click, &mut events);
                log::info!("{} started (seed {})", config.name, state.seed);
            }
            return events;
        }
        Phase::Playing => {}
        _ => return events,
    }

    state.time_ticks += 1;
    state.survived_ms += step.millis();

    steer(config, state, step);
    state.avatar.record_trail();

    for effect in state.effects.decay() {
        events.push(GameEvent::EffectExpired(effect));
    }

    apply_passive(config, state, step);

    if input.clicked {
        fire_laser(config, state, &mut events);
    }

    spawn_items(config, state, step);
    advance_projectiles(state, step);
    let fatal = resolve_items(config, state, step, &mut events);
    update_particles(&mut state.particles, step);

    if let Some(per) = config.score_per_level {
        let level = (state.score / per).floor() as u32 + 1;
        if level > state.level {
            state.level = level;
            log::info!("{} reached level {}", config.name, level);
            events.push(GameEvent::LevelUp(level));
        }
    }

    let survived = state.survived_ms / 1000.0;
    for (metric, value) in [(Metric::Score, state.score), (Metric::SurvivalSecs, survived)] {
        for id in state.achievements.observe(metric, value) {
            events.push(GameEvent::Achievement(id));
        }
    }

    if fatal {
        transition(&mut state.phase, Trigger::FatalContact, &mut events);
    } else if state.resource.at_bound() {
        transition(&mut state.phase, Trigger::ResourceBound, &mut events);
    } else if config.win_score.is_some_and(|target| state.score >= target) {
        transition(&mut state.phase, Trigger::WinReached, &mut events);
    }

    state.normalize_order();
    events
}

/// Move the avatar toward its target per the game's steering mode
fn steer(config: &ArcadeConfig, state: &mut ArcadeState, step: TimeStep) {
    let avatar = &mut state.avatar;
    let half = avatar.shape.half_extents();
    let clamp = |p: Vec2| p.clamp(half, (config.arena - half).max(half));
    let follow = |axes: Axes, pos: Vec2, target: Vec2| match axes {
        Axes::X => Vec2::new(target.x, pos.y),
        Axes::Both => target,
    };

    match config.avatar.steering {
        Steering::Snap { axes } => {
            avatar.pos = clamp(follow(axes, avatar.pos, avatar.target));
        }
        Steering::Ease { k, axes } => {
            let goal = clamp(follow(axes, avatar.pos, avatar.target));
            avatar.pos = ease_toward(avatar.pos, goal, k, step);
        }
        Steering::Orbit => {
            if let Some(center) = config.base_center() {
                let aim = avatar.target - center;
                if aim.length_squared() > 0.0 {
                    state.guard_heading = aim.y.atan2(aim.x);
                }
                avatar.pos = center;
            }
        }
    }
}

/// Passive score, proximity heat, cooling zones and regeneration
fn apply_passive(config: &ArcadeConfig, state: &mut ArcadeState, step: TimeStep) {
    let proximity = ((config.arena.y - state.avatar.pos.y) / config.arena.y).clamp(0.0, 1.0);

    match config.passive_score {
        PassiveScore::None => {}
        PassiveScore::PerTick(points) => state.score += points * step.factor,
        PassiveScore::Proximity(points) => state.score += proximity * points * step.factor,
    }

    let rule = &config.resource;
    if rule.proximity_gain > 0.0 {
        state.resource.harm(proximity * rule.proximity_gain * step.factor);
    }
    if let Some(zone) = rule.safe_zone {
        let x = state.avatar.pos.x;
        if x < zone.margin || x > config.arena.x - zone.margin {
            state.resource.relieve(zone.relief * step.factor);
        }
    }
    if rule.regen > 0.0 {
        state.resource.relieve(rule.regen * step.factor);
    }

    if let (Some(guard), Some(base)) = (state.guard.as_mut(), config.base) {
        guard.relieve(base.guard_regen * step.factor);
    }
}

fn fire_laser(config: &ArcadeConfig, state: &mut ArcadeState, events: &mut Vec<GameEvent>) {
    let Some(laser) = config.laser else {
        return;
    };
    if !state.effects.take_laser_charge() {
        return;
    }
    let id = state.next_entity_id();
    let nose = state.avatar.pos - Vec2::new(0.0, state.avatar.shape.half_extents().y);
    state.projectiles.push(Projectile {
        id,
        pos: nose,
        vel: Vec2::new(0.0, -laser.speed),
        half: Vec2::new(laser.width, laser.height) / 2.0,
    });
    events.push(GameEvent::LaserFired);
}

/// One Bernoulli trial per spawn rule
fn spawn_items(config: &ArcadeConfig, state: &mut ArcadeState, step: TimeStep) {
    let difficulty = config.difficulty.scalar(state.progress());
    for rule in &config.spawns {
        if state.level < rule.min_level {
            continue;
        }
        if state.rng.random::<f32>() < rule.probability(difficulty, step) {
            let id = state.next_entity_id();
            let item = rule.instantiate(id, config.arena, difficulty, &mut state.rng);
            log::debug!("Spawned item {} {:?}", id, item.kind);
            state.items.push(item);
        }
    }
}

fn advance_projectiles(state: &mut ArcadeState, step: TimeStep) {
    for p in state.projectiles.iter_mut() {
        p.pos += p.vel * step.factor;
    }
    state.projectiles.retain(|p| p.pos.y + p.half.y > 0.0);
}

fn burst(state: &mut ArcadeState, at: Vec2, spec: BurstSpec, tint: ParticleTint) {
    spawn_burst(&mut state.particles, &mut state.rng, at, spec, tint, state.particle_cap);
}

fn tint_for(kind: &ItemKind) -> ParticleTint {
    match kind {
        ItemKind::Collectible { category: CollectibleCategory::Star, .. } => ParticleTint::Star,
        ItemKind::Collectible { category: CollectibleCategory::DataPacket, .. } => ParticleTint::Data,
        ItemKind::Collectible { category: CollectibleCategory::Crystal, .. } => ParticleTint::Spark,
        ItemKind::Hazard(spec) => match spec.category {
            HazardCategory::Junk | HazardCategory::Asteroid => ParticleTint::Debris,
            _ => ParticleTint::Fire,
        },
        ItemKind::PowerUp(_) => ParticleTint::Spark,
    }
}

/// Move every item and give each at most one outcome. Every item is either kept
/// or dropped here, so nothing outlives the tick it collided in.
/// Returns whether a fatal contact happened.
fn resolve_items(config: &ArcadeConfig, state: &mut ArcadeState, step: TimeStep, events: &mut Vec<GameEvent>) -> bool {
    let items = std::mem::take(&mut state.items);
    let mut survivors = Vec::with_capacity(items.len());
    let mut fragments = Vec::new();
    let mut fatal = false;

    let guard_arc = state.guard_arc(config);
    let base = config.base.map(|b| (b.at * config.arena, b.radius));
    let magnet_on = state.effects.is_active(TimedEffect::Magnet);

    for mut item in items {
        if magnet_on && matches!(item.kind, ItemKind::Collectible { .. }) {
            item.pos = magnet_pull(item.pos, state.avatar.pos, config.magnet.radius, config.magnet.strength, step);
        }
        item.advance(step);

        // Laser bolts
        if let (Some(laser), true) = (config.laser, item.is_hazard()) {
            let hit = state
                .projectiles
                .iter()
                .position(|p| aabb_overlap(p.pos, p.half, item.pos, Vec2::splat(item.radius)));
            if let Some(idx) = hit {
                state.projectiles.remove(idx);
                state.score += laser.hit_points;
                burst(state, item.pos, config.hit_burst, ParticleTint::Debris);
                events.push(GameEvent::LaserHit { points: laser.hit_points });
                continue;
            }
        }

        // Guard arc (only while it has power)
        if let (Some(arc), Some(spec)) = (&guard_arc, item.hazard().copied()) {
            let powered = state.guard.is_some_and(|g| g.value > 0.0);
            if powered && arc.blocks(item.pos, item.radius) {
                state.score += spec.block_points;
                if let Some(guard) = state.guard.as_mut() {
                    guard.harm(spec.guard_drain);
                }
                burst(state, item.pos, config.collect_burst, ParticleTint::Shield);
                events.push(GameEvent::Blocked { points: spec.block_points });
                continue;
            }
        }

        let touched = match base {
            Some((center, radius)) => item.is_hazard() && circles_overlap(center, radius, item.pos, item.radius),
            None => avatar_hit(config.collision, state.avatar.pos, &state.avatar.shape, item.pos, item.radius),
        };
        if touched {
            let tint = tint_for(&item.kind);
            match resolve_contact(&item.kind, &mut state.effects) {
                ContactOutcome::Collect { points } => {
                    state.score += points;
                    burst(state, item.pos, config.collect_burst, tint);
                    events.push(GameEvent::Collected { points });
                }
                ContactOutcome::Damage { amount, fatal: lethal } => {
                    state.resource.harm(amount);
                    burst(state, item.pos, config.hit_burst, tint);
                    events.push(GameEvent::Damaged {
                        amount,
                        remaining: state.resource.value,
                    });
                    fatal |= lethal;
                }
                ContactOutcome::Absorbed => {
                    burst(state, item.pos, config.collect_burst, ParticleTint::Shield);
                    events.push(GameEvent::ShieldAbsorbed);
                }
                ContactOutcome::PhasedThrough => events.push(GameEvent::PhasedThrough),
                ContactOutcome::PowerUp(kind) => {
                    state.effects.apply(kind, config.effect_duration_ticks);
                    events.push(GameEvent::PowerUp(kind));
                }
            }
            continue;
        }

        // Splitters burst into fragments mid-flight
        if let (Some(split), Some(spec)) = (config.splitter, item.hazard())
            && spec.splits
            && item.age >= split.min_age
            && state.rng.random::<f32>() < step.scale_chance(split.chance)
        {
            for _ in 0..split.pieces {
                let id = state.next_entity_id();
                let vel = Vec2::new(
                    (state.rng.random::<f32>() - 0.5) * 2.0 * split.fragment_speed,
                    (state.rng.random::<f32>() - 0.5) * 2.0 * split.fragment_speed,
                );
                let mut fragment = Item::new(id, ItemKind::Hazard(split.fragment), item.pos, vel, split.fragment_radius);
                fragment.ttl = Some(split.fragment_ttl);
                fragments.push(fragment);
            }
            events.push(GameEvent::Split { pieces: split.pieces });
            continue;
        }

        if item.is_expired() || out_of_bounds(item.pos, item.radius, config.arena, CULL_MARGIN) {
            continue;
        }
        survivors.push(item);
    }

    survivors.extend(fragments);
    state.items = survivors;
    fatal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{HazardSpec, PowerUpKind};
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Config with an empty spawn table so tests control every item
    fn quiet(mut config: ArcadeConfig) -> ArcadeConfig {
        config.spawns.clear();
        config
    }

    fn playing(config: &ArcadeConfig) -> ArcadeState {
        let mut state = ArcadeState::new(config, 12345);
        state.phase = Phase::Playing;
        state
    }

    fn drop_item(state: &mut ArcadeState, kind: ItemKind, pos: Vec2, radius: f32) -> u32 {
        let id = state.next_entity_id();
        state.items.push(Item::new(id, kind, pos, Vec2::ZERO, radius));
        id
    }

    fn junk(damage: f32) -> ItemKind {
        ItemKind::Hazard(HazardSpec::new(HazardCategory::Junk, damage))
    }

    fn star() -> ItemKind {
        ItemKind::Collectible { category: CollectibleCategory::Star, points: 10.0 }
    }

    fn click() -> TickInput {
        TickInput { clicked: true, ..Default::default() }
    }

    #[test]
    fn test_click_starts_round() {
        let config = ArcadeConfig::cosmic_collector();
        let mut state = ArcadeState::new(&config, 1);
        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert!(events.is_empty());
        assert_eq!(state.phase, Phase::Start);

        let events = tick(&config, &mut state, &click(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(events, vec![GameEvent::PhaseChanged { from: Phase::Start, to: Phase::Playing }]);
    }

    #[test]
    fn test_three_hazard_hits_leave_forty_health() {
        let config = quiet(ArcadeConfig::cosmic_collector());
        let mut state = playing(&config);
        for _ in 0..3 {
            let at = state.avatar.pos;
            drop_item(&mut state, junk(20.0), at, 15.0);
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert_eq!(state.resource.value, 40.0);
        assert_eq!(state.phase, Phase::Playing);
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_final_hit_clamps_and_loses() {
        let config = quiet(ArcadeConfig::cosmic_collector());
        let mut state = playing(&config);
        state.resource.value = 15.0;
        let at = state.avatar.pos;
        drop_item(&mut state, junk(20.0), at, 15.0);
        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.resource.value, 0.0);
        assert_eq!(state.phase, Phase::Lost);
        assert!(events.contains(&GameEvent::PhaseChanged { from: Phase::Playing, to: Phase::Lost }));

        // Frozen until clicked, then back through Start into a fresh round
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Lost);
        tick(&config, &mut state, &click(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.resource.value, 100.0);
    }

    #[test]
    fn test_twenty_stars_fire_hoarder_once() {
        let config = quiet(ArcadeConfig::cosmic_collector());
        let mut state = playing(&config);
        let mut unlocks = Vec::new();
        for n in 1..=25 {
            let at = state.avatar.pos;
            drop_item(&mut state, star(), at, 10.0);
            let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
            unlocks.extend(events.into_iter().filter_map(|e| match e {
                GameEvent::Achievement(id) => Some(id),
                _ => None,
            }));
            if n == 20 {
                assert_eq!(state.score, 200.0);
            }
        }
        assert_eq!(unlocks, vec!["star-fragment-hoarder".to_string()]);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let config = quiet(ArcadeConfig::cosmic_collector());
        let mut state = playing(&config);
        let id = drop_item(&mut state, junk(10.0), Vec2::new(100.0, 100.0), 15.0);
        state.items[0].vel = Vec2::new(0.0, 2.0);

        let pause = TickInput { pause: true, ..Default::default() };
        tick(&config, &mut state, &pause, TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Paused);
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.items[0].pos, Vec2::new(100.0, 100.0));

        tick(&config, &mut state, &pause, TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.items[0].id, id);
        assert_eq!(state.items[0].pos, Vec2::new(100.0, 102.0));
    }

    #[test]
    fn test_snap_steering_clamps_to_arena() {
        let config = quiet(ArcadeConfig::cosmic_collector());
        let mut state = playing(&config);
        let input = TickInput { pointer: Some(Vec2::new(5.0, 10.0)), ..Default::default() };
        tick(&config, &mut state, &input, TimeStep::NOMINAL);
        // x only, half width 30
        assert_eq!(state.avatar.pos, Vec2::new(30.0, config.avatar.start.y));
    }

    #[test]
    fn test_shield_absorbs_then_expires() {
        let config = quiet(ArcadeConfig::classic_collector());
        let mut state = playing(&config);
        let at = state.avatar.pos;
        drop_item(&mut state, ItemKind::PowerUp(PowerUpKind::Shield), at, 15.0);
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert!(state.effects.is_active(TimedEffect::Shield));

        let at = state.avatar.pos;
        drop_item(&mut state, junk(20.0), at, 15.0);
        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert!(events.contains(&GameEvent::ShieldAbsorbed));
        assert_eq!(state.resource.value, 100.0);
        assert!(!state.effects.is_active(TimedEffect::Shield));
    }

    #[test]
    fn test_magnet_runs_out_after_duration() {
        let config = quiet(ArcadeConfig::classic_collector());
        let mut state = playing(&config);
        state.effects.apply(PowerUpKind::Magnet, config.effect_duration_ticks);
        let mut expired_at = None;
        for t in 1..=400u32 {
            let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
            assert_eq!(state.effects.is_active(TimedEffect::Magnet), state.effects.magnet_ticks > 0);
            if events.contains(&GameEvent::EffectExpired(TimedEffect::Magnet)) {
                expired_at = Some(t);
            }
        }
        assert_eq!(expired_at, Some(300));
        assert_eq!(state.effects.magnet_ticks, 0);
    }

    #[test]
    fn test_magnet_pulls_stars() {
        let config = quiet(ArcadeConfig::classic_collector());
        let mut state = playing(&config);
        state.effects.apply(PowerUpKind::Magnet, 300);
        let start = state.avatar.pos - Vec2::new(0.0, 100.0);
        drop_item(&mut state, star(), start, 12.0);
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.items[0].pos, start + Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_fatal_asteroid_unless_phased() {
        let config = quiet(ArcadeConfig::asteroid_navigator());
        let asteroid = ArcadeConfig::asteroid_navigator().spawns[0].kind;
        let mut state = playing(&config);
        state.effects.apply(PowerUpKind::Phase, 300);
        let at = state.avatar.pos;
        drop_item(&mut state, asteroid, at, 20.0);
        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert!(events.contains(&GameEvent::PhasedThrough));
        assert_eq!(state.phase, Phase::Playing);
        assert!(state.items.is_empty());

        state.effects.consume(TimedEffect::Phase);
        let at = state.avatar.pos;
        drop_item(&mut state, asteroid, at, 20.0);
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.phase, Phase::Lost);
    }

    #[test]
    fn test_laser_destroys_asteroid() {
        let config = quiet(ArcadeConfig::asteroid_navigator());
        let mut state = playing(&config);
        let asteroid = ArcadeConfig::asteroid_navigator().spawns[0].kind;
        drop_item(&mut state, asteroid, Vec2::new(400.0, 300.0), 20.0);
        state.effects.apply(PowerUpKind::Laser, 300);

        let first = tick(&config, &mut state, &click(), TimeStep::NOMINAL);
        assert!(first.contains(&GameEvent::LaserFired));
        assert_eq!(state.effects.laser_charges, 0);

        let mut hit = false;
        for _ in 0..5 {
            let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
            hit |= events.contains(&GameEvent::LaserHit { points: 10.0 });
        }
        assert!(hit);
        assert!(state.items.is_empty());
        assert!(state.projectiles.is_empty());
        assert!(state.score >= 10.0);
    }

    #[test]
    fn test_click_without_ammo_fires_nothing() {
        let config = quiet(ArcadeConfig::asteroid_navigator());
        let mut state = playing(&config);
        let events = tick(&config, &mut state, &click(), TimeStep::NOMINAL);
        assert!(!events.contains(&GameEvent::LaserFired));
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_guard_blocks_flare_and_drains_power() {
        let config = quiet(ArcadeConfig::solar_shield());
        let mut state = playing(&config);
        let earth = config.base_center().unwrap();
        let aim_left = TickInput { pointer: Some(Vec2::new(100.0, 225.0)), ..Default::default() };
        let flare = ArcadeConfig::solar_shield().spawns[0].kind;
        drop_item(&mut state, flare, earth + Vec2::new(-72.0, 0.0), 10.0);

        let events = tick(&config, &mut state, &aim_left, TimeStep::NOMINAL);
        assert!(events.contains(&GameEvent::Blocked { points: 1.0 }));
        assert_eq!(state.score, 1.0);
        assert!(state.guard.is_some_and(|g| g.value < 100.0));
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_unpowered_guard_lets_flare_through() {
        let mut config = quiet(ArcadeConfig::solar_shield());
        if let Some(base) = config.base.as_mut() {
            base.guard_regen = 0.0;
        }
        let mut state = playing(&config);
        if let Some(guard) = state.guard.as_mut() {
            guard.value = 0.0;
        }
        let earth = config.base_center().unwrap();
        let aim_left = TickInput { pointer: Some(Vec2::new(100.0, 225.0)), ..Default::default() };
        let flare = ArcadeConfig::solar_shield().spawns[0].kind;
        drop_item(&mut state, flare, earth + Vec2::new(-72.0, 0.0), 10.0);

        let events = tick(&config, &mut state, &aim_left, TimeStep::NOMINAL);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Blocked { .. })));
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_flare_hitting_earth_damages_it() {
        let config = quiet(ArcadeConfig::solar_shield());
        let mut state = playing(&config);
        let earth = config.base_center().unwrap();
        let flare = ArcadeConfig::solar_shield().spawns[0].kind;
        // Behind Earth, away from the default left-facing guard
        drop_item(&mut state, flare, earth + Vec2::new(40.0, 0.0), 10.0);
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.resource.value, 95.0);
    }

    #[test]
    fn test_blocking_raises_level() {
        let config = quiet(ArcadeConfig::solar_shield());
        let mut state = playing(&config);
        state.score = 9.0;
        let earth = config.base_center().unwrap();
        let flare = ArcadeConfig::solar_shield().spawns[0].kind;
        drop_item(&mut state, flare, earth + Vec2::new(-72.0, 0.0), 10.0);
        let aim_left = TickInput { pointer: Some(Vec2::new(100.0, 225.0)), ..Default::default() };
        let events = tick(&config, &mut state, &aim_left, TimeStep::NOMINAL);
        assert_eq!(state.level, 2);
        assert!(events.contains(&GameEvent::LevelUp(2)));
    }

    #[test]
    fn test_splitter_bursts_into_fragments() {
        let mut config = quiet(ArcadeConfig::solar_shield());
        if let Some(split) = config.splitter.as_mut() {
            split.chance = 1.0;
            split.min_age = 0.0;
        }
        let mut state = playing(&config);
        let splitter = ArcadeConfig::solar_shield().spawns[1].kind;
        drop_item(&mut state, splitter, Vec2::new(300.0, 225.0), 8.0);
        let events = tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert!(events.contains(&GameEvent::Split { pieces: 3 }));
        assert_eq!(state.items.len(), 3);
        for item in &state.items {
            assert_eq!(item.hazard().map(|h| h.category), Some(HazardCategory::Fragment));
            assert_eq!(item.ttl, Some(300.0));
        }
    }

    #[test]
    fn test_heat_builds_near_sun_and_cools_at_edges() {
        let config = quiet(ArcadeConfig::parker_probe());
        let mut state = playing(&config);
        state.avatar.pos = Vec2::new(400.0, 45.0);
        state.avatar.target = state.avatar.pos;
        for _ in 0..10 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        let hot = state.resource.value;
        assert!(hot > 0.8);
        assert!(state.score > 4.0);

        state.avatar.pos = Vec2::new(50.0, 45.0);
        state.avatar.target = state.avatar.pos;
        for _ in 0..3 {
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert!(state.resource.value < hot);
    }

    #[test]
    fn test_out_of_bounds_items_are_culled() {
        let config = quiet(ArcadeConfig::cosmic_collector());
        let mut state = playing(&config);
        drop_item(&mut state, star(), Vec2::new(100.0, 600.0), 10.0);
        drop_item(&mut state, star(), Vec2::new(100.0, 100.0), 10.0);
        tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_win_score_ends_round() {
        let mut config = quiet(ArcadeConfig::cosmic_collector());
        config.win_score = Some(20.0);
        let mut state = playing(&config);
        for _ in 0..2 {
            let at = state.avatar.pos;
            drop_item(&mut state, star(), at, 10.0);
            tick(&config, &mut state, &TickInput::default(), TimeStep::NOMINAL);
        }
        assert_eq!(state.phase, Phase::Won);
    }

    #[test]
    fn test_determinism() {
        let config = ArcadeConfig::asteroid_navigator();
        let mut a = ArcadeState::new(&config, 99999);
        let mut b = ArcadeState::new(&config, 99999);
        tick(&config, &mut a, &click(), TimeStep::NOMINAL);
        tick(&config, &mut b, &click(), TimeStep::NOMINAL);
        for i in 0..600 {
            let input = TickInput {
                pointer: Some(Vec2::new((i as f32 * 7.0) % 800.0, 0.0)),
                ..Default::default()
            };
            tick(&config, &mut a, &input, TimeStep::NOMINAL);
            tick(&config, &mut b, &input, TimeStep::NOMINAL);
        }
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.score, b.score);
        assert_eq!(a.items, b.items);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_removed_items_never_return(seed in any::<u64>(), xs in prop::collection::vec(0.0f32..800.0, 50..300)) {
            let config = ArcadeConfig::classic_collector();
            let mut state = ArcadeState::new(&config, seed);
            tick(&config, &mut state, &click(), TimeStep::NOMINAL);
            let mut removed: HashSet<u32> = HashSet::new();
            let mut last_health = state.resource.value;
            for x in xs {
                let before: HashSet<u32> = state.items.iter().map(|i| i.id).collect();
                let input = TickInput { pointer: Some(Vec2::new(x, 0.0)), ..Default::default() };
                tick(&config, &mut state, &input, TimeStep::NOMINAL);
                let after: HashSet<u32> = state.items.iter().map(|i| i.id).collect();
                prop_assert!(after.is_disjoint(&removed));
                prop_assert_eq!(after.len(), state.items.len());
                removed.extend(before.difference(&after));
                // No regeneration in this game: health never rises within a round
                prop_assert!(state.resource.value <= last_health);
                prop_assert!(state.resource.value >= 0.0);
                last_health = state.resource.value;
            }
        }
    }
}
