//! Per-tick simulation update and input dispatch
//!
//! `dispatch` applies one player/UI input; `tick` advances the world by one
//! frame. Motion is per tick (`pos += vel`), while the scheduler counts down
//! the frame's elapsed milliseconds.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cannon::FireTrigger;
use super::coins;
use super::collision::{HitTarget, projectile_orb_hit};
use super::economy::{SkinId, UpgradeKind};
use super::effects::{HIT_ARMOR_COLOR, HIT_CORE_COLOR};
use super::progression;
use super::state::{GameEvent, GameMode, GameState};
use crate::consts::MAX_FRAME_MS;

/// Every input the UI layer can send
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Tap/click on the play area
    Shoot,
    ToggleAutoFire,
    TogglePause,
    PurchaseUpgrade(UpgradeKind),
    PurchaseSkin(SkinId),
    StartGame,
    Restart,
    ReturnToMenu,
    /// Skip to the next level while no orb is alive
    AdvanceLevel,
    Resize { width: f32, height: f32 },
}

/// Apply a single input. `now_ms` is the wall-clock time used for the
/// shooting rate limit.
pub fn dispatch(state: &mut GameState, event: InputEvent, now_ms: f64) {
    match event {
        InputEvent::Shoot => {
            if !state.shoot(FireTrigger::Manual, now_ms) {
                log::trace!("Shot ignored (mode {:?} or rate limited)", state.mode);
            }
        }
        InputEvent::ToggleAutoFire => {
            state.cannon.auto_fire = !state.cannon.auto_fire;
            log::info!("Auto-fire {}", if state.cannon.auto_fire { "on" } else { "off" });
        }
        InputEvent::TogglePause => match state.mode {
            GameMode::Playing => {
                state.mode = GameMode::Paused;
                log::info!("Paused");
            }
            GameMode::Paused => {
                state.mode = GameMode::Playing;
                log::info!("Resumed");
            }
            _ => {}
        },
        InputEvent::PurchaseUpgrade(kind) => {
            state.purchase_upgrade(kind);
        }
        InputEvent::PurchaseSkin(skin) => {
            state.purchase_skin(skin);
        }
        InputEvent::StartGame => {
            if state.mode == GameMode::Menu {
                start_session(state);
            }
        }
        InputEvent::Restart => start_session(state),
        InputEvent::ReturnToMenu => {
            state.scheduler.invalidate();
            state.mode = GameMode::Menu;
            log::info!("Returned to menu");
        }
        InputEvent::AdvanceLevel => {
            progression::advance_level(state);
        }
        InputEvent::Resize { width, height } => state.resize(width, height),
    }
}

/// Fresh run at level 1 with a new orb
fn start_session(state: &mut GameState) {
    state.reset_run();
    state.mode = GameMode::Playing;
    log::info!("Game started (seed {})", state.seed);
    progression::spawn_orb(state);
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, dt_ms: f64, now_ms: f64) {
    // Don't tick unless playing
    if state.mode != GameMode::Playing {
        return;
    }
    state.time_ticks += 1;

    // Delayed respawns/level-ups run before the frame's own work
    let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
    for action in state.scheduler.advance(dt_ms) {
        progression::run_scheduled(state, action);
    }

    if state.cannon.auto_fire && state.live_orb().is_some() {
        state.shoot(FireTrigger::Auto, now_ms);
    }

    if let Some(orb) = state.orb.as_mut() {
        orb.rotate();
    }

    advance_projectiles(state);
    state.effects.update();
    collect_coins(state);

    // Destruction is decided once, after every projectile has had its turn
    if state.orb.as_ref().is_some_and(|orb| orb.is_depleted()) {
        progression::on_orb_destroyed(state);
    }
}

/// Outcome of one projectile striking the orb
enum Impact {
    Armor { at: Vec2, broke: bool },
    Core { at: Vec2 },
}

/// Move projectiles, resolve hits against the orb, drop spent/off-screen ones
fn advance_projectiles(state: &mut GameState) {
    let trail_length = state.settings.trail_length();
    let width = state.arena.width;
    let margin = state.tuning.offscreen_margin;
    let tuning = &state.tuning;
    let mut orb = state.orb.as_mut().filter(|orb| orb.is_alive());
    let mut impacts = Vec::new();

    state.projectiles.retain_mut(|proj| {
        proj.advance(trail_length);

        if let Some(orb) = orb.as_deref_mut() {
            if let Some(target) = projectile_orb_hit(proj.pos, orb, tuning) {
                match target {
                    HitTarget::Armor { index, at } => {
                        let broke = orb.armor[index].apply_damage(proj.damage);
                        impacts.push(Impact::Armor { at, broke });
                    }
                    HitTarget::Core => {
                        orb.apply_core_damage(proj.damage);
                        impacts.push(Impact::Core { at: orb.pos });
                    }
                }
                if proj.consume_hit() {
                    return false;
                }
            }
        }

        proj.in_bounds(width, margin)
    });

    if impacts.is_empty() {
        return;
    }

    let armor_drops = state.tuning.armor_break_coin_drops;
    let core_drops = state.tuning.core_hit_coin_drops;
    let mut broken = Vec::new();
    {
        let (effects, coin_drops, rng) = state.effects_mut();
        for impact in impacts {
            match impact {
                Impact::Armor { at, broke } => {
                    effects.hit_sparks(rng, at, HIT_ARMOR_COLOR);
                    if broke {
                        effects.armor_break(rng, at);
                        coins::scatter(coin_drops, rng, at, armor_drops);
                        broken.push(at);
                    }
                }
                Impact::Core { at } => {
                    effects.hit_sparks(rng, at, HIT_CORE_COLOR);
                    let offset = Vec2::new(
                        (rng.random::<f32>() - 0.5) * 60.0,
                        (rng.random::<f32>() - 0.5) * 60.0,
                    );
                    coins::scatter(coin_drops, rng, at + offset, core_drops);
                }
            }
        }
    }
    for pos in broken {
        log::debug!("Armor segment broken at ({:.0}, {:.0})", pos.x, pos.y);
        state.emit(GameEvent::ArmorBroken { pos });
    }
}

/// Let coin pickups fall and pay out the ones that reach the line
fn collect_coins(state: &mut GameState) {
    let collect_y = state.arena.collect_line(&state.tuning);
    let gravity = state.tuning.coin_gravity;
    let collected = coins::update(&mut state.coin_drops, gravity, collect_y);
    if collected.is_empty() {
        return;
    }

    let amount: u64 = collected.iter().map(|c| c.value).sum();
    state.ledger.coins += amount;
    {
        let (effects, _, rng) = state.effects_mut();
        for coin in &collected {
            effects.coin_sparkle(rng, coin.pos);
        }
    }
    state.emit(GameEvent::CoinsCollected { amount });
    state.mark_stats_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NOMINAL_FRAME_MS;
    use crate::sim::cannon::Launch;
    use proptest::prelude::*;

    const FRAME: f64 = NOMINAL_FRAME_MS;

    fn started() -> GameState {
        let mut state = GameState::new(12345);
        dispatch(&mut state, InputEvent::StartGame, 0.0);
        state
    }

    /// Run `frames` ticks starting at `*now`
    fn run(state: &mut GameState, now: &mut f64, frames: usize) {
        for _ in 0..frames {
            *now += FRAME;
            tick(state, FRAME, *now);
        }
    }

    /// Launch one projectile from `pos` heading up at the orb
    fn launch_at(state: &mut GameState, pos: Vec2, damage: u32, piercing: u32) {
        let vel = Vec2::new(0.0, -state.tuning.projectile_speed);
        state
            .projectiles
            .spawn(&[Launch { pos, vel }], damage, piercing);
    }

    fn count_events(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_start_spawns_orb() {
        let state = started();
        assert_eq!(state.mode, GameMode::Playing);
        let orb = state.live_orb().expect("orb spawned on start");
        assert_eq!(orb.level, 1);
        assert_eq!(orb.max_health, 100);
        assert_eq!(orb.armor.len(), 1);
    }

    #[test]
    fn test_ten_hits_destroy_plain_orb() {
        let mut state = started();
        let mut now = 0.0;
        state.orb.as_mut().unwrap().armor.clear();
        state.drain_events();

        for hit in 1..=10 {
            state.shoot(FireTrigger::Manual, now);
            while !state.projectiles.is_empty() {
                run(&mut state, &mut now, 1);
            }
            let orb = state.orb.as_ref().unwrap();
            assert_eq!(orb.health, 100 - hit * 10);
            assert_eq!(orb.destroyed, hit == 10);
        }

        assert_eq!(state.orbs_destroyed_total, 1);
        assert_eq!(state.orbs_destroyed_this_level, 1);
        let events = state.drain_events();
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::OrbDestroyed { .. })),
            1
        );
    }

    #[test]
    fn test_destruction_is_idempotent() {
        let mut state = started();
        state.orb.as_mut().unwrap().health = 0;
        assert!(progression::on_orb_destroyed(&mut state));
        let coins = state.ledger.coins;
        let diamonds = state.ledger.diamonds;
        let particles = state.effects.particles().len();

        assert!(!progression::on_orb_destroyed(&mut state));
        assert_eq!(state.ledger.coins, coins);
        assert_eq!(state.ledger.diamonds, diamonds);
        assert_eq!(state.effects.particles().len(), particles);
        assert_eq!(state.scheduler.pending_count(), 1);
        assert_eq!(state.orbs_destroyed_total, 1);
    }

    #[test]
    fn test_orb_rewards_and_coin_burst() {
        let mut state = started();
        state.orb.as_mut().unwrap().health = 0;
        let mut now = 0.0;
        run(&mut state, &mut now, 1);
        // 10 + 1*5 coins, floor(1/2)+1 diamonds
        assert_eq!(state.ledger.coins, 15);
        assert_eq!(state.ledger.diamonds, 1);
        assert_eq!(state.coin_drops.len(), 6);

        // Burst coins eventually land and pay out
        run(&mut state, &mut now, 200);
        assert!(state.coin_drops.is_empty());
        assert_eq!(state.ledger.coins, 21);
    }

    #[test]
    fn test_respawn_waits_for_delay() {
        let mut state = started();
        state.orb.as_mut().unwrap().health = 0;
        let mut now = 0.0;
        run(&mut state, &mut now, 1);
        let first_id = state.orb.as_ref().unwrap().id;
        assert!(state.live_orb().is_none());

        // Just under a second: still waiting
        run(&mut state, &mut now, 59);
        assert!(state.live_orb().is_none());

        run(&mut state, &mut now, 2);
        let orb = state.live_orb().expect("respawned after delay");
        assert_ne!(orb.id, first_id);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_five_orbs_level_up_once() {
        let mut state = started();
        let mut now = 0.0;
        for _ in 0..5 {
            state.orb.as_mut().unwrap().health = 0;
            run(&mut state, &mut now, 1);
            run(&mut state, &mut now, 100);
        }
        assert_eq!(state.level, 2);
        assert_eq!(state.orbs_destroyed_this_level, 0);
        assert_eq!(state.orbs_destroyed_total, 5);
        assert_eq!(state.live_orb().map(|o| o.level), Some(2));

        // Nothing else is queued
        run(&mut state, &mut now, 300);
        assert_eq!(state.level, 2);
        let events = state.drain_events();
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::LevelUp { .. })),
            1
        );
    }

    #[test]
    fn test_level_up_bonus() {
        let mut state = started();
        state.orbs_destroyed_this_level = 4;
        state.orb.as_mut().unwrap().health = 0;
        let mut now = 0.0;
        run(&mut state, &mut now, 1);
        assert!(state.scheduler.is_pending(crate::sim::ScheduledAction::LevelUp));
        let coins = state.ledger.coins;
        let diamonds = state.ledger.diamonds;

        state.coin_drops.clear();
        run(&mut state, &mut now, 95);
        assert_eq!(state.level, 2);
        // Bonus uses the new level: 2*50 coins, floor(2/3)+2 diamonds
        assert_eq!(state.ledger.diamonds, diamonds + 2);
        assert!(state.ledger.coins >= coins + 100);
    }

    #[test]
    fn test_restart_invalidates_pending_spawn() {
        let mut state = started();
        state.orb.as_mut().unwrap().health = 0;
        let mut now = 0.0;
        run(&mut state, &mut now, 1);
        assert_eq!(state.scheduler.pending_count(), 1);

        dispatch(&mut state, InputEvent::ReturnToMenu, now);
        dispatch(&mut state, InputEvent::StartGame, now);
        let orb_id = state.orb.as_ref().unwrap().id;
        state.drain_events();

        run(&mut state, &mut now, 200);
        assert_eq!(state.orb.as_ref().unwrap().id, orb_id);
        let events = state.drain_events();
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::OrbSpawned { .. })),
            0
        );
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut state = started();
        let mut now = 0.0;
        state.shoot(FireTrigger::Manual, now);
        run(&mut state, &mut now, 3);
        let pos = state.projectiles.as_slice()[0].pos;
        let rotation = state.orb.as_ref().unwrap().rotation;

        dispatch(&mut state, InputEvent::TogglePause, now);
        assert_eq!(state.mode, GameMode::Paused);
        run(&mut state, &mut now, 30);
        assert_eq!(state.projectiles.as_slice()[0].pos, pos);
        assert_eq!(state.orb.as_ref().unwrap().rotation, rotation);
        // Shooting is ignored while paused
        assert!(!state.shoot(FireTrigger::Manual, now));

        dispatch(&mut state, InputEvent::TogglePause, now);
        assert_eq!(state.mode, GameMode::Playing);
        run(&mut state, &mut now, 1);
        assert_ne!(state.projectiles.as_slice()[0].pos, pos);
    }

    #[test]
    fn test_menu_ignores_shots_and_ticks() {
        let mut state = GameState::new(3);
        dispatch(&mut state, InputEvent::Shoot, 0.0);
        let mut now = 0.0;
        run(&mut state, &mut now, 10);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_armor_absorbs_hit() {
        let mut state = started();
        let orb = state.orb.as_mut().unwrap();
        orb.rotation_speed = 0.0;
        orb.armor[0].angular_offset = std::f32::consts::FRAC_PI_2;
        let armor_at = orb.pos + Vec2::new(0.0, orb.radius - 20.0);
        let core_health = orb.health;

        // One step below the segment
        launch_at(&mut state, armor_at + Vec2::new(0.0, 8.0), 10, 1);
        let mut now = 0.0;
        run(&mut state, &mut now, 1);

        let orb = state.orb.as_ref().unwrap();
        assert_eq!(orb.health, core_health);
        assert_eq!(orb.armor[0].health, orb.armor[0].max_health - 10);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_broken_armor_drops_coins_then_core_takes_hits() {
        let mut state = started();
        let orb = state.orb.as_mut().unwrap();
        orb.rotation_speed = 0.0;
        orb.armor[0].angular_offset = std::f32::consts::FRAC_PI_2;
        orb.armor[0].health = 5;
        let armor_at = orb.pos + Vec2::new(0.0, orb.radius - 20.0);
        state.drain_events();

        let mut now = 0.0;
        launch_at(&mut state, armor_at + Vec2::new(0.0, 8.0), 10, 1);
        run(&mut state, &mut now, 1);
        assert!(state.orb.as_ref().unwrap().armor[0].destroyed);
        assert_eq!(state.coin_drops.len(), 2);
        let events = state.drain_events();
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::ArmorBroken { .. })),
            1
        );

        launch_at(&mut state, armor_at + Vec2::new(0.0, 8.0), 10, 1);
        run(&mut state, &mut now, 1);
        assert_eq!(state.orb.as_ref().unwrap().health, 90);
    }

    #[test]
    fn test_piercing_projectile_hits_multiple_times() {
        let mut state = started();
        state.orb.as_mut().unwrap().armor.clear();
        let center = state.orb.as_ref().unwrap().pos;
        launch_at(&mut state, center + Vec2::new(0.0, 60.0), 10, 3);
        let mut now = 0.0;

        run(&mut state, &mut now, 1);
        assert_eq!(state.projectiles.as_slice()[0].remaining_piercing, 2);
        run(&mut state, &mut now, 1);
        assert_eq!(state.projectiles.as_slice()[0].remaining_piercing, 1);
        run(&mut state, &mut now, 1);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.orb.as_ref().unwrap().health, 70);
    }

    #[test]
    fn test_offscreen_projectiles_removed() {
        let mut state = started();
        state.orb = None;
        let mut now = 0.0;
        state.shoot(FireTrigger::Manual, now);
        run(&mut state, &mut now, 200);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_auto_fire_uses_slow_interval() {
        let mut state = started();
        dispatch(&mut state, InputEvent::ToggleAutoFire, 0.0);
        state.drain_events();
        let mut now = 0.0;
        // 60 frames ≈ 1 second at a 300ms auto interval
        run(&mut state, &mut now, 60);
        let events = state.drain_events();
        let shots = count_events(&events, |e| {
            matches!(e, GameEvent::ShotFired { trigger: FireTrigger::Auto, .. })
        });
        assert_eq!(shots, 4);
    }

    #[test]
    fn test_auto_fire_waits_for_orb() {
        let mut state = started();
        dispatch(&mut state, InputEvent::ToggleAutoFire, 0.0);
        state.orb.as_mut().unwrap().health = 0;
        let mut now = 0.0;
        run(&mut state, &mut now, 1);
        state.drain_events();
        run(&mut state, &mut now, 30);
        let events = state.drain_events();
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::ShotFired { .. })),
            0
        );
    }

    #[test]
    fn test_advance_level_between_orbs() {
        let mut state = started();
        // Not while an orb is alive
        dispatch(&mut state, InputEvent::AdvanceLevel, 0.0);
        assert_eq!(state.level, 1);

        state.orb.as_mut().unwrap().health = 0;
        let mut now = 0.0;
        run(&mut state, &mut now, 1);
        dispatch(&mut state, InputEvent::AdvanceLevel, now);
        assert_eq!(state.level, 2);
        assert_eq!(state.orbs_destroyed_this_level, 0);
        assert_eq!(state.live_orb().map(|o| o.armor.len()), Some(2));
        assert_eq!(state.scheduler.pending_count(), 0);
    }

    #[test]
    fn test_purchases_through_dispatch() {
        let mut state = started();
        state.ledger.coins = 12;
        dispatch(&mut state, InputEvent::PurchaseUpgrade(UpgradeKind::Damage), 0.0);
        assert_eq!(state.cannon.damage, 15);
        assert_eq!(state.ledger.coins, 2);
        dispatch(&mut state, InputEvent::PurchaseUpgrade(UpgradeKind::Damage), 0.0);
        assert_eq!(state.ledger.coins, 2);

        state.ledger.diamonds = 30;
        dispatch(&mut state, InputEvent::PurchaseSkin(SkinId::Plasma), 0.0);
        assert_eq!(state.ledger.diamonds, 30);
        assert!(!state.ledger.owns(SkinId::Plasma));
    }

    #[test]
    fn test_determinism() {
        let mut a = started();
        let mut b = started();
        for state in [&mut a, &mut b] {
            dispatch(state, InputEvent::ToggleAutoFire, 0.0);
            let mut now = 0.0;
            run(state, &mut now, 600);
        }
        assert_eq!(a.ledger.coins, b.ledger.coins);
        assert_eq!(a.orbs_destroyed_total, b.orbs_destroyed_total);
        assert_eq!(a.coin_drops.len(), b.coin_drops.len());
        assert_eq!(a.effects.particles().len(), b.effects.particles().len());
    }

    fn input_strategy() -> impl Strategy<Value = Option<InputEvent>> {
        prop_oneof![
            4 => Just(None),
            3 => Just(Some(InputEvent::Shoot)),
            1 => Just(Some(InputEvent::ToggleAutoFire)),
            1 => Just(Some(InputEvent::TogglePause)),
            1 => Just(Some(InputEvent::PurchaseUpgrade(UpgradeKind::Damage))),
            1 => Just(Some(InputEvent::PurchaseUpgrade(UpgradeKind::Piercing))),
            1 => Just(Some(InputEvent::PurchaseUpgrade(UpgradeKind::Multishot))),
            1 => Just(Some(InputEvent::AdvanceLevel)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_session_invariants(inputs in proptest::collection::vec(input_strategy(), 1..400)) {
            let mut state = started();
            let mut now = 0.0;
            let mut last_level = state.level;
            let mut tracked: Option<(u32, i32, Vec<i32>)> = None;

            for input in inputs {
                if let Some(event) = input {
                    dispatch(&mut state, event, now);
                }
                run(&mut state, &mut now, 1);

                prop_assert!(state.level >= last_level);
                last_level = state.level;
                prop_assert!(state.orbs_destroyed_this_level <= state.orbs_per_level());

                if let Some(orb) = state.orb.as_ref() {
                    let armor: Vec<i32> = orb.armor.iter().map(|a| a.health).collect();
                    if let Some((id, health, prev_armor)) = &tracked {
                        if *id == orb.id {
                            prop_assert!(orb.health <= *health);
                            for (now_hp, was_hp) in armor.iter().zip(prev_armor) {
                                prop_assert!(now_hp <= was_hp);
                            }
                        }
                    }
                    if orb.health <= 0 {
                        prop_assert!(orb.destroyed);
                    }
                    tracked = Some((orb.id, orb.health, armor));
                }
                for proj in state.projectiles.as_slice() {
                    prop_assert!(proj.remaining_piercing >= 1);
                }
            }
        }
    }
}
