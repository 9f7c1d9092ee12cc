//! Orb lifecycle sequencing: destruction, rewards, respawn and level-up

use super::coins;
use super::effects::{COIN_COLOR, DIAMOND_COLOR};
use super::orb::Orb;
use super::schedule::ScheduledAction;
use super::state::{GameEvent, GameMode, GameState};

/// Put a fresh orb for the current level on the field.
///
/// Does nothing if a live orb is already present.
pub fn spawn_orb(state: &mut GameState) -> bool {
    if state.live_orb().is_some() {
        log::debug!("Spawn skipped: orb still alive");
        return false;
    }
    let id = state.next_orb_id();
    let pos = state.arena.orb_anchor(&state.tuning);
    let orb = Orb::spawn(id, state.level, pos, &state.tuning);
    log::info!(
        "Level {}: spawned orb {} (hp {}, {} armor)",
        state.level,
        id,
        orb.max_health,
        orb.armor.len()
    );
    state.orb = Some(orb);
    state.emit(GameEvent::OrbSpawned { level: state.level });
    true
}

/// Process a depleted orb. Safe to call repeatedly: rewards, effects and the
/// follow-up task only happen on the first call for a given orb.
pub fn on_orb_destroyed(state: &mut GameState) -> bool {
    let Some(orb) = state.orb.as_mut() else {
        return false;
    };
    if !orb.mark_destroyed() {
        return false;
    }
    let pos = orb.pos;
    let radius = orb.radius;
    let level = state.level;

    state.orbs_destroyed_total += 1;
    state.orbs_destroyed_this_level += 1;

    let reward_coins = state.tuning.orb_coin_reward(level);
    let diamonds = state.tuning.orb_diamond_reward(level);
    state.ledger.coins += reward_coins;
    state.ledger.diamonds += diamonds;

    let burst_drops = state.tuning.orb_burst_coin_drops(level);
    {
        let (effects, coin_drops, rng) = state.effects_mut();
        effects.orb_explosion(rng, pos, radius);
        effects.floating_text(pos, format!("+{reward_coins}"), COIN_COLOR);
        coins::scatter(coin_drops, rng, pos, burst_drops);
    }

    log::info!(
        "Orb destroyed at level {} (+{} coins, +{} diamonds, {}/{})",
        level,
        reward_coins,
        diamonds,
        state.orbs_destroyed_this_level,
        state.orbs_per_level()
    );
    state.emit(GameEvent::OrbDestroyed {
        level,
        coins: reward_coins,
        diamonds,
    });
    state.mark_stats_dirty();

    if state.orbs_destroyed_this_level >= state.orbs_per_level() {
        let delay = state.tuning.level_up_delay_ms;
        state.scheduler.schedule(ScheduledAction::LevelUp, delay);
    } else {
        let delay = state.tuning.respawn_delay_ms;
        state.scheduler.schedule(ScheduledAction::SpawnOrb, delay);
    }
    true
}

/// Move to the next level, pay the completion bonus and spawn
pub fn level_up(state: &mut GameState) {
    state.level += 1;
    state.orbs_destroyed_this_level = 0;
    let (bonus_coins, bonus_diamonds) = state.tuning.level_bonus(state.level);
    state.ledger.coins += bonus_coins;
    state.ledger.diamonds += bonus_diamonds;

    let anchor = state.arena.orb_anchor(&state.tuning);
    state
        .effects
        .floating_text(anchor, format!("LEVEL {}", state.level), DIAMOND_COLOR);

    log::info!(
        "Level up! Now level {} (+{} coins, +{} diamonds)",
        state.level,
        bonus_coins,
        bonus_diamonds
    );
    state.emit(GameEvent::LevelUp {
        level: state.level,
        bonus_coins,
        bonus_diamonds,
    });
    state.mark_stats_dirty();
    spawn_orb(state);
}

/// Skip ahead one level by hand, without a bonus. Only allowed between orbs.
pub fn advance_level(state: &mut GameState) -> bool {
    if state.mode != GameMode::Playing || state.live_orb().is_some() {
        return false;
    }
    // Replaces whatever respawn or level-up was queued
    state.scheduler.invalidate();
    state.level += 1;
    state.orbs_destroyed_this_level = 0;
    log::info!("Advanced to level {} manually", state.level);
    state.mark_stats_dirty();
    spawn_orb(state)
}

/// Execute a task the scheduler reports as due
pub fn run_scheduled(state: &mut GameState, action: ScheduledAction) {
    match action {
        ScheduledAction::SpawnOrb => {
            spawn_orb(state);
        }
        ScheduledAction::LevelUp => level_up(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::new(77);
        state.mode = GameMode::Playing;
        state
    }

    #[test]
    fn test_spawn_skipped_while_orb_alive() {
        let mut state = playing();
        assert!(spawn_orb(&mut state));
        let id = state.orb.as_ref().unwrap().id;
        assert!(!spawn_orb(&mut state));
        assert_eq!(state.orb.as_ref().unwrap().id, id);
    }

    #[test]
    fn test_destroy_requires_depleted_orb() {
        let mut state = playing();
        assert!(!on_orb_destroyed(&mut state));
        spawn_orb(&mut state);
        assert!(!on_orb_destroyed(&mut state));
        assert_eq!(state.orbs_destroyed_total, 0);
        assert_eq!(state.scheduler.pending_count(), 0);
    }

    #[test]
    fn test_destroy_schedules_respawn_or_level_up() {
        let mut state = playing();
        spawn_orb(&mut state);
        state.orb.as_mut().unwrap().health = -5;
        assert!(on_orb_destroyed(&mut state));
        assert!(state.scheduler.is_pending(ScheduledAction::SpawnOrb));

        state.orbs_destroyed_this_level = 4;
        state.orb = None;
        spawn_orb(&mut state);
        state.orb.as_mut().unwrap().health = 0;
        state.scheduler.invalidate();
        on_orb_destroyed(&mut state);
        assert!(state.scheduler.is_pending(ScheduledAction::LevelUp));
        assert!(!state.scheduler.is_pending(ScheduledAction::SpawnOrb));
    }

    #[test]
    fn test_destroy_text_and_burst() {
        let mut state = playing();
        spawn_orb(&mut state);
        state.orb.as_mut().unwrap().health = 0;
        on_orb_destroyed(&mut state);
        let labels: Vec<_> = state
            .effects
            .particles()
            .iter()
            .filter_map(|p| match &p.kind {
                crate::sim::ParticleKind::Text { label } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["+15"]);
        assert_eq!(state.coin_drops.len(), 6);
    }

    #[test]
    fn test_level_up_pays_bonus_for_new_level() {
        let mut state = playing();
        state.level = 2;
        state.orbs_destroyed_this_level = 5;
        level_up(&mut state);
        assert_eq!(state.level, 3);
        assert_eq!(state.orbs_destroyed_this_level, 0);
        // 3 * 50 coins, floor(3/3) + 2 diamonds
        assert_eq!(state.ledger.coins, 150);
        assert_eq!(state.ledger.diamonds, 3);
        let orb = state.live_orb().expect("spawned after level-up");
        assert_eq!(orb.level, 3);
        assert_eq!(orb.max_health, 200);
        assert_eq!(orb.armor.len(), 3);
    }

    #[test]
    fn test_advance_level_needs_playing_and_no_orb() {
        let mut state = GameState::new(77);
        assert!(!advance_level(&mut state));
        state.mode = GameMode::Playing;
        spawn_orb(&mut state);
        assert!(!advance_level(&mut state));

        state.orb.as_mut().unwrap().health = 0;
        on_orb_destroyed(&mut state);
        let coins = state.ledger.coins;
        assert!(advance_level(&mut state));
        assert_eq!(state.level, 2);
        assert_eq!(state.ledger.coins, coins);
        assert_eq!(state.scheduler.pending_count(), 0);
    }

    #[test]
    fn test_run_scheduled_spawn() {
        let mut state = playing();
        run_scheduled(&mut state, ScheduledAction::SpawnOrb);
        assert!(state.live_orb().is_some());
        assert_eq!(state.level, 1);
    }
}
