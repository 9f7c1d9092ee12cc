//! The player's cannon
//!
//! Fixed at the bottom centre of the play area. Its combat stats are derived
//! from the upgrade ledger, never stored independently of it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::economy::{Ledger, SkinId, UpgradeKind, scaled_stat};
use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// What asked the cannon to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireTrigger {
    /// Player tap/click, governed by the fast interval
    Manual,
    /// Auto-fire toggle, governed by the slow interval
    Auto,
}

/// A single projectile launch produced by a shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cannon {
    pub pos: Vec2,
    pub damage: u32,
    pub manual_fire_interval_ms: f64,
    pub auto_fire_interval_ms: f64,
    pub piercing: u32,
    pub multishot: u32,
    pub auto_fire: bool,
    /// Wall-clock time of the last accepted shot
    pub last_shot_ms: Option<f64>,
    pub skin: SkinId,
}

impl Cannon {
    pub fn new(ledger: &Ledger, tuning: &Tuning, width: f32, height: f32) -> Self {
        let mut cannon = Self {
            pos: Vec2::ZERO,
            damage: 0,
            manual_fire_interval_ms: tuning.manual_fire_interval_ms,
            auto_fire_interval_ms: tuning.auto_fire_interval_ms,
            piercing: 1,
            multishot: 1,
            auto_fire: false,
            last_shot_ms: None,
            skin: ledger.active_skin(),
        };
        cannon.reposition(width, height, tuning);
        cannon.apply_upgrades(ledger, tuning);
        cannon
    }

    /// Re-anchor to the bottom centre after the play area changes size
    pub fn reposition(&mut self, width: f32, height: f32, tuning: &Tuning) {
        self.pos = Vec2::new(width / 2.0, height - tuning.cannon_bottom_offset);
    }

    /// Recompute every derived stat from the ledger's upgrade levels
    pub fn apply_upgrades(&mut self, ledger: &Ledger, tuning: &Tuning) {
        let damage = ledger.upgrade(UpgradeKind::Damage);
        self.damage = scaled_stat(tuning.base_damage, damage.effect_multiplier, damage.level) as u32;

        let speed = ledger.upgrade(UpgradeKind::Speed);
        let interval = |base: f64| {
            scaled_stat(base, speed.effect_multiplier, speed.level).max(tuning.min_fire_interval_ms)
        };
        self.manual_fire_interval_ms = interval(tuning.manual_fire_interval_ms);
        self.auto_fire_interval_ms = interval(tuning.auto_fire_interval_ms);

        self.piercing = ledger.upgrade(UpgradeKind::Piercing).level;
        self.multishot = ledger.upgrade(UpgradeKind::Multishot).level;
        self.skin = ledger.active_skin();
    }

    pub fn fire_interval(&self, trigger: FireTrigger) -> f64 {
        match trigger {
            FireTrigger::Manual => self.manual_fire_interval_ms,
            FireTrigger::Auto => self.auto_fire_interval_ms,
        }
    }

    /// Whether a shot from `trigger` at `now_ms` passes the rate limit
    pub fn ready(&self, trigger: FireTrigger, now_ms: f64) -> bool {
        match self.last_shot_ms {
            Some(last) => now_ms - last >= self.fire_interval(trigger),
            None => true,
        }
    }

    /// Attempt a shot. Returns the fan of launches, or `None` when rate
    /// limited.
    pub fn fire(
        &mut self,
        trigger: FireTrigger,
        now_ms: f64,
        tuning: &Tuning,
    ) -> Option<Vec<Launch>> {
        if !self.ready(trigger, now_ms) {
            return None;
        }
        self.last_shot_ms = Some(now_ms);
        Some(
            spread_angles(self.multishot, tuning.multishot_spread)
                .map(|angle| Launch {
                    pos: self.pos,
                    vel: polar_to_cartesian(tuning.projectile_speed, angle),
                })
                .collect(),
        )
    }
}

/// Launch angles for `shots` projectiles fanned around straight up (-π/2 in
/// screen space, y grows downward)
pub fn spread_angles(shots: u32, spread: f32) -> impl Iterator<Item = f32> {
    let up = -std::f32::consts::FRAC_PI_2;
    (0..shots).map(move |i| {
        if shots > 1 {
            let step = spread / (shots - 1) as f32;
            up + (i as f32 - (shots - 1) as f32 / 2.0) * step
        } else {
            up
        }
    })
}
