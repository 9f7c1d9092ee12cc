//! Data-driven game balance
//!
//! Every number that shapes difficulty or reward lives here. The defaults are
//! the shipped balance; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::economy::UpgradeKind;

/// Upper bound on `base_damage`; upgrades scale from here
pub const MAX_BASE_DAMAGE: f64 = 1_000_000.0;

/// Pricing and effect parameters for one upgradeable stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTuning {
    /// Coin price of level 2
    pub initial_cost: u64,
    /// Applied to the price after each purchase: cost = floor(cost * growth)
    pub cost_growth: f64,
    /// How the level maps onto the cannon stat (ignored by direct stats)
    pub effect_multiplier: f64,
}

impl UpgradeTuning {
    const fn new(initial_cost: u64, cost_growth: f64, effect_multiplier: f64) -> Self {
        Self {
            initial_cost,
            cost_growth,
            effect_multiplier,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Orb ===
    pub orb_base_health: i32,
    pub orb_health_per_level: i32,
    pub orb_base_radius: f32,
    pub orb_radius_per_level: f32,
    /// Radians per tick
    pub orb_base_rotation_speed: f32,
    pub orb_rotation_speed_per_level: f32,
    /// Orb centre height as a fraction of the play area
    pub orb_height_fraction: f32,
    /// Extra reach added to the core radius for projectile hits
    pub core_hit_tolerance: f32,

    // === Armor ===
    pub armor_base_health: i32,
    pub armor_health_per_level: i32,
    pub max_armor_segments: u32,
    /// Armor sits this far inside the orb radius
    pub armor_ring_inset: f32,
    /// Projectile-to-segment distance that counts as an armor hit
    pub armor_hit_radius: f32,

    // === Cannon ===
    pub base_damage: f64,
    /// Distance of the cannon above the bottom edge
    pub cannon_bottom_offset: f32,
    /// Units per tick
    pub projectile_speed: f32,
    /// Total fan angle for multishot (radians)
    pub multishot_spread: f32,
    pub manual_fire_interval_ms: f64,
    pub auto_fire_interval_ms: f64,
    pub min_fire_interval_ms: f64,
    /// Projectiles further than this outside the play area are dropped
    pub offscreen_margin: f32,

    // === Upgrades ===
    pub damage_upgrade: UpgradeTuning,
    pub speed_upgrade: UpgradeTuning,
    pub piercing_upgrade: UpgradeTuning,
    pub multishot_upgrade: UpgradeTuning,

    // === Rewards ===
    pub orb_base_coins: u64,
    pub orb_coins_per_level: u64,
    /// Orb diamonds: base + level / divisor
    pub orb_base_diamonds: u64,
    pub orb_diamond_level_divisor: u32,
    pub armor_break_coin_drops: u32,
    pub core_hit_coin_drops: u32,
    pub orb_burst_base_coin_drops: u32,
    pub level_bonus_coins_per_level: u64,
    /// Level bonus diamonds: base + new_level / divisor
    pub level_bonus_base_diamonds: u64,
    pub level_bonus_diamond_divisor: u32,

    // === Progression ===
    pub orbs_per_level: u32,
    pub respawn_delay_ms: f64,
    pub level_up_delay_ms: f64,

    // === Coin pickups ===
    /// Units per tick squared
    pub coin_gravity: f32,
    /// Pickups are collected once they fall below height - offset
    pub coin_collect_offset: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            orb_base_health: 100,
            orb_health_per_level: 50,
            orb_base_radius: 80.0,
            orb_radius_per_level: 5.0,
            orb_base_rotation_speed: 0.02,
            orb_rotation_speed_per_level: 0.005,
            orb_height_fraction: 0.3,
            core_hit_tolerance: 10.0,

            armor_base_health: 30,
            armor_health_per_level: 5,
            max_armor_segments: 8,
            armor_ring_inset: 20.0,
            armor_hit_radius: 25.0,

            base_damage: 10.0,
            cannon_bottom_offset: 50.0,
            projectile_speed: 8.0,
            multishot_spread: std::f32::consts::PI / 8.0,
            manual_fire_interval_ms: 50.0,
            auto_fire_interval_ms: 300.0,
            min_fire_interval_ms: 10.0,
            offscreen_margin: 50.0,

            damage_upgrade: UpgradeTuning::new(10, 1.8, 1.5),
            speed_upgrade: UpgradeTuning::new(15, 1.8, 0.8),
            piercing_upgrade: UpgradeTuning::new(25, 1.8, 1.0),
            multishot_upgrade: UpgradeTuning::new(50, 1.8, 1.0),

            orb_base_coins: 10,
            orb_coins_per_level: 5,
            orb_base_diamonds: 1,
            orb_diamond_level_divisor: 2,
            armor_break_coin_drops: 2,
            core_hit_coin_drops: 1,
            orb_burst_base_coin_drops: 5,
            level_bonus_coins_per_level: 50,
            level_bonus_base_diamonds: 2,
            level_bonus_diamond_divisor: 3,

            orbs_per_level: 5,
            respawn_delay_ms: 1000.0,
            level_up_delay_ms: 1500.0,

            coin_gravity: 0.3,
            coin_collect_offset: 100.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Pricing parameters for an upgrade
    pub fn upgrade(&self, kind: UpgradeKind) -> &UpgradeTuning {
        match kind {
            UpgradeKind::Damage => &self.damage_upgrade,
            UpgradeKind::Speed => &self.speed_upgrade,
            UpgradeKind::Piercing => &self.piercing_upgrade,
            UpgradeKind::Multishot => &self.multishot_upgrade,
        }
    }

    /// Core health for an orb spawned at `level`
    pub fn orb_health(&self, level: u32) -> i32 {
        self.orb_base_health + (level as i32 - 1) * self.orb_health_per_level
    }

    pub fn orb_radius(&self, level: u32) -> f32 {
        self.orb_base_radius + (level as f32 - 1.0) * self.orb_radius_per_level
    }

    pub fn orb_rotation_speed(&self, level: u32) -> f32 {
        self.orb_base_rotation_speed + level as f32 * self.orb_rotation_speed_per_level
    }

    /// Health of each armor segment at `level`
    pub fn armor_health(&self, level: u32) -> i32 {
        self.armor_base_health + level as i32 * self.armor_health_per_level
    }

    pub fn armor_count(&self, level: u32) -> u32 {
        level.min(self.max_armor_segments)
    }

    /// Coins credited directly when an orb dies
    pub fn orb_coin_reward(&self, level: u32) -> u64 {
        self.orb_base_coins + level as u64 * self.orb_coins_per_level
    }

    pub fn orb_diamond_reward(&self, level: u32) -> u64 {
        self.orb_base_diamonds + (level / self.orb_diamond_level_divisor) as u64
    }

    /// Coin pickups scattered by the destruction burst
    pub fn orb_burst_coin_drops(&self, level: u32) -> u32 {
        self.orb_burst_base_coin_drops + level
    }

    /// Bonus for reaching `new_level`
    pub fn level_bonus(&self, new_level: u32) -> (u64, u64) {
        let coins = new_level as u64 * self.level_bonus_coins_per_level;
        let diamonds =
            self.level_bonus_base_diamonds + (new_level / self.level_bonus_diamond_divisor) as u64;
        (coins, diamonds)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orb_base_health <= 0 {
            return Err(ConfigError::invalid("orb_base_health", "must be positive"));
        }
        if self.orb_health_per_level < 0 || self.armor_health_per_level < 0 {
            return Err(ConfigError::invalid(
                "orb_health_per_level",
                "health increments cannot be negative",
            ));
        }
        if self.armor_base_health <= 0 {
            return Err(ConfigError::invalid("armor_base_health", "must be positive"));
        }
        if self.orb_base_radius <= self.armor_ring_inset {
            return Err(ConfigError::invalid(
                "orb_base_radius",
                "must be larger than armor_ring_inset",
            ));
        }
        if !(1.0..=MAX_BASE_DAMAGE).contains(&self.base_damage) {
            return Err(ConfigError::invalid(
                "base_damage",
                "must be between 1 and 1000000",
            ));
        }
        if self.projectile_speed <= 0.0 {
            return Err(ConfigError::invalid("projectile_speed", "must be positive"));
        }
        if self.min_fire_interval_ms <= 0.0
            || self.manual_fire_interval_ms < self.min_fire_interval_ms
            || self.auto_fire_interval_ms < self.min_fire_interval_ms
        {
            return Err(ConfigError::invalid(
                "manual_fire_interval_ms",
                "fire intervals must be positive and not below min_fire_interval_ms",
            ));
        }
        for kind in UpgradeKind::ALL {
            let upgrade = self.upgrade(kind);
            if upgrade.initial_cost == 0 {
                return Err(ConfigError::invalid("initial_cost", "must be positive"));
            }
            if upgrade.cost_growth < 1.0 {
                return Err(ConfigError::invalid(
                    "cost_growth",
                    "must be at least 1.0 so prices never fall",
                ));
            }
        }
        if self.damage_upgrade.effect_multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "damage_upgrade.effect_multiplier",
                "must be at least 1.0",
            ));
        }
        let speed = self.speed_upgrade.effect_multiplier;
        if speed <= 0.0 || speed > 1.0 {
            return Err(ConfigError::invalid(
                "speed_upgrade.effect_multiplier",
                "must be in (0, 1] so intervals shrink",
            ));
        }
        if self.orbs_per_level == 0 {
            return Err(ConfigError::invalid("orbs_per_level", "must be at least 1"));
        }
        if self.orb_diamond_level_divisor == 0 || self.level_bonus_diamond_divisor == 0 {
            return Err(ConfigError::invalid(
                "orb_diamond_level_divisor",
                "diamond divisors must be at least 1",
            ));
        }
        if self.coin_gravity <= 0.0 {
            return Err(ConfigError::invalid("coin_gravity", "must be positive"));
        }
        if self.respawn_delay_ms < 0.0 || self.level_up_delay_ms < 0.0 {
            return Err(ConfigError::invalid(
                "respawn_delay_ms",
                "delays cannot be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_level_three_orb() {
        let t = Tuning::default();
        assert_eq!(t.orb_health(3), 200);
        assert_eq!(t.armor_health(3), 45);
        assert_eq!(t.armor_count(3), 3);
        assert_eq!(t.armor_count(12), 8);
        assert!((t.orb_radius(3) - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rewards() {
        let t = Tuning::default();
        assert_eq!(t.orb_coin_reward(1), 15);
        assert_eq!(t.orb_diamond_reward(1), 1);
        assert_eq!(t.orb_diamond_reward(4), 3);
        assert_eq!(t.orb_burst_coin_drops(2), 7);
        assert_eq!(t.level_bonus(2), (100, 2));
        assert_eq!(t.level_bonus(6), (300, 4));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "orbs_per_level": 3, "hit_unknown": 1 }"#);
        // Unknown keys are ignored, missing keys fall back to defaults
        let t = t.expect("partial tuning should parse");
        assert_eq!(t.orbs_per_level, 3);
        assert_eq!(t.orb_base_health, 100);
    }

    #[test]
    fn test_rejects_shrinking_costs() {
        let json = r#"{ "damage_upgrade": { "initial_cost": 10, "cost_growth": 0.5, "effect_multiplier": 1.5 } }"#;
        match Tuning::from_json(json) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "cost_growth"),
            other => panic!("expected invalid cost growth, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_zero_orbs_per_level() {
        assert!(matches!(
            Tuning::from_json(r#"{ "orbs_per_level": 0 }"#),
            Err(ConfigError::Invalid { field: "orbs_per_level", .. })
        ));
    }

    #[test]
    fn test_diamond_rewards_are_tunable() {
        let t = Tuning {
            orb_base_diamonds: 0,
            orb_diamond_level_divisor: 1,
            level_bonus_base_diamonds: 5,
            level_bonus_diamond_divisor: 2,
            ..Tuning::default()
        };
        assert!(t.validate().is_ok());
        assert_eq!(t.orb_diamond_reward(3), 3);
        assert_eq!(t.level_bonus(4), (200, 7));
    }

    #[test]
    fn test_rejects_zero_diamond_divisor() {
        assert!(matches!(
            Tuning::from_json(r#"{ "level_bonus_diamond_divisor": 0 }"#),
            Err(ConfigError::Invalid { field: "orb_diamond_level_divisor", .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_damage() {
        for damage in [0.5, 3.0e9, f64::NAN] {
            let t = Tuning {
                base_damage: damage,
                ..Tuning::default()
            };
            assert!(matches!(
                t.validate(),
                Err(ConfigError::Invalid { field: "base_damage", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_non_positive_coin_gravity() {
        for gravity in [0.0, -0.3] {
            let t = Tuning {
                coin_gravity: gravity,
                ..Tuning::default()
            };
            assert!(matches!(
                t.validate(),
                Err(ConfigError::Invalid { field: "coin_gravity", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
