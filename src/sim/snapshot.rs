//! Read-only views handed to the front end
//!
//! The render snapshot borrows the live collections so building one each
//! frame doesn't copy projectiles or particles. The stats snapshot is owned
//! and only built when something shown in the HUD changed.

use glam::Vec2;
use serde::Serialize;

use super::coins::CoinDrop;
use super::economy::{SkinColor, SkinId, UpgradeKind};
use super::effects::Particle;
use super::projectile::Projectile;
use super::state::{GameMode, GameState};

#[derive(Debug, Clone, Serialize)]
pub struct CannonView {
    pub pos: Vec2,
    pub color: SkinColor,
    /// Damage upgrade level, drives the barrel glow
    pub power_level: u32,
    pub auto_fire: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArmorView {
    pub pos: Vec2,
    /// Angle the plate faces (radians)
    pub angle: f32,
    pub health_fraction: f32,
    pub destroyed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbView {
    pub pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub health: i32,
    pub max_health: i32,
    pub health_fraction: f32,
    pub destroyed: bool,
    pub armor: Vec<ArmorView>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot<'a> {
    pub mode: GameMode,
    pub width: f32,
    pub height: f32,
    pub time_ticks: u64,
    pub cannon: CannonView,
    pub orb: Option<OrbView>,
    pub projectiles: &'a [Projectile],
    pub particles: &'a [Particle],
    pub coin_drops: &'a [CoinDrop],
}

impl<'a> RenderSnapshot<'a> {
    pub fn capture(state: &'a GameState) -> Self {
        let cannon = CannonView {
            pos: state.cannon.pos,
            color: state.cannon.skin.color(),
            power_level: state.ledger.upgrade(UpgradeKind::Damage).level,
            auto_fire: state.cannon.auto_fire,
        };

        let inset = state.tuning.armor_ring_inset;
        let orb = state.orb.as_ref().map(|orb| OrbView {
            pos: orb.pos,
            radius: orb.radius,
            rotation: orb.rotation,
            health: orb.health,
            max_health: orb.max_health,
            health_fraction: orb.health_fraction(),
            destroyed: orb.destroyed,
            armor: orb
                .armor
                .iter()
                .map(|segment| ArmorView {
                    pos: orb.armor_position(segment, inset),
                    angle: segment.angular_offset + orb.rotation,
                    health_fraction: segment.health_fraction(),
                    destroyed: segment.destroyed,
                })
                .collect(),
        });

        Self {
            mode: state.mode,
            width: state.arena.width,
            height: state.arena.height,
            time_ticks: state.time_ticks,
            cannon,
            orb,
            projectiles: state.projectiles.as_slice(),
            particles: state.effects.particles(),
            coin_drops: &state.coin_drops,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeStats {
    pub kind: UpgradeKind,
    pub level: u32,
    pub cost: u64,
    pub affordable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkinStats {
    pub skin: SkinId,
    pub cost: u64,
    pub owned: bool,
    pub active: bool,
}

/// HUD and shop numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub mode: GameMode,
    pub coins: u64,
    pub diamonds: u64,
    pub level: u32,
    pub orbs_destroyed_this_level: u32,
    pub orbs_per_level: u32,
    pub orbs_destroyed_total: u64,
    /// Current per-projectile damage
    pub damage: u32,
    pub auto_fire: bool,
    pub upgrades: Vec<UpgradeStats>,
    pub skins: Vec<SkinStats>,
}

impl StatsSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let ledger = &state.ledger;
        Self {
            mode: state.mode,
            coins: ledger.coins,
            diamonds: ledger.diamonds,
            level: state.level,
            orbs_destroyed_this_level: state.orbs_destroyed_this_level,
            orbs_per_level: state.orbs_per_level(),
            orbs_destroyed_total: state.orbs_destroyed_total,
            damage: state.cannon.damage,
            auto_fire: state.cannon.auto_fire,
            upgrades: ledger
                .upgrades()
                .map(|upgrade| UpgradeStats {
                    kind: upgrade.kind,
                    level: upgrade.level,
                    cost: upgrade.cost,
                    affordable: ledger.can_afford(upgrade.kind),
                })
                .collect(),
            skins: SkinId::ALL
                .into_iter()
                .map(|skin| SkinStats {
                    skin,
                    cost: skin.cost(),
                    owned: ledger.owns(skin),
                    active: ledger.active_skin() == skin,
                })
                .collect(),
        }
    }

    pub fn upgrade(&self, kind: UpgradeKind) -> Option<&UpgradeStats> {
        self.upgrades.iter().find(|u| u.kind == kind)
    }

    /// "2/5"-style level progress
    pub fn progress_label(&self) -> String {
        format!(
            "{}/{}",
            self.orbs_destroyed_this_level, self.orbs_per_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::{InputEvent, dispatch};

    #[test]
    fn test_render_snapshot_reflects_orb() {
        let mut state = GameState::new(9);
        dispatch(&mut state, InputEvent::StartGame, 0.0);
        let snapshot = RenderSnapshot::capture(&state);
        let orb = snapshot.orb.expect("orb on field");
        assert_eq!(orb.health_fraction, 1.0);
        assert_eq!(orb.armor.len(), 1);
        // Single segment sits on the ring at angle 0
        assert_eq!(orb.armor[0].pos, orb.pos + Vec2::new(60.0, 0.0));
        assert_eq!(snapshot.cannon.color, SkinColor::Solid(0xff6b35));
    }

    #[test]
    fn test_stats_snapshot_affordability() {
        let mut state = GameState::new(9);
        state.ledger.coins = 20;
        let stats = StatsSnapshot::capture(&state);
        assert_eq!(stats.upgrades.len(), 4);
        assert!(stats.upgrade(UpgradeKind::Damage).unwrap().affordable);
        assert!(stats.upgrade(UpgradeKind::Speed).unwrap().affordable);
        assert!(!stats.upgrade(UpgradeKind::Piercing).unwrap().affordable);
        assert_eq!(stats.progress_label(), "0/5");
        assert!(stats.skins[0].owned && stats.skins[0].active);
        assert!(!stats.skins[1].owned);
    }

    #[test]
    fn test_stats_serialize_to_json() {
        let state = GameState::new(9);
        let json = serde_json::to_value(StatsSnapshot::capture(&state)).unwrap();
        assert_eq!(json["level"], 1);
        assert_eq!(json["upgrades"][0]["kind"], "Damage");
    }
}
