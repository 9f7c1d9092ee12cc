//! Game state and core simulation types
//!
//! One `GameState` holds everything the simulation mutates. It is passed by
//! reference into the tick and dispatch functions; there is no global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cannon::{Cannon, FireTrigger};
use super::coins::CoinDrop;
use super::economy::{Ledger, PurchaseOutcome, SkinId, UpgradeKind};
use super::effects::Emitter;
use super::orb::Orb;
use super::projectile::ProjectileSet;
use super::schedule::Scheduler;
use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Top-level mode; only `Playing` advances the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Start screen, nothing updates or renders
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen, still rendered so an overlay can be drawn
    Paused,
    /// Run ended; rendered but not updated
    GameOver,
}

/// Notable things that happened, for the front end (sound, HUD flashes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired { trigger: FireTrigger, projectiles: u32 },
    ArmorBroken { pos: Vec2 },
    OrbSpawned { level: u32 },
    OrbDestroyed { level: u32, coins: u64, diamonds: u64 },
    LevelUp { level: u32, bonus_coins: u64, bonus_diamonds: u64 },
    CoinsCollected { amount: u64 },
    UpgradePurchased { kind: UpgradeKind, level: u32 },
    SkinChanged { skin: SkinId },
}

/// Oldest events are dropped past this if nobody drains the queue
pub const MAX_PENDING_EVENTS: usize = 256;

/// Play area size in canvas units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    /// Where new orbs are centred
    pub fn orb_anchor(&self, tuning: &Tuning) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height * tuning.orb_height_fraction)
    }

    /// Coin pickups below this line are collected
    pub fn collect_line(&self, tuning: &Tuning) -> f32 {
        self.height - tuning.coin_collect_offset
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub mode: GameMode,
    /// Current level, starts at 1
    pub level: u32,
    pub orbs_destroyed_total: u64,
    pub orbs_destroyed_this_level: u32,
    pub ledger: Ledger,
    pub cannon: Cannon,
    /// The current target, if one is on the field
    pub orb: Option<Orb>,
    pub projectiles: ProjectileSet,
    /// Visual particles (not gameplay-affecting)
    pub effects: Emitter,
    pub coin_drops: Vec<CoinDrop>,
    pub arena: Arena,
    pub tuning: Tuning,
    pub settings: Settings,
    pub scheduler: Scheduler,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    stats_dirty: bool,
    rng: Pcg32,
    next_orb_id: u32,
}

impl GameState {
    /// Create a new game state with default balance
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), Settings::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let arena = Arena {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        };
        let ledger = Ledger::new(&tuning);
        let cannon = Cannon::new(&ledger, &tuning, arena.width, arena.height);
        Self {
            seed,
            mode: GameMode::Menu,
            level: 1,
            orbs_destroyed_total: 0,
            orbs_destroyed_this_level: 0,
            ledger,
            cannon,
            orb: None,
            projectiles: ProjectileSet::new(),
            effects: Emitter::new(&settings),
            coin_drops: Vec::new(),
            arena,
            tuning,
            settings,
            scheduler: Scheduler::new(),
            time_ticks: 0,
            events: Vec::new(),
            stats_dirty: true,
            rng: Pcg32::seed_from_u64(seed),
            next_orb_id: 1,
        }
    }

    pub fn orbs_per_level(&self) -> u32 {
        self.tuning.orbs_per_level
    }

    /// The current orb if it is still alive
    pub fn live_orb(&self) -> Option<&Orb> {
        self.orb.as_ref().filter(|orb| orb.is_alive())
    }

    /// Resize the play area; the cannon follows, a live orb stays put
    pub fn resize(&mut self, width: f32, height: f32) {
        self.arena = Arena { width, height };
        self.cannon.reposition(width, height, &self.tuning);
    }

    /// Wipe the run back to level 1. Diamonds and owned skins carry over.
    pub fn reset_run(&mut self) {
        self.scheduler.invalidate();
        self.level = 1;
        self.orbs_destroyed_total = 0;
        self.orbs_destroyed_this_level = 0;
        self.ledger.reset_run(&self.tuning);
        self.cannon = Cannon::new(&self.ledger, &self.tuning, self.arena.width, self.arena.height);
        self.orb = None;
        self.projectiles.clear();
        self.effects.clear();
        self.coin_drops.clear();
        self.mark_stats_dirty();
    }

    /// Apply new presentation settings
    pub fn set_settings(&mut self, settings: Settings) {
        self.effects.configure(&settings);
        self.settings = settings;
    }

    /// Fire the cannon if playing and the rate limit allows.
    /// Returns true when a volley was launched.
    pub fn shoot(&mut self, trigger: FireTrigger, now_ms: f64) -> bool {
        if self.mode != GameMode::Playing {
            return false;
        }
        let Some(launches) = self.cannon.fire(trigger, now_ms, &self.tuning) else {
            return false;
        };
        self.projectiles
            .spawn(&launches, self.cannon.damage, self.cannon.piercing);
        self.effects.muzzle_flash(&mut self.rng, self.cannon.pos);
        self.emit(GameEvent::ShotFired {
            trigger,
            projectiles: launches.len() as u32,
        });
        true
    }

    /// Buy the next level of an upgrade and refresh cannon stats
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> PurchaseOutcome {
        let outcome = self.ledger.purchase_upgrade(kind);
        if outcome == PurchaseOutcome::Purchased {
            self.cannon.apply_upgrades(&self.ledger, &self.tuning);
            let level = self.ledger.upgrade(kind).level;
            log::info!("Upgraded {} to level {}", kind.as_str(), level);
            self.emit(GameEvent::UpgradePurchased { kind, level });
            self.mark_stats_dirty();
        }
        outcome
    }

    /// Buy or equip a skin
    pub fn purchase_skin(&mut self, skin: SkinId) -> PurchaseOutcome {
        let outcome = self.ledger.purchase_skin(skin);
        match outcome {
            PurchaseOutcome::Purchased | PurchaseOutcome::Equipped => {
                self.cannon.skin = skin;
                log::info!("Skin {} active ({:?})", skin.name(), outcome);
                self.emit(GameEvent::SkinChanged { skin });
                self.mark_stats_dirty();
            }
            PurchaseOutcome::InsufficientFunds => {
                log::debug!("Cannot afford skin {}", skin.name());
            }
        }
        outcome
    }

    /// Take all events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    pub(crate) fn mark_stats_dirty(&mut self) {
        self.stats_dirty = true;
    }

    /// True once after any stats-visible change
    pub fn take_stats_dirty(&mut self) -> bool {
        std::mem::take(&mut self.stats_dirty)
    }

    /// Split borrow of the decorative outputs and the RNG that drives them
    pub(crate) fn effects_mut(&mut self) -> (&mut Emitter, &mut Vec<CoinDrop>, &mut Pcg32) {
        (&mut self.effects, &mut self.coin_drops, &mut self.rng)
    }

    pub(crate) fn next_orb_id(&mut self) -> u32 {
        let id = self.next_orb_id;
        self.next_orb_id += 1;
        id
    }
}
