//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (creation order for armor and projectiles)
//! - Time comes in from the caller, never read from a clock
//! - No rendering or platform dependencies

pub mod cannon;
pub mod coins;
pub mod collision;
pub mod economy;
pub mod effects;
pub mod orb;
pub mod progression;
pub mod projectile;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use cannon::{Cannon, FireTrigger};
pub use coins::CoinDrop;
pub use collision::{HitTarget, projectile_orb_hit};
pub use economy::{Ledger, PurchaseOutcome, SkinColor, SkinId, UpgradeKind};
pub use effects::{Emitter, Particle, ParticleKind};
pub use orb::{ArmorSegment, Orb};
pub use projectile::{Projectile, ProjectileSet};
pub use schedule::{ScheduledAction, Scheduler};
pub use snapshot::{RenderSnapshot, StatsSnapshot};
pub use state::{Arena, GameEvent, GameMode, GameState};
pub use tick::{InputEvent, dispatch, tick};
