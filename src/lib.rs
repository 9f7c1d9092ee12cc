//! Orb Destroyer - A single-screen arcade clicker
//!
//! Core modules:
//! - `sim`: Deterministic simulation (orb, armor, projectiles, economy)
//! - `game`: Frame-driven clock that sequences update and render
//! - `renderer`: Palette and the browser canvas frontend
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences

pub mod error;
pub mod game;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use game::{Frontend, Game};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the scheduler (ms), so a backgrounded tab
    /// doesn't fast-forward pending spawns
    pub const MAX_FRAME_MS: f64 = 100.0;
    /// Nominal frame length used for the very first frame
    pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

    /// Default play area before the first resize
    pub const DEFAULT_WIDTH: f32 = 480.0;
    pub const DEFAULT_HEIGHT: f32 = 640.0;

    /// Projectile trail points kept at full quality
    pub const TRAIL_LENGTH: usize = 8;

    /// Hard cap on projectiles in flight
    pub const MAX_PROJECTILES: usize = 512;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
