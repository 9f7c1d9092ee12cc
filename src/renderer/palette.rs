//! Colors shared by every frontend

use crate::sim::SkinColor;
use crate::sim::effects::hsl_to_rgb;

pub const BACKGROUND_TOP: u32 = 0x000033;
pub const BACKGROUND_BOTTOM: u32 = 0x000011;
pub const CANNON_BASE: u32 = 0x333333;
pub const CANNON_BARREL: u32 = 0x555555;
pub const ARMOR_FILL: u32 = 0x888888;
pub const ARMOR_CRACK: u32 = 0xff0000;
pub const OUTLINE: u32 = 0xffffff;

/// Hue degrees advanced per tick for the rainbow skin
const RAINBOW_DEGREES_PER_TICK: f32 = 3.0;

/// `#rrggbb`
pub fn css_hex(color: u32) -> String {
    format!("#{:06x}", color & 0xff_ffff)
}

pub fn css_rgba(color: u32, alpha: f32) -> String {
    let (r, g, b) = ((color >> 16) & 0xff, (color >> 8) & 0xff, color & 0xff);
    format!("rgba({r}, {g}, {b}, {:.3})", alpha.clamp(0.0, 1.0))
}

/// Resolve a skin to a concrete color at `time_ticks`
pub fn skin_rgb(color: SkinColor, time_ticks: u64) -> u32 {
    match color {
        SkinColor::Solid(rgb) => rgb,
        SkinColor::Rainbow => {
            let hue = (time_ticks as f32 * RAINBOW_DEGREES_PER_TICK) % 360.0;
            hsl_to_rgb(hue, 1.0, 0.5)
        }
    }
}

/// Red when nearly dead through to green at full health
pub fn health_rgb(fraction: f32) -> u32 {
    hsl_to_rgb(fraction.clamp(0.0, 1.0) * 120.0, 0.8, 0.5)
}

/// Shadow blur for the cannon tip, growing with damage upgrades
pub fn cannon_glow(power_level: u32) -> f64 {
    15.0 + (power_level.saturating_sub(1).min(10) as f64) * 2.0
}
