//! The orb target and its armor ring
//!
//! Both the orb and each armor segment go `Alive -> Destroyed` exactly once.
//! Health only ever decreases.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// Damage above `i32::MAX` still only takes health down
fn clamp_damage(damage: u32) -> i32 {
    i32::try_from(damage).unwrap_or(i32::MAX)
}

/// One independently destructible plate orbiting the core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmorSegment {
    /// Angle relative to the orb's rotation (radians)
    pub angular_offset: f32,
    pub health: i32,
    pub max_health: i32,
    pub destroyed: bool,
}

impl ArmorSegment {
    /// Absorb a hit. Returns true on the hit that breaks the segment.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        if self.destroyed {
            return false;
        }
        self.health = self.health.saturating_sub(clamp_damage(damage));
        if self.health <= 0 {
            self.destroyed = true;
            return true;
        }
        false
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    /// Level the orb was spawned at
    pub level: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    /// Accumulated rotation (radians)
    pub rotation: f32,
    /// Radians per tick
    pub rotation_speed: f32,
    /// Segments in creation order (ascending angular offset)
    pub armor: Vec<ArmorSegment>,
    pub destroyed: bool,
}

impl Orb {
    /// Build a fresh orb for `level` centred at `pos`
    pub fn spawn(id: u32, level: u32, pos: Vec2, tuning: &Tuning) -> Self {
        let armor_count = tuning.armor_count(level);
        let armor_health = tuning.armor_health(level);
        let armor = (0..armor_count)
            .map(|i| ArmorSegment {
                angular_offset: i as f32 / armor_count as f32 * std::f32::consts::TAU,
                health: armor_health,
                max_health: armor_health,
                destroyed: false,
            })
            .collect();
        let health = tuning.orb_health(level);
        Self {
            id,
            level,
            pos,
            radius: tuning.orb_radius(level),
            health,
            max_health: health,
            rotation: 0.0,
            rotation_speed: tuning.orb_rotation_speed(level),
            armor,
            destroyed: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.destroyed
    }

    /// Spin one tick (only while alive)
    pub fn rotate(&mut self) {
        if !self.destroyed {
            self.rotation += self.rotation_speed;
        }
    }

    /// Where a segment currently sits in world space
    pub fn armor_position(&self, segment: &ArmorSegment, inset: f32) -> Vec2 {
        self.pos
            + polar_to_cartesian(self.radius - inset, segment.angular_offset + self.rotation)
    }

    /// Subtract core health. Destruction itself is decided once per tick by
    /// [`Orb::mark_destroyed`].
    pub fn apply_core_damage(&mut self, damage: u32) {
        self.health = self.health.saturating_sub(clamp_damage(damage));
    }

    /// Whether health has reached zero but destruction hasn't been processed
    pub fn is_depleted(&self) -> bool {
        !self.destroyed && self.health <= 0
    }

    /// Latch the destroyed flag. Returns true only the first time, so rewards
    /// hang off this exactly once.
    pub fn mark_destroyed(&mut self) -> bool {
        if self.destroyed || self.health > 0 {
            return false;
        }
        self.destroyed = true;
        true
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    pub fn intact_armor(&self) -> usize {
        self.armor.iter().filter(|a| !a.destroyed).count()
    }
}
