//! Projectiles and the set that owns them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cannon::Launch;
use crate::consts::MAX_PROJECTILES;

/// A cannon shot in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Cannon damage at the moment this was fired
    pub damage: u32,
    /// Hits left before the projectile is consumed
    pub remaining_piercing: u32,
    /// Recent positions for rendering (newest first)
    pub trail: Vec<Vec2>,
}

impl Projectile {
    /// Move one tick and remember where we were
    pub fn advance(&mut self, trail_length: usize) {
        if trail_length > 0 {
            self.trail.insert(0, self.pos);
            self.trail.truncate(trail_length);
        }
        self.pos += self.vel;
    }

    /// Spend one hit. Returns true when the projectile is used up.
    pub fn consume_hit(&mut self) -> bool {
        self.remaining_piercing = self.remaining_piercing.saturating_sub(1);
        self.remaining_piercing == 0
    }

    /// Whether the projectile is still inside the play area plus `margin`
    pub fn in_bounds(&self, width: f32, margin: f32) -> bool {
        self.pos.y > -margin && self.pos.x > -margin && self.pos.x < width + margin
    }
}

/// Every projectile currently in flight, in firing order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileSet {
    items: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the projectiles of one shot. Oldest shots are dropped at the cap.
    pub fn spawn(&mut self, launches: &[Launch], damage: u32, piercing: u32) {
        for launch in launches {
            if self.items.len() >= MAX_PROJECTILES {
                self.items.remove(0);
            }
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            self.items.push(Projectile {
                id,
                pos: launch.pos,
                vel: launch.vel,
                damage,
                remaining_piercing: piercing.max(1),
                trail: Vec::new(),
            });
        }
    }

    pub fn as_slice(&self) -> &[Projectile] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Visit every projectile, keeping those for which `keep` returns true
    pub fn retain_mut(&mut self, keep: impl FnMut(&mut Projectile) -> bool) {
        self.items.retain_mut(keep);
    }
}
