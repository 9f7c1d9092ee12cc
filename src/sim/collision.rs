//! Projectile-versus-orb hit testing
//!
//! Armor takes priority: a projectile close enough to an intact segment hits
//! that segment and the core is spared. Segments are checked in creation
//! order and the first one in reach wins, so at most one segment absorbs a
//! given projectile per tick.

use glam::Vec2;

use super::orb::Orb;
use crate::tuning::Tuning;

/// What a projectile struck
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    /// Armor segment by index, with its world position at impact
    Armor { index: usize, at: Vec2 },
    Core,
}

/// Whether `point` is inside the orb's hit circle (radius plus tolerance)
#[inline]
pub fn within_orb(point: Vec2, orb: &Orb, tolerance: f32) -> bool {
    point.distance(orb.pos) < orb.radius + tolerance
}

/// First intact armor segment within reach of `point`
pub fn armor_hit(point: Vec2, orb: &Orb, tuning: &Tuning) -> Option<(usize, Vec2)> {
    orb.armor
        .iter()
        .enumerate()
        .filter(|(_, segment)| !segment.destroyed)
        .map(|(index, segment)| (index, orb.armor_position(segment, tuning.armor_ring_inset)))
        .find(|(_, at)| point.distance(*at) < tuning.armor_hit_radius)
}

/// Resolve a projectile at `point` against a live orb
pub fn projectile_orb_hit(point: Vec2, orb: &Orb, tuning: &Tuning) -> Option<HitTarget> {
    if orb.destroyed || !within_orb(point, orb, tuning.core_hit_tolerance) {
        return None;
    }
    Some(match armor_hit(point, orb, tuning) {
        Some((index, at)) => HitTarget::Armor { index, at },
        None => HitTarget::Core,
    })
}
