//! Coin pickups
//!
//! Unlike particles these carry value: each one pops upward, falls under
//! gravity and pays out when it crosses the collection line.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinDrop {
    pub pos: Vec2,
    /// Vertical speed, positive is downward
    pub vy: f32,
    /// Spin angle, purely visual
    pub rotation: f32,
    pub value: u64,
}

/// A pickup that reached the collection line this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collected {
    pub pos: Vec2,
    pub value: u64,
}

/// Scatter `count` one-coin pickups around `at`
pub fn scatter(drops: &mut Vec<CoinDrop>, rng: &mut impl Rng, at: Vec2, count: u32) {
    for _ in 0..count {
        drops.push(CoinDrop {
            pos: Vec2::new(at.x + (rng.random::<f32>() - 0.5) * 40.0, at.y),
            vy: -2.0 - rng.random::<f32>() * 3.0,
            rotation: 0.0,
            value: 1,
        });
    }
}

/// Apply one tick of gravity and remove pickups below `collect_y`.
/// Pickups above the top edge that can no longer fall back are discarded
/// unpaid.
pub fn update(drops: &mut Vec<CoinDrop>, gravity: f32, collect_y: f32) -> Vec<Collected> {
    let mut collected = Vec::new();
    let before = drops.len();
    drops.retain_mut(|coin| {
        coin.pos.y += coin.vy;
        coin.vy += gravity;
        coin.rotation += 0.1;
        if coin.pos.y < 0.0 && coin.vy <= 0.0 && gravity <= 0.0 {
            return false;
        }
        if coin.pos.y > collect_y {
            collected.push(Collected {
                pos: coin.pos,
                value: coin.value,
            });
            false
        } else {
            true
        }
    });
    let lost = before - drops.len() - collected.len();
    if lost > 0 {
        log::debug!("{} coin pickups left the top of the arena", lost);
    }
    collected
}
