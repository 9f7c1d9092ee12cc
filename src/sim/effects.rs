//! Decorative particle emitter
//!
//! Particles are written by the simulation and read only by the renderer.
//! Nothing in gameplay ever looks at them, so the cap from [`Settings`] can
//! drop them freely.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

pub const HIT_CORE_COLOR: u32 = 0xff6b35;
pub const HIT_ARMOR_COLOR: u32 = 0x888888;
pub const ARMOR_BREAK_COLOR: u32 = 0xffffff;
pub const COIN_COLOR: u32 = 0xf7931e;
pub const DIAMOND_COLOR: u32 = 0x66ccff;

/// What a particle looks like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Small dot: hit sparks, muzzle flash
    Spark,
    /// Larger debris from a destroyed orb
    Explosion,
    /// Sparkle where a coin pickup was collected
    CoinSparkle,
    /// Floating label that drifts upward
    Text { label: String },
    /// Expanding shockwave ring
    Ring { max_radius: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks left
    pub life: u32,
    pub max_life: u32,
    /// 0xRRGGBB
    pub color: u32,
    pub kind: ParticleKind,
}

impl Particle {
    /// 1.0 when fresh, approaching 0.0 as it expires
    pub fn life_fraction(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Convert HSL (hue in degrees, saturation/lightness 0-1) to 0xRRGGBB
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> u32 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f32| (((v + m) * 255.0).round().clamp(0.0, 255.0)) as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Uniform in [-0.5, 0.5) times `scale`
fn jitter(rng: &mut impl Rng, scale: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * scale
}

/// Owns every live particle and decides how many exist
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    particles: Vec<Particle>,
    max_particles: usize,
    floating_text: bool,
}

impl Emitter {
    pub fn new(settings: &Settings) -> Self {
        let mut emitter = Self::default();
        emitter.configure(settings);
        emitter
    }

    /// Apply new presentation settings, trimming if the cap shrank
    pub fn configure(&mut self, settings: &Settings) {
        self.max_particles = settings.max_particles();
        self.floating_text = settings.floating_text;
        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    fn push(&mut self, particle: Particle) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            // Remove oldest particles to make room
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    fn burst<R: Rng>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        count: usize,
        speed: f32,
        life: u32,
        kind: ParticleKind,
        color: impl Fn(&mut R) -> u32,
    ) {
        for _ in 0..count {
            let vel = Vec2::new(jitter(rng, speed), jitter(rng, speed));
            let color = color(rng);
            self.push(Particle {
                pos,
                vel,
                life,
                max_life: life,
                color,
                kind: kind.clone(),
            });
        }
    }

    /// Flame puff at the cannon mouth
    pub fn muzzle_flash(&mut self, rng: &mut impl Rng, cannon_pos: Vec2) {
        for _ in 0..5 {
            let pos = Vec2::new(cannon_pos.x + jitter(rng, 20.0), cannon_pos.y - 20.0);
            let vel = Vec2::new(jitter(rng, 4.0), -rng.random::<f32>() * 3.0);
            let color = hsl_to_rgb(
                20.0 + rng.random::<f32>() * 40.0,
                1.0,
                0.5 + rng.random::<f32>() * 0.3,
            );
            self.push(Particle {
                pos,
                vel,
                life: 15,
                max_life: 15,
                color,
                kind: ParticleKind::Spark,
            });
        }
    }

    /// Sparks where a projectile struck armor or the core
    pub fn hit_sparks(&mut self, rng: &mut impl Rng, pos: Vec2, color: u32) {
        self.burst(rng, pos, 8, 6.0, 20, ParticleKind::Spark, |_| color);
    }

    /// White shards when an armor segment breaks
    pub fn armor_break(&mut self, rng: &mut impl Rng, pos: Vec2) {
        self.burst(rng, pos, 15, 8.0, 30, ParticleKind::Spark, |_| {
            ARMOR_BREAK_COLOR
        });
    }

    /// Sparkle where a coin pickup was collected
    pub fn coin_sparkle(&mut self, rng: &mut impl Rng, pos: Vec2) {
        for _ in 0..5 {
            let vel = Vec2::new(jitter(rng, 4.0), -rng.random::<f32>() * 4.0);
            self.push(Particle {
                pos,
                vel,
                life: 15,
                max_life: 15,
                color: COIN_COLOR,
                kind: ParticleKind::CoinSparkle,
            });
        }
    }

    /// Big debris burst plus a shockwave ring for a destroyed orb
    pub fn orb_explosion(&mut self, rng: &mut impl Rng, pos: Vec2, radius: f32) {
        self.burst(rng, pos, 50, 12.0, 60, ParticleKind::Explosion, |rng| {
            let hue = rng.random::<f32>() * 60.0 + 10.0;
            let lightness = 0.5 + rng.random::<f32>() * 0.3;
            hsl_to_rgb(hue, 1.0, lightness)
        });
        self.push(Particle {
            pos,
            vel: Vec2::ZERO,
            life: 30,
            max_life: 30,
            color: HIT_CORE_COLOR,
            kind: ParticleKind::Ring {
                max_radius: radius * 1.5,
            },
        });
    }

    /// Reward label drifting up from `pos`
    pub fn floating_text(&mut self, pos: Vec2, label: impl Into<String>, color: u32) {
        if !self.floating_text {
            return;
        }
        self.push(Particle {
            pos,
            vel: Vec2::new(0.0, -1.0),
            life: 60,
            max_life: 60,
            color,
            kind: ParticleKind::Text {
                label: label.into(),
            },
        });
    }

    /// Advance one tick and drop expired particles
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.pos += particle.vel;
            particle.life = particle.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), 0xff0000);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), 0x00ff00);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), 0x0000ff);
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), 0xffffff);
    }

    #[test]
    fn test_particles_expire() {
        let mut emitter = Emitter::new(&Settings::default());
        let mut rng = rng();
        emitter.hit_sparks(&mut rng, Vec2::ZERO, HIT_CORE_COLOR);
        assert_eq!(emitter.particles().len(), 8);
        for _ in 0..19 {
            emitter.update();
        }
        assert_eq!(emitter.particles().len(), 8);
        emitter.update();
        assert!(emitter.particles().is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut emitter = Emitter::new(&Settings::from_preset(QualityPreset::Low));
        let mut rng = rng();
        for _ in 0..3 {
            emitter.orb_explosion(&mut rng, Vec2::ZERO, 80.0);
        }
        assert_eq!(emitter.particles().len(), 100);
        // The newest particle is the last ring
        assert!(matches!(
            emitter.particles().last().map(|p| &p.kind),
            Some(ParticleKind::Ring { .. })
        ));
    }

    #[test]
    fn test_disabled_particles_emit_nothing() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        let mut emitter = Emitter::new(&settings);
        emitter.armor_break(&mut rng(), Vec2::ZERO);
        emitter.floating_text(Vec2::ZERO, "+10", COIN_COLOR);
        assert!(emitter.particles().is_empty());
    }

    #[test]
    fn test_floating_text_toggle() {
        let settings = Settings {
            floating_text: false,
            ..Settings::default()
        };
        let mut emitter = Emitter::new(&settings);
        emitter.floating_text(Vec2::ZERO, "+10", COIN_COLOR);
        assert!(emitter.particles().is_empty());

        emitter.configure(&Settings::default());
        emitter.floating_text(Vec2::ZERO, "+10", COIN_COLOR);
        assert_eq!(emitter.particles().len(), 1);
        assert_eq!(
            emitter.particles()[0].kind,
            ParticleKind::Text {
                label: "+10".to_string()
            }
        );
    }

    #[test]
    fn test_explosion_colors_are_warm() {
        let mut emitter = Emitter::new(&Settings::default());
        emitter.orb_explosion(&mut rng(), Vec2::ZERO, 80.0);
        for p in emitter.particles() {
            if p.kind == ParticleKind::Explosion {
                let red = p.color >> 16;
                let blue = p.color & 0xff;
                assert!(red >= blue);
            }
        }
    }
}
