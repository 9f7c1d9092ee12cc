//! Canvas 2D drawing of a render snapshot

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::palette::{self, css_hex, css_rgba};
use crate::sim::snapshot::{CannonView, OrbView, RenderSnapshot};
use crate::sim::{GameMode, ParticleKind};

/// Size of the orb core relative to its hit radius
const CORE_INSET: f64 = 30.0;
const ARMOR_DRAW_RADIUS: f64 = 20.0;
const PROJECTILE_RADIUS: f64 = 4.0;
const COIN_RADIUS: f64 = 8.0;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }

    pub fn draw(&self, snapshot: &RenderSnapshot<'_>) -> Result<(), JsValue> {
        let (w, h) = (snapshot.width as f64, snapshot.height as f64);
        let ctx = &self.ctx;

        let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
        gradient.add_color_stop(0.0, &css_hex(palette::BACKGROUND_TOP))?;
        gradient.add_color_stop(1.0, &css_hex(palette::BACKGROUND_BOTTOM))?;
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.fill_rect(0.0, 0.0, w, h);

        let shot_color = css_hex(palette::skin_rgb(snapshot.cannon.color, snapshot.time_ticks));

        self.draw_cannon(&snapshot.cannon, &shot_color)?;
        if let Some(orb) = snapshot.orb.as_ref().filter(|orb| !orb.destroyed) {
            self.draw_orb(orb)?;
        }
        self.draw_projectiles(snapshot, &shot_color)?;
        self.draw_particles(snapshot)?;
        self.draw_coins(snapshot)?;

        if snapshot.mode == GameMode::Paused {
            ctx.set_fill_style_str("rgba(0, 0, 0, 0.7)");
            ctx.fill_rect(0.0, 0.0, w, h);
            ctx.set_fill_style_str(&shot_color);
            ctx.set_font("bold 48px Arial");
            ctx.set_text_align("center");
            ctx.fill_text("PAUSED", w / 2.0, h / 2.0)?;
        }
        Ok(())
    }

    fn draw_cannon(&self, cannon: &CannonView, color: &str) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.save();
        ctx.translate(cannon.pos.x as f64, cannon.pos.y as f64)?;

        ctx.set_fill_style_str(&css_hex(palette::CANNON_BASE));
        ctx.set_stroke_style_str("#666666");
        ctx.set_line_width(3.0);
        ctx.begin_path();
        ctx.arc(0.0, 0.0, 25.0, 0.0, TAU)?;
        ctx.fill();
        ctx.stroke();

        ctx.set_fill_style_str(&css_hex(palette::CANNON_BARREL));
        ctx.set_stroke_style_str("#888888");
        ctx.set_line_width(2.0);
        ctx.fill_rect(-8.0, -40.0, 16.0, 40.0);
        ctx.stroke_rect(-8.0, -40.0, 16.0, 40.0);

        ctx.set_shadow_color(color);
        ctx.set_shadow_blur(palette::cannon_glow(cannon.power_level));
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        ctx.arc(0.0, -40.0, 4.0, 0.0, TAU)?;
        ctx.fill();
        ctx.set_shadow_blur(0.0);

        ctx.restore();
        Ok(())
    }

    fn draw_orb(&self, orb: &OrbView) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let (x, y) = (orb.pos.x as f64, orb.pos.y as f64);
        let core_radius = (orb.radius as f64 - CORE_INSET).max(1.0);
        let core_color = css_hex(palette::health_rgb(orb.health_fraction));

        ctx.set_fill_style_str(&core_color);
        ctx.set_shadow_color(&core_color);
        ctx.set_shadow_blur(20.0);
        ctx.begin_path();
        ctx.arc(x, y, core_radius, 0.0, TAU)?;
        ctx.fill();
        ctx.set_shadow_blur(0.0);

        ctx.set_stroke_style_str(&css_hex(palette::OUTLINE));
        ctx.set_line_width(3.0);
        ctx.stroke();

        for armor in orb.armor.iter().filter(|a| !a.destroyed) {
            let (ax, ay) = (armor.pos.x as f64, armor.pos.y as f64);
            ctx.set_fill_style_str(&css_rgba(palette::ARMOR_FILL, armor.health_fraction));
            ctx.set_stroke_style_str(&css_hex(palette::OUTLINE));
            ctx.set_line_width(2.0);
            ctx.begin_path();
            ctx.arc(ax, ay, ARMOR_DRAW_RADIUS, 0.0, TAU)?;
            ctx.fill();
            ctx.stroke();

            if armor.health_fraction < 0.5 {
                ctx.set_stroke_style_str(&css_hex(palette::ARMOR_CRACK));
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(ax - 10.0, ay - 5.0);
                ctx.line_to(ax + 8.0, ay + 7.0);
                ctx.move_to(ax - 8.0, ay + 6.0);
                ctx.line_to(ax + 10.0, ay - 4.0);
                ctx.stroke();
            }
        }

        // Health bar
        let (bar_w, bar_h) = (100.0, 8.0);
        let bar_x = x - bar_w / 2.0;
        let bar_y = y - orb.radius as f64 - 20.0;
        ctx.set_fill_style_str("#000000");
        ctx.fill_rect(bar_x, bar_y, bar_w, bar_h);
        ctx.set_fill_style_str(&core_color);
        ctx.fill_rect(bar_x, bar_y, bar_w * orb.health_fraction as f64, bar_h);
        ctx.set_stroke_style_str(&css_hex(palette::OUTLINE));
        ctx.set_line_width(1.0);
        ctx.stroke_rect(bar_x, bar_y, bar_w, bar_h);
        Ok(())
    }

    fn draw_projectiles(&self, snapshot: &RenderSnapshot<'_>, color: &str) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(3.0);
        for proj in snapshot.projectiles {
            // Trail is newest first; fade towards the tail
            let len = proj.trail.len() as f64;
            let mut prev = proj.pos;
            for (i, point) in proj.trail.iter().enumerate() {
                ctx.set_global_alpha(0.8 * (1.0 - i as f64 / len));
                ctx.begin_path();
                ctx.move_to(prev.x as f64, prev.y as f64);
                ctx.line_to(point.x as f64, point.y as f64);
                ctx.stroke();
                prev = *point;
            }
            ctx.set_global_alpha(1.0);

            ctx.set_fill_style_str(color);
            ctx.set_shadow_color(color);
            ctx.set_shadow_blur(10.0);
            ctx.begin_path();
            ctx.arc(proj.pos.x as f64, proj.pos.y as f64, PROJECTILE_RADIUS, 0.0, TAU)?;
            ctx.fill();
            ctx.set_shadow_blur(0.0);
        }
        Ok(())
    }

    fn draw_particles(&self, snapshot: &RenderSnapshot<'_>) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        for particle in snapshot.particles {
            let alpha = particle.life_fraction() as f64;
            let (x, y) = (particle.pos.x as f64, particle.pos.y as f64);
            let color = css_hex(particle.color);
            ctx.set_global_alpha(alpha);
            match &particle.kind {
                ParticleKind::Spark | ParticleKind::CoinSparkle => {
                    ctx.set_fill_style_str(&color);
                    ctx.begin_path();
                    ctx.arc(x, y, 2.0, 0.0, TAU)?;
                    ctx.fill();
                }
                ParticleKind::Explosion => {
                    ctx.set_fill_style_str(&color);
                    ctx.begin_path();
                    ctx.arc(x, y, 3.0, 0.0, TAU)?;
                    ctx.fill();
                }
                ParticleKind::Text { label } => {
                    ctx.set_fill_style_str(&color);
                    ctx.set_font("bold 20px Arial");
                    ctx.set_text_align("center");
                    ctx.fill_text(label, x, y)?;
                }
                ParticleKind::Ring { max_radius } => {
                    let radius = *max_radius as f64 * (1.0 - alpha);
                    ctx.set_stroke_style_str(&color);
                    ctx.set_line_width(3.0);
                    ctx.begin_path();
                    ctx.arc(x, y, radius.max(0.0), 0.0, TAU)?;
                    ctx.stroke();
                }
            }
        }
        ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn draw_coins(&self, snapshot: &RenderSnapshot<'_>) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        for coin in snapshot.coin_drops {
            ctx.save();
            ctx.translate(coin.pos.x as f64, coin.pos.y as f64)?;
            ctx.rotate(coin.rotation as f64)?;
            ctx.set_fill_style_str(&css_hex(crate::sim::effects::COIN_COLOR));
            ctx.set_stroke_style_str(&css_hex(palette::OUTLINE));
            ctx.set_line_width(2.0);
            ctx.begin_path();
            ctx.arc(0.0, 0.0, COIN_RADIUS, 0.0, TAU)?;
            ctx.fill();
            ctx.stroke();
            ctx.set_fill_style_str("#000000");
            ctx.set_font("bold 10px Arial");
            ctx.set_text_align("center");
            ctx.fill_text("$", 0.0, 3.0)?;
            ctx.restore();
        }
        Ok(())
    }
}
