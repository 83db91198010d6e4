//! Canvas 2D renderer.
//!
//! Pure output: reads the entity store each frame and draws flat vector
//! shapes. World space is arena-centered with +y up; the canvas is y-down,
//! so the vertical axis flips during projection. One world unit maps to
//! `canvas_height / arena_height` pixels, which keeps the sim's aspect-based
//! bounds and the canvas in agreement at any viewport size.

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::sim::{EntityKind, GameState};

const BACKGROUND: &str = "#000511";
const PLAYER_COLOR: &str = "#00ffcc";
const ENEMY_COLOR: &str = "#ff3b3b";
const PLAYER_BULLET_COLOR: &str = "#00ffff";
const ENEMY_BULLET_COLOR: &str = "#ff5533";
const PARTICLE_COLOR: &str = "#ffaa00";

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = f64::from(width);
        self.height = f64::from(height);
    }

    fn scale(&self, state: &GameState) -> f64 {
        self.height / f64::from(state.bounds.half_height * 2.0)
    }

    fn to_screen(&self, scale: f64, pos: Vec2) -> (f64, f64) {
        (
            self.width / 2.0 + f64::from(pos.x) * scale,
            self.height / 2.0 - f64::from(pos.y) * scale,
        )
    }

    pub fn draw(&self, state: &GameState) {
        let ctx = &self.ctx;
        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, self.width, self.height);

        let scale = self.scale(state);
        for entity in state.store.iter() {
            let (x, y) = self.to_screen(scale, entity.position);
            match entity.kind {
                EntityKind::Player => self.draw_player(x, y, scale),
                EntityKind::Enemy { .. } => self.draw_enemy(x, y, scale),
                EntityKind::Bullet { player_owned } => {
                    ctx.set_fill_style_str(if player_owned {
                        PLAYER_BULLET_COLOR
                    } else {
                        ENEMY_BULLET_COLOR
                    });
                    ctx.fill_rect(
                        x - 0.06 * scale,
                        y - 0.2 * scale,
                        0.12 * scale,
                        0.4 * scale,
                    );
                }
                EntityKind::Particle { life, initial_life } => {
                    // Linear fade over the particle's lifetime.
                    let alpha = f64::from(life) / f64::from(initial_life.max(1));
                    ctx.set_global_alpha(alpha);
                    ctx.set_fill_style_str(PARTICLE_COLOR);
                    ctx.fill_rect(
                        x - 0.06 * scale,
                        y - 0.06 * scale,
                        0.12 * scale,
                        0.12 * scale,
                    );
                    ctx.set_global_alpha(1.0);
                }
            }
        }
    }

    /// Upward-pointing triangle.
    fn draw_player(&self, x: f64, y: f64, scale: f64) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(PLAYER_COLOR);
        ctx.begin_path();
        ctx.move_to(x, y - 0.5 * scale);
        ctx.line_to(x - 0.4 * scale, y + 0.35 * scale);
        ctx.line_to(x + 0.4 * scale, y + 0.35 * scale);
        ctx.close_path();
        ctx.fill();
    }

    /// Downward-pointing diamond.
    fn draw_enemy(&self, x: f64, y: f64, scale: f64) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(ENEMY_COLOR);
        ctx.begin_path();
        ctx.move_to(x, y + 0.45 * scale);
        ctx.line_to(x - 0.45 * scale, y - 0.1 * scale);
        ctx.line_to(x, y - 0.35 * scale);
        ctx.line_to(x + 0.45 * scale, y - 0.1 * scale);
        ctx.close_path();
        ctx.fill();
    }
}
