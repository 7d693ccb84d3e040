//! Canvas 2D draw calls

use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{
    BALL_GLOW_BLUR, BANNER_ALPHA, BANNER_HEIGHT, OVERLAY_ALPHA, PARTICLE_RADIUS, RING_DASH,
    RING_WIDTH, TRAIL_ALPHA, font, gradient_stops, overlay_lines, spin_angle, win_banner,
};
use crate::sim::{Ball, EvilCircle, GameState, Particle};

const TAU: f64 = std::f64::consts::TAU;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    /// Shadow glow around balls
    glow: bool,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement, glow: bool) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            glow,
        })
    }

    /// Draw one frame: background, particles, balls, evil circle, overlays
    pub fn render(&self, state: &GameState, now_ms: f64) {
        self.draw_background(state);

        for particle in &state.particles {
            self.draw_particle(particle);
        }
        self.ctx.set_global_alpha(1.0);

        for ball in &state.balls {
            self.draw_ball(ball);
        }
        // Glow must not leak into the ring or text
        self.ctx.set_shadow_blur(0.0);

        self.draw_evil(&state.evil, now_ms);

        if let Some([first, second]) = overlay_lines(state.phase) {
            self.ctx.set_fill_style_str(&format!("rgba(0,0,0,{})", OVERLAY_ALPHA));
            self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
            self.ctx.set_fill_style_str("#fff");
            self.ctx.set_font(&font(28));
            self.ctx.fill_text(first, 24.0, 48.0).ok();
            self.ctx.fill_text(second, 24.0, 84.0).ok();
        }

        if let Some([title, hint]) = win_banner(state) {
            self.ctx.set_fill_style_str(&format!("rgba(0,0,0,{})", BANNER_ALPHA));
            self.ctx.fill_rect(0.0, 0.0, self.width, BANNER_HEIGHT);
            self.ctx.set_fill_style_str("#fff");
            self.ctx.set_font(&font(32));
            self.ctx.fill_text(&title, 24.0, 48.0).ok();
            self.ctx.set_font(&font(20));
            self.ctx.fill_text(&hint, 24.0, 84.0).ok();
        }
    }

    fn draw_background(&self, state: &GameState) {
        let (start, end) = gradient_stops(state.tint);
        let gradient = self
            .ctx
            .create_linear_gradient(0.0, 0.0, self.width, self.height);
        gradient.add_color_stop(0.0, &start.css_alpha(1.0)).ok();
        gradient.add_color_stop(1.0, &end.css_alpha(1.0)).ok();

        self.ctx.set_global_alpha(TRAIL_ALPHA);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        self.ctx.set_global_alpha(1.0);
    }

    fn draw_particle(&self, particle: &Particle) {
        self.ctx.set_global_alpha(particle.alpha() as f64);
        self.ctx.set_fill_style_str(&particle.color.css_alpha(1.0));
        self.ctx.begin_path();
        self.ctx
            .arc(
                particle.pos.x as f64,
                particle.pos.y as f64,
                PARTICLE_RADIUS,
                0.0,
                TAU,
            )
            .ok();
        self.ctx.fill();
    }

    fn draw_ball(&self, ball: &Ball) {
        if !ball.exists {
            return;
        }

        let color = ball.color.css();
        self.ctx.begin_path();
        if self.glow {
            // Shadow settings apply to the next fill
            self.ctx.set_shadow_color(&color);
            self.ctx.set_shadow_blur(BALL_GLOW_BLUR);
        }
        self.ctx.set_fill_style_str(&color);
        self.ctx
            .arc(ball.pos.x as f64, ball.pos.y as f64, ball.size as f64, 0.0, TAU)
            .ok();
        self.ctx.fill();
    }

    fn draw_evil(&self, evil: &EvilCircle, now_ms: f64) {
        let dash = Array::of2(&RING_DASH[0].into(), &RING_DASH[1].into());

        self.ctx.save();
        self.ctx.set_line_width(RING_WIDTH);
        self.ctx.set_line_dash(&dash).ok();
        self.ctx.translate(evil.pos.x as f64, evil.pos.y as f64).ok();
        self.ctx.rotate(spin_angle(now_ms)).ok();
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&evil.color.css());
        self.ctx.arc(0.0, 0.0, evil.size as f64, 0.0, TAU).ok();
        self.ctx.stroke();
        self.ctx.restore();
    }
}
