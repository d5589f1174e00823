//! Canvas 2D renderer (browser only)

use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::shapes::{self, CLOUD_PUFFS};
use super::{FrameView, RenderSink};
use crate::assets::AssetSlot;
use crate::sim::{Avatar, Obstacle, Rect};

/// Corner radius of the clipped custom avatar image
const IMAGE_CORNER: f64 = 10.0;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    /// Custom avatar image; the drawn face is used until it loads
    pub avatar_image: AssetSlot<HtmlImageElement>,
    pub clouds: bool,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            avatar_image: AssetSlot::empty(),
            clouds: true,
        })
    }

    fn fill_rect(&self, r: &Rect) {
        self.ctx
            .fill_rect(r.x as f64, r.y as f64, r.w as f64, r.h as f64);
    }

    fn draw_clouds(&self, time_ms: f64, field_width: f32) {
        self.ctx.set_fill_style_str(shapes::CLOUD_COLOR);
        for cloud in shapes::clouds(time_ms, field_width) {
            self.ctx.save();
            let _ = self.ctx.translate(cloud.pos.x as f64, cloud.pos.y as f64);
            let _ = self.ctx.scale(cloud.scale as f64, cloud.scale as f64);
            self.ctx.begin_path();
            for (dx, dy, r) in CLOUD_PUFFS {
                let _ = self.ctx.arc(dx as f64, dy as f64, r as f64, 0.0, PI * 2.0);
            }
            self.ctx.fill();
            self.ctx.restore();
        }
    }

    fn draw_pipe(&self, obstacle: &Obstacle, ground_y: f32) {
        let (top, bottom) = shapes::pipe_rects(obstacle, ground_y);

        let grad_top = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, top.h as f64);
        let _ = grad_top.add_color_stop(0.0, shapes::PIPE_LIGHT);
        let _ = grad_top.add_color_stop(1.0, shapes::PIPE_DARK);
        self.ctx.set_fill_style_canvas_gradient(&grad_top);
        self.fill_rect(&top);

        let grad_bot = self
            .ctx
            .create_linear_gradient(0.0, bottom.y as f64, 0.0, self.height);
        let _ = grad_bot.add_color_stop(0.0, shapes::PIPE_LIGHT);
        let _ = grad_bot.add_color_stop(1.0, shapes::PIPE_DARK);
        self.ctx.set_fill_style_canvas_gradient(&grad_bot);
        self.fill_rect(&bottom);

        self.ctx.set_fill_style_str(shapes::LIP_COLOR);
        for lip in shapes::pipe_lips(obstacle) {
            self.fill_rect(&lip);
        }
    }

    fn draw_ground(&self, field_width: f32, ground_y: f32) {
        self.ctx.set_fill_style_str(shapes::GROUND_COLOR);
        self.ctx
            .fill_rect(0.0, ground_y as f64, self.width, self.height - ground_y as f64);
        self.ctx.set_fill_style_str(shapes::STRIPE_COLOR);
        for stripe in shapes::ground_stripes(field_width, ground_y) {
            self.fill_rect(&stripe);
        }
    }

    fn draw_avatar(&self, avatar: &Avatar) {
        let ctx = &self.ctx;
        ctx.save();
        let _ = ctx.translate(avatar.pos.x as f64, avatar.pos.y as f64);
        let _ = ctx.rotate(avatar.angle as f64);

        let w = avatar.size.x as f64;
        let h = avatar.size.y as f64;
        match self.avatar_image.ready() {
            Some(img) => self.draw_rounded_image(img, -w / 2.0, -h / 2.0, w, h),
            None => self.draw_face(w.min(h) / 2.0),
        }
        ctx.restore();
    }

    fn draw_rounded_image(&self, img: &HtmlImageElement, x: f64, y: f64, w: f64, h: f64) {
        let ctx = &self.ctx;
        let r = IMAGE_CORNER;
        ctx.save();
        ctx.begin_path();
        ctx.move_to(x + r, y);
        let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
        let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
        let _ = ctx.arc_to(x, y + h, x, y, r);
        let _ = ctx.arc_to(x, y, x + w, y, r);
        ctx.close_path();
        ctx.clip();
        if ctx
            .draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h)
            .is_err()
        {
            log::warn!("Custom avatar image could not be drawn");
        }
        ctx.restore();

        ctx.set_stroke_style_str("rgba(0,0,0,0.25)");
        ctx.set_line_width(2.0);
        ctx.stroke_rect(x, y, w, h);
    }

    /// Fallback avatar: yellow disc with eyes and a smile
    fn draw_face(&self, r: f64) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(shapes::AVATAR_FILL);
        ctx.begin_path();
        let _ = ctx.arc(0.0, 0.0, r, 0.0, PI * 2.0);
        ctx.fill();

        ctx.set_fill_style_str(shapes::FACE_COLOR);
        for eye_x in [-8.0, 8.0] {
            ctx.begin_path();
            let _ = ctx.arc(eye_x, -6.0, 3.0, 0.0, PI * 2.0);
            ctx.fill();
        }

        ctx.set_stroke_style_str(shapes::FACE_COLOR);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        let _ = ctx.arc(0.0, 2.0, 10.0, 0.15 * PI, 0.85 * PI);
        ctx.stroke();
    }

    fn draw_overlay(&self, text: &str) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(shapes::OVERLAY_DIM);
        ctx.fill_rect(0.0, 0.0, self.width, self.height);
        ctx.set_fill_style_str("#fff");
        ctx.set_font("bold 28px system-ui, sans-serif");
        ctx.set_text_align("center");
        let _ = ctx.fill_text(text, self.width / 2.0, self.height / 2.0);
    }

    fn draw_score(&self, score: u32) {
        let ctx = &self.ctx;
        let text = score.to_string();
        let x = self.width / 2.0;
        let y = shapes::SCORE_BASELINE as f64;
        let off = shapes::SCORE_SHADOW_OFFSET as f64;

        ctx.set_font("bold 56px system-ui, sans-serif");
        ctx.set_text_align("center");
        ctx.set_fill_style_str(shapes::SCORE_SHADOW);
        let _ = ctx.fill_text(&text, x + off, y + off);
        ctx.set_fill_style_str("#ffffff");
        let _ = ctx.fill_text(&text, x, y);
    }
}

impl RenderSink for CanvasRenderer {
    fn render(&mut self, view: &FrameView<'_>) {
        let ground_y = view.tuning.ground_y();
        let field_width = view.tuning.field_width;

        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        if self.clouds {
            self.draw_clouds(view.time_ms, field_width);
        }
        for obstacle in view.obstacles {
            self.draw_pipe(obstacle, ground_y);
        }
        self.draw_ground(field_width, ground_y);
        self.draw_avatar(view.avatar);
        if let Some(text) = view.overlay_text() {
            self.draw_overlay(text);
        }
        self.draw_score(view.score);
    }
}
