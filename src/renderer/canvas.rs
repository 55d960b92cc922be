//! Canvas 2D backend: replays a `Frame` on a `CanvasRenderingContext2d`

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::commands::{DrawCmd, Frame, TextAlign};

/// Look up a canvas by element id and take its 2D context
pub fn get_canvas_context(id: &str) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
    let document = web_sys::window()?.document()?;
    let canvas: HtmlCanvasElement = document.get_element_by_id(id)?.dyn_into().ok()?;
    let ctx = canvas.get_context("2d").ok()??.dyn_into().ok()?;
    Some((canvas, ctx))
}

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    /// Device-pixel scale applied on top of logical arena coordinates
    scale: f64,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx, scale: 1.0 }
    }

    /// Size the backing store to `logical * dpr` pixels
    pub fn resize(&mut self, canvas: &HtmlCanvasElement, logical: Vec2, dpr: f64) {
        canvas.set_width((logical.x as f64 * dpr).round() as u32);
        canvas.set_height((logical.y as f64 * dpr).round() as u32);
        self.scale = dpr;
        log::info!("Canvas resized to {}x{} (dpr {})", canvas.width(), canvas.height(), dpr);
    }

    pub fn render(&self, frame: &Frame) {
        let ctx = &self.ctx;
        let _ = ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);
        for (_, cmd) in frame.iter() {
            self.draw(cmd, frame.size);
        }
    }

    fn draw(&self, cmd: &DrawCmd, size: Vec2) {
        let ctx = &self.ctx;
        match cmd {
            DrawCmd::Clear { color } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
            }
            DrawCmd::Rect {
                center,
                size,
                rotation,
                fill,
            } => {
                ctx.save();
                let _ = ctx.translate(center.x as f64, center.y as f64);
                if *rotation != 0.0 {
                    let _ = ctx.rotate(*rotation as f64);
                }
                ctx.set_fill_style_str(&fill.to_css());
                ctx.fill_rect(
                    -size.x as f64 / 2.0,
                    -size.y as f64 / 2.0,
                    size.x as f64,
                    size.y as f64,
                );
                ctx.restore();
            }
            DrawCmd::Circle { center, radius, fill } => {
                ctx.begin_path();
                let _ = ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU);
                ctx.set_fill_style_str(&fill.to_css());
                ctx.fill();
            }
            DrawCmd::Ring {
                center,
                radius,
                width,
                stroke,
            } => {
                ctx.begin_path();
                let _ = ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU);
                ctx.set_line_width(*width as f64);
                ctx.set_stroke_style_str(&stroke.to_css());
                ctx.stroke();
            }
            DrawCmd::Arc {
                center,
                radius,
                start,
                end,
                width,
                stroke,
            } => {
                ctx.begin_path();
                let _ = ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    *radius as f64,
                    *start as f64,
                    *end as f64,
                );
                ctx.set_line_width(*width as f64);
                ctx.set_line_cap("round");
                ctx.set_stroke_style_str(&stroke.to_css());
                ctx.stroke();
                ctx.set_line_cap("butt");
            }
            DrawCmd::Line { from, to, width, stroke } => {
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.set_line_width(*width as f64);
                ctx.set_stroke_style_str(&stroke.to_css());
                ctx.stroke();
            }
            DrawCmd::Polyline { points, width, stroke } => {
                if self.trace(points) {
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&stroke.to_css());
                    ctx.stroke();
                }
            }
            DrawCmd::Polygon { points, fill } => {
                if self.trace(points) {
                    ctx.close_path();
                    ctx.set_fill_style_str(&fill.to_css());
                    ctx.fill();
                }
            }
            DrawCmd::Text {
                pos,
                text,
                size,
                color,
                align,
            } => {
                ctx.set_font(&format!("{}px sans-serif", size));
                ctx.set_text_align(match align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                    TextAlign::Right => "right",
                });
                ctx.set_fill_style_str(&color.to_css());
                let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
            }
            DrawCmd::Bar {
                pos,
                size,
                fraction,
                fill,
                back,
            } => {
                let (x, y, w, h) = (pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                ctx.set_fill_style_str(&back.to_css());
                ctx.fill_rect(x, y, w, h);
                ctx.set_fill_style_str(&fill.to_css());
                ctx.fill_rect(x, y, w * fraction.clamp(0.0, 1.0) as f64, h);
            }
        }
    }

    /// Open a path through `points`; false when there is nothing to draw
    fn trace(&self, points: &[Vec2]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        true
    }
}
