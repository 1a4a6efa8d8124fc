use std::collections::{HashMap, HashSet};

use kurbo::Shape;

use crate::foundation::core::{Affine, BezPath, Point, Vec2};
use crate::foundation::error::{MetroError, MetroResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::render::fonts::{FontFace, TextBrushRgba8, TextLayoutEngine};
use crate::scene::plan::{DrawOp, FramePlan, Paint, Stroke, TextOp};

const SHAPE_TOLERANCE: f64 = 0.1;
const STROKE_TOLERANCE: f64 = 0.25;

/// CPU raster backend built on `vello_cpu`.
///
/// Holds a reusable render context plus per-font caches, so one instance should be reused
/// across frames (one per worker thread when rendering in parallel).
pub struct CpuBackend {
    settings: RenderSettings,
    ctx: Option<vello_cpu::RenderContext>,
    text_engine: TextLayoutEngine,
    font_cache: HashMap<String, vello_cpu::peniko::FontData>,
    warned_fonts: HashSet<String>,
}

impl CpuBackend {
    /// A backend drawing text with `settings.fonts`. The raster context is created on first use.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ctx: None,
            text_engine: TextLayoutEngine::new(),
            font_cache: HashMap::new(),
            warned_fonts: HashSet::new(),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> MetroResult<R>,
    ) -> MetroResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn font_face(&mut self, id: &str) -> Option<FontFace> {
        let face = self.settings.fonts.resolve(id).cloned();
        if face.as_ref().is_none_or(|f| f.id != id) && self.warned_fonts.insert(id.to_owned()) {
            match &face {
                Some(f) => tracing::warn!(font = id, fallback = %f.id, "font not registered, using fallback"),
                None => tracing::warn!(font = id, "no fonts registered, skipping text"),
            }
        }
        face
    }

    fn font_data(&mut self, face: &FontFace) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry(face.id.clone())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.bytes.to_vec()),
                    0,
                )
            })
            .clone()
    }

    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, op: &DrawOp) -> MetroResult<()> {
        match op {
            DrawOp::Rect {
                rect,
                corner_radius,
                fill,
                stroke,
            } => {
                let path = if *corner_radius > 0.0 {
                    kurbo::RoundedRect::from_rect(*rect, *corner_radius).to_path(SHAPE_TOLERANCE)
                } else {
                    rect.to_path(SHAPE_TOLERANCE)
                };
                fill_and_stroke(ctx, &path, *fill, *stroke);
            }
            DrawOp::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let path = kurbo::Circle::new(*center, *radius).to_path(SHAPE_TOLERANCE);
                fill_and_stroke(ctx, &path, *fill, *stroke);
            }
            DrawOp::Polygon {
                points,
                closed,
                fill,
                stroke,
            } => {
                let path = polygon_path(points, *closed);
                fill_and_stroke(ctx, &path, *fill, *stroke);
            }
            DrawOp::Text(text) => self.draw_text(ctx, text)?,
        }
        Ok(())
    }

    fn draw_text(&mut self, ctx: &mut vello_cpu::RenderContext, op: &TextOp) -> MetroResult<()> {
        if op.text.is_empty() || op.paint.alpha <= 0.0 || op.scale.x == 0.0 || op.scale.y == 0.0 {
            return Ok(());
        }
        let Some(face) = self.font_face(&op.font) else {
            return Ok(());
        };
        let font = self.font_data(&face);
        let brush = TextBrushRgba8::from(op.paint.color.to_rgba8(op.paint.alpha));
        let layout = self
            .text_engine
            .layout_plain(&op.text, &face, op.size, brush)?;

        let extent = Vec2::new(f64::from(layout.width()), f64::from(layout.height()));
        ctx.set_transform(affine_to_cpu(text_transform(op, extent)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip(self, plan), fields(ops = plan.ops.len()))]
    fn render_plan(&mut self, plan: &FramePlan) -> MetroResult<FrameRGBA> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| MetroError::render("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| MetroError::render("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(MetroError::render("canvas width and height must be > 0"));
        }

        self.with_ctx_mut(width, height, |this, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            set_paint(ctx, Paint::solid(plan.background));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));

            for op in &plan.ops {
                this.draw_op(ctx, op)?;
            }

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(FrameRGBA {
                width: u32::from(width),
                height: u32::from(height),
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }

    fn worker_render_settings(&self) -> Option<RenderSettings> {
        Some(self.settings.clone())
    }
}

/// Places a laid-out block so its box is centered on `op.center`, then scales it about
/// `op.scale_origin`.
pub(crate) fn text_transform(op: &TextOp, extent: Vec2) -> Affine {
    let origin = op.scale_origin.to_vec2();
    Affine::translate(origin)
        * Affine::scale_non_uniform(op.scale.x, op.scale.y)
        * Affine::translate(-origin)
        * Affine::translate(op.center.to_vec2() - extent * 0.5)
}

fn polygon_path(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut it = points.iter();
    if let Some(first) = it.next() {
        path.move_to(*first);
        for p in it {
            path.line_to(*p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}

fn fill_and_stroke(
    ctx: &mut vello_cpu::RenderContext,
    path: &BezPath,
    fill: Option<Paint>,
    stroke: Option<Stroke>,
) {
    if path.elements().is_empty() {
        return;
    }
    if let Some(paint) = fill.filter(|p| p.alpha > 0.0) {
        set_paint(ctx, paint);
        ctx.fill_path(&bezpath_to_cpu(path));
    }
    if let Some(stroke) = stroke.filter(|s| s.width > 0.0) {
        let style = kurbo::Stroke::new(stroke.width)
            .with_join(kurbo::Join::Miter)
            .with_caps(kurbo::Cap::Butt);
        let outline = kurbo::stroke(
            path.iter(),
            &style,
            &kurbo::StrokeOpts::default(),
            STROKE_TOLERANCE,
        );
        set_paint(ctx, Paint::solid(stroke.color));
        ctx.fill_path(&bezpath_to_cpu(&outline));
    }
}

fn set_paint(ctx: &mut vello_cpu::RenderContext, paint: Paint) {
    let [r, g, b, a] = paint.color.to_rgba8(paint.alpha);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
