use crate::foundation::core::{Canvas, Point, Rect, Rgb, Vec2};

/// Fill color plus straight alpha. Alpha may leave `[0, 1]`; backends saturate it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Straight color.
    pub color: Rgb,
    /// Opacity multiplier.
    pub alpha: f32,
}

impl Paint {
    /// Fully opaque `color`.
    pub const fn solid(color: Rgb) -> Self {
        Self { color, alpha: 1.0 }
    }

    /// `color` at `alpha`.
    pub const fn with_alpha(color: Rgb, alpha: f32) -> Self {
        Self { color, alpha }
    }
}

/// Opaque outline centered on the shape's edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    /// Outline color.
    pub color: Rgb,
    /// Outline width in pixels.
    pub width: f64,
}

impl Stroke {
    /// An outline `width` pixels wide.
    pub const fn new(color: Rgb, width: f64) -> Self {
        Self { color, width }
    }
}

/// A text run centered on `center`, then scaled by `scale` about `scale_origin`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    /// Single line of text.
    pub text: String,
    /// Font identifier as written in the settings file.
    pub font: String,
    /// Font size in pixels.
    pub size: f32,
    /// Center of the laid-out text box.
    pub center: Point,
    /// Glyph color and opacity.
    pub paint: Paint,
    /// Horizontal and vertical scale.
    pub scale: Vec2,
    /// Fixed point of `scale`.
    pub scale_origin: Point,
}

/// One drawing command. Fills are painted before strokes.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Axis-aligned rectangle, rounded when `corner_radius > 0`.
    Rect {
        /// Outer bounds.
        rect: Rect,
        /// Corner radius in pixels.
        corner_radius: f64,
        /// Interior paint.
        fill: Option<Paint>,
        /// Outline.
        stroke: Option<Stroke>,
    },
    /// Circle around `center`.
    Circle {
        /// Center point.
        center: Point,
        /// Radius in pixels.
        radius: f64,
        /// Interior paint.
        fill: Option<Paint>,
        /// Outline.
        stroke: Option<Stroke>,
    },
    /// Polygon when `closed`, polyline otherwise.
    Polygon {
        /// Vertices in drawing order.
        points: Vec<Point>,
        /// Join the last vertex back to the first.
        closed: bool,
        /// Interior paint, only used when `closed`.
        fill: Option<Paint>,
        /// Outline.
        stroke: Option<Stroke>,
    },
    /// Text laid out with the backend's fonts.
    Text(TextOp),
}

/// Background every composed frame starts from.
pub const FRAME_BACKGROUND: Rgb = Rgb::WHITE;

/// A complete frame as ordered draw commands over a solid background.
///
/// Ops are painted back to front in vector order.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Output size.
    pub canvas: Canvas,
    /// Color painted under every op.
    pub background: Rgb,
    /// Draw commands.
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    /// Empty white frame.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            background: FRAME_BACKGROUND,
            ops: Vec::new(),
        }
    }

    /// Append `op` above everything drawn so far.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Fill a `size` rectangle centered on `center`.
    pub fn fill_rect(&mut self, center: Point, size: Vec2, paint: Paint) {
        self.push(DrawOp::Rect {
            rect: Rect::from_center_size(center, (size.x, size.y)),
            corner_radius: 0.0,
            fill: Some(paint),
            stroke: None,
        });
    }

    /// Stroke an open polyline through `points`.
    pub fn polyline(&mut self, points: Vec<Point>, stroke: Stroke) {
        self.push(DrawOp::Polygon {
            points,
            closed: false,
            fill: None,
            stroke: Some(stroke),
        });
    }

    /// Text at natural size.
    pub fn text(
        &mut self,
        text: impl Into<String>,
        font: &str,
        size: f32,
        center: Point,
        paint: Paint,
    ) {
        self.push(DrawOp::Text(TextOp {
            text: text.into(),
            font: font.to_owned(),
            size,
            center,
            paint,
            scale: Vec2::new(1.0, 1.0),
            scale_origin: center,
        }));
    }

    /// Iterate text commands in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextOp> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/plan.rs"]
mod tests;
