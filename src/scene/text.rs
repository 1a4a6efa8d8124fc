use std::borrow::Cow;

use crate::animation::interp::TextPass;
use crate::foundation::core::{Point, Rgb, Vec2};
use crate::scene::plan::{DrawOp, FramePlan, Paint, TextOp};
use crate::settings::model::{StationTranslation, TerminusTranslation};

/// One language's text for a zone, ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneVariant<'a> {
    pub text: Cow<'a, str>,
    pub font: &'a str,
    pub size: f32,
    pub scale_x: f64,
    /// Where the text is centered.
    pub center: Point,
    /// Scale origin while showing.
    pub enter: Point,
    /// Scale origin while hiding.
    pub exit: Point,
}

impl<'a> ZoneVariant<'a> {
    /// Station-name or train-state text centered on the zone anchor.
    pub fn station(t: &'a StationTranslation, center: Point) -> Self {
        Self {
            text: Cow::Borrowed(&t.name),
            font: &t.font,
            size: t.fontsize,
            scale_x: t.scale_x,
            center,
            enter: t.enter_xy,
            exit: t.exit_xy,
        }
    }

    /// Terminus name drawn with a station variant's styling (departure screen, station zone).
    pub fn terminus_name(
        styling: &'a StationTranslation,
        t: &'a TerminusTranslation,
        center: Point,
    ) -> Self {
        Self {
            text: Cow::Borrowed(&t.terminus),
            ..Self::station(styling, center)
        }
    }

    /// Direction word joined with the terminus name, centered on the zone anchor.
    pub fn direction(t: &'a TerminusTranslation, center: Point) -> Self {
        Self {
            text: Cow::Owned(t.combined_text()),
            font: &t.font,
            size: t.fontsize,
            scale_x: t.scale_x,
            center,
            enter: t.enter_xy,
            exit: t.exit_xy,
        }
    }

    /// Direction phrase at the language's own anchor with the combined scale origins.
    pub fn direction_combined(t: &'a TerminusTranslation) -> Self {
        Self {
            center: t.xy,
            enter: t.combined_enter_xy,
            exit: t.combined_exit_xy,
            ..Self::direction(t, t.xy)
        }
    }
}

/// The outgoing and incoming variant of one zone.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneTransition<'a> {
    pub old: ZoneVariant<'a>,
    pub new: ZoneVariant<'a>,
}

/// Draw one zone at clip-local time `t`.
///
/// Identical text on both sides draws only the settled outgoing text.
pub fn draw_zone(
    plan: &mut FramePlan,
    t: f64,
    duration: f64,
    color: Rgb,
    zone: &ZoneTransition<'_>,
) {
    if zone.old.text == zone.new.text {
        draw_pass(plan, TextPass::Hide, 0.0, duration, color, &zone.old);
        return;
    }
    draw_pass(plan, TextPass::Show, t, duration, color, &zone.new);
    draw_pass(plan, TextPass::Hide, t, duration, color, &zone.old);
}

fn draw_pass(
    plan: &mut FramePlan,
    pass: TextPass,
    t: f64,
    duration: f64,
    color: Rgb,
    v: &ZoneVariant<'_>,
) {
    if t == pass.skip_at(duration) {
        return;
    }
    let alpha = (pass.alpha_curve())(t, duration);
    let scale_y = (pass.scale_curve())(t, duration);
    let origin = match pass {
        TextPass::Show => v.enter,
        TextPass::Hide => v.exit,
    };
    plan.push(DrawOp::Text(TextOp {
        text: v.text.clone().into_owned(),
        font: v.font.to_owned(),
        size: v.size,
        center: v.center,
        paint: Paint::with_alpha(color, alpha as f32),
        scale: Vec2::new(v.scale_x, scale_y),
        scale_origin: origin,
    }));
}

#[cfg(test)]
#[path = "../../tests/unit/scene/text.rs"]
mod tests;
