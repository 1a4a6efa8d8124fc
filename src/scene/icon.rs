use crate::foundation::core::{Point, Rect};
use crate::foundation::error::MetroResult;
use crate::scene::plan::{DrawOp, FramePlan, Paint, Stroke};
use crate::settings::model::{Constants, IconShape, split_station_code};
use crate::theme::table::ThemeSpec;

const ROUND_STROKE_WIDTH: f64 = 30.0;
const SQUARE_LINE_LIFT: f64 = 40.0;
const ROUND_LINE_LIFT: f64 = 45.0;
const NUMBER_DROP: f64 = 30.0;

/// Draw the station badge for `code` (`"SS-09"`): line code above, number below.
pub fn draw_station_icon(
    plan: &mut FramePlan,
    c: &Constants,
    theme: &ThemeSpec,
    code: &str,
) -> MetroResult<()> {
    let (line, number) = split_station_code(code)?;
    let style = &theme.icon;
    let center = c.icon_xy;
    let fill = Some(Paint::solid(style.fill.resolve(c)));
    let stroke_color = style.stroke.resolve(c);

    let lift = match c.icon_shape {
        IconShape::Square => {
            plan.push(DrawOp::Rect {
                rect: Rect::from_center_size(center, (c.icon_size, c.icon_size)),
                corner_radius: 0.0,
                fill,
                stroke: Some(Stroke::new(stroke_color, style.square_stroke_width)),
            });
            SQUARE_LINE_LIFT
        }
        IconShape::Circle => {
            plan.push(DrawOp::Circle {
                center,
                radius: c.icon_size,
                fill,
                stroke: Some(Stroke::new(stroke_color, ROUND_STROKE_WIDTH)),
            });
            ROUND_LINE_LIFT
        }
    };

    let text = Paint::solid(style.text);
    plan.text(
        line,
        &c.icon_text_font,
        c.icon_line_fontsize + style.letter_mod,
        Point::new(center.x, center.y - lift),
        text,
    );
    plan.text(
        number,
        &c.icon_text_font,
        c.icon_station_fontsize - style.letter_mod,
        Point::new(center.x, center.y + NUMBER_DROP),
        text,
    );
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/icon.rs"]
mod tests;
