//! Line progress bar: which stations are visible, where the arrow sits, and how it is drawn.

use std::ops::Range;

use crate::foundation::core::{Point, Rect, Rgb, Vec2};
use crate::scene::plan::{DrawOp, FramePlan, Paint, Stroke, TextOp};
use crate::settings::model::{Constants, StationTransition};
use crate::theme::table::{LabelRow, SlotShape, ThemeSpec};

/// Slots on the bar.
pub const MAX_VISIBLE_STATIONS: usize = 8;

const SLOT_ALPHA: f32 = 0.9;
const SLOT_CORNER_RADIUS: f64 = 6.0;
const NAME_SPACING: f64 = 70.0;
const NAME_SIZE: f32 = 70.0;
const TRANSFER_ROW_HEIGHT: f64 = 40.0;
const SEPARATOR_WIDTH: f64 = 8.0;
const ARROW_FILL: Rgb = Rgb::from_u8(251, 3, 1);
const OUTLINE_WIDTH: f64 = 5.0;
const PASSED_GREY: Rgb = Rgb::new(0.5, 0.5, 0.5);

/// Pixel layout of the bar, derived from the canvas and the top panel height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    /// Canvas width.
    pub width: f64,
    /// Vertical center of the area below the top panel.
    pub section_center: f64,
    /// Height of one bar band.
    pub bar_height: f64,
    /// Bar length without the continuation triangles.
    pub bar_width: f64,
    /// Horizontal center of the bar.
    pub bar_x: f64,
    /// Center of the upper bar band.
    pub bar_y: f64,
    /// Width of one continuation triangle.
    pub triangle_width: f64,
    /// Left edge of the continuation triangles.
    pub triangle_x: f64,
    /// Width of a station slot.
    pub rect_width: f64,
    /// Gap between the bar ends and the outer slots.
    pub edge_padding: f64,
    /// Center of the first slot.
    pub rect_x: f64,
    /// Distance between neighbouring slot centers.
    pub spacing: f64,
}

impl BarGeometry {
    /// Geometry for a canvas with these constants.
    pub fn new(c: &Constants) -> Self {
        let width = f64::from(c.width);
        let height = f64::from(c.height);
        let section_center = (height - c.sep_height) / 2.0 + c.sep_height;

        let bar_height = height * 0.05;
        let bar_width = width * 0.955;
        let bar_x = bar_width / 2.0;
        // 40px is roughly half the station-number font height.
        let bar_y = section_center - bar_height * 2.0 - 40.0;

        let triangle_width = width * 0.03;
        let triangle_x = bar_x + bar_width / 2.0 - 1.0;

        let rect_width = bar_width * 0.06;
        let edge_padding = width * 0.05;
        let rect_x = (width - bar_width - triangle_width) / 2.0 + rect_width / 2.0 + edge_padding;
        let max_rect_x = triangle_x - edge_padding - rect_width / 2.0;
        let spacing = (max_rect_x - rect_x) / (MAX_VISIBLE_STATIONS - 1) as f64;

        Self {
            width,
            section_center,
            bar_height,
            bar_width,
            bar_x,
            bar_y,
            triangle_width,
            triangle_x,
            rect_width,
            edge_padding,
            rect_x,
            spacing,
        }
    }

    /// Horizontal center of slot `slot`.
    pub fn slot_x(&self, slot: usize) -> f64 {
        self.rect_x + self.spacing * slot as f64
    }

    fn row_y(&self, row: LabelRow) -> f64 {
        match row {
            LabelRow::AboveBar(dy) => self.bar_y - self.bar_height + dy,
            LabelRow::SectionCenter(dy) => self.section_center + dy,
        }
    }
}

/// Visible stations and the arrow position for one station index.
#[derive(Clone, Debug, PartialEq)]
pub struct BarWindow {
    /// Indices into the station list, at most [`MAX_VISIBLE_STATIONS`] long.
    pub range: Range<usize>,
    /// Arrow shift from its base position, in slots.
    pub arrow_offset_slots: f64,
    /// More stations follow beyond the last slot.
    pub continues: bool,
}

impl BarWindow {
    /// The arrow shift in pixels.
    pub fn arrow_offset_px(&self, g: &BarGeometry) -> f64 {
        self.arrow_offset_slots * g.spacing
    }
}

/// Distance back from `station_index` to the nearest station the train stops at.
///
/// Falls back to 1 with a warning when every earlier station is skipped.
pub fn previous_stop_distance(stations: &[StationTransition], station_index: usize) -> usize {
    for i in 1..=station_index {
        if !stations[station_index - i].skip {
            return i;
        }
    }
    tracing::warn!(
        station_index,
        "no earlier station without skip; placing the arrow as if the previous station were a stop"
    );
    1
}

/// Choose the visible stations for `station_index`.
pub fn select_window(stations: &[StationTransition], station_index: usize) -> BarWindow {
    let total = stations.len();
    let remaining = total.saturating_sub(station_index);
    let continues = remaining > MAX_VISIBLE_STATIONS - 1;

    if remaining <= MAX_VISIBLE_STATIONS - 2 {
        // Trailing window; the arrow walks forward through it.
        BarWindow {
            range: total.saturating_sub(MAX_VISIBLE_STATIONS)..total,
            arrow_offset_slots: (MAX_VISIBLE_STATIONS - 1 - remaining) as f64,
            continues,
        }
    } else if station_index == 0 {
        BarWindow {
            range: 0..total.min(MAX_VISIBLE_STATIONS),
            arrow_offset_slots: -0.5,
            continues,
        }
    } else {
        let back = previous_stop_distance(stations, station_index);
        let start = station_index.saturating_sub(back);
        BarWindow {
            range: start..total.min(start + MAX_VISIBLE_STATIONS),
            arrow_offset_slots: (back - 1) as f64,
            continues,
        }
    }
}

/// Draw the whole progress bar section for `station_index`.
pub fn draw_line_info(
    plan: &mut FramePlan,
    c: &Constants,
    theme: &ThemeSpec,
    stations: &[StationTransition],
    station_index: usize,
) {
    let g = BarGeometry::new(c);
    let window = select_window(stations, station_index);
    let lower = if theme.two_tone_bar {
        c.line_color_dark
    } else {
        c.line_color
    };

    draw_bar(plan, &g, c.line_color, lower);
    if window.continues {
        draw_triangles(plan, &g, c.line_color, lower);
    }
    for (slot, station) in stations[window.range.clone()].iter().enumerate() {
        draw_station(plan, &g, c, theme, slot, station);
    }
    if theme.separator {
        plan.polyline(
            vec![
                Point::new(0.0, g.section_center),
                Point::new(g.width, g.section_center),
            ],
            Stroke::new(c.line_color, SEPARATOR_WIDTH),
        );
    }
    draw_arrow(plan, &g, window.arrow_offset_px(&g));
}

fn draw_bar(plan: &mut FramePlan, g: &BarGeometry, upper: Rgb, lower: Rgb) {
    let size = Vec2::new(g.bar_width, g.bar_height);
    plan.fill_rect(Point::new(g.bar_x, g.bar_y), size, Paint::solid(upper));
    plan.fill_rect(
        Point::new(g.bar_x, g.bar_y + g.bar_height),
        size,
        Paint::solid(lower),
    );
}

fn draw_triangles(plan: &mut FramePlan, g: &BarGeometry, upper: Rgb, lower: Rgb) {
    let (x, w, y, h) = (g.triangle_x, g.triangle_width, g.bar_y, g.bar_height);
    plan.push(DrawOp::Polygon {
        points: vec![
            Point::new(x, y - h / 2.0),
            Point::new(x + w, y + h / 2.0),
            Point::new(x, y + h / 2.0),
        ],
        closed: true,
        fill: Some(Paint::solid(upper)),
        stroke: None,
    });
    plan.push(DrawOp::Polygon {
        points: vec![
            Point::new(x, y + h / 2.0),
            Point::new(x + w, y + h / 2.0),
            Point::new(x, y + h * 1.5),
        ],
        closed: true,
        fill: Some(Paint::solid(lower)),
        stroke: None,
    });
}

fn draw_station(
    plan: &mut FramePlan,
    g: &BarGeometry,
    c: &Constants,
    theme: &ThemeSpec,
    slot: usize,
    station: &StationTransition,
) {
    let x = g.slot_x(slot);
    let passed = slot == 0 && !c.show_direction;
    let label = Paint::solid(if station.skip || passed {
        PASSED_GREY
    } else {
        Rgb::BLACK
    });

    if station.skip {
        plan.push(skip_chevron(x - 15.0, g.bar_y));
    } else {
        let center = Point::new(x, g.bar_y + g.bar_height / 2.0);
        let fill = Some(Paint::with_alpha(Rgb::WHITE, SLOT_ALPHA));
        plan.push(match theme.slot {
            SlotShape::Round => DrawOp::Circle {
                center,
                radius: g.bar_height * 0.9,
                fill,
                stroke: None,
            },
            SlotShape::Rect => DrawOp::Rect {
                rect: Rect::from_center_size(
                    center,
                    (g.rect_width, g.bar_height * 1.6),
                ),
                corner_radius: SLOT_CORNER_RADIUS,
                fill,
                stroke: None,
            },
        });
    }

    let labels = &theme.labels;
    plan.text(
        station.station_number.as_str(),
        &c.icon_text_font,
        labels.number_size,
        Point::new(x, g.row_y(labels.number_row)),
        label,
    );

    let name = station.names.first();
    let name_y = g.row_y(labels.name_row);
    for (i, ch) in name.name.chars().enumerate() {
        plan.text(
            ch.to_string(),
            &name.font,
            NAME_SIZE,
            Point::new(x, name_y + NAME_SPACING * i as f64),
            label,
        );
    }

    for (row, transfer) in station.transfers.iter().enumerate() {
        let y = g.bar_y - g.bar_height + 10.0
            - TRANSFER_ROW_HEIGHT * row as f64
            - labels.transfer_lift;
        let line = transfer.current();
        let at = Point::new(x, y);
        plan.push(DrawOp::Text(TextOp {
            text: line.name.clone(),
            font: line.font.clone(),
            size: line.fontsize,
            center: at,
            paint: label,
            scale: Vec2::new(line.scale_x, 1.0),
            scale_origin: at,
        }));
    }
}

fn skip_chevron(ax: f64, by: f64) -> DrawOp {
    let aw = 5.0;
    DrawOp::Polygon {
        points: vec![
            Point::new(ax - aw, by - 5.0),
            Point::new(ax + aw, by - 5.0),
            Point::new(ax + 7.0 * aw, by + 30.0),
            Point::new(ax + aw, by + 65.0),
            Point::new(ax - aw, by + 65.0),
            Point::new(ax + 5.0 * aw, by + 30.0),
        ],
        closed: true,
        fill: Some(Paint::solid(Rgb::WHITE)),
        stroke: Some(Stroke::new(Rgb::WHITE, OUTLINE_WIDTH)),
    }
}

fn draw_arrow(plan: &mut FramePlan, g: &BarGeometry, offset: f64) {
    let arrow_width = g.spacing / 2.0 - g.rect_width / 2.0;
    let left = offset + g.rect_x + g.rect_width / 2.0;
    let tip = offset + g.rect_x + g.spacing - g.rect_width / 2.0;
    let (top, mid, bottom) = (
        g.bar_y - g.bar_height / 2.0,
        g.bar_y + g.bar_height / 2.0,
        g.bar_y + g.bar_height * 1.5,
    );
    plan.push(DrawOp::Polygon {
        points: vec![
            Point::new(left, top),
            Point::new(left + arrow_width, top),
            Point::new(tip, mid),
            Point::new(left + arrow_width, bottom),
            Point::new(left, bottom),
            Point::new(tip - arrow_width, mid),
        ],
        closed: true,
        fill: Some(Paint::solid(ARROW_FILL)),
        stroke: Some(Stroke::new(Rgb::WHITE, OUTLINE_WIDTH)),
    });
}

#[cfg(test)]
#[path = "../../tests/unit/scene/progress.rs"]
mod tests;
