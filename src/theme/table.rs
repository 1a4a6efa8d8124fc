//! Static theme table.
//!
//! A theme is read-only data plus two strategies: a chrome drawer (background panels and
//! accents painted before any text) and a text colorer. Names are matched case-insensitively;
//! names outside the table resolve to [`UNTHEMED`], which draws no chrome and black text.

use crate::foundation::core::{Point, Rgb, Vec2};
use crate::scene::plan::{FramePlan, Paint, Stroke};
use crate::settings::model::Constants;

/// Built-in themes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Tokyo Metro.
    Metro,
    /// JR Yamanote line.
    Yamanote,
    /// JR East.
    Jr,
    /// Tokyu.
    Tokyu,
}

impl Theme {
    /// Every built-in theme.
    pub const ALL: [Theme; 4] = [Self::Metro, Self::Yamanote, Self::Jr, Self::Tokyu];

    /// Case-insensitive name lookup.
    pub fn lookup(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "metro" => Some(Self::Metro),
            "yamanote" => Some(Self::Yamanote),
            "jr" => Some(Self::Jr),
            "tokyu" => Some(Self::Tokyu),
            _ => None,
        }
    }

    /// Static data for this theme.
    pub fn spec(self) -> &'static ThemeSpec {
        match self {
            Self::Metro => &METRO,
            Self::Yamanote => &YAMANOTE,
            Self::Jr => &JR,
            Self::Tokyu => &TOKYU,
        }
    }
}

/// Station slot marker on the progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotShape {
    /// Rectangle.
    Rect,
    /// Circle.
    Round,
}

/// Vertical placement of a progress-bar label row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LabelRow {
    /// Offset from the top edge of the upper bar band.
    AboveBar(f64),
    /// Offset from the center of the lower section.
    SectionCenter(f64),
}

/// Station label layout on the progress bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelMetrics {
    /// Row of the station numbers.
    pub number_row: LabelRow,
    /// Station-number font size.
    pub number_size: f32,
    /// Row of the station names.
    pub name_row: LabelRow,
    /// Extra upward shift applied to every transfer row.
    pub transfer_lift: f64,
}

/// A color that is either fixed by the theme or taken from the line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThemeColor {
    /// Always this color.
    Fixed(Rgb),
    /// The line's [`Constants::line_color`].
    Line,
}

impl ThemeColor {
    /// The concrete color for a line.
    pub fn resolve(self, c: &Constants) -> Rgb {
        match self {
            Self::Fixed(rgb) => rgb,
            Self::Line => c.line_color,
        }
    }
}

/// Station badge styling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconStyle {
    /// Badge fill.
    pub fill: ThemeColor,
    /// Badge outline.
    pub stroke: ThemeColor,
    /// Outline width of the square badge; the round badge always uses a heavier outline.
    pub square_stroke_width: f64,
    /// Badge text color.
    pub text: Rgb,
    /// Added to the line-code font size and subtracted from the number font size.
    pub letter_mod: f32,
}

/// Fixed bundle of theme data and strategies.
#[derive(Debug)]
pub struct ThemeSpec {
    /// `None` for unthemed lines.
    pub theme: Option<Theme>,
    /// Draws panels and accents before any text.
    pub chrome: fn(&mut FramePlan, &Constants),
    /// Color of zone text.
    pub text_color: fn(&Constants) -> Rgb,
    /// Station slot marker.
    pub slot: SlotShape,
    /// Paint the lower bar band in the dark line color.
    pub two_tone_bar: bool,
    /// Rule between the progress bar and the station names.
    pub separator: bool,
    /// Progress-bar label layout.
    pub labels: LabelMetrics,
    /// Badge styling.
    pub icon: IconStyle,
}

const STANDARD_LABELS: LabelMetrics = LabelMetrics {
    number_row: LabelRow::SectionCenter(-40.0),
    number_size: 50.0,
    name_row: LabelRow::SectionCenter(40.0),
    transfer_lift: 0.0,
};

const STANDARD_ICON: IconStyle = IconStyle {
    fill: ThemeColor::Fixed(Rgb::WHITE),
    stroke: ThemeColor::Line,
    square_stroke_width: 15.0,
    text: Rgb::BLACK,
    letter_mod: 0.0,
};

const METRO_PANEL: Rgb = Rgb::new(0.95, 0.95, 0.95);
const METRO_PANEL_HEIGHT: f64 = 250.0;
const METRO_RULE_WIDTH: f64 = 10.0;

const YAMANOTE_BG: Rgb = Rgb::from_u8(229, 229, 229);
const YAMANOTE_PANEL: Rgb = Rgb::from_u8(26, 26, 24);
const YAMANOTE_INDICATOR_WIDTH: f64 = 100.0;
const YAMANOTE_INDICATOR_X: f64 = 470.0;

const JR_TOP: Rgb = Rgb::from_u8(173, 175, 179);
const JR_BOTTOM: Rgb = Rgb::from_u8(213, 217, 224);
const JR_BOX: Rgb = Rgb::from_u8(242, 242, 242);
const JR_BOX_WIDTH_MUL: f64 = 2.3 / 4.0;
const JR_BOX_HEIGHT_MUL: f64 = 2.5 / 4.0;

const TOKYU_BG: Rgb = Rgb::from_u8(233, 235, 239);
const TOKYU_PANEL: Rgb = Rgb::from_u8(22, 22, 22);

/// [`Theme::Metro`].
pub static METRO: ThemeSpec = ThemeSpec {
    theme: Some(Theme::Metro),
    chrome: metro_chrome,
    text_color: black_text,
    slot: SlotShape::Rect,
    two_tone_bar: true,
    separator: true,
    labels: STANDARD_LABELS,
    icon: STANDARD_ICON,
};

/// [`Theme::Yamanote`].
pub static YAMANOTE: ThemeSpec = ThemeSpec {
    theme: Some(Theme::Yamanote),
    chrome: yamanote_chrome,
    text_color: yamanote_text,
    slot: SlotShape::Rect,
    two_tone_bar: true,
    separator: true,
    labels: STANDARD_LABELS,
    icon: STANDARD_ICON,
};

/// [`Theme::Jr`].
pub static JR: ThemeSpec = ThemeSpec {
    theme: Some(Theme::Jr),
    chrome: jr_chrome,
    text_color: black_text,
    slot: SlotShape::Rect,
    two_tone_bar: true,
    separator: true,
    labels: STANDARD_LABELS,
    icon: STANDARD_ICON,
};

/// [`Theme::Tokyu`].
pub static TOKYU: ThemeSpec = ThemeSpec {
    theme: Some(Theme::Tokyu),
    chrome: tokyu_chrome,
    text_color: white_text,
    slot: SlotShape::Round,
    two_tone_bar: false,
    separator: false,
    labels: LabelMetrics {
        number_row: LabelRow::AboveBar(5.0),
        number_size: 30.0,
        name_row: LabelRow::SectionCenter(-20.0),
        transfer_lift: 40.0,
    },
    icon: IconStyle {
        fill: ThemeColor::Line,
        stroke: ThemeColor::Fixed(Rgb::WHITE),
        square_stroke_width: 5.0,
        text: Rgb::WHITE,
        letter_mod: -10.0,
    },
};

/// Fallback for theme names outside the table.
pub static UNTHEMED: ThemeSpec = ThemeSpec {
    theme: None,
    chrome: no_chrome,
    text_color: black_text,
    slot: SlotShape::Rect,
    two_tone_bar: true,
    separator: true,
    labels: STANDARD_LABELS,
    icon: STANDARD_ICON,
};

/// Resolve a theme name from the settings file.
pub fn resolve(name: &str) -> &'static ThemeSpec {
    Theme::lookup(name).map_or(&UNTHEMED, Theme::spec)
}

fn black_text(_: &Constants) -> Rgb {
    Rgb::BLACK
}

fn yamanote_text(_: &Constants) -> Rgb {
    YAMANOTE_BG
}

fn white_text(_: &Constants) -> Rgb {
    Rgb::WHITE
}

fn no_chrome(_: &mut FramePlan, _: &Constants) {}

fn flood(plan: &mut FramePlan, c: &Constants, color: Rgb) {
    // Centered on the origin and twice the canvas size, so it covers the whole frame.
    plan.fill_rect(
        Point::ZERO,
        Vec2::new(2.0 * f64::from(c.width), 2.0 * f64::from(c.height)),
        Paint::solid(color),
    );
}

fn top_panel(plan: &mut FramePlan, c: &Constants, color: Rgb) {
    let w = f64::from(c.width);
    plan.fill_rect(
        Point::new(w / 2.0, c.sep_height / 2.0),
        Vec2::new(w, c.sep_height),
        Paint::solid(color),
    );
}

fn metro_chrome(plan: &mut FramePlan, c: &Constants) {
    let w = f64::from(c.width);
    plan.polyline(
        vec![Point::new(0.0, c.sep_height), Point::new(w, c.sep_height)],
        Stroke::new(Rgb::BLACK, METRO_RULE_WIDTH),
    );
    plan.fill_rect(
        Point::ZERO,
        Vec2::new(2.0 * w, METRO_PANEL_HEIGHT),
        Paint::solid(METRO_PANEL),
    );
}

fn yamanote_chrome(plan: &mut FramePlan, c: &Constants) {
    flood(plan, c, YAMANOTE_BG);
    top_panel(plan, c, YAMANOTE_PANEL);
    plan.fill_rect(
        Point::new(YAMANOTE_INDICATOR_X, c.sep_height / 2.0),
        Vec2::new(YAMANOTE_INDICATOR_WIDTH, c.sep_height),
        Paint::solid(c.line_color),
    );
}

fn jr_chrome(plan: &mut FramePlan, c: &Constants) {
    let w = f64::from(c.width);
    flood(plan, c, JR_BOTTOM);
    top_panel(plan, c, JR_TOP);
    plan.fill_rect(
        Point::new(w / 2.0, c.sep_height / 2.0 + 50.0),
        Vec2::new(w * JR_BOX_WIDTH_MUL, c.sep_height * JR_BOX_HEIGHT_MUL),
        Paint::solid(JR_BOX),
    );
}

fn tokyu_chrome(plan: &mut FramePlan, c: &Constants) {
    flood(plan, c, TOKYU_BG);
    top_panel(plan, c, TOKYU_PANEL);
}

#[cfg(test)]
#[path = "../../tests/unit/theme/table.rs"]
mod tests;
