use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps, Point, Rgb};
use crate::foundation::error::{MetroError, MetroResult};
use crate::sequence::circular::CircularSequence;

/// `[x, y]` or `{ "x": .., "y": .. }` in settings files; always written back as an array.
mod point_repr {
    use super::Point;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Arr([f64; 2]),
        Obj { x: f64, y: f64 },
    }

    pub(super) fn serialize<S: Serializer>(p: &Point, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq([p.x, p.y])
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Point, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Arr([x, y]) | Repr::Obj { x, y } => Ok(Point::new(x, y)),
        }
    }
}

/// One language's text for a transfer line label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineTranslation {
    /// Line name in this language.
    pub name: String,
    /// Font identifier.
    pub font: String,
    /// Font size in pixels.
    pub fontsize: f32,
    /// Horizontal squeeze applied to the text.
    pub scale_x: f64,
}

/// One language's text for a station-name or train-state zone.
///
/// `enter_xy` is the scale origin while the text shows, `exit_xy` while it hides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationTranslation {
    /// Text in this language.
    pub name: String,
    /// Font identifier.
    pub font: String,
    /// Font size in pixels.
    pub fontsize: f32,
    /// Horizontal squeeze applied to the text.
    pub scale_x: f64,
    /// Scale origin while showing.
    #[serde(with = "point_repr")]
    pub enter_xy: Point,
    /// Scale origin while hiding.
    #[serde(with = "point_repr")]
    pub exit_xy: Point,
}

/// One language's text for the destination zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerminusTranslation {
    /// Direction word, e.g. "For" or "ゆき".
    pub name: String,
    /// Font identifier.
    pub font: String,
    /// Font size in pixels.
    pub fontsize: f32,
    /// Horizontal squeeze applied to the text.
    pub scale_x: f64,
    /// Scale origin while showing.
    #[serde(with = "point_repr")]
    pub enter_xy: Point,
    /// Scale origin while hiding.
    #[serde(with = "point_repr")]
    pub exit_xy: Point,
    /// Terminus station name in this language.
    pub terminus: String,
    /// `true` when the direction word follows the station name ("渋谷 ゆき").
    pub name_after_terminus: bool,
    /// Anchor used for the combined phrase on the departure screen.
    #[serde(with = "point_repr")]
    pub xy: Point,
    /// Show origin for the combined phrase.
    #[serde(with = "point_repr")]
    pub combined_enter_xy: Point,
    /// Hide origin for the combined phrase.
    #[serde(with = "point_repr")]
    pub combined_exit_xy: Point,
}

impl TerminusTranslation {
    /// Direction word and terminus name joined in this language's word order.
    pub fn combined_text(&self) -> String {
        if self.name_after_terminus {
            format!("{} {}", self.terminus, self.name)
        } else {
            format!("{} {}", self.name, self.terminus)
        }
    }
}

/// A station on the line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationTransition {
    /// Station name in every language.
    #[serde(rename = "translations")]
    pub names: CircularSequence<StationTranslation>,
    /// Anchor of the station-name zone.
    #[serde(with = "point_repr")]
    pub xy: Point,
    /// Line code and number joined by a hyphen, e.g. `"SS-09"`.
    pub station_number: String,
    /// One sequence per connecting line; each holds that line's label in every language.
    #[serde(default)]
    pub transfers: Vec<CircularSequence<LineTranslation>>,
    /// The train passes this station without stopping.
    #[serde(default)]
    pub skip: bool,
}

/// A named train state ("next", "arriving", ...) with its label in every language.
#[derive(Clone, Debug, PartialEq)]
pub struct StateTransition {
    /// Key in the settings `states` map.
    pub name: String,
    /// Label in every language.
    pub names: CircularSequence<StationTranslation>,
    /// Anchor of the train-state zone.
    pub xy: Point,
}

#[derive(Serialize, Deserialize)]
struct StateBody {
    translations: CircularSequence<StationTranslation>,
    #[serde(with = "point_repr")]
    xy: Point,
}

/// Train states in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainStates(pub Vec<StateTransition>);

impl TrainStates {
    /// States in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, StateTransition> {
        self.0.iter()
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no state is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// State at `index`.
    pub fn get(&self, index: usize) -> Option<&StateTransition> {
        self.0.get(index)
    }

    /// Index of the state called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|s| s.name == name)
    }
}

impl Serialize for TrainStates {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for s in &self.0 {
            let body = StateBody {
                translations: s.names.clone(),
                xy: s.xy,
            };
            map.serialize_entry(&s.name, &body)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TrainStates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct StatesVisitor;

        impl<'de> serde::de::Visitor<'de> for StatesVisitor {
            type Value = TrainStates;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of train state name to translations")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut out: Vec<StateTransition> = Vec::new();
                while let Some((name, body)) = map.next_entry::<String, StateBody>()? {
                    if out.iter().any(|s| s.name == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate train state '{name}'"
                        )));
                    }
                    out.push(StateTransition {
                        name,
                        names: body.translations,
                        xy: body.xy,
                    });
                }
                Ok(TrainStates(out))
            }
        }

        deserializer.deserialize_map(StatesVisitor)
    }
}

/// The destination shown in the terminus zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerminusTransition {
    /// Direction word and terminus name in every language.
    #[serde(rename = "translations")]
    pub names: CircularSequence<TerminusTranslation>,
    /// Anchor of the destination zone.
    #[serde(with = "point_repr")]
    pub xy: Point,
    /// Station code of the terminus, e.g. `"SS-01"`.
    pub terminus_number: String,
}

/// Station badge outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum IconShape {
    /// Round badge.
    Circle,
    /// Square badge.
    Square,
}

impl std::str::FromStr for IconShape {
    type Err = MetroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(Self::Circle),
            "square" => Ok(Self::Square),
            other => Err(MetroError::config(format!(
                "unknown icon_shape '{other}' (expected 'circle' or 'square')"
            ))),
        }
    }
}

impl TryFrom<String> for IconShape {
    type Error = MetroError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Line-wide constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Output frame rate.
    #[serde(default)]
    pub fps: Fps,
    /// Seconds per language transition.
    pub duration: f64,
    /// Seconds each freeze hold adds.
    pub freeze_duration: f64,
    /// Height of the top panel in pixels.
    pub sep_height: f64,
    /// Line color used for the bar and badge.
    pub line_color: Rgb,
    /// Darker line color for the lower bar band.
    pub line_color_dark: Rgb,
    /// Theme name, matched case-insensitively. Unknown names render without theme chrome.
    pub theme: String,
    /// Badge outline.
    pub icon_shape: IconShape,
    /// Badge side length or diameter in pixels.
    pub icon_size: f64,
    /// Badge center.
    #[serde(with = "point_repr")]
    pub icon_xy: Point,
    /// Font identifier for the badge text.
    pub icon_text_font: String,
    /// Line-code font size before the theme adjustment.
    pub icon_line_fontsize: f32,
    /// Station-number font size before the theme adjustment.
    pub icon_station_fontsize: f32,
    /// Show the direction phrase instead of the first station's name.
    #[serde(default)]
    pub show_direction: bool,
}

impl Constants {
    /// Canvas size.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

/// A complete line description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSettings {
    /// Line-wide constants.
    pub constants: Constants,
    /// Stations in travel order.
    pub stations: Vec<StationTransition>,
    /// Destination shown in the terminus zone.
    #[serde(rename = "terminal", alias = "terminus")]
    pub terminus: TerminusTransition,
    /// Train states cycled at every station.
    pub states: TrainStates,
    /// Font identifier to font file. Relative paths resolve against the settings file.
    #[serde(default)]
    pub fonts: BTreeMap<String, PathBuf>,
}

impl LineSettings {
    /// Parse settings from a JSON string.
    pub fn from_json_str(s: &str) -> MetroResult<Self> {
        serde_json::from_str(s).map_err(|e| MetroError::serde(format!("parse line settings: {e}")))
    }

    /// Parse settings from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MetroResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MetroError::serde(format!("parse line settings: {e}")))
    }

    /// Parse settings from a JSON file, resolving relative font paths against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> MetroResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).map_err(|e| {
            MetroError::config(format!("open line settings '{}': {e}", path.display()))
        })?;
        let mut settings = Self::from_reader(std::io::BufReader::new(f))?;
        if let Some(dir) = path.parent() {
            settings.resolve_font_paths(dir);
        }
        Ok(settings)
    }

    /// Make every relative font path absolute against `base`.
    pub fn resolve_font_paths(&mut self, base: &Path) {
        for p in self.fonts.values_mut() {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    /// Check every configuration rule the renderer depends on.
    pub fn validate(&self) -> MetroResult<()> {
        super::validate::validate_settings(self)
    }
}

/// Split a station code at its first hyphen: `"SS-09"` becomes `("SS", "09")`.
pub fn split_station_code(code: &str) -> MetroResult<(&str, &str)> {
    code.split_once('-').ok_or_else(|| {
        MetroError::config(format!(
            "station code '{code}' has no '-' between line code and number"
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/settings/model.rs"]
mod tests;
