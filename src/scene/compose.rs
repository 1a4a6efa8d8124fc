use crate::foundation::error::{MetroError, MetroResult};
use crate::scene::icon::draw_station_icon;
use crate::scene::plan::FramePlan;
use crate::scene::progress::draw_line_info;
use crate::scene::text::{ZoneTransition, ZoneVariant, draw_zone};
use crate::settings::model::{
    Constants, StateTransition, StationTransition, StationTranslation, TerminusTransition,
    TerminusTranslation,
};
use crate::theme::table;

/// `(old, new)` variants of the three text zones for one clip.
#[derive(Clone, Copy, Debug)]
pub struct ZonePairs<'a> {
    /// Station-name zone.
    pub station: (&'a StationTranslation, &'a StationTranslation),
    /// Train-state zone.
    pub state: (&'a StationTranslation, &'a StationTranslation),
    /// Destination zone.
    pub terminus: (&'a TerminusTranslation, &'a TerminusTranslation),
}

impl<'a> ZonePairs<'a> {
    /// The `pair`-th ordered pair of every zone.
    pub fn nth(
        station: &'a StationTransition,
        state: &'a StateTransition,
        terminus: &'a TerminusTransition,
        pair: usize,
    ) -> MetroResult<Self> {
        let missing = || {
            MetroError::config(format!(
                "language pair {pair} is out of range for station '{}' / state '{}'",
                station.station_number, state.name
            ))
        };
        Ok(Self {
            station: station.names.pair(pair).ok_or_else(missing)?,
            state: state.names.pair(pair).ok_or_else(missing)?,
            terminus: terminus.names.pair(pair).ok_or_else(missing)?,
        })
    }
}

/// Build the complete frame at clip-local time `t`.
///
/// On the first station with `show_direction` set, the station zone shows the terminus name and
/// the terminus zone shows the direction phrase at each language's own anchor; the badge then
/// shows the terminus code.
pub fn compose_frame(
    t: f64,
    c: &Constants,
    station_index: usize,
    stations: &[StationTransition],
    state: &StateTransition,
    terminus: &TerminusTransition,
    pairs: &ZonePairs<'_>,
) -> MetroResult<FramePlan> {
    let station = stations.get(station_index).ok_or_else(|| {
        MetroError::config(format!(
            "station index {station_index} out of range for {} stations",
            stations.len()
        ))
    })?;
    let theme = table::resolve(&c.theme);
    let color = (theme.text_color)(c);
    let direction = station_index == 0 && c.show_direction;

    let mut plan = FramePlan::new(c.canvas());
    (theme.chrome)(&mut plan, c);

    let (old, new) = pairs.station;
    let (old_term, new_term) = pairs.terminus;
    let station_zone = if direction {
        ZoneTransition {
            old: ZoneVariant::terminus_name(old, old_term, station.xy),
            new: ZoneVariant::terminus_name(new, new_term, station.xy),
        }
    } else {
        ZoneTransition {
            old: ZoneVariant::station(old, station.xy),
            new: ZoneVariant::station(new, station.xy),
        }
    };
    draw_zone(&mut plan, t, c.duration, color, &station_zone);

    let (old_state, new_state) = pairs.state;
    let state_zone = ZoneTransition {
        old: ZoneVariant::station(old_state, state.xy),
        new: ZoneVariant::station(new_state, state.xy),
    };
    draw_zone(&mut plan, t, c.duration, color, &state_zone);

    let terminus_zone = if direction {
        ZoneTransition {
            old: ZoneVariant::direction_combined(old_term),
            new: ZoneVariant::direction_combined(new_term),
        }
    } else {
        ZoneTransition {
            old: ZoneVariant::direction(old_term, terminus.xy),
            new: ZoneVariant::direction(new_term, terminus.xy),
        }
    };
    draw_zone(&mut plan, t, c.duration, color, &terminus_zone);

    draw_line_info(&mut plan, c, theme, stations, station_index);

    let code = if direction {
        &terminus.terminus_number
    } else {
        &station.station_number
    };
    draw_station_icon(&mut plan, c, theme, code)?;

    Ok(plan)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/compose.rs"]
mod tests;
