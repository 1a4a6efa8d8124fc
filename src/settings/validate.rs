//! Line settings validation.
//!
//! Everything here runs before the first frame is rendered, so a bad settings file fails with one
//! configuration error instead of a half-written video.

use crate::animation::interp::PIVOT_SECS;
use crate::foundation::error::{MetroError, MetroResult};
use crate::settings::model::{LineSettings, split_station_code};
use crate::theme::table;

fn check_font_size(what: impl FnOnce() -> String, size: f32) -> MetroResult<()> {
    if size.is_finite() && size > 0.0 {
        return Ok(());
    }
    Err(MetroError::config(format!(
        "{} font size must be finite and > 0, got {size}",
        what()
    )))
}

pub(crate) fn validate_settings(settings: &LineSettings) -> MetroResult<()> {
    let c = &settings.constants;

    if c.width == 0 || c.height == 0 {
        return Err(MetroError::config(format!(
            "canvas must be non-empty, got {}x{}",
            c.width, c.height
        )));
    }
    if c.width > u32::from(u16::MAX) || c.height > u32::from(u16::MAX) {
        return Err(MetroError::config(format!(
            "canvas {}x{} exceeds {} pixels per side",
            c.width,
            c.height,
            u16::MAX
        )));
    }
    if !c.duration.is_finite() || c.duration <= PIVOT_SECS {
        return Err(MetroError::config(format!(
            "duration must be a finite number of seconds greater than {PIVOT_SECS}, got {}",
            c.duration
        )));
    }
    if !c.freeze_duration.is_finite() || c.freeze_duration < 0.0 {
        return Err(MetroError::config(format!(
            "freeze_duration must be finite and >= 0, got {}",
            c.freeze_duration
        )));
    }

    if settings.stations.is_empty() {
        return Err(MetroError::config("station list is empty"));
    }
    if settings.states.is_empty() {
        return Err(MetroError::config("no train states configured"));
    }

    // Badge text sizes are shifted by the theme before they reach the rasterizer.
    let letter_mod = table::resolve(&c.theme).icon.letter_mod;
    check_font_size(
        || format!("icon line (theme '{}')", c.theme),
        c.icon_line_fontsize + letter_mod,
    )?;
    check_font_size(
        || format!("icon station number (theme '{}')", c.theme),
        c.icon_station_fontsize - letter_mod,
    )?;

    split_station_code(&settings.terminus.terminus_number)?;
    for t in settings.terminus.names.as_slice() {
        check_font_size(|| format!("terminus '{}'", t.terminus), t.fontsize)?;
    }
    for state in settings.states.iter() {
        for t in state.names.as_slice() {
            check_font_size(|| format!("train state '{}'", state.name), t.fontsize)?;
        }
    }

    let terminus_pairs = settings.terminus.names.len();
    for (idx, station) in settings.stations.iter().enumerate() {
        split_station_code(&station.station_number)?;
        for t in station.names.as_slice() {
            check_font_size(
                || format!("station '{}' name '{}'", station.station_number, t.name),
                t.fontsize,
            )?;
        }
        for line in station.transfers.iter().flat_map(|seq| seq.as_slice()) {
            check_font_size(
                || format!("station '{}' transfer '{}'", station.station_number, line.name),
                line.fontsize,
            )?;
        }

        if station.skip {
            continue;
        }
        let station_pairs = station.names.len();
        if station_pairs != terminus_pairs {
            return Err(MetroError::config(format!(
                "station {idx} ('{}') has {station_pairs} translations but the terminus has {terminus_pairs}",
                station.station_number
            )));
        }
        for state in settings.states.iter() {
            if state.names.len() != station_pairs {
                return Err(MetroError::config(format!(
                    "train state '{}' has {} translations but station {idx} ('{}') has {station_pairs}",
                    state.name,
                    state.names.len(),
                    station.station_number
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/settings/validate.rs"]
mod tests;
