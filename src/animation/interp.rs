//! Time curves for the show/hide text animation.
//!
//! Every curve is a function of `(t, duration)` in seconds. The public curves wrap a linear base
//! ramp with a threshold so text never collapses to a zero-height flash at the ends of a
//! transition: the rising ("show") family holds a small constant up to the pivot, the falling
//! ("hide") family holds it from `duration - pivot` on.
//!
//! Times outside `[0, duration]` are not validated here.

use crate::foundation::math::lerp_exact;

/// Offset from the start (show) or end (hide) of a transition where the threshold holds.
pub const PIVOT_SECS: f64 = 0.1;

/// Value held inside the threshold region.
pub const PIVOT_VALUE: f64 = 0.01;

/// A curve of `(t, duration)`.
pub type Curve = fn(f64, f64) -> f64;

/// Wrap an increasing curve `f` so that:
/// - `g(t, d) = value` for `t <= pivot`
/// - `g` is linear from `(pivot, value)` to `(d, f(d, d))`
/// - `g(d, d) == f(d, d)` exactly
pub fn threshold_rising<F>(pivot: f64, value: f64, f: F) -> impl Fn(f64, f64) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    move |t, d| {
        if t <= pivot {
            return value;
        }
        let s = (t - pivot) / (d - pivot);
        lerp_exact(value, f(d, d), s)
    }
}

/// Wrap a decreasing curve `f` so that:
/// - `g(t, d) = value` for `t >= d - pivot`
/// - `g` is linear from `(0, f(0, d))` to `(d - pivot, value)`
/// - `g(0, d) == f(0, d)` exactly
pub fn threshold_falling<F>(pivot: f64, value: f64, f: F) -> impl Fn(f64, f64) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    move |t, d| {
        let end = d - pivot;
        if t >= end {
            return value;
        }
        let s = t / end;
        lerp_exact(f(0.0, d), value, s)
    }
}

/// Base vertical scale while showing: `0 -> 1`.
pub fn linear_show_scale(t: f64, duration: f64) -> f64 {
    t / duration
}

/// Base vertical scale while hiding: `1 -> 0`.
pub fn linear_hide_scale(t: f64, duration: f64) -> f64 {
    1.0 - t / duration
}

/// Base alpha while showing: `0 -> 2 * duration`. The surface saturates at opaque.
pub fn linear_show_alpha(t: f64, _duration: f64) -> f64 {
    2.0 * t
}

/// Base alpha while hiding: `2 * duration -> 0`.
pub fn linear_hide_alpha(t: f64, duration: f64) -> f64 {
    -2.0 * t + 2.0 * duration
}

/// Vertical scale of the incoming text.
pub fn show_scale(t: f64, duration: f64) -> f64 {
    threshold_rising(PIVOT_SECS, PIVOT_VALUE, linear_show_scale)(t, duration)
}

/// Vertical scale of the outgoing text.
pub fn hide_scale(t: f64, duration: f64) -> f64 {
    threshold_falling(PIVOT_SECS, PIVOT_VALUE, linear_hide_scale)(t, duration)
}

/// Opacity of the incoming text. Values above 1 draw fully opaque.
pub fn show_alpha(t: f64, duration: f64) -> f64 {
    threshold_rising(PIVOT_SECS, PIVOT_VALUE, linear_show_alpha)(t, duration)
}

/// Opacity of the outgoing text.
pub fn hide_alpha(t: f64, duration: f64) -> f64 {
    threshold_falling(PIVOT_SECS, PIVOT_VALUE, linear_hide_alpha)(t, duration)
}

/// Which half of a zone transition a text pass draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextPass {
    /// The incoming variant.
    Show,
    /// The outgoing variant.
    Hide,
}

impl TextPass {
    /// [`show_scale`] or [`hide_scale`].
    pub fn scale_curve(self) -> Curve {
        match self {
            Self::Show => show_scale,
            Self::Hide => hide_scale,
        }
    }

    /// [`show_alpha`] or [`hide_alpha`].
    pub fn alpha_curve(self) -> Curve {
        match self {
            Self::Show => show_alpha,
            Self::Hide => hide_alpha,
        }
    }

    /// Time at which this pass draws nothing: the start for `Show`, the end for `Hide`.
    pub fn skip_at(self, duration: f64) -> f64 {
        match self {
            Self::Show => 0.0,
            Self::Hide => duration,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interp.rs"]
mod tests;
