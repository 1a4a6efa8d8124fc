//! metroani renders animated passenger-information displays for train cars.
//!
//! A line is described by [`LineSettings`]: canvas constants, the ordered stations, the
//! terminus and the train states. Every station name, state label and direction phrase is a
//! ring of per-language variants that cross-fade into each other. The engine lays these
//! transitions out on a [`Timeline`] and renders each output frame independently:
//!
//! - Load and validate a [`LineSettings`]
//! - Build the [`Timeline`], or go straight to [`render_line`] with a [`FrameSink`]
//! - Render single moments with [`render_preview`] for inspection
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod encode;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod sequence;
pub(crate) mod settings;
pub(crate) mod theme;
pub(crate) mod timeline;

#[cfg(test)]
#[path = "../tests/unit/support/fixtures.rs"]
pub(crate) mod test_support;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgb, Vec2,
};
pub use crate::foundation::error::{MetroError, MetroResult};

pub use crate::animation::interp::{
    Curve, PIVOT_SECS, PIVOT_VALUE, TextPass, hide_alpha, hide_scale, linear_hide_alpha,
    linear_hide_scale, linear_show_alpha, linear_show_scale, show_alpha, show_scale,
    threshold_falling, threshold_rising,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::fonts::{FontBook, FontFace};
pub use crate::render::pipeline::{
    PreviewSelector, RenderStats, RenderThreading, frame_plan, render_frame, render_line,
    render_preview,
};
pub use crate::scene::compose::{ZonePairs, compose_frame};
pub use crate::scene::plan::{DrawOp, FRAME_BACKGROUND, FramePlan, Paint, Stroke, TextOp};
pub use crate::scene::progress::{
    BarGeometry, BarWindow, MAX_VISIBLE_STATIONS, previous_stop_distance, select_window,
};
pub use crate::sequence::circular::{CircularSequence, OrderedPairs};
pub use crate::settings::model::{
    Constants, IconShape, LineSettings, LineTranslation, StateTransition, StationTransition,
    StationTranslation, TerminusTransition, TerminusTranslation, TrainStates,
    split_station_code,
};
pub use crate::theme::table::{Theme, ThemeSpec};
pub use crate::timeline::assemble::{
    Clip, ClipCue, ClipHold, FrameCue, Segment, Timeline, combine_language_transitions,
    combine_train_states,
};
