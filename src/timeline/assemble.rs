//! Timeline assembly.
//!
//! A clip is one language transition of one train state at one station. Clips are laid out in
//! station order, then state order, then language-pair order, each padded with freeze holds. The
//! resulting timeline maps every output frame to the clip it belongs to and the clip-local time to
//! draw, so frames can be produced independently of each other.

use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{MetroError, MetroResult};
use crate::settings::model::LineSettings;

/// Identifies one clip: station, train state and language pair, all 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipCue {
    /// Station index.
    pub station: usize,
    /// Train-state index.
    pub state: usize,
    /// Language pair index.
    pub pair: usize,
}

/// Freeze holds around a clip's animated part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipHold {
    /// Freeze on the first frame.
    pub start: bool,
    /// Freeze on the last frame.
    pub end: bool,
}

impl ClipHold {
    /// Every clip holds its last frame; even-indexed pairs also hold their first frame.
    pub fn for_pair(pair: usize) -> Self {
        Self {
            start: pair % 2 == 0,
            end: true,
        }
    }

    fn count(self) -> u32 {
        u32::from(self.start) + u32::from(self.end)
    }
}

/// A clip and its freeze holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clip {
    /// Which clip.
    pub cue: ClipCue,
    /// Freeze holds.
    pub hold: ClipHold,
}

impl Clip {
    /// Held length in seconds.
    pub fn duration_secs(&self, duration: f64, freeze: f64) -> f64 {
        duration + freeze * f64::from(self.hold.count())
    }

    /// Map seconds since the clip started to animation time in `[0, duration]`.
    pub fn local_time(&self, secs: f64, duration: f64, freeze: f64) -> f64 {
        let mut s = secs.max(0.0);
        if self.hold.start {
            if s < freeze {
                return 0.0;
            }
            s -= freeze;
        }
        s.min(duration)
    }
}

/// Clips for one station and train state; empty for skipped stations.
pub fn combine_language_transitions(
    settings: &LineSettings,
    station: usize,
    state: usize,
) -> Vec<Clip> {
    let Some(st) = settings.stations.get(station) else {
        return Vec::new();
    };
    if st.skip {
        return Vec::new();
    }
    (0..st.names.ordered_pairs().len())
        .map(|pair| Clip {
            cue: ClipCue {
                station,
                state,
                pair,
            },
            hold: ClipHold::for_pair(pair),
        })
        .collect()
}

/// Clips for every train state at one station, in state order.
pub fn combine_train_states(settings: &LineSettings, station: usize) -> Vec<Clip> {
    (0..settings.states.len())
        .flat_map(|state| combine_language_transitions(settings, station, state))
        .collect()
}

/// A clip placed on the output timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// The placed clip.
    pub clip: Clip,
    /// Start time on the output timeline.
    pub start_secs: f64,
    /// Output frames covered by this segment.
    pub frames: FrameRange,
}

/// What to draw for one output frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCue {
    /// Clip being drawn.
    pub cue: ClipCue,
    /// Clip-local animation time in `[0, duration]`.
    pub t: f64,
}

impl FrameCue {
    /// Frames with equal keys produce identical pixels.
    pub fn key(&self) -> (ClipCue, u64) {
        (self.cue, self.t.to_bits())
    }
}

/// The whole line as a gapless sequence of held clips.
#[derive(Clone, Debug)]
pub struct Timeline {
    fps: Fps,
    duration: f64,
    freeze: f64,
    total_secs: f64,
    segments: Vec<Segment>,
}

impl Timeline {
    /// Validate `settings` and lay out every clip.
    #[tracing::instrument(skip(settings), fields(stations = settings.stations.len()))]
    pub fn build(settings: &LineSettings) -> MetroResult<Self> {
        settings.validate()?;
        let c = &settings.constants;
        let fps = c.fps;

        let mut segments = Vec::new();
        let mut cursor = 0.0_f64;
        for station in 0..settings.stations.len() {
            let clips = combine_train_states(settings, station);
            if clips.is_empty() {
                tracing::debug!(station, "station is skipped; no clips");
                continue;
            }
            for clip in clips {
                let start_secs = cursor;
                cursor += clip.duration_secs(c.duration, c.freeze_duration);
                let frames = FrameRange::new(
                    FrameIndex(fps.secs_to_frames_round(start_secs)),
                    FrameIndex(fps.secs_to_frames_round(cursor)),
                )?;
                segments.push(Segment {
                    clip,
                    start_secs,
                    frames,
                });
            }
            tracing::debug!(station, end_secs = cursor, "station laid out");
        }

        if segments.is_empty() {
            return Err(MetroError::config(
                "every station is skipped; the timeline is empty",
            ));
        }

        Ok(Self {
            fps,
            duration: c.duration,
            freeze: c.freeze_duration,
            total_secs: cursor,
            segments,
        })
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Clips in playback order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.total_secs
    }

    /// Total length in frames.
    pub fn frame_count(&self) -> u64 {
        self.fps.secs_to_frames_round(self.total_secs)
    }

    /// The clip and clip-local time for output frame `frame`.
    pub fn cue_at(&self, frame: FrameIndex) -> Option<FrameCue> {
        let i = self.segments.partition_point(|s| s.frames.end.0 <= frame.0);
        let seg = self.segments.get(i)?;
        if !seg.frames.contains(frame) {
            return None;
        }
        let secs = self.fps.frames_to_secs(frame.0) - seg.start_secs;
        Some(FrameCue {
            cue: seg.clip.cue,
            t: seg.clip.local_time(secs, self.duration, self.freeze),
        })
    }

    /// Every output frame in order.
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, FrameCue)> + '_ {
        self.segments.iter().flat_map(move |seg| {
            (seg.frames.start.0..seg.frames.end.0).map(move |f| {
                let secs = self.fps.frames_to_secs(f) - seg.start_secs;
                (
                    FrameIndex(f),
                    FrameCue {
                        cue: seg.clip.cue,
                        t: seg.clip.local_time(secs, self.duration, self.freeze),
                    },
                )
            })
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/assemble.rs"]
mod tests;
