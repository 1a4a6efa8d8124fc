use std::collections::HashMap;

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MetroError, MetroResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::render::cpu::CpuBackend;
use crate::scene::compose::{ZonePairs, compose_frame};
use crate::scene::plan::FramePlan;
use crate::settings::model::LineSettings;
use crate::timeline::assemble::{ClipCue, FrameCue, Timeline};

/// Compose the draw plan for one cue.
pub fn frame_plan(settings: &LineSettings, cue: &FrameCue) -> MetroResult<FramePlan> {
    let ClipCue {
        station,
        state,
        pair,
    } = cue.cue;
    let st = settings.stations.get(station).ok_or_else(|| {
        MetroError::config(format!(
            "station {station} out of range for {} stations",
            settings.stations.len()
        ))
    })?;
    let state_t = settings.states.get(state).ok_or_else(|| {
        MetroError::config(format!(
            "train state {state} out of range for {} states",
            settings.states.len()
        ))
    })?;
    let pairs = ZonePairs::nth(st, state_t, &settings.terminus, pair)?;
    compose_frame(
        cue.t,
        &settings.constants,
        station,
        &settings.stations,
        state_t,
        &settings.terminus,
        &pairs,
    )
}

/// Compose + render one output frame of `timeline`.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
pub fn render_frame(
    settings: &LineSettings,
    timeline: &Timeline,
    frame: FrameIndex,
    backend: &mut dyn RenderBackend,
) -> MetroResult<FrameRGBA> {
    let cue = timeline.cue_at(frame).ok_or_else(|| {
        MetroError::render(format!(
            "frame {} is past the end of the timeline ({} frames)",
            frame.0,
            timeline.frame_count()
        ))
    })?;
    let plan = frame_plan(settings, &cue)?;
    backend.render_plan(&plan)
}

/// Selects a single moment for [`render_preview`], independent of any timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewSelector {
    /// 0-based station index; must not be a skipped station.
    pub station: usize,
    /// 0-based train state index.
    pub state: usize,
    /// 0-based language pair index.
    pub pair: usize,
    /// Clip-local time in seconds, clamped into `[0, duration]`.
    pub t: f64,
}

/// Single-frame entry point for previews and debugging.
pub fn render_preview(
    settings: &LineSettings,
    selector: PreviewSelector,
    backend: &mut dyn RenderBackend,
) -> MetroResult<FrameRGBA> {
    settings.validate()?;
    if !selector.t.is_finite() {
        return Err(MetroError::config(format!(
            "preview time must be finite, got {}",
            selector.t
        )));
    }
    if settings
        .stations
        .get(selector.station)
        .is_some_and(|s| s.skip)
    {
        return Err(MetroError::config(format!(
            "station {} is skipped and has no frames",
            selector.station
        )));
    }

    let cue = FrameCue {
        cue: ClipCue {
            station: selector.station,
            state: selector.state,
            pair: selector.pair,
        },
        t: selector.t.clamp(0.0, settings.constants.duration),
    };
    let plan = frame_plan(settings, &cue)?;
    backend.render_plan(&plan)
}

/// How [`render_line`] spreads rasterization across threads.
#[derive(Clone, Debug)]
pub struct RenderThreading {
    /// Rasterize each chunk on a rayon pool with one [`CpuBackend`] per worker.
    pub parallel: bool,
    /// Frames rasterized before they are handed to the sink. Zero is treated as one.
    pub chunk_size: usize,
    /// Worker count for the pool; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Rasterize repeated cues (freeze holds) once and reuse the pixels.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: true,
        }
    }
}

/// Frame counts reported by [`render_line`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames that went through the backend.
    pub frames_rendered: u64,
    /// Frames copied from an identical earlier cue.
    pub frames_elided: u64,
}

impl RenderStats {
    fn add(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

/// Render the whole line into `sink`, in timeline order.
#[tracing::instrument(skip_all, fields(parallel = threading.parallel))]
pub fn render_line(
    settings: &LineSettings,
    backend: &mut dyn RenderBackend,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
) -> MetroResult<RenderStats> {
    let timeline = Timeline::build(settings)?;
    let cues: Vec<(FrameIndex, FrameCue)> = timeline.frames().collect();
    let canvas = settings.constants.canvas();

    let mut maybe_pool = None;
    let mut maybe_worker_settings = None;
    if threading.parallel {
        maybe_pool = Some(build_thread_pool(threading.threads)?);
        maybe_worker_settings = Some(backend.worker_render_settings().ok_or_else(|| {
            MetroError::render("parallel render requires backend worker settings support (CpuBackend)")
        })?);
    }

    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: timeline.fps(),
    })?;

    let streamed = stream_frames(
        settings,
        &cues,
        backend,
        sink,
        threading,
        maybe_pool.as_ref().zip(maybe_worker_settings.as_ref()),
    );
    let stats = match streamed.and_then(|stats| sink.end().map(|()| stats)) {
        Ok(stats) => stats,
        Err(err) => {
            tracing::warn!(error = %err, "render failed, aborting sink");
            sink.abort();
            return Err(err);
        }
    };

    tracing::debug!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "line rendered"
    );
    Ok(stats)
}

fn stream_frames(
    settings: &LineSettings,
    cues: &[(FrameIndex, FrameCue)],
    backend: &mut dyn RenderBackend,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
    parallel: Option<(&rayon::ThreadPool, &RenderSettings)>,
) -> MetroResult<RenderStats> {
    let mut stats = RenderStats::default();
    for chunk in cues.chunks(normalized_chunk_size(threading.chunk_size)) {
        let (frames, chunk_stats) = match parallel {
            Some((pool, worker_settings)) => render_chunk_parallel_cpu(
                settings,
                chunk,
                worker_settings,
                threading.static_frame_elision,
                pool,
            )?,
            None => render_chunk_sequential(settings, chunk, backend, threading.static_frame_elision)?,
        };
        for ((idx, _), frame) in chunk.iter().zip(&frames) {
            sink.push_frame(*idx, frame)?;
        }
        stats.add(chunk_stats);
    }
    Ok(stats)
}

fn render_chunk_sequential(
    settings: &LineSettings,
    cues: &[(FrameIndex, FrameCue)],
    backend: &mut dyn RenderBackend,
    elide: bool,
) -> MetroResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut out: Vec<FrameRGBA> = Vec::with_capacity(cues.len());
    let mut stats = RenderStats::default();
    let mut last_key = None;
    for (_, cue) in cues {
        stats.frames_total += 1;
        let key = cue.key();
        if elide
            && last_key == Some(key)
            && let Some(prev) = out.last()
        {
            let prev = prev.clone();
            out.push(prev);
            stats.frames_elided += 1;
            continue;
        }
        let plan = frame_plan(settings, cue)?;
        out.push(backend.render_plan(&plan)?);
        stats.frames_rendered += 1;
        last_key = Some(key);
    }
    Ok((out, stats))
}

fn render_chunk_parallel_cpu(
    settings: &LineSettings,
    cues: &[(FrameIndex, FrameCue)],
    render_settings: &RenderSettings,
    elide: bool,
    pool: &rayon::ThreadPool,
) -> MetroResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut unique_indices = Vec::<usize>::with_capacity(cues.len());
    let mut frame_to_unique = Vec::<usize>::with_capacity(cues.len());
    if elide {
        let mut first = HashMap::<(ClipCue, u64), usize>::new();
        for (idx, (_, cue)) in cues.iter().enumerate() {
            let slot = *first.entry(cue.key()).or_insert_with(|| {
                unique_indices.push(idx);
                unique_indices.len() - 1
            });
            frame_to_unique.push(slot);
        }
    } else {
        for idx in 0..cues.len() {
            frame_to_unique.push(idx);
            unique_indices.push(idx);
        }
    }

    let rendered = pool.install(|| {
        unique_indices
            .par_iter()
            .map_init(
                || CpuBackend::new(render_settings.clone()),
                |worker_backend, cue_idx| -> MetroResult<FrameRGBA> {
                    let plan = frame_plan(settings, &cues[*cue_idx].1)?;
                    worker_backend.render_plan(&plan)
                },
            )
            .collect::<Vec<_>>()
    });

    let mut unique_frames = Vec::<Option<FrameRGBA>>::with_capacity(rendered.len());
    for item in rendered {
        unique_frames.push(Some(item?));
    }

    let mut remaining = vec![0usize; unique_frames.len()];
    for &u in &frame_to_unique {
        remaining[u] += 1;
    }

    let mut out = Vec::<FrameRGBA>::with_capacity(frame_to_unique.len());
    for u in frame_to_unique {
        let frame = if remaining[u] == 1 {
            unique_frames[u].take()
        } else {
            unique_frames[u].clone()
        };
        out.push(frame.ok_or_else(|| {
            MetroError::render("internal error: unique frame missing during chunk assembly")
        })?);
        remaining[u] -= 1;
    }

    let total = cues.len() as u64;
    let rendered_count = unique_indices.len() as u64;
    Ok((
        out,
        RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total.saturating_sub(rendered_count),
        },
    ))
}

fn build_thread_pool(threads: Option<usize>) -> MetroResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MetroError::config(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MetroError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
