use super::*;
use crate::encode::sink::InMemorySink;
use crate::test_support::{line, line_with_skips};

/// Records every plan and returns a 1x1 frame whose red channel counts calls.
#[derive(Default)]
struct CountingBackend {
    plans: Vec<FramePlan>,
}

impl RenderBackend for CountingBackend {
    fn render_plan(&mut self, plan: &FramePlan) -> MetroResult<FrameRGBA> {
        self.plans.push(plan.clone());
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![self.plans.len() as u8, 0, 0, 255],
            premultiplied: true,
        })
    }
}

fn small_line(count: usize) -> LineSettings {
    let mut l = line(count, "Metro");
    l.constants.width = 64;
    l.constants.height = 36;
    l
}

#[test]
fn render_line_pushes_every_frame_in_order() {
    let l = line(2, "Metro");
    let mut backend = CountingBackend::default();
    let mut sink = InMemorySink::new();
    let threading = RenderThreading {
        static_frame_elision: false,
        ..RenderThreading::default()
    };
    let stats = render_line(&l, &mut backend, &mut sink, &threading).unwrap();

    assert_eq!(stats.frames_total, 88);
    assert_eq!(stats.frames_rendered, 88);
    assert_eq!(stats.frames_elided, 0);
    assert_eq!(backend.plans.len(), 88);
    assert!(sink.is_finished());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (1920, 1080));
    assert!(
        sink.frames()
            .iter()
            .enumerate()
            .all(|(i, (idx, _))| idx.0 == i as u64)
    );
}

#[test]
fn elision_reuses_held_frames() {
    let l = line(2, "Metro");
    let mut backend = CountingBackend::default();
    let mut sink = InMemorySink::new();
    let stats = render_line(&l, &mut backend, &mut sink, &RenderThreading::default()).unwrap();

    assert_eq!(stats.frames_total, 88);
    assert!(stats.frames_elided > 0);
    assert_eq!(stats.frames_rendered + stats.frames_elided, 88);
    assert_eq!(backend.plans.len() as u64, stats.frames_rendered);
    assert_eq!(sink.frames().len(), 88);

    // The first second is a start hold: one render, reused.
    let first = &sink.frames()[0].1;
    assert!(sink.frames()[..10].iter().all(|(_, f)| f == first));
}

#[test]
fn parallel_matches_sequential() {
    let l = small_line(2);
    let settings = RenderSettings::default();

    let mut seq_sink = InMemorySink::new();
    let mut seq_backend = CpuBackend::new(settings.clone());
    let seq = render_line(
        &l,
        &mut seq_backend,
        &mut seq_sink,
        &RenderThreading::default(),
    )
    .unwrap();

    let mut par_sink = InMemorySink::new();
    let mut par_backend = CpuBackend::new(settings);
    let threading = RenderThreading {
        parallel: true,
        chunk_size: 16,
        threads: Some(2),
        static_frame_elision: true,
    };
    let par = render_line(&l, &mut par_backend, &mut par_sink, &threading).unwrap();

    assert_eq!(seq.frames_total, par.frames_total);
    assert_eq!(seq_sink.frames(), par_sink.frames());
}

#[test]
fn parallel_requires_worker_settings() {
    let l = line(2, "Metro");
    let threading = RenderThreading {
        parallel: true,
        ..RenderThreading::default()
    };
    let err = render_line(
        &l,
        &mut CountingBackend::default(),
        &mut InMemorySink::new(),
        &threading,
    )
    .unwrap_err();
    assert!(err.to_string().contains("worker settings"));
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(64), 64);
}

#[test]
fn render_frame_follows_the_timeline() {
    let l = line(2, "Metro");
    let tl = Timeline::build(&l).unwrap();
    let mut backend = CountingBackend::default();

    render_frame(&l, &tl, FrameIndex(0), &mut backend).unwrap();
    render_frame(&l, &tl, FrameIndex(87), &mut backend).unwrap();
    assert_eq!(backend.plans.len(), 2);
    assert!(render_frame(&l, &tl, FrameIndex(88), &mut backend).is_err());
}

#[test]
fn preview_rejects_skipped_station_and_clamps_time() {
    let l = line_with_skips(3, &[1], "Metro");
    let mut backend = CountingBackend::default();

    let skipped = PreviewSelector {
        station: 1,
        state: 0,
        pair: 0,
        t: 0.0,
    };
    assert!(
        render_preview(&l, skipped, &mut backend)
            .unwrap_err()
            .is_config()
    );

    let late = PreviewSelector {
        station: 2,
        state: 0,
        pair: 1,
        t: 99.0,
    };
    let end = PreviewSelector { t: 0.7, ..late };
    render_preview(&l, late, &mut backend).unwrap();
    render_preview(&l, end, &mut backend).unwrap();
    assert_eq!(backend.plans[0], backend.plans[1]);
}

#[test]
fn preview_rejects_out_of_range_selectors() {
    let l = line(2, "Metro");
    let mut backend = CountingBackend::default();
    for sel in [
        PreviewSelector {
            station: 5,
            state: 0,
            pair: 0,
            t: 0.0,
        },
        PreviewSelector {
            station: 0,
            state: 3,
            pair: 0,
            t: 0.0,
        },
        PreviewSelector {
            station: 0,
            state: 0,
            pair: 2,
            t: 0.0,
        },
        PreviewSelector {
            station: 0,
            state: 0,
            pair: 0,
            t: f64::NAN,
        },
    ] {
        assert!(render_preview(&l, sel, &mut backend).is_err(), "{sel:?}");
    }
    assert!(backend.plans.is_empty());
}

/// Fails on the `fail_at`-th plan.
struct FailingBackend {
    calls: usize,
    fail_at: usize,
}

impl RenderBackend for FailingBackend {
    fn render_plan(&mut self, _plan: &FramePlan) -> MetroResult<FrameRGBA> {
        self.calls += 1;
        if self.calls == self.fail_at {
            return Err(MetroError::render("rasterizer gave up"));
        }
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
            premultiplied: true,
        })
    }
}

#[derive(Default)]
struct LifecycleSink {
    begun: bool,
    pushed: u64,
    ended: bool,
    aborted: bool,
}

impl FrameSink for LifecycleSink {
    fn begin(&mut self, _cfg: SinkConfig) -> MetroResult<()> {
        self.begun = true;
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> MetroResult<()> {
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> MetroResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn backend_failure_aborts_the_sink_instead_of_ending_it() {
    let l = line(2, "Metro");
    let mut backend = FailingBackend {
        calls: 0,
        fail_at: 3,
    };
    let mut sink = LifecycleSink::default();
    let threading = RenderThreading {
        chunk_size: 1,
        static_frame_elision: false,
        ..RenderThreading::default()
    };
    let err = render_line(&l, &mut backend, &mut sink, &threading).unwrap_err();

    assert!(err.to_string().contains("rasterizer gave up"));
    assert!(sink.begun);
    assert_eq!(sink.pushed, 2);
    assert!(sink.aborted);
    assert!(!sink.ended);
}

#[test]
fn successful_render_never_aborts() {
    let l = line(2, "Metro");
    let mut backend = CountingBackend::default();
    let mut sink = LifecycleSink::default();
    render_line(&l, &mut backend, &mut sink, &RenderThreading::default()).unwrap();
    assert!(sink.ended);
    assert!(!sink.aborted);
}
