use super::*;
use crate::animation::interp::PIVOT_VALUE;
use crate::foundation::core::Canvas;
use crate::test_support::{terminus, translation, LANGS};

fn blank() -> FramePlan {
    FramePlan::new(Canvas {
        width: 1920,
        height: 1080,
    })
}

fn texts(plan: &FramePlan) -> Vec<&TextOp> {
    plan.texts().collect()
}

#[test]
fn identical_text_draws_settled_hide_only() {
    let a = translation("Shibuya");
    let b = translation("Shibuya");
    let xy = Point::new(960.0, 220.0);
    let zone = ZoneTransition {
        old: ZoneVariant::station(&a, xy),
        new: ZoneVariant::station(&b, xy),
    };
    let mut plan = blank();
    draw_zone(&mut plan, 0.35, 0.7, Rgb::BLACK, &zone);
    let ts = texts(&plan);
    assert_eq!(ts.len(), 1);
    assert_eq!(ts[0].scale.y, 1.0);
    assert!((ts[0].paint.alpha - 1.4).abs() < 1e-6);
    assert_eq!(ts[0].scale_origin, a.exit_xy);
}

#[test]
fn first_frame_draws_only_the_outgoing_text() {
    let a = translation("渋谷");
    let b = translation("Shibuya");
    let xy = Point::new(960.0, 220.0);
    let zone = ZoneTransition {
        old: ZoneVariant::station(&a, xy),
        new: ZoneVariant::station(&b, xy),
    };
    let mut plan = blank();
    draw_zone(&mut plan, 0.0, 0.7, Rgb::BLACK, &zone);
    let ts = texts(&plan);
    assert_eq!(ts.len(), 1);
    assert_eq!(ts[0].text, "渋谷");
}

#[test]
fn last_frame_draws_only_the_incoming_text() {
    let a = translation("渋谷");
    let b = translation("Shibuya");
    let xy = Point::new(960.0, 220.0);
    let zone = ZoneTransition {
        old: ZoneVariant::station(&a, xy),
        new: ZoneVariant::station(&b, xy),
    };
    let mut plan = blank();
    draw_zone(&mut plan, 0.7, 0.7, Rgb::WHITE, &zone);
    let ts = texts(&plan);
    assert_eq!(ts.len(), 1);
    assert_eq!(ts[0].text, "Shibuya");
    assert_eq!(ts[0].scale.y, 1.0);
    assert_eq!(ts[0].scale_origin, b.enter_xy);
    assert_eq!(ts[0].paint.color, Rgb::WHITE);
}

#[test]
fn mid_transition_draws_show_then_hide() {
    let a = translation("渋谷");
    let mut b = translation("Shibuya");
    b.scale_x = 0.8;
    let xy = Point::new(960.0, 220.0);
    let zone = ZoneTransition {
        old: ZoneVariant::station(&a, xy),
        new: ZoneVariant::station(&b, xy),
    };
    let mut plan = blank();
    draw_zone(&mut plan, 0.05, 0.7, Rgb::BLACK, &zone);
    let ts = texts(&plan);
    assert_eq!(ts.len(), 2);
    assert_eq!(ts[0].text, "Shibuya");
    assert_eq!(ts[0].scale, Vec2::new(0.8, PIVOT_VALUE));
    assert_eq!(ts[1].text, "渋谷");
    assert!(ts[1].scale.y > 0.9);
    assert!(ts.iter().all(|t| t.center == xy));
}

#[test]
fn direction_variants_use_combined_phrase() {
    let term = terminus(&LANGS);
    let ja = &term.names.as_slice()[0];
    let en = &term.names.as_slice()[1];

    let v = ZoneVariant::direction(en, term.xy);
    assert_eq!(v.text, "for-en End-en");
    assert_eq!(v.center, term.xy);
    assert_eq!(v.enter, en.enter_xy);

    let v = ZoneVariant::direction_combined(ja);
    assert_eq!(v.text, "End-ja for-ja");
    assert_eq!(v.center, ja.xy);
    assert_eq!(v.exit, ja.combined_exit_xy);

    let styling = translation("S0");
    let v = ZoneVariant::terminus_name(&styling, en, Point::new(1.0, 2.0));
    assert_eq!(v.text, "End-en");
    assert_eq!(v.font, styling.font);
    assert_eq!(v.enter, styling.enter_xy);
}

mod raster {
    use std::ops::Range;
    use std::sync::Arc;

    use super::*;
    use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
    use crate::render::cpu::CpuBackend;
    use crate::render::fonts::FontBook;

    const DURATION: f64 = 0.7;
    const FONT: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSansMono.ttf"
    );

    fn backend() -> CpuBackend {
        let mut fonts = FontBook::new();
        fonts.insert("Sans", std::fs::read(FONT).unwrap());
        CpuBackend::new(RenderSettings {
            fonts: Arc::new(fonts),
        })
    }

    /// Bounding box `(x0, y0, x1, y1)` of dark pixels within `cols`, inclusive.
    fn ink(frame: &FrameRGBA, cols: Range<u32>) -> Option<(u32, u32, u32, u32)> {
        let mut bbox: Option<(u32, u32, u32, u32)> = None;
        for y in 0..frame.height {
            for x in cols.clone() {
                let [r, ..] = frame.pixel(x, y).unwrap();
                if r >= 200 {
                    continue;
                }
                bbox = Some(match bbox {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bbox
    }

    fn height(bbox: (u32, u32, u32, u32)) -> u32 {
        bbox.3 - bbox.1 + 1
    }

    /// Old text anchored in the left half of the canvas, new text in the right half.
    fn render_split(old: &str, new: &str, t: f64) -> FrameRGBA {
        let a = translation(old);
        let b = translation(new);
        let zone = ZoneTransition {
            old: ZoneVariant::station(&a, Point::new(480.0, 220.0)),
            new: ZoneVariant::station(&b, Point::new(1440.0, 220.0)),
        };
        let mut plan = blank();
        draw_zone(&mut plan, t, DURATION, Rgb::BLACK, &zone);
        backend().render_plan(&plan).unwrap()
    }

    #[test]
    fn settled_text_inks_its_anchor_box() {
        let a = translation("Shibuya");
        let xy = Point::new(960.0, 220.0);
        let zone = ZoneTransition {
            old: ZoneVariant::station(&a, xy),
            new: ZoneVariant::station(&a, xy),
        };
        let mut plan = blank();
        draw_zone(&mut plan, 0.35, DURATION, Rgb::BLACK, &zone);
        let frame = backend().render_plan(&plan).unwrap();

        let (x0, y0, x1, y1) = ink(&frame, 0..frame.width).expect("no ink drawn");
        let cx = f64::from(x0 + x1) / 2.0;
        assert!((cx - 960.0).abs() < 12.0, "ink centered at x={cx}");
        assert!(y0 > 140 && y1 < 300, "ink rows {y0}..{y1}");
        assert!(x1 - x0 > 200, "ink only {} px wide", x1 - x0);
        assert!(y1 - y0 > 50, "ink only {} px tall", y1 - y0);
    }

    #[test]
    fn ends_of_a_transition_draw_one_side_only() {
        let start = render_split("Shibuya", "Ebisu", 0.0);
        assert!(ink(&start, 0..960).is_some());
        assert_eq!(ink(&start, 960..1920), None);

        let end = render_split("Shibuya", "Ebisu", DURATION);
        assert_eq!(ink(&end, 0..960), None);
        assert!(ink(&end, 960..1920).is_some());
    }

    #[test]
    fn mid_transition_squashes_both_sides() {
        let settled_old = ink(&render_split("Shibuya", "Ebisu", 0.0), 0..960).unwrap();
        let settled_new = ink(&render_split("Shibuya", "Ebisu", DURATION), 960..1920).unwrap();

        let mid = render_split("Shibuya", "Ebisu", DURATION / 2.0);
        let old = ink(&mid, 0..960).expect("outgoing text missing mid-transition");
        let new = ink(&mid, 960..1920).expect("incoming text missing mid-transition");

        assert!(height(old) * 10 < height(settled_old) * 7, "{old:?} vs {settled_old:?}");
        assert!(height(new) * 10 < height(settled_new) * 7, "{new:?} vs {settled_new:?}");
        // Only the vertical axis is animated.
        assert!((old.2 - old.0).abs_diff(settled_old.2 - settled_old.0) <= 4);
    }
}
