use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_rounds_boundaries_to_nearest_frame() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(0.7), 21);
    assert_eq!(fps.secs_to_frames_round(1.7), 51);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
}

#[test]
fn fps_deserializes_integer_and_ratio() {
    let a: Fps = serde_json::from_str("24").unwrap();
    assert_eq!(a, Fps { num: 24, den: 1 });
    let b: Fps = serde_json::from_str(r#"{ "num": 30000, "den": 1001 }"#).unwrap();
    assert_eq!(b, Fps { num: 30000, den: 1001 });
    assert!(serde_json::from_str::<Fps>("0").is_err());
}

#[test]
fn rgb_quantizes_and_saturates_alpha() {
    let c = Rgb::new(1.0, 0.5, 0.0);
    assert_eq!(c.to_rgba8(1.4), [255, 128, 0, 255]);
    assert_eq!(c.to_rgba8(-0.2)[3], 0);
    assert_eq!(Rgb::from_u8(229, 229, 229).to_rgba8(1.0), [229, 229, 229, 255]);
}

#[test]
fn rgb_serializes_as_array() {
    let c: Rgb = serde_json::from_str("[0.19, 0.71, 0.85]").unwrap();
    assert_eq!(c, Rgb::new(0.19, 0.71, 0.85));
    assert_eq!(serde_json::to_string(&Rgb::WHITE).unwrap(), "[1.0,1.0,1.0]");
}
