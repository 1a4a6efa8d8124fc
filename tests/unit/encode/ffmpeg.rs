use super::*;
use crate::foundation::core::Fps;
use crate::test_support::constants;

fn opts(out: &str) -> FfmpegSinkOpts {
    FfmpegSinkOpts::for_line(std::env::temp_dir().join(out), &constants("Metro")).unwrap()
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(10, 1).unwrap(),
    }
}

#[test]
fn transparent_pixels_take_the_background() {
    let mut dst = vec![0u8; 4];
    flatten_onto(&mut dst, &[0, 0, 0, 0], [10, 20, 30]).unwrap();
    assert_eq!(dst, [10, 20, 30, 255]);
}

#[test]
fn opaque_pixels_pass_through() {
    let mut dst = vec![0u8; 4];
    flatten_onto(&mut dst, &[1, 2, 3, 255], [10, 20, 30]).unwrap();
    assert_eq!(dst, [1, 2, 3, 255]);
}

#[test]
fn half_red_over_white_is_pink() {
    let mut dst = vec![0u8; 4];
    flatten_onto(&mut dst, &[128, 0, 0, 128], [255, 255, 255]).unwrap();
    assert_eq!(dst[0], 255);
    assert!((126..=128).contains(&dst[1]));
    assert_eq!(dst[1], dst[2]);
    assert_eq!(dst[3], 255);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_onto(&mut dst, &[0; 4], [0, 0, 0]).is_err());
}

#[test]
fn options_follow_the_line_canvas() {
    let o = opts("metroani-canvas.mp4");
    assert_eq!(
        o.canvas,
        Canvas {
            width: 1920,
            height: 1080
        }
    );
    assert_eq!(o.background, FRAME_BACKGROUND);
    assert!(o.overwrite);

    let mut odd = constants("Metro");
    odd.width = 1919;
    let err = FfmpegSinkOpts::for_line("odd.mp4", &odd).unwrap_err();
    assert!(err.to_string().contains("even"), "{err}");
}

#[test]
fn command_streams_raw_rgba_at_the_line_rate() {
    let mut o = opts("metroani-args.mp4");
    o.overwrite = false;
    let cmd = ffmpeg_command(&o, cfg(1920, 1080));
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    assert_eq!(args[0], "-n");
    let after = |flag: &str| {
        let at = args.iter().position(|a| a == flag).unwrap();
        args[at + 1].clone()
    };
    assert_eq!(after("-s"), "1920x1080");
    assert_eq!(after("-r"), "10/1");
    assert_eq!(after("-i"), "pipe:0");
    assert_eq!(after("-c:v"), "libx264");
    // The rate must describe the input, so it precedes `-i`.
    let r = args.iter().position(|a| a == "-r").unwrap();
    let i = args.iter().position(|a| a == "-i").unwrap();
    assert!(r < i);
    assert!(args.last().unwrap().ends_with("metroani-args.mp4"));
}

#[test]
fn begin_rejects_a_different_canvas() {
    let mut sink = FfmpegSink::new(opts("metroani-mismatch.mp4"));
    let err = sink.begin(cfg(1280, 720)).unwrap_err();
    assert!(err.to_string().contains("1920x1080"), "{err}");
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let path = std::env::temp_dir().join(format!("metroani-keep-{}.mp4", std::process::id()));
    std::fs::write(&path, b"earlier render").unwrap();

    let mut o = opts("unused.mp4");
    o.out_path = path.clone();
    o.overwrite = false;
    let mut sink = FfmpegSink::new(o);
    let err = sink.begin(cfg(1920, 1080)).unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // Aborting a sink that never started must not touch the file.
    sink.abort();
    drop(sink);
    assert_eq!(std::fs::read(&path).unwrap(), b"earlier render");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(opts("metroani-early.mp4"));
    let frame = FrameRGBA {
        width: 1920,
        height: 1080,
        data: vec![0; 1920 * 1080 * 4],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn abort_kills_the_encoder_and_removes_partial_output() {
    if !is_ffmpeg_on_path() {
        eprintln!("ffmpeg not on PATH, skipping");
        return;
    }
    let path = std::env::temp_dir().join(format!("metroani-abort-{}.mp4", std::process::id()));
    let mut c = constants("Metro");
    c.width = 64;
    c.height = 36;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::for_line(&path, &c).unwrap());
    sink.begin(cfg(64, 36)).unwrap();
    let frame = FrameRGBA {
        width: 64,
        height: 36,
        data: vec![255; 64 * 36 * 4],
        premultiplied: true,
    };
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    assert!(sink.push_frame(FrameIndex(5), &frame).is_err());

    sink.abort();
    assert!(!path.exists());
    // Nothing left to finish.
    assert!(sink.end().is_err());
}
