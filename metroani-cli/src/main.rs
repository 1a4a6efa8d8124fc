use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "metroani", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a line settings file and print the timeline summary.
    Check(CheckArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input line settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print the summary as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input line settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline frame index (0-based). Overrides the selector flags.
    #[arg(long)]
    frame: Option<u64>,

    /// Station index (0-based).
    #[arg(long, default_value_t = 0)]
    station: usize,

    /// Train state index (0-based).
    #[arg(long, default_value_t = 0)]
    state: usize,

    /// Language pair index (0-based).
    #[arg(long, default_value_t = 0)]
    pair: usize,

    /// Clip-local time in seconds.
    #[arg(long, default_value_t = 0.0)]
    t: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input line settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Rasterize every frame, even repeated freeze frames.
    #[arg(long, default_value_t = false)]
    no_elision: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load(path: &Path) -> anyhow::Result<metroani::LineSettings> {
    metroani::LineSettings::from_path(path)
        .with_context(|| format!("load line settings '{}'", path.display()))
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cpu_backend(line: &metroani::LineSettings) -> anyhow::Result<metroani::CpuBackend> {
    let fonts = metroani::FontBook::load(&line.fonts).context("load fonts")?;
    if fonts.is_empty() {
        tracing::warn!("no fonts configured; text will not be drawn");
    }
    Ok(metroani::CpuBackend::new(metroani::RenderSettings {
        fonts: Arc::new(fonts),
    }))
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let line = load(&args.in_path)?;
    let timeline = metroani::Timeline::build(&line)?;

    let skipped = line.stations.iter().filter(|s| s.skip).count();
    let summary = serde_json::json!({
        "stations": line.stations.len(),
        "skipped": skipped,
        "states": line.states.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        "languages": line.terminus.names.len(),
        "clips": timeline.segments().len(),
        "fps": timeline.fps().as_f64(),
        "frames": timeline.frame_count(),
        "seconds": timeline.duration_secs(),
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: {} stations ({} skipped), {} states, {} clips, {} frames ({:.2}s at {} fps)",
            args.in_path.display(),
            line.stations.len(),
            skipped,
            line.states.len(),
            timeline.segments().len(),
            timeline.frame_count(),
            timeline.duration_secs(),
            timeline.fps().as_f64(),
        );
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let line = load(&args.in_path)?;
    let mut backend = cpu_backend(&line)?;

    let frame = match args.frame {
        Some(idx) => {
            let timeline = metroani::Timeline::build(&line)?;
            metroani::render_frame(&line, &timeline, metroani::FrameIndex(idx), &mut backend)?
        }
        None => metroani::render_preview(
            &line,
            metroani::PreviewSelector {
                station: args.station,
                state: args.state,
                pair: args.pair,
                t: args.t,
            },
            &mut backend,
        )?,
    };

    create_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let line = load(&args.in_path)?;
    let mut backend = cpu_backend(&line)?;

    let threading = metroani::RenderThreading {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        static_frame_elision: !args.no_elision,
    };
    let mut opts = metroani::FfmpegSinkOpts::for_line(&args.out, &line.constants)?;
    opts.overwrite = !args.no_overwrite;
    create_parent_dir(&args.out)?;
    let mut sink = metroani::FfmpegSink::new(opts);

    let stats = metroani::render_line(&line, &mut backend, &mut sink, &threading)?;
    tracing::debug!(
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "render finished"
    );

    eprintln!(
        "wrote {} ({} frames)",
        args.out.display(),
        stats.frames_total
    );
    Ok(())
}
