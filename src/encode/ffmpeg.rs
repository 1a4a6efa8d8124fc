//! MP4 output through a system `ffmpeg` process.
//!
//! Frames leave the rasterizer premultiplied; they are flattened over the line's background
//! before being piped as `rawvideo` RGBA. A render that fails midway kills the encoder and
//! removes the partial file.

use std::io::{Read, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, Rgb};
use crate::foundation::error::{MetroError, MetroResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use crate::scene::plan::FRAME_BACKGROUND;
use crate::settings::model::Constants;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path. Its directory must already exist.
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// Canvas the line renders at; `begin` rejects any other frame size.
    pub canvas: Canvas,
    /// Color translucent pixels are flattened onto.
    pub background: Rgb,
}

impl FfmpegSinkOpts {
    /// Options for encoding a line with these constants.
    ///
    /// H.264 in yuv420p needs even dimensions, so odd canvases are rejected here rather than
    /// after the timeline has been built.
    pub fn for_line(out_path: impl Into<PathBuf>, constants: &Constants) -> MetroResult<Self> {
        let canvas = constants.canvas();
        check_canvas(canvas)?;
        Ok(Self {
            out_path: out_path.into(),
            overwrite: true,
            canvas,
            background: FRAME_BACKGROUND,
        })
    }
}

/// Sink that streams frames into a child `ffmpeg` process.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    scratch: Vec<u8>,
    next_idx: u64,
}

struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl Encoder {
    /// Close stdin and collect the exit status and stderr.
    fn finish(mut self) -> MetroResult<(std::process::ExitStatus, String)> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| MetroError::encode(format!("waiting for ffmpeg: {e}")))?;
        let stderr = match self.stderr.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
            Some(Ok(Err(e))) => format!("<stderr unreadable: {e}>"),
            Some(Err(_)) => "<stderr reader panicked>".to_owned(),
            None => String::new(),
        };
        Ok((status, stderr))
    }
}

impl FfmpegSink {
    /// A sink that writes nothing until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            scratch: Vec::new(),
            next_idx: 0,
        }
    }

    fn discard_output(&self) {
        if let Err(e) = std::fs::remove_file(&self.opts.out_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                out = %self.opts.out_path.display(),
                error = %e,
                "could not remove partial output"
            );
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> MetroResult<()> {
        if self.encoder.is_some() {
            return Err(MetroError::encode("ffmpeg sink already started"));
        }
        let canvas = Canvas {
            width: cfg.width,
            height: cfg.height,
        };
        if canvas != self.opts.canvas {
            return Err(MetroError::encode(format!(
                "sink configured for {}x{} but the render is {}x{}",
                self.opts.canvas.width, self.opts.canvas.height, cfg.width, cfg.height
            )));
        }
        check_canvas(canvas)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(MetroError::encode(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(MetroError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = ffmpeg_command(&self.opts, cfg)
            .spawn()
            .map_err(|e| MetroError::encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                pipe.read_to_end(&mut bytes)?;
                Ok(bytes)
            })
        });
        if stdin.is_none() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(MetroError::encode("failed to open ffmpeg stdin"));
        }

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            "ffmpeg started"
        );
        self.scratch = vec![0; canvas.width as usize * canvas.height as usize * 4];
        self.encoder = Some(Encoder {
            child,
            stdin,
            stderr,
        });
        self.next_idx = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MetroResult<()> {
        let Some(stdin) = self.encoder.as_mut().and_then(|e| e.stdin.as_mut()) else {
            return Err(MetroError::encode("ffmpeg sink not started"));
        };
        if idx.0 != self.next_idx {
            return Err(MetroError::encode(format!(
                "expected frame {}, got frame {}",
                self.next_idx, idx.0
            )));
        }
        if frame.width != self.opts.canvas.width || frame.height != self.opts.canvas.height {
            return Err(MetroError::encode(format!(
                "frame {} is {}x{}, expected {}x{}",
                idx.0, frame.width, frame.height, self.opts.canvas.width, self.opts.canvas.height
            )));
        }

        let bg = self.opts.background.to_rgba8(1.0);
        flatten_onto(&mut self.scratch, &frame.data, [bg[0], bg[1], bg[2]])?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| MetroError::encode(format!("writing frame {} to ffmpeg: {e}", idx.0)))?;
        self.next_idx += 1;
        Ok(())
    }

    fn end(&mut self) -> MetroResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| MetroError::encode("ffmpeg sink not started"))?;
        let (status, stderr) = encoder.finish()?;
        if !status.success() {
            self.discard_output();
            return Err(MetroError::encode(format!(
                "ffmpeg exited with {status}: {stderr}"
            )));
        }
        tracing::debug!(frames = self.next_idx, "ffmpeg finished");
        Ok(())
    }

    fn abort(&mut self) {
        let Some(mut encoder) = self.encoder.take() else {
            return;
        };
        if let Err(e) = encoder.child.kill() {
            tracing::debug!(error = %e, "ffmpeg already exited");
        }
        match encoder.finish() {
            Ok((status, _)) => tracing::warn!(
                out = %self.opts.out_path.display(),
                frames = self.next_idx,
                %status,
                "encoding aborted"
            ),
            Err(e) => tracing::warn!(error = %e, "encoding aborted, ffmpeg not reaped"),
        }
        self.discard_output();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

fn check_canvas(canvas: Canvas) -> MetroResult<()> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(MetroError::encode("video canvas must be non-empty"));
    }
    if !canvas.width.is_multiple_of(2) || !canvas.height.is_multiple_of(2) {
        return Err(MetroError::encode(format!(
            "video canvas {}x{} must have even sides for yuv420p output",
            canvas.width, canvas.height
        )));
    }
    Ok(())
}

/// The encoder invocation for one render.
fn ffmpeg_command(opts: &FfmpegSinkOpts, cfg: SinkConfig) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    cmd.arg(if opts.overwrite { "-y" } else { "-n" });
    cmd.args(["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"]);
    cmd.arg("-s").arg(format!("{}x{}", cfg.width, cfg.height));
    // Input rate goes before `-i`.
    cmd.arg("-r").arg(format!("{}/{}", cfg.fps.num, cfg.fps.den));
    cmd.args(["-i", "pipe:0", "-an"]);
    cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"]);
    cmd.arg(&opts.out_path);
    cmd
}

/// Composite premultiplied RGBA8 `src` over an opaque `bg` into `dst`.
pub(crate) fn flatten_onto(dst: &mut [u8], src: &[u8], bg: [u8; 3]) -> MetroResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MetroError::encode(
            "flatten expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let inv = 255 - u16::from(s[3]);
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(u16::from(bg[c]), inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
