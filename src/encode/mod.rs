//! Frame sinks.
//!
//! Sinks consume rendered frames in timeline order and are driven by [`crate::render_line`].

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub(crate) mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub(crate) mod sink;
