use std::sync::Arc;

use crate::foundation::error::MetroResult;
use crate::render::fonts::FontBook;
use crate::scene::plan::FramePlan;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// The four bytes of pixel `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// A renderer that executes a [`FramePlan`] into a [`FrameRGBA`].
///
/// Most callers go through [`crate::render_frame`] or [`crate::render_line`], which build the
/// plan from the timeline.
pub trait RenderBackend {
    /// Rasterize `plan`.
    fn render_plan(&mut self, plan: &FramePlan) -> MetroResult<FrameRGBA>;

    /// Settings required to construct equivalent worker backends for parallel rendering.
    fn worker_render_settings(&self) -> Option<RenderSettings> {
        None
    }
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Fonts shared by every backend built from these settings.
    pub fonts: Arc<FontBook>,
}
