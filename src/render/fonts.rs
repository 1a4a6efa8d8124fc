use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::error::{MetroError, MetroResult};

/// Raw font bytes registered under the identifier settings files use.
#[derive(Clone, Debug, PartialEq)]
pub struct FontFace {
    /// Identifier used by `font` fields in the settings.
    pub id: String,
    /// Font file contents (TTF or OTF).
    pub bytes: Arc<Vec<u8>>,
}

/// Fonts available to the CPU backend.
///
/// Lookup is exact by identifier, falling back to the first registered face.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
}

impl FontBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every font file named in a settings `fonts` map.
    pub fn load(fonts: &BTreeMap<String, PathBuf>) -> MetroResult<Self> {
        let mut book = Self::new();
        for (id, path) in fonts {
            let bytes = std::fs::read(path).map_err(|e| {
                MetroError::config(format!("read font '{id}' from '{}': {e}", path.display()))
            })?;
            book.insert(id.clone(), bytes);
        }
        Ok(book)
    }

    /// Register `bytes` under `id`, replacing an earlier face with the same identifier.
    pub fn insert(&mut self, id: impl Into<String>, bytes: Vec<u8>) {
        let face = FontFace {
            id: id.into(),
            bytes: Arc::new(bytes),
        };
        match self.faces.iter_mut().find(|f| f.id == face.id) {
            Some(existing) => *existing = face,
            None => self.faces.push(face),
        }
    }

    /// The face registered under exactly `id`.
    pub fn get(&self, id: &str) -> Option<&FontFace> {
        self.faces.iter().find(|f| f.id == id)
    }

    /// `id` if registered, otherwise the fallback face.
    pub fn resolve(&self, id: &str) -> Option<&FontFace> {
        self.get(id).or_else(|| self.faces.first())
    }

    /// Number of registered faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// `true` when no face is registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Stateful helper for building Parley text layouts from registered font faces.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_name(&mut self, face: &FontFace) -> MetroResult<String> {
        if let Some(name) = self.families.get(&face.id) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MetroError::render(format!("font '{}' contains no font families", face.id))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MetroError::render(format!("font '{}' family has no name", face.id)))?
            .to_string();

        self.families.insert(face.id.clone(), name.clone());
        Ok(name)
    }

    /// Shape a single unwrapped line of text.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> MetroResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MetroError::render(format!(
                "text size must be finite and > 0, got {size_px}"
            )));
        }
        let family = self.family_name(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
