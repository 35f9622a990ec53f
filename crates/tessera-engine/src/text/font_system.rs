use std::path::Path;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use thiserror::Error;

use crate::coords::Vec2;

/// Error returned while loading a font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font parse error: {0}")]
    Parse(String),

    #[error("failed to read font file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("none of the candidate font files could be read")]
    NotFound,
}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// A loaded font at a pixel size; the font object passed to `draw_text`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextFont {
    pub id: FontId,
    pub size: f32,
}

impl TextFont {
    #[inline]
    pub const fn new(id: FontId, size: f32) -> Self {
        Self { id, size }
    }
}

/// Owns a collection of parsed fonts. Fonts are immutable after loading.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {id:?}");
        Ok(id)
    }

    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> Result<FontId, FontError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load_font(&bytes)
    }

    /// Loads the first readable file of `candidates`.
    pub fn load_first_font<P: AsRef<Path>>(&mut self, candidates: &[P]) -> Result<FontId, FontError> {
        let bytes = candidates
            .iter()
            .find_map(|p| std::fs::read(p).ok())
            .ok_or(FontError::NotFound)?;
        self.load_font(&bytes)
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Size of a laid-out single-line string in logical pixels.
    ///
    /// Width is the pen position after the last glyph, not the bitmap edge.
    /// An unknown font measures as an empty line of `font.size * 1.2`.
    #[must_use]
    pub fn measure_text(&self, text: &str, font: TextFont) -> Vec2 {
        let empty = Vec2::new(0.0, font.size * 1.2);
        let Some(f) = self.get(font.id) else {
            return empty;
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[f], &TextStyle::new(text, font.size, 0));

        let glyphs = layout.glyphs();
        if glyphs.is_empty() {
            return empty;
        }

        let w = glyphs
            .iter()
            .map(|g| {
                let m = f.metrics_indexed(g.key.glyph_index, font.size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        let h = glyphs.iter().map(|g| g.y + g.height as f32).fold(font.size, f32::max);
        Vec2::new(w, h)
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let mut fonts = FontSystem::new();
        let err = fonts.load_font(b"definitely not a font").unwrap_err();
        assert!(matches!(err, FontError::Parse(_)));
        assert!(fonts.is_empty());
    }

    #[test]
    fn missing_candidates_report_not_found() {
        let mut fonts = FontSystem::new();
        let err = fonts.load_first_font(&["/nonexistent/a.ttf", "/nonexistent/b.ttf"]).unwrap_err();
        assert!(matches!(err, FontError::NotFound));
    }

    #[test]
    fn missing_file_keeps_path_in_error() {
        let mut fonts = FontSystem::new();
        let err = fonts.load_font_file("/nonexistent/font.ttf").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }

    #[test]
    fn unknown_font_measures_as_empty_line() {
        let fonts = FontSystem::new();
        let size = fonts.measure_text("hello", TextFont::new(FontId(3), 10.0));
        assert_eq!(size, Vec2::new(0.0, 12.0));
    }
}
