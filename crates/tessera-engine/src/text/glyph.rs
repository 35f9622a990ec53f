use std::collections::HashMap;

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::render::{GpuBackend, PrimitiveClass, Vertex};

use super::atlas::AtlasPacker;
use super::font_system::{FontId, FontSystem, TextFont};

/// Session-based text drawing collaborator of the renderer.
///
/// Text drawn between `begin` and `end` is painted by `end`, after whatever
/// the renderer flushed before it.
pub trait TextBackend {
    /// The externally supplied font object.
    type Font;

    fn begin(&mut self);

    /// `position` is the top-left of the line box, in the same space as the
    /// renderer's geometry (offset already applied).
    fn draw_text(&mut self, font: &Self::Font, text: &str, position: Vec2, color: Color);

    /// Paints everything drawn since `begin` onto `gpu`.
    fn end(&mut self, gpu: &mut dyn GpuBackend);
}

struct AtlasUpload {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

#[derive(Copy, Clone)]
struct GlyphQuad {
    dst: Rect,
    uv: Rect,
    color: Color,
}

/// Default [`TextBackend`]: glyph quads sampled from a coverage atlas.
///
/// Glyphs are rasterized by `fontdue` on first use and cached for the
/// backend's lifetime, keyed by `GlyphRasterConfig` (font, glyph, pixel size).
/// New atlas regions are uploaded at the next `end`, before the session's
/// single textured-triangle draw.
pub struct GlyphBatch {
    fonts: FontSystem,
    layout: Layout<()>,

    glyph_cache: HashMap<GlyphRasterConfig, Rect>,
    packer: AtlasPacker,
    pending_uploads: Vec<AtlasUpload>,
    warned_full: bool,

    quads: Vec<GlyphQuad>,
    vertices: Vec<Vertex>,
    in_session: bool,
}

impl GlyphBatch {
    pub fn new(fonts: FontSystem) -> Self {
        Self {
            fonts,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            glyph_cache: HashMap::new(),
            packer: AtlasPacker::default(),
            pending_uploads: Vec::new(),
            warned_full: false,
            quads: Vec::new(),
            vertices: Vec::new(),
            in_session: false,
        }
    }

    pub fn fonts(&self) -> &FontSystem {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontSystem {
        &mut self.fonts
    }

    pub fn measure_text(&self, text: &str, font: TextFont) -> Vec2 {
        self.fonts.measure_text(text, font)
    }

    /// Glyph quads queued in the current session.
    pub fn pending_quads(&self) -> usize {
        self.quads.len()
    }

    pub fn cached_glyphs(&self) -> usize {
        self.glyph_cache.len()
    }

    fn cache_glyph(&mut self, key: GlyphRasterConfig, font: FontId) -> Option<Rect> {
        if let Some(uv) = self.glyph_cache.get(&key) {
            return Some(*uv);
        }

        let font = self.fonts.get(font)?;
        let (metrics, bitmap) = font.rasterize_config(key);
        if metrics.width == 0 || metrics.height == 0 {
            return None;
        }
        let (w, h) = (metrics.width as u32, metrics.height as u32);

        let Some((x, y)) = self.packer.place(w, h) else {
            if !self.warned_full {
                let size = self.packer.size();
                log::warn!("glyph atlas is full ({size}x{size}); new glyphs will not be drawn");
                self.warned_full = true;
            }
            return None;
        };

        let atlas = self.packer.size() as f32;
        let uv = Rect::new(x as f32 / atlas, y as f32 / atlas, w as f32 / atlas, h as f32 / atlas);
        self.pending_uploads.push(AtlasUpload { x, y, width: w, height: h, coverage: bitmap });
        self.glyph_cache.insert(key, uv);
        Some(uv)
    }
}

impl TextBackend for GlyphBatch {
    type Font = TextFont;

    fn begin(&mut self) {
        if self.in_session {
            log::warn!("GlyphBatch::begin called twice without end; dropping {} quads", self.quads.len());
        }
        self.quads.clear();
        self.in_session = true;
    }

    fn draw_text(&mut self, font: &TextFont, text: &str, position: Vec2, color: Color) {
        if !self.in_session {
            log::warn!("GlyphBatch::draw_text outside a session; ignored");
            return;
        }
        let Some(f) = self.fonts.get(font.id) else {
            log::warn!("GlyphBatch: unknown {:?}, skipping", font.id);
            return;
        };

        self.layout.reset(&LayoutSettings {
            x: position.x,
            y: position.y,
            ..LayoutSettings::default()
        });
        self.layout.append(&[f], &TextStyle::new(text, font.size, 0));

        // Snapshot so the borrow on `self.layout` ends before `cache_glyph`.
        let glyphs: Vec<(GlyphRasterConfig, Rect)> = self
            .layout
            .glyphs()
            .iter()
            .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
            .map(|g| (g.key, Rect::new(g.x, g.y, g.width as f32, g.height as f32)))
            .collect();

        for (key, dst) in glyphs {
            if let Some(uv) = self.cache_glyph(key, font.id) {
                self.quads.push(GlyphQuad { dst, uv, color });
            }
        }
    }

    fn end(&mut self, gpu: &mut dyn GpuBackend) {
        for up in self.pending_uploads.drain(..) {
            gpu.write_atlas(up.x, up.y, up.width, up.height, &up.coverage);
        }

        self.vertices.clear();
        for q in &self.quads {
            let (d, t) = (q.dst, q.uv);
            let v = |x: f32, y: f32, u: f32, w: f32| Vertex::textured(Vec2::new(x, y), q.color, Vec2::new(u, w));
            let tl = v(d.left(), d.top(), t.left(), t.top());
            let tr = v(d.right(), d.top(), t.right(), t.top());
            let br = v(d.right(), d.bottom(), t.right(), t.bottom());
            let bl = v(d.left(), d.bottom(), t.left(), t.bottom());
            self.vertices.extend_from_slice(&[tl, tr, bl, tr, br, bl]);
        }
        if !self.vertices.is_empty() {
            gpu.draw(PrimitiveClass::TexturedTriangles, &self.vertices);
            log::trace!("text: {} glyph quads", self.quads.len());
        }

        self.quads.clear();
        self.in_session = false;
    }
}
