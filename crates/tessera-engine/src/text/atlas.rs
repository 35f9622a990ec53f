/// Side length of the square glyph coverage atlas, in texels.
pub const ATLAS_SIZE: u32 = 1024;

const GLYPH_PADDING: u32 = 1; // texels between glyphs

/// Shelf packer for glyph bitmaps.
///
/// Glyphs fill rows left to right; a glyph that does not fit horizontally
/// opens a new row below the tallest glyph of the current one. Once a glyph
/// does not fit vertically the atlas is full for good.
#[derive(Debug, Clone)]
pub struct AtlasPacker {
    size: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl AtlasPacker {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
            full: false,
        }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Reserves a `w` x `h` region and returns its top-left texel.
    pub fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full {
            return None;
        }
        if w + 2 * GLYPH_PADDING > self.size {
            return None;
        }

        if self.cursor_x + w + GLYPH_PADDING > self.size {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }

        if self.cursor_y + h + GLYPH_PADDING > self.size {
            self.full = true;
            return None;
        }

        let origin = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        Some(origin)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.size);
    }
}

impl Default for AtlasPacker {
    fn default() -> Self {
        Self::new(ATLAS_SIZE)
    }
}
