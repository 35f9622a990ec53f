//! Text: font storage and the glyph-quad text backend.
//!
//! Text is drawn through [`TextBackend`], a session-based collaborator of the
//! renderer. [`GlyphBatch`] is the default one: `fontdue` layout and
//! rasterization into a shared coverage atlas, flushed as textured triangles.

mod atlas;
mod font_system;
mod glyph;

pub use atlas::{AtlasPacker, ATLAS_SIZE};
pub use font_system::{FontError, FontId, FontSystem, TextFont};
pub use glyph::{GlyphBatch, TextBackend};
