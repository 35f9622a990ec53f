//! Coordinate and geometry types shared by the batcher, the renderer and widgets.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! The primitive shader adds the active viewport origin before mapping to NDC.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
