//! Color model shared between widgets and the batcher.
//!
//! Geometry types remain in `coords`.

mod color;

pub use color::Color;
