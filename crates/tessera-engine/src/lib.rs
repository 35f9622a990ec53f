//! Tessera engine crate.
//!
//! A batched 2D primitive renderer for retained-mode UI. Widget code talks to
//! [`render::Renderer`], which applies the active offset/clip/viewport state and
//! hands tessellated geometry to a [`render::PrimitiveBatch`]. Batches are flushed
//! to a [`render::GpuBackend`]: `wgpu` in production, [`render::Recorder`] headless.

pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;

mod error;

pub use error::RenderError;
