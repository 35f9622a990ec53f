//! Rendering core.
//!
//! Layering, leaf first:
//! - `vertex`: the one vertex format shared by all primitive classes
//! - `backend`: the [`GpuBackend`] seam plus the headless [`Recorder`]
//! - `batch` + `shapes`: [`PrimitiveBatch`] buffering and tessellation
//! - `stack` + `renderer`: the [`Renderer`] façade with offset/clip/viewport stacks
//! - `gpu` + `ctx`: the `wgpu` implementation of the backend
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The vertex shader adds the active viewport origin and maps to NDC by target size.

mod backend;
mod batch;
mod ctx;
mod gpu;
mod renderer;
mod shapes;
mod stack;
mod vertex;

pub use backend::{BackendCall, GpuBackend, Recorder};
pub use batch::{BatchConfig, FrameStats, PrimitiveBatch};
pub use ctx::{RenderCtx, RenderTarget};
pub use gpu::WgpuBackend;
pub use renderer::{BorderStyle, Renderer, RendererConfig, Scope};
pub use stack::FloorStack;
pub use vertex::{PrimitiveClass, Vertex};
