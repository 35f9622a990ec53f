use crate::coords::Rect;

use super::vertex::{PrimitiveClass, Vertex};

/// The GPU-facing side of the batcher.
///
/// Every `draw` call is exactly one GPU draw call over a whole flushed batch.
/// Viewport and scissor are absolute target rectangles in logical pixels and
/// apply to every draw issued after them.
pub trait GpuBackend {
    fn draw(&mut self, class: PrimitiveClass, vertices: &[Vertex]);

    fn set_viewport(&mut self, rect: Rect);

    fn set_scissor(&mut self, rect: Rect);

    /// Uploads an 8-bit coverage region into the texture sampled by
    /// [`PrimitiveClass::TexturedTriangles`]. `coverage` is `width * height` bytes, row-major.
    fn write_atlas(&mut self, x: u32, y: u32, width: u32, height: u32, coverage: &[u8]);
}

/// One call observed by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Draw { class: PrimitiveClass, vertices: Vec<Vertex> },
    Viewport(Rect),
    Scissor(Rect),
    Atlas { x: u32, y: u32, width: u32, height: u32 },
}

/// Headless backend that records every call instead of talking to a GPU.
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Vec<BackendCall>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls in the order they were issued.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Draw calls only, as `(class, vertices)`.
    pub fn draws(&self) -> impl Iterator<Item = (PrimitiveClass, &[Vertex])> + '_ {
        self.calls.iter().filter_map(|c| match c {
            BackendCall::Draw { class, vertices } => Some((*class, vertices.as_slice())),
            _ => None,
        })
    }

    pub fn draw_count(&self, class: PrimitiveClass) -> usize {
        self.draws().filter(|(c, _)| *c == class).count()
    }

    pub fn vertex_count(&self, class: PrimitiveClass) -> usize {
        self.draws().filter(|(c, _)| *c == class).map(|(_, v)| v.len()).sum()
    }

    /// Vertices of every draw of `class`, concatenated in draw order.
    pub fn vertices(&self, class: PrimitiveClass) -> Vec<Vertex> {
        self.draws()
            .filter(|(c, _)| *c == class)
            .flat_map(|(_, v)| v.iter().copied())
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl GpuBackend for Recorder {
    fn draw(&mut self, class: PrimitiveClass, vertices: &[Vertex]) {
        self.calls.push(BackendCall::Draw { class, vertices: vertices.to_vec() });
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.calls.push(BackendCall::Viewport(rect));
    }

    fn set_scissor(&mut self, rect: Rect) {
        self.calls.push(BackendCall::Scissor(rect));
    }

    fn write_atlas(&mut self, x: u32, y: u32, width: u32, height: u32, coverage: &[u8]) {
        debug_assert_eq!(coverage.len(), (width * height) as usize);
        self.calls.push(BackendCall::Atlas { x, y, width, height });
    }
}
