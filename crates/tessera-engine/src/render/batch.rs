use crate::coords::Vec2;
use crate::error::RenderError;
use crate::paint::Color;

use super::backend::GpuBackend;
use super::vertex::{PrimitiveClass, Vertex};

/// Twice the smallest triangle area that is still emitted.
const MIN_AREA2: f32 = 1e-6;

/// Fixed batch capacities, in primitives (lines or triangles).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatchConfig {
    pub line_capacity: usize,
    pub triangle_capacity: usize,
    pub textured_triangle_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::uniform(512)
    }
}

impl BatchConfig {
    /// Same capacity for all three classes.
    pub const fn uniform(primitives: usize) -> Self {
        Self {
            line_capacity: primitives,
            triangle_capacity: primitives,
            textured_triangle_capacity: primitives,
        }
    }

    pub const fn capacity(&self, class: PrimitiveClass) -> usize {
        match class {
            PrimitiveClass::Lines => self.line_capacity,
            PrimitiveClass::Triangles => self.triangle_capacity,
            PrimitiveClass::TexturedTriangles => self.textured_triangle_capacity,
        }
    }

    /// Capacity in vertices of the buffer for `class`.
    pub const fn vertex_capacity(&self, class: PrimitiveClass) -> usize {
        self.capacity(class) * class.vertices_per_primitive()
    }
}

/// Per-session counters, reset by [`PrimitiveBatch::begin`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    draw_calls: [usize; 3],
    vertices: [usize; 3],
}

impl FrameStats {
    pub fn draw_calls(&self, class: PrimitiveClass) -> usize {
        self.draw_calls[class.index()]
    }

    pub fn vertices(&self, class: PrimitiveClass) -> usize {
        self.vertices[class.index()]
    }

    pub fn total_draw_calls(&self) -> usize {
        self.draw_calls.iter().sum()
    }

    pub fn total_vertices(&self) -> usize {
        self.vertices.iter().sum()
    }

    fn record(&mut self, class: PrimitiveClass, vertex_count: usize) {
        self.draw_calls[class.index()] += 1;
        self.vertices[class.index()] += vertex_count;
    }
}

/// CPU mirror of one GPU vertex buffer.
#[derive(Debug)]
struct BatchBuffer {
    class: PrimitiveClass,
    vertices: Vec<Vertex>,
    capacity: usize, // vertices
}

impl BatchBuffer {
    fn new(class: PrimitiveClass, config: &BatchConfig) -> Self {
        let capacity = config.vertex_capacity(class);
        Self { class, vertices: Vec::with_capacity(capacity), capacity }
    }

    #[inline]
    fn has_room(&self) -> bool {
        self.vertices.len() + self.class.vertices_per_primitive() <= self.capacity
    }
}

/// Accumulates lines, solid triangles and textured triangles into fixed-size
/// buffers and draws each buffer with a single backend call.
///
/// A session runs from [`begin`](Self::begin) to [`end`](Self::end). Appending
/// to a full buffer flushes that buffer first, so a primitive is never split
/// across two draw calls and overflow is never an error.
///
/// Shape tessellation lives in `render::shapes`.
pub struct PrimitiveBatch<B> {
    backend: B,
    config: BatchConfig,
    // indexed by `PrimitiveClass::index`
    buffers: [BatchBuffer; 3],
    in_session: bool,
    stats: FrameStats,
}

impl<B: GpuBackend> PrimitiveBatch<B> {
    pub fn new(backend: B, config: BatchConfig) -> Result<Self, RenderError> {
        for class in PrimitiveClass::FLUSH_ORDER {
            if config.capacity(class) == 0 {
                return Err(RenderError::ZeroCapacity(class));
            }
        }

        log::debug!(
            "primitive batch: {} lines, {} triangles, {} textured triangles per draw",
            config.line_capacity,
            config.triangle_capacity,
            config.textured_triangle_capacity
        );

        Ok(Self {
            backend,
            buffers: [
                BatchBuffer::new(PrimitiveClass::Lines, &config),
                BatchBuffer::new(PrimitiveClass::Triangles, &config),
                BatchBuffer::new(PrimitiveClass::TexturedTriangles, &config),
            ],
            config,
            in_session: false,
            stats: FrameStats::default(),
        })
    }

    // ── session ───────────────────────────────────────────────────────────

    /// Starts a session: all cursors reset to zero, counters cleared.
    pub fn begin(&mut self) -> Result<(), RenderError> {
        if self.in_session {
            log::warn!("PrimitiveBatch::begin called twice without end");
            return Err(RenderError::SessionActive);
        }
        for buffer in &mut self.buffers {
            buffer.vertices.clear();
        }
        self.stats = FrameStats::default();
        self.in_session = true;
        Ok(())
    }

    /// Draws everything still buffered and closes the session.
    pub fn end(&mut self) -> Result<(), RenderError> {
        if !self.in_session {
            return Err(RenderError::NoSession);
        }
        self.flush();
        self.in_session = false;

        log::debug!(
            "batch session: {} draw calls, {} vertices",
            self.stats.total_draw_calls(),
            self.stats.total_vertices()
        );
        Ok(())
    }

    /// Draws every non-empty buffer in [`PrimitiveClass::FLUSH_ORDER`] without
    /// ending the session.
    pub fn flush(&mut self) {
        for class in PrimitiveClass::FLUSH_ORDER {
            self.flush_class(class);
        }
    }

    fn flush_class(&mut self, class: PrimitiveClass) {
        let buffer = &mut self.buffers[class.index()];
        if buffer.vertices.is_empty() {
            return;
        }

        self.backend.draw(class, &buffer.vertices);
        self.stats.record(class, buffer.vertices.len());
        log::trace!("flushed {} vertices of {}", buffer.vertices.len(), class.label());

        buffer.vertices.clear();
    }

    #[inline]
    pub fn in_session(&self) -> bool {
        self.in_session
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Vertices currently buffered (not yet drawn) for `class`.
    pub fn pending_vertices(&self, class: PrimitiveClass) -> usize {
        self.buffers[class.index()].vertices.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    // ── primitives ────────────────────────────────────────────────────────

    /// One line segment.
    pub fn draw_line(&mut self, a: Vec2, b: Vec2, color: Color) -> Result<(), RenderError> {
        self.ensure_session()?;
        self.push_line(a, b, color);
        Ok(())
    }

    /// One solid triangle; winding is normalized and zero-area input is dropped.
    pub fn draw_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) -> Result<(), RenderError> {
        self.ensure_session()?;
        self.push_triangle(
            PrimitiveClass::Triangles,
            [Vertex::solid(a, color), Vertex::solid(b, color), Vertex::solid(c, color)],
        );
        Ok(())
    }

    #[inline]
    pub(super) fn ensure_session(&self) -> Result<(), RenderError> {
        if self.in_session { Ok(()) } else { Err(RenderError::NoSession) }
    }

    pub(super) fn push_line(&mut self, a: Vec2, b: Vec2, color: Color) {
        if a == b {
            return;
        }
        self.push_primitive(PrimitiveClass::Lines, &[Vertex::solid(a, color), Vertex::solid(b, color)]);
    }

    /// Appends a triangle with positive signed area in y-down space
    /// (clockwise on screen). Degenerate triangles are dropped.
    pub(super) fn push_triangle(&mut self, class: PrimitiveClass, tri: [Vertex; 3]) {
        let [a, b, c] = tri;
        let area2 = (b.position() - a.position()).cross(c.position() - a.position());
        if area2.abs() <= MIN_AREA2 || !area2.is_finite() {
            return;
        }
        if area2 > 0.0 {
            self.push_primitive(class, &[a, b, c]);
        } else {
            self.push_primitive(class, &[a, c, b]);
        }
    }

    fn push_primitive(&mut self, class: PrimitiveClass, vertices: &[Vertex]) {
        debug_assert_eq!(vertices.len(), class.vertices_per_primitive());
        if !self.buffers[class.index()].has_room() {
            self.flush_class(class);
        }
        self.buffers[class.index()].vertices.extend_from_slice(vertices);
    }
}
