use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

/// The three batched primitive classes. Each owns one vertex buffer and
/// flushes as one draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveClass {
    Lines,
    Triangles,
    TexturedTriangles,
}

impl PrimitiveClass {
    /// Order in which non-empty buffers are drawn on every flush.
    ///
    /// Fixed so overlapping geometry of one frame always composes the same way.
    pub const FLUSH_ORDER: [PrimitiveClass; 3] = [
        PrimitiveClass::Triangles,
        PrimitiveClass::TexturedTriangles,
        PrimitiveClass::Lines,
    ];

    #[inline]
    pub const fn vertices_per_primitive(self) -> usize {
        match self {
            PrimitiveClass::Lines => 2,
            PrimitiveClass::Triangles | PrimitiveClass::TexturedTriangles => 3,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            PrimitiveClass::Lines => 0,
            PrimitiveClass::Triangles => 1,
            PrimitiveClass::TexturedTriangles => 2,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            PrimitiveClass::Lines => "lines",
            PrimitiveClass::Triangles => "triangles",
            PrimitiveClass::TexturedTriangles => "textured triangles",
        }
    }
}

/// Vertex layout (32 bytes):
///
///  offset  0  pos    [f32; 2]   loc 0  (logical px, viewport-relative)
///  offset  8  color  [f32; 4]   loc 1  (premultiplied)
///  offset 24  uv     [f32; 2]   loc 2  (atlas coords; unused by solid classes)
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x4, // color
        2 => Float32x2  // uv
    ];

    #[inline]
    pub fn solid(pos: Vec2, color: Color) -> Self {
        Self { pos: pos.to_array(), color: color.to_array(), uv: [0.0; 2] }
    }

    #[inline]
    pub fn textured(pos: Vec2, color: Color, uv: Vec2) -> Self {
        Self { pos: pos.to_array(), color: color.to_array(), uv: uv.to_array() }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.pos[0], self.pos[1])
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
