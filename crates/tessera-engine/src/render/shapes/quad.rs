use crate::coords::{Rect, Vec2};
use crate::error::RenderError;
use crate::paint::Color;
use crate::render::backend::GpuBackend;
use crate::render::batch::PrimitiveBatch;
use crate::render::vertex::{PrimitiveClass, Vertex};

impl<B: GpuBackend> PrimitiveBatch<B> {
    /// Solid axis-aligned rectangle as two triangles sharing the TR-BL diagonal.
    pub fn draw_quad(&mut self, rect: Rect, color: Color) -> Result<(), RenderError> {
        self.ensure_session()?;
        self.push_quad(rect, color);
        Ok(())
    }

    /// Rectangle sampling `uv` (normalized atlas coordinates) from the backend's
    /// atlas texture, tinted by `color`.
    pub fn draw_textured_quad(&mut self, rect: Rect, uv: Rect, color: Color) -> Result<(), RenderError> {
        self.ensure_session()?;

        let r = rect.normalized();
        if r.is_empty() {
            return Ok(());
        }
        let [tl, tr, br, bl] = corners(r);
        let [uv_tl, uv_tr, uv_br, uv_bl] = corners(uv);

        let v = |p: Vec2, t: Vec2| Vertex::textured(p, color, t);
        self.push_triangle(PrimitiveClass::TexturedTriangles, [v(tl, uv_tl), v(tr, uv_tr), v(bl, uv_bl)]);
        self.push_triangle(PrimitiveClass::TexturedTriangles, [v(tr, uv_tr), v(br, uv_br), v(bl, uv_bl)]);
        Ok(())
    }

    pub(super) fn push_quad(&mut self, rect: Rect, color: Color) {
        let r = rect.normalized();
        if r.is_empty() {
            return;
        }
        let [tl, tr, br, bl] = corners(r);

        let v = |p: Vec2| Vertex::solid(p, color);
        self.push_triangle(PrimitiveClass::Triangles, [v(tl), v(tr), v(bl)]);
        self.push_triangle(PrimitiveClass::Triangles, [v(tr), v(br), v(bl)]);
    }
}

/// `[top-left, top-right, bottom-right, bottom-left]`.
#[inline]
fn corners(r: Rect) -> [Vec2; 4] {
    [
        Vec2::new(r.left(), r.top()),
        Vec2::new(r.right(), r.top()),
        Vec2::new(r.right(), r.bottom()),
        Vec2::new(r.left(), r.bottom()),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;

    #[test]
    fn quad_covers_exactly_its_rect() {
        let rect = Rect::new(5.0, 7.0, 30.0, 11.0);
        let rec = record(|b| b.draw_quad(rect, Color::RED));

        let verts = rec.vertices(PrimitiveClass::Triangles);
        assert_eq!(verts.len(), 6);
        assert_eq!(bounds(&verts), rect);
        assert_eq!(total_area(&verts), 30.0 * 11.0);
        assert!(verts.iter().all(|v| v.color == Color::RED.to_array()));
    }

    #[test]
    fn negative_extent_is_normalized() {
        let rec = record(|b| b.draw_quad(Rect::new(10.0, 10.0, -10.0, -5.0), Color::WHITE));
        assert_eq!(bounds(&rec.vertices(PrimitiveClass::Triangles)), Rect::new(0.0, 5.0, 10.0, 5.0));
    }

    #[test]
    fn textured_quad_maps_uv_corners() {
        let rect = Rect::new(0.0, 0.0, 8.0, 8.0);
        let uv = Rect::new(0.25, 0.5, 0.25, 0.25);
        let rec = record(|b| b.draw_textured_quad(rect, uv, Color::WHITE));

        let verts = rec.vertices(PrimitiveClass::TexturedTriangles);
        assert_eq!(verts.len(), 6);
        assert_eq!(rec.draw_count(PrimitiveClass::Triangles), 0);
        let bottom_right = verts.iter().find(|v| v.pos == [8.0, 8.0]).unwrap();
        assert_eq!(bottom_right.uv, [0.5, 0.75]);
    }
}
