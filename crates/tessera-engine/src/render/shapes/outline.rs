use crate::coords::{Rect, Vec2};
use crate::error::RenderError;
use crate::paint::Color;
use crate::render::backend::GpuBackend;
use crate::render::batch::PrimitiveBatch;

impl<B: GpuBackend> PrimitiveBatch<B> {
    /// Rectangle border.
    ///
    /// `inner` strokes keep the border inside `rect`; outer strokes surround it.
    /// Thickness up to one pixel draws four lines through pixel centers; anything
    /// thicker draws four non-overlapping triangle strips. Non-positive thickness
    /// draws nothing.
    pub fn draw_outline(&mut self, rect: Rect, color: Color, inner: bool, thickness: f32) -> Result<(), RenderError> {
        self.ensure_session()?;
        self.push_outline(rect, color, inner, thickness);
        Ok(())
    }

    pub(super) fn push_outline(&mut self, rect: Rect, color: Color, inner: bool, thickness: f32) {
        let r = rect.normalized();
        if r.is_empty() || !(thickness > 0.0) {
            return;
        }

        if thickness <= 1.0 {
            let b = hairline_box(r, inner);
            let tl = Vec2::new(b.left(), b.top());
            let tr = Vec2::new(b.right(), b.top());
            let br = Vec2::new(b.right(), b.bottom());
            let bl = Vec2::new(b.left(), b.bottom());
            self.push_line(tl, tr, color);
            self.push_line(tr, br, color);
            self.push_line(br, bl, color);
            self.push_line(bl, tl, color);
            return;
        }

        let (outer, hole) = if inner { (r, r.inflated(-thickness)) } else { (r.inflated(thickness), r) };
        if hole.is_empty() {
            // band swallows the whole rect
            self.push_quad(outer, color);
            return;
        }

        self.push_frame(outer, hole, color);
    }

    /// Fills `outer` minus `hole` (which must lie inside it) with four
    /// non-overlapping strips.
    pub(super) fn push_frame(&mut self, outer: Rect, hole: Rect, color: Color) {
        let band_top = hole.top() - outer.top();
        let band_bottom = outer.bottom() - hole.bottom();
        let band_left = hole.left() - outer.left();
        let band_right = outer.right() - hole.right();

        // top/bottom run full width, left/right fill the gap between them
        self.push_quad(Rect::new(outer.left(), outer.top(), outer.width(), band_top), color);
        self.push_quad(Rect::new(outer.left(), hole.bottom(), outer.width(), band_bottom), color);
        self.push_quad(Rect::new(outer.left(), hole.top(), band_left, hole.height()), color);
        self.push_quad(Rect::new(hole.right(), hole.top(), band_right, hole.height()), color);
    }
}

/// Box whose edges the one-pixel lines run along.
///
/// Inner: the last pixel row/column inside `r`. Outer: the first one outside.
pub(super) fn hairline_box(r: Rect, inner: bool) -> Rect {
    if inner {
        Rect::new(r.left(), r.top(), (r.width() - 1.0).max(0.0), (r.height() - 1.0).max(0.0))
    } else {
        Rect::new(r.left() - 1.0, r.top() - 1.0, r.width() + 1.0, r.height() + 1.0)
    }
}
