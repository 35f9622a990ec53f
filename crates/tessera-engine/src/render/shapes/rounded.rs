use std::f32::consts::{FRAC_PI_2, PI};

use crate::coords::{Rect, Vec2};
use crate::error::RenderError;
use crate::paint::Color;
use crate::render::backend::GpuBackend;
use crate::render::batch::PrimitiveBatch;
use crate::render::vertex::{PrimitiveClass, Vertex};

use super::outline::hairline_box;

/// One quarter-circle corner. Every arc sweeps +π/2 from its start angle,
/// clockwise on screen (y-down).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomRight, Corner::BottomLeft];

    /// Arc center for a box `b` with corner radius `radius`.
    fn pivot(self, b: Rect, radius: f32) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(b.left() + radius, b.top() + radius),
            Corner::TopRight => Vec2::new(b.right() - radius, b.top() + radius),
            Corner::BottomRight => Vec2::new(b.right() - radius, b.bottom() - radius),
            Corner::BottomLeft => Vec2::new(b.left() + radius, b.bottom() - radius),
        }
    }

    fn start_angle(self) -> f32 {
        match self {
            Corner::TopLeft => PI,
            Corner::TopRight => 1.5 * PI,
            Corner::BottomRight => 0.0,
            Corner::BottomLeft => FRAC_PI_2,
        }
    }

    /// Unit direction of arc sample `i` of `samples`.
    ///
    /// The two end points are exact axis vectors so arcs meet the straight
    /// edges without a sliver.
    fn direction(self, i: u32, samples: u32) -> Vec2 {
        let (start, end) = match self {
            Corner::TopLeft => (Vec2::new(-1.0, 0.0), Vec2::new(0.0, -1.0)),
            Corner::TopRight => (Vec2::new(0.0, -1.0), Vec2::new(1.0, 0.0)),
            Corner::BottomRight => (Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)),
            Corner::BottomLeft => (Vec2::new(0.0, 1.0), Vec2::new(-1.0, 0.0)),
        };
        if i == 0 {
            start
        } else if i >= samples {
            end
        } else {
            Vec2::from_angle(self.start_angle() + FRAC_PI_2 * i as f32 / samples as f32)
        }
    }
}

fn check_corner_radius(r: Rect, radius: f32) -> Result<(), RenderError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(RenderError::InvalidCornerRadius(radius));
    }
    if radius * 2.0 > r.width() || radius * 2.0 > r.height() {
        return Err(RenderError::CornerRadiusTooLarge {
            radius,
            width: r.width(),
            height: r.height(),
        });
    }
    Ok(())
}

impl<B: GpuBackend> PrimitiveBatch<B> {
    /// Filled rectangle with quarter-circle corners.
    ///
    /// Three axis-aligned rectangles cover the cross-shaped middle, then each
    /// corner is a fan of `samples` wedges around its pivot. `radius` must be
    /// finite, non-negative and at most half of the smaller side; a zero radius
    /// is a plain quad. `samples == 0` is treated as 1.
    pub fn draw_rounded_quad(
        &mut self,
        rect: Rect,
        color: Color,
        radius: f32,
        samples: u32,
    ) -> Result<(), RenderError> {
        self.ensure_session()?;
        let r = rect.normalized();
        check_corner_radius(r, radius)?;

        if radius == 0.0 {
            self.push_quad(r, color);
            return Ok(());
        }
        self.push_rounded_fill(r, color, radius, samples.max(1));
        Ok(())
    }

    /// Border of a rounded rectangle, with the same inner/outer and hairline
    /// rules as [`draw_outline`](Self::draw_outline).
    ///
    /// Outer strokes grow the corner radius by the thickness. An inner stroke
    /// thicker than the radius leaves a square-cornered hole.
    pub fn draw_rounded_outline(
        &mut self,
        rect: Rect,
        color: Color,
        radius: f32,
        inner: bool,
        thickness: f32,
        samples: u32,
    ) -> Result<(), RenderError> {
        self.ensure_session()?;
        let r = rect.normalized();
        check_corner_radius(r, radius)?;

        if radius == 0.0 {
            self.push_outline(r, color, inner, thickness);
            return Ok(());
        }
        if r.is_empty() || !(thickness > 0.0) {
            return Ok(());
        }
        let samples = samples.max(1);

        if thickness <= 1.0 {
            self.push_rounded_hairline(r, color, radius, inner, samples);
        } else {
            self.push_rounded_band(r, color, radius, inner, thickness, samples);
        }
        Ok(())
    }

    fn push_rounded_fill(&mut self, r: Rect, color: Color, radius: f32, samples: u32) {
        let side_h = r.height() - 2.0 * radius;
        self.push_quad(Rect::new(r.left() + radius, r.top(), r.width() - 2.0 * radius, r.height()), color);
        self.push_quad(Rect::new(r.left(), r.top() + radius, radius, side_h), color);
        self.push_quad(Rect::new(r.right() - radius, r.top() + radius, radius, side_h), color);
        self.push_corner_fans(r, color, radius, samples);
    }

    fn push_corner_fans(&mut self, r: Rect, color: Color, radius: f32, samples: u32) {
        let v = |p: Vec2| Vertex::solid(p, color);
        for corner in Corner::ALL {
            let pivot = corner.pivot(r, radius);
            for i in 0..samples {
                let a = pivot + corner.direction(i, samples) * radius;
                let b = pivot + corner.direction(i + 1, samples) * radius;
                self.push_triangle(PrimitiveClass::Triangles, [v(pivot), v(a), v(b)]);
            }
        }
    }

    fn push_rounded_band(&mut self, r: Rect, color: Color, radius: f32, inner: bool, thickness: f32, samples: u32) {
        if inner && thickness > radius {
            self.push_rounded_band_square_hole(r, color, radius, thickness, samples);
            return;
        }
        let (outer_r, inner_r) = if inner { (radius, radius - thickness) } else { (radius + thickness, radius) };
        let band = outer_r - inner_r;

        let tl = Corner::TopLeft.pivot(r, radius);
        let br = Corner::BottomRight.pivot(r, radius);
        let span_w = br.x - tl.x;
        let span_h = br.y - tl.y;

        self.push_quad(Rect::new(tl.x, tl.y - outer_r, span_w, band), color);
        self.push_quad(Rect::new(tl.x, br.y + inner_r, span_w, band), color);
        self.push_quad(Rect::new(tl.x - outer_r, tl.y, band, span_h), color);
        self.push_quad(Rect::new(br.x + inner_r, tl.y, band, span_h), color);

        let v = |p: Vec2| Vertex::solid(p, color);
        for corner in Corner::ALL {
            let pivot = corner.pivot(r, radius);
            for i in 0..samples {
                let d0 = corner.direction(i, samples);
                let d1 = corner.direction(i + 1, samples);
                let (o0, o1) = (pivot + d0 * outer_r, pivot + d1 * outer_r);
                let (i0, i1) = (pivot + d0 * inner_r, pivot + d1 * inner_r);
                self.push_triangle(PrimitiveClass::Triangles, [v(o0), v(o1), v(i1)]);
                // collapses to nothing when inner_r == 0
                self.push_triangle(PrimitiveClass::Triangles, [v(o0), v(i1), v(i0)]);
            }
        }
    }

    /// Inner stroke thicker than the corner radius: the hole has square
    /// corners, so the corners are solid fans and the body between the corner
    /// rows is a rectangular frame around the hole.
    fn push_rounded_band_square_hole(&mut self, r: Rect, color: Color, radius: f32, thickness: f32, samples: u32) {
        let hole = r.inflated(-thickness);
        if hole.is_empty() {
            self.push_rounded_fill(r, color, radius, samples);
            return;
        }

        let span_w = r.width() - 2.0 * radius;
        self.push_quad(Rect::new(r.left() + radius, r.top(), span_w, radius), color);
        self.push_quad(Rect::new(r.left() + radius, r.bottom() - radius, span_w, radius), color);
        self.push_corner_fans(r, color, radius, samples);

        let body = Rect::new(r.left(), r.top() + radius, r.width(), r.height() - 2.0 * radius);
        self.push_frame(body, hole, color);
    }

    fn push_rounded_hairline(&mut self, r: Rect, color: Color, radius: f32, inner: bool, samples: u32) {
        let b = hairline_box(r, inner);
        let arc_r = (if inner { radius } else { radius + 1.0 }).min(b.width().min(b.height()) * 0.5);

        let tl = Corner::TopLeft.pivot(b, arc_r);
        let tr = Corner::TopRight.pivot(b, arc_r);
        let br = Corner::BottomRight.pivot(b, arc_r);
        let bl = Corner::BottomLeft.pivot(b, arc_r);

        self.push_line(Vec2::new(tl.x, b.top()), Vec2::new(tr.x, b.top()), color);
        self.push_line(Vec2::new(b.right(), tr.y), Vec2::new(b.right(), br.y), color);
        self.push_line(Vec2::new(br.x, b.bottom()), Vec2::new(bl.x, b.bottom()), color);
        self.push_line(Vec2::new(b.left(), bl.y), Vec2::new(b.left(), tl.y), color);

        for corner in Corner::ALL {
            let pivot = corner.pivot(b, arc_r);
            for i in 0..samples {
                let a = pivot + corner.direction(i, samples) * arc_r;
                let c = pivot + corner.direction(i + 1, samples) * arc_r;
                self.push_line(a, c, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use crate::render::{BatchConfig, Recorder};

    fn within(v: &Vertex, b: Rect) -> bool {
        let eps = 1e-4;
        v.pos[0] >= b.left() - eps && v.pos[0] <= b.right() + eps && v.pos[1] >= b.top() - eps && v.pos[1] <= b.bottom() + eps
    }

    // ── corner geometry ───────────────────────────────────────────────────

    #[test]
    fn arcs_start_and_end_on_axes() {
        for corner in Corner::ALL {
            let first = corner.direction(0, 4);
            let last = corner.direction(4, 4);
            assert_eq!(first.x.abs() + first.y.abs(), 1.0);
            assert_eq!(last.x.abs() + last.y.abs(), 1.0);
            // consecutive corners hand over on the same axis
            assert!(first.cross(last) > 0.0);
        }
        assert_eq!(Corner::TopLeft.direction(4, 4), Corner::TopRight.direction(0, 4));
    }

    #[test]
    fn mid_samples_sit_on_the_unit_circle() {
        let d = Corner::BottomRight.direction(1, 2);
        assert!(approx(d.x, (PI / 4.0).cos(), 1e-6));
        assert!(approx(d.y, (PI / 4.0).sin(), 1e-6));
    }

    // ── filled ────────────────────────────────────────────────────────────

    #[test]
    fn rounded_quad_counts_and_hygiene() {
        let rect = Rect::new(0.0, 0.0, 40.0, 40.0);
        let rec = record(|b| b.draw_rounded_quad(rect, Color::WHITE, 8.0, 4));
        let tris = rec.vertices(PrimitiveClass::Triangles);

        assert_eq!(tris.len() / 3, 6 + 4 * 4);
        assert_clean_triangles(&tris);
        assert_eq!(bounds(&tris), rect);

        // 4 wedges confined to each 8x8 corner square
        let squares = [
            Rect::new(0.0, 0.0, 8.0, 8.0),
            Rect::new(32.0, 0.0, 8.0, 8.0),
            Rect::new(32.0, 32.0, 8.0, 8.0),
            Rect::new(0.0, 32.0, 8.0, 8.0),
        ];
        for sq in squares {
            let n = tris.chunks(3).filter(|t| t.iter().all(|v| within(v, sq))).count();
            assert_eq!(n, 4, "corner {sq:?}");
        }

        // polygonal corners: each loses 64 - 2 * 64 * sin(pi/8)
        let expected = 1600.0 - 4.0 * (64.0 - 128.0 * (PI / 8.0).sin());
        assert!(approx(total_area(&tris), expected, 0.05));
    }

    #[test]
    fn zero_samples_means_one_wedge() {
        let rec = record(|b| b.draw_rounded_quad(Rect::new(0.0, 0.0, 40.0, 40.0), Color::WHITE, 8.0, 0));
        assert_eq!(rec.vertex_count(PrimitiveClass::Triangles) / 3, 6 + 4);
    }

    #[test]
    fn zero_radius_is_a_plain_quad() {
        let rect = Rect::new(3.0, 4.0, 10.0, 10.0);
        let rounded = record(|b| b.draw_rounded_quad(rect, Color::RED, 0.0, 8));
        let plain = record(|b| b.draw_quad(rect, Color::RED));
        assert_eq!(rounded.calls(), plain.calls());
    }

    #[test]
    fn half_side_radius_is_accepted() {
        let rec = record(|b| b.draw_rounded_quad(Rect::new(0.0, 0.0, 20.0, 20.0), Color::WHITE, 10.0, 4));
        let tris = rec.vertices(PrimitiveClass::Triangles);
        // central strips vanish, only wedges remain
        assert_eq!(tris.len() / 3, 16);
        assert_clean_triangles(&tris);
    }

    #[test]
    fn many_samples_stay_non_degenerate() {
        let rec = record(|b| b.draw_rounded_quad(Rect::new(0.0, 0.0, 40.0, 40.0), Color::WHITE, 8.0, 64));
        let tris = rec.vertices(PrimitiveClass::Triangles);
        assert_eq!(tris.len() / 3, 6 + 4 * 64);
        assert_clean_triangles(&tris);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn oversized_radius_is_rejected_without_geometry() {
        let mut b = PrimitiveBatch::new(Recorder::new(), BatchConfig::default()).unwrap();
        b.begin().unwrap();
        let rect = Rect::new(0.0, 0.0, 20.0, 30.0);

        let err = b.draw_rounded_quad(rect, Color::WHITE, 10.5, 4);
        assert_eq!(
            err,
            Err(RenderError::CornerRadiusTooLarge { radius: 10.5, width: 20.0, height: 30.0 })
        );
        let err = b.draw_rounded_outline(rect, Color::WHITE, 10.5, true, 2.0, 4);
        assert!(matches!(err, Err(RenderError::CornerRadiusTooLarge { .. })));

        assert_eq!(b.pending_vertices(PrimitiveClass::Triangles), 0);
        assert_eq!(b.pending_vertices(PrimitiveClass::Lines), 0);
        b.end().unwrap();
        assert!(b.backend().calls().is_empty());
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let mut b = PrimitiveBatch::new(Recorder::new(), BatchConfig::default()).unwrap();
        b.begin().unwrap();
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
        assert_eq!(
            b.draw_rounded_quad(rect, Color::WHITE, -1.0, 4),
            Err(RenderError::InvalidCornerRadius(-1.0))
        );
        assert!(matches!(
            b.draw_rounded_outline(rect, Color::WHITE, f32::NAN, false, 1.0, 4),
            Err(RenderError::InvalidCornerRadius(_))
        ));
    }

    // ── stroked ───────────────────────────────────────────────────────────

    #[test]
    fn thick_inner_rounded_outline_stays_inside() {
        let rect = Rect::new(0.0, 0.0, 40.0, 30.0);
        let rec = record(|b| b.draw_rounded_outline(rect, Color::WHITE, 8.0, true, 3.0, 4));
        let tris = rec.vertices(PrimitiveClass::Triangles);
        assert_eq!(tris.len() / 3, 4 * 2 + 4 * 4 * 2);
        assert_clean_triangles(&tris);
        assert!(tris.iter().all(|v| within(v, rect)));
        assert_eq!(bounds(&tris), rect);
    }

    #[test]
    fn thick_outer_rounded_outline_surrounds_rect() {
        let rect = Rect::new(0.0, 0.0, 40.0, 30.0);
        let rec = record(|b| b.draw_rounded_outline(rect, Color::WHITE, 8.0, false, 3.0, 4));
        let tris = rec.vertices(PrimitiveClass::Triangles);
        assert_clean_triangles(&tris);
        assert_eq!(bounds(&tris), rect.inflated(3.0));
    }

    #[test]
    fn inner_band_thicker_than_radius_keeps_full_thickness() {
        let rect = Rect::new(0.0, 0.0, 40.0, 40.0);
        let square = record(|b| b.draw_outline(rect, Color::WHITE, true, 10.0));
        assert_eq!(total_area(&square.vertices(PrimitiveClass::Triangles)), 1200.0);

        // coverage only loses the polygonal corner slivers of the outer edge
        for radius in [0.5_f32, 1.0, 2.0, 4.0, 8.0] {
            let rec = record(|b| b.draw_rounded_outline(rect, Color::WHITE, radius, true, 10.0, 4));
            let tris = rec.vertices(PrimitiveClass::Triangles);
            assert_clean_triangles(&tris);
            assert!(tris.iter().all(|v| within(v, rect)));

            let sliver = radius * radius * (1.0 - 2.0 * (PI / 8.0).sin());
            let expected = 1200.0 - 4.0 * sliver;
            let area = total_area(&tris);
            assert!(approx(area, expected, 0.05), "radius {radius}: {area} vs {expected}");
        }
    }

    #[test]
    fn inner_band_swallowing_the_rect_fills_it() {
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
        let band = record(|b| b.draw_rounded_outline(rect, Color::WHITE, 2.0, true, 10.0, 4));
        let fill = record(|b| b.draw_rounded_quad(rect, Color::WHITE, 2.0, 4));
        assert_eq!(band.calls(), fill.calls());
    }

    #[test]
    fn thin_rounded_outline_inner_vs_outer() {
        let rect = Rect::new(10.0, 10.0, 40.0, 30.0);
        let inner = record(|b| b.draw_rounded_outline(rect, Color::WHITE, 6.0, true, 1.0, 3));
        let outer = record(|b| b.draw_rounded_outline(rect, Color::WHITE, 6.0, false, 1.0, 3));

        let li = inner.vertices(PrimitiveClass::Lines);
        let lo = outer.vertices(PrimitiveClass::Lines);
        assert_eq!(li.len() / 2, 4 + 4 * 3);
        assert_eq!(lo.len() / 2, 4 + 4 * 3);
        assert_eq!(bounds(&li), Rect::new(10.0, 10.0, 39.0, 29.0));
        assert_eq!(bounds(&lo), Rect::new(9.0, 9.0, 41.0, 31.0));
        assert_eq!(inner.draw_count(PrimitiveClass::Triangles), 0);
    }

    #[test]
    fn zero_radius_outline_matches_plain_outline() {
        let rect = Rect::new(0.0, 0.0, 12.0, 12.0);
        let rounded = record(|b| b.draw_rounded_outline(rect, Color::WHITE, 0.0, false, 2.0, 4));
        let plain = record(|b| b.draw_outline(rect, Color::WHITE, false, 2.0));
        assert_eq!(rounded.calls(), plain.calls());
    }
}
