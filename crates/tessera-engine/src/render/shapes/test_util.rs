use crate::coords::Rect;
use crate::error::RenderError;
use crate::render::batch::tests::area2;
use crate::render::{BatchConfig, PrimitiveBatch, Recorder, Vertex};

/// Runs `f` inside one batch session and returns what reached the backend.
pub(super) fn record<F>(f: F) -> Recorder
where
    F: FnOnce(&mut PrimitiveBatch<Recorder>) -> Result<(), RenderError>,
{
    let mut batch = PrimitiveBatch::new(Recorder::new(), BatchConfig::default()).unwrap();
    batch.begin().unwrap();
    f(&mut batch).unwrap();
    batch.end().unwrap();
    batch.into_backend()
}

/// Bounding box of a vertex list.
pub(super) fn bounds(verts: &[Vertex]) -> Rect {
    let (mut x0, mut y0) = (f32::INFINITY, f32::INFINITY);
    let (mut x1, mut y1) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for v in verts {
        x0 = x0.min(v.pos[0]);
        y0 = y0.min(v.pos[1]);
        x1 = x1.max(v.pos[0]);
        y1 = y1.max(v.pos[1]);
    }
    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Summed area of a triangle list.
pub(super) fn total_area(verts: &[Vertex]) -> f32 {
    verts.chunks(3).map(|t| area2(t) * 0.5).sum()
}

/// Asserts every triangle is wound the same way and has non-zero area.
pub(super) fn assert_clean_triangles(verts: &[Vertex]) {
    assert_eq!(verts.len() % 3, 0);
    for tri in verts.chunks(3) {
        assert!(area2(tri) > 0.0, "bad triangle {tri:?}");
    }
}

pub(super) fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
