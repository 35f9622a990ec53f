use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle spanning two corners given in any order.
    #[inline]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let x0 = a.x.min(b.x);
        let y0 = a.y.min(b.y);
        Rect::new(x0, y0, a.x.max(b.x) - x0, a.y.max(b.y) - y0)
    }

    #[inline]
    pub fn left(self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.left() && p.y >= r.top() && p.x < r.right() && p.y < r.bottom()
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let x0 = a.left().max(b.left());
        let y0 = a.top().max(b.top());
        let x1 = a.right().min(b.right());
        let y1 = a.bottom().min(b.bottom());

        if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }

    #[inline]
    pub fn translated(self, by: Vec2) -> Rect {
        Rect::from_origin_size(self.origin + by, self.size)
    }

    /// Grows the rectangle by `amount` on every side; a negative amount shrinks it.
    ///
    /// Shrinking never produces a negative size: the result collapses onto the center.
    #[inline]
    pub fn inflated(self, amount: f32) -> Rect {
        let r = self.normalized();
        let w = r.size.x + amount * 2.0;
        let h = r.size.y + amount * 2.0;
        let cx = r.origin.x + r.size.x * 0.5;
        let cy = r.origin.y + r.size.y * 0.5;
        let w = w.max(0.0);
        let h = h.max(0.0);
        Rect::new(cx - w * 0.5, cy - h * 0.5, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── edges ─────────────────────────────────────────────────────────────

    #[test]
    fn edges_follow_origin_and_size() {
        let rect = r(2.0, 3.0, 10.0, 20.0);
        assert_eq!(rect.left(), 2.0);
        assert_eq!(rect.top(), 3.0);
        assert_eq!(rect.right(), 12.0);
        assert_eq!(rect.bottom(), 23.0);
    }

    #[test]
    fn from_corners_orders_points() {
        let rect = Rect::from_corners(Vec2::new(10.0, 8.0), Vec2::new(4.0, 2.0));
        assert_eq!(rect, r(4.0, 2.0, 6.0, 6.0));
    }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_negative_extent() {
        let n = r(10.0, 10.0, -4.0, -3.0).normalized();
        assert_eq!(n, r(6.0, 7.0, 4.0, 3.0));
    }

    // ── contains / intersect ──────────────────────────────────────────────

    #[test]
    fn contains_is_half_open() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(5.0, 5.0)));
        assert!(!rect.contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn intersect_overlapping() {
        let i = r(0.0, 0.0, 10.0, 10.0).intersect(r(5.0, 5.0, 10.0, 10.0));
        assert_eq!(i, Some(r(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        assert!(r(0.0, 0.0, 10.0, 10.0).intersect(r(10.0, 0.0, 10.0, 10.0)).is_none());
    }

    // ── translated / inflated ─────────────────────────────────────────────

    #[test]
    fn translated_moves_origin_only() {
        let t = r(1.0, 1.0, 4.0, 4.0).translated(Vec2::new(10.0, -1.0));
        assert_eq!(t, r(11.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn inflated_grows_every_side() {
        assert_eq!(r(10.0, 10.0, 20.0, 10.0).inflated(2.0), r(8.0, 8.0, 24.0, 14.0));
    }

    #[test]
    fn deflating_past_center_collapses() {
        let d = r(0.0, 0.0, 10.0, 4.0).inflated(-3.0);
        assert_eq!(d, r(3.0, 2.0, 4.0, 0.0));
        assert!(d.is_empty());
    }
}
