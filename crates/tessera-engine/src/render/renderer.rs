use std::ops::{Deref, DerefMut};

use bitflags::bitflags;

use crate::coords::{Rect, Vec2};
use crate::error::RenderError;
use crate::paint::Color;
use crate::text::TextBackend;

use super::backend::GpuBackend;
use super::batch::{BatchConfig, FrameStats, PrimitiveBatch};
use super::stack::FloorStack;

bitflags! {
    /// How [`Renderer::draw_bounds`] strokes a rectangle.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct BorderStyle: u8 {
        /// Without this flag nothing is drawn.
        const VISIBLE = 1 << 0;
        /// Stroke inside the bounds instead of around them.
        const INNER   = 1 << 1;
        /// Two pixels instead of one.
        const THICK   = 1 << 2;
    }
}

impl BorderStyle {
    #[inline]
    pub fn thickness(self) -> f32 {
        if self.contains(BorderStyle::THICK) { 2.0 } else { 1.0 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RendererConfig {
    pub batch: BatchConfig,
    /// Whole render target in logical pixels; the floor of the clip and viewport stacks.
    pub target: Rect,
}

impl RendererConfig {
    pub fn new(target: Rect) -> Self {
        Self { batch: BatchConfig::default(), target }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new(Rect::new(0.0, 0.0, 800.0, 600.0))
    }
}

/// Drawing façade for widget code.
///
/// Owns the primitive batch and the text backend and keeps three save/restore
/// stacks:
/// - offset: translation applied to every shape and text position; a push
///   *replaces* the active offset
/// - clip: scissor rectangle
/// - viewport: target region that geometry coordinates are relative to
///
/// Clip and viewport pushes are relative to the active viewport's origin and
/// take effect on the backend immediately, after flushing whatever was drawn
/// under the previous state.
pub struct Renderer<B: GpuBackend, T: TextBackend> {
    batch: PrimitiveBatch<B>,
    text: T,

    offsets: FloorStack<Vec2>,
    clips: FloorStack<Rect>,
    viewports: FloorStack<Rect>,

    frame_active: bool,
}

impl<B: GpuBackend, T: TextBackend> Renderer<B, T> {
    pub fn new(backend: B, text: T, config: RendererConfig) -> Result<Self, RenderError> {
        let batch = PrimitiveBatch::new(backend, config.batch)?;
        log::debug!("renderer initialized for target {:?}", config.target);

        Ok(Self {
            batch,
            text,
            offsets: FloorStack::new(Vec2::zero()),
            clips: FloorStack::new(config.target),
            viewports: FloorStack::new(config.target),
            frame_active: false,
        })
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Opens the batch and text sessions and re-installs the active viewport
    /// and scissor.
    pub fn start_frame(&mut self) -> Result<(), RenderError> {
        if self.frame_active {
            log::warn!("Renderer::start_frame called while a frame is active");
            return Err(RenderError::FrameActive);
        }
        self.batch.begin()?;
        self.text.begin();
        self.frame_active = true;

        self.install_viewport();
        self.install_clip();
        Ok(())
    }

    /// Draws all pending shapes, then all pending text.
    pub fn end_frame(&mut self) -> Result<(), RenderError> {
        self.ensure_frame()?;
        self.batch.end()?;
        self.text.end(self.batch.backend_mut());
        self.frame_active = false;

        let stats = self.batch.stats();
        log::trace!("frame: {} draw calls, {} vertices", stats.total_draw_calls(), stats.total_vertices());
        Ok(())
    }

    /// Draws everything pending without closing the frame. Text drawn before
    /// the flush ends up below shapes drawn after it.
    pub fn flush(&mut self) -> Result<(), RenderError> {
        self.ensure_frame()?;
        self.flush_pending();
        Ok(())
    }

    #[inline]
    pub fn is_frame_active(&self) -> bool {
        self.frame_active
    }

    fn flush_pending(&mut self) {
        self.batch.flush();
        self.text.end(self.batch.backend_mut());
        self.text.begin();
    }

    #[inline]
    fn ensure_frame(&self) -> Result<(), RenderError> {
        if self.frame_active { Ok(()) } else { Err(RenderError::NoFrame) }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    pub fn fill_bounds(&mut self, rect: Rect, color: Color) -> Result<(), RenderError> {
        self.ensure_frame()?;
        self.batch.draw_quad(rect.translated(self.offsets.peek()), color)
    }

    pub fn draw_bounds(&mut self, rect: Rect, color: Color, style: BorderStyle) -> Result<(), RenderError> {
        self.ensure_frame()?;
        if !style.contains(BorderStyle::VISIBLE) {
            return Ok(());
        }
        self.batch.draw_outline(
            rect.translated(self.offsets.peek()),
            color,
            style.contains(BorderStyle::INNER),
            style.thickness(),
        )
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, color: Color, radius: f32, samples: u32) -> Result<(), RenderError> {
        self.ensure_frame()?;
        self.batch.draw_rounded_quad(rect.translated(self.offsets.peek()), color, radius, samples)
    }

    pub fn draw_rounded_rect(
        &mut self,
        rect: Rect,
        color: Color,
        radius: f32,
        inner: bool,
        thickness: f32,
        samples: u32,
    ) -> Result<(), RenderError> {
        self.ensure_frame()?;
        self.batch.draw_rounded_outline(rect.translated(self.offsets.peek()), color, radius, inner, thickness, samples)
    }

    pub fn draw_line(&mut self, a: Vec2, b: Vec2, color: Color) -> Result<(), RenderError> {
        self.ensure_frame()?;
        let off = self.offsets.peek();
        self.batch.draw_line(a + off, b + off, color)
    }

    /// Queues `text` with its line box's top-left at `position`.
    pub fn draw_text(&mut self, font: &T::Font, text: &str, position: Vec2, color: Color) -> Result<(), RenderError> {
        self.ensure_frame()?;
        self.text.draw_text(font, text, position + self.offsets.peek(), color);
        Ok(())
    }

    // ── offset stack ──────────────────────────────────────────────────────

    /// Replaces the active offset with `offset`; callers that nest pass an
    /// already-summed value.
    pub fn push_offset(&mut self, offset: Vec2) {
        self.offsets.push(offset);
    }

    pub fn pop_offset(&mut self) -> Vec2 {
        self.offsets.pop()
    }

    pub fn peek_offset(&self) -> Vec2 {
        self.offsets.peek()
    }

    // ── clip stack ────────────────────────────────────────────────────────

    /// Installs `rect` (relative to the active viewport) as the scissor.
    pub fn push_clip(&mut self, rect: Rect) {
        let abs = rect.translated(self.viewports.peek().origin);
        self.before_state_change();
        self.clips.push(abs);
        self.install_clip();
    }

    /// Restores the previous scissor and returns it (absolute).
    pub fn pop_clip(&mut self) -> Rect {
        self.before_state_change();
        let clip = self.clips.pop();
        self.install_clip();
        clip
    }

    /// Active scissor rectangle in absolute target coordinates.
    pub fn peek_clip(&self) -> Rect {
        self.clips.peek()
    }

    // ── viewport stack ────────────────────────────────────────────────────

    /// Installs `rect` (relative to the active viewport) as the viewport.
    pub fn push_viewport(&mut self, rect: Rect) {
        let abs = rect.translated(self.viewports.peek().origin);
        self.before_state_change();
        self.viewports.push(abs);
        self.install_viewport();
    }

    pub fn pop_viewport(&mut self) -> Rect {
        self.before_state_change();
        let viewport = self.viewports.pop();
        self.install_viewport();
        viewport
    }

    pub fn peek_viewport(&self) -> Rect {
        self.viewports.peek()
    }

    fn before_state_change(&mut self) {
        if self.frame_active {
            self.flush_pending();
        }
    }

    fn install_clip(&mut self) {
        if self.frame_active {
            let clip = self.clips.peek();
            self.batch.backend_mut().set_scissor(clip);
        }
    }

    fn install_viewport(&mut self) {
        if self.frame_active {
            let viewport = self.viewports.peek();
            self.batch.backend_mut().set_viewport(viewport);
        }
    }

    // ── scoped state ──────────────────────────────────────────────────────

    /// Pushes `offset` until the returned guard is dropped.
    pub fn scoped_offset(&mut self, offset: Vec2) -> Scope<'_, B, T> {
        self.push_offset(offset);
        Scope { renderer: self, kind: ScopeKind::Offset }
    }

    pub fn scoped_clip(&mut self, rect: Rect) -> Scope<'_, B, T> {
        self.push_clip(rect);
        Scope { renderer: self, kind: ScopeKind::Clip }
    }

    pub fn scoped_viewport(&mut self, rect: Rect) -> Scope<'_, B, T> {
        self.push_viewport(rect);
        Scope { renderer: self, kind: ScopeKind::Viewport }
    }

    // ── target ────────────────────────────────────────────────────────────

    /// New render target size: every stack is reset to its floor.
    pub fn resize(&mut self, target: Rect) {
        if self.offsets.depth() + self.clips.depth() + self.viewports.depth() > 0 {
            log::warn!("Renderer::resize with unbalanced pushes; nested state discarded");
        }
        self.before_state_change();
        self.offsets.reset(Vec2::zero());
        self.clips.reset(target);
        self.viewports.reset(target);
        self.install_viewport();
        self.install_clip();
        log::debug!("render target resized to {target:?}");
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn stats(&self) -> FrameStats {
        self.batch.stats()
    }

    pub fn batch(&self) -> &PrimitiveBatch<B> {
        &self.batch
    }

    pub fn backend(&self) -> &B {
        self.batch.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.batch.backend_mut()
    }

    pub fn text(&self) -> &T {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut T {
        &mut self.text
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ScopeKind {
    Offset,
    Clip,
    Viewport,
}

/// Guard returned by the `Renderer::scoped_*` methods.
///
/// Derefs to the renderer and pops the pushed entry when dropped, including
/// on early return and unwinding.
pub struct Scope<'r, B: GpuBackend, T: TextBackend> {
    renderer: &'r mut Renderer<B, T>,
    kind: ScopeKind,
}

impl<B: GpuBackend, T: TextBackend> Deref for Scope<'_, B, T> {
    type Target = Renderer<B, T>;

    fn deref(&self) -> &Self::Target {
        &*self.renderer
    }
}

impl<B: GpuBackend, T: TextBackend> DerefMut for Scope<'_, B, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.renderer
    }
}

impl<B: GpuBackend, T: TextBackend> Drop for Scope<'_, B, T> {
    fn drop(&mut self) {
        match self.kind {
            ScopeKind::Offset => {
                self.renderer.pop_offset();
            }
            ScopeKind::Clip => {
                self.renderer.pop_clip();
            }
            ScopeKind::Viewport => {
                self.renderer.pop_viewport();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BackendCall, PrimitiveClass, Recorder, Vertex};

    const TARGET: Rect = Rect::new(0.0, 0.0, 640.0, 480.0);

    /// Text backend that paints one marker triangle per session with text in it.
    #[derive(Default)]
    struct MockText {
        pending: Vec<(String, Vec2)>,
        drawn: Vec<(String, Vec2)>,
        sessions: usize,
    }

    impl TextBackend for MockText {
        type Font = ();

        fn begin(&mut self) {
            self.sessions += 1;
        }

        fn draw_text(&mut self, _font: &(), text: &str, position: Vec2, _color: Color) {
            self.pending.push((text.to_owned(), position));
        }

        fn end(&mut self, gpu: &mut dyn GpuBackend) {
            if self.pending.is_empty() {
                return;
            }
            let v = |x, y| Vertex::solid(Vec2::new(x, y), Color::WHITE);
            gpu.draw(PrimitiveClass::TexturedTriangles, &[v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)]);
            self.drawn.append(&mut self.pending);
        }
    }

    type TestRenderer = Renderer<Recorder, MockText>;

    fn renderer() -> TestRenderer {
        Renderer::new(Recorder::new(), MockText::default(), RendererConfig::new(TARGET)).unwrap()
    }

    fn in_frame() -> TestRenderer {
        let mut r = renderer();
        r.start_frame().unwrap();
        r.backend_mut().clear();
        r
    }

    fn bounds(verts: &[Vertex]) -> Rect {
        let min_x = verts.iter().map(|v| v.pos[0]).fold(f32::INFINITY, f32::min);
        let min_y = verts.iter().map(|v| v.pos[1]).fold(f32::INFINITY, f32::min);
        let max_x = verts.iter().map(|v| v.pos[0]).fold(f32::NEG_INFINITY, f32::max);
        let max_y = verts.iter().map(|v| v.pos[1]).fold(f32::NEG_INFINITY, f32::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    // ── frame protocol ────────────────────────────────────────────────────

    #[test]
    fn start_frame_installs_viewport_and_scissor() {
        let mut r = renderer();
        r.start_frame().unwrap();
        assert_eq!(
            r.backend().calls(),
            &[BackendCall::Viewport(TARGET), BackendCall::Scissor(TARGET)]
        );
    }

    #[test]
    fn frame_protocol_misuse_is_reported() {
        let mut r = renderer();
        assert_eq!(r.fill_bounds(TARGET, Color::RED), Err(RenderError::NoFrame));
        assert_eq!(r.draw_text(&(), "x", Vec2::zero(), Color::RED), Err(RenderError::NoFrame));
        assert_eq!(r.end_frame(), Err(RenderError::NoFrame));
        assert_eq!(r.flush(), Err(RenderError::NoFrame));

        r.start_frame().unwrap();
        assert_eq!(r.start_frame(), Err(RenderError::FrameActive));
        r.end_frame().unwrap();
        assert!(!r.is_frame_active());
    }

    #[test]
    fn text_paints_over_shapes_at_end_frame() {
        let mut r = in_frame();
        r.draw_text(&(), "label", Vec2::new(1.0, 2.0), Color::WHITE).unwrap();
        r.fill_bounds(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED).unwrap();
        r.end_frame().unwrap();

        let order: Vec<PrimitiveClass> = r.backend().draws().map(|(c, _)| c).collect();
        assert_eq!(order, vec![PrimitiveClass::Triangles, PrimitiveClass::TexturedTriangles]);
    }

    #[test]
    fn mid_frame_flush_interleaves_text() {
        let mut r = in_frame();
        r.fill_bounds(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED).unwrap();
        r.draw_text(&(), "a", Vec2::zero(), Color::WHITE).unwrap();
        r.flush().unwrap();
        r.fill_bounds(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLUE).unwrap();
        r.end_frame().unwrap();

        let order: Vec<PrimitiveClass> = r.backend().draws().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![PrimitiveClass::Triangles, PrimitiveClass::TexturedTriangles, PrimitiveClass::Triangles]
        );
        // flush ended and restarted the text session
        assert_eq!(r.text().sessions, 2);
    }

    // ── offset ────────────────────────────────────────────────────────────

    #[test]
    fn fill_bounds_lands_at_rect_plus_offset() {
        let mut r = in_frame();
        r.push_offset(Vec2::new(3.0, -4.0));
        r.fill_bounds(Rect::new(10.0, 20.0, 30.0, 40.0), Color::RED).unwrap();
        r.end_frame().unwrap();

        let verts = r.backend().vertices(PrimitiveClass::Triangles);
        assert_eq!(bounds(&verts), Rect::new(13.0, 16.0, 30.0, 40.0));
    }

    #[test]
    fn offset_push_replaces_rather_than_accumulates() {
        let mut r = in_frame();
        r.push_offset(Vec2::new(5.0, 5.0));
        r.push_offset(Vec2::new(10.0, 10.0));
        r.fill_bounds(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED).unwrap();
        r.end_frame().unwrap();

        let verts = r.backend().vertices(PrimitiveClass::Triangles);
        assert_eq!(bounds(&verts).origin, Vec2::new(10.0, 10.0));
        assert_eq!(r.pop_offset(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn text_and_lines_follow_offset() {
        let mut r = in_frame();
        r.push_offset(Vec2::new(7.0, 8.0));
        r.draw_text(&(), "hi", Vec2::new(1.0, 1.0), Color::WHITE).unwrap();
        r.draw_line(Vec2::zero(), Vec2::new(4.0, 0.0), Color::WHITE).unwrap();
        r.end_frame().unwrap();

        assert_eq!(r.text().drawn, vec![("hi".to_owned(), Vec2::new(8.0, 9.0))]);
        let lines = r.backend().vertices(PrimitiveClass::Lines);
        assert_eq!(lines[0].pos, [7.0, 8.0]);
        assert_eq!(lines[1].pos, [11.0, 8.0]);
    }

    #[test]
    fn pops_below_floor_return_the_floor() {
        let mut r = renderer();
        for _ in 0..3 {
            assert_eq!(r.pop_offset(), Vec2::zero());
            assert_eq!(r.pop_clip(), TARGET);
            assert_eq!(r.pop_viewport(), TARGET);
        }

        r.push_offset(Vec2::new(1.0, 1.0));
        assert_eq!(r.peek_offset(), Vec2::new(1.0, 1.0));
        assert_eq!(r.pop_offset(), Vec2::zero());
    }

    // ── clip / viewport ───────────────────────────────────────────────────

    #[test]
    fn clip_is_relative_to_viewport_origin() {
        let mut r = in_frame();
        r.push_viewport(Rect::new(100.0, 50.0, 200.0, 200.0));
        r.push_clip(Rect::new(10.0, 10.0, 20.0, 20.0));

        let expected = Rect::new(110.0, 60.0, 20.0, 20.0);
        assert_eq!(r.peek_clip(), expected);
        assert_eq!(r.backend().calls().last(), Some(&BackendCall::Scissor(expected)));
    }

    #[test]
    fn nested_viewports_compose_origins() {
        let mut r = renderer();
        r.push_viewport(Rect::new(100.0, 100.0, 300.0, 300.0));
        r.push_viewport(Rect::new(10.0, 20.0, 50.0, 50.0));
        assert_eq!(r.peek_viewport(), Rect::new(110.0, 120.0, 50.0, 50.0));
        assert_eq!(r.pop_viewport(), Rect::new(100.0, 100.0, 300.0, 300.0));
    }

    #[test]
    fn state_change_flushes_pending_geometry_first() {
        let mut r = in_frame();
        r.fill_bounds(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED).unwrap();
        let viewport = Rect::new(20.0, 20.0, 100.0, 100.0);
        r.push_viewport(viewport);

        let calls = r.backend().calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], BackendCall::Draw { class: PrimitiveClass::Triangles, .. }));
        assert_eq!(calls[1], BackendCall::Viewport(viewport));

        r.pop_viewport();
        assert_eq!(r.backend().calls().last(), Some(&BackendCall::Viewport(TARGET)));
    }

    #[test]
    fn stack_changes_outside_frame_only_touch_state() {
        let mut r = renderer();
        r.push_clip(Rect::new(1.0, 1.0, 5.0, 5.0));
        assert!(r.backend().calls().is_empty());

        r.start_frame().unwrap();
        assert_eq!(r.backend().calls().last(), Some(&BackendCall::Scissor(Rect::new(1.0, 1.0, 5.0, 5.0))));
    }

    // ── scopes ────────────────────────────────────────────────────────────

    #[test]
    fn scoped_offset_restores_on_drop() {
        let mut r = in_frame();
        r.push_offset(Vec2::new(2.0, 2.0));
        {
            let mut s = r.scoped_offset(Vec2::new(-50.0, 0.0));
            s.fill_bounds(Rect::new(60.0, 0.0, 5.0, 5.0), Color::RED).unwrap();
            assert_eq!(s.peek_offset(), Vec2::new(-50.0, 0.0));
        }
        assert_eq!(r.peek_offset(), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn scoped_offset_restores_on_early_error() {
        fn children(r: &mut TestRenderer) -> Result<(), RenderError> {
            let mut s = r.scoped_offset(Vec2::new(0.0, -30.0));
            // radius too large for the rect
            s.fill_rounded_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED, 6.0, 4)?;
            s.fill_bounds(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED)
        }

        let mut r = in_frame();
        assert!(matches!(children(&mut r), Err(RenderError::CornerRadiusTooLarge { .. })));
        assert_eq!(r.peek_offset(), Vec2::zero());
        assert_eq!(r.batch().pending_vertices(PrimitiveClass::Triangles), 0);
    }

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut r = in_frame();
        {
            let mut clip = r.scoped_clip(Rect::new(0.0, 0.0, 50.0, 50.0));
            {
                let mut vp = clip.scoped_viewport(Rect::new(5.0, 5.0, 40.0, 40.0));
                let off = vp.scoped_offset(Vec2::new(0.0, -10.0));
                assert_eq!(off.peek_viewport(), Rect::new(5.0, 5.0, 40.0, 40.0));
            }
            assert_eq!(clip.peek_viewport(), TARGET);
            assert_eq!(clip.peek_clip(), Rect::new(0.0, 0.0, 50.0, 50.0));
        }
        assert_eq!(r.peek_clip(), TARGET);
        assert_eq!(r.backend().calls().last(), Some(&BackendCall::Scissor(TARGET)));
    }

    // ── borders ───────────────────────────────────────────────────────────

    #[test]
    fn border_style_selects_outline() {
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
        let mut r = in_frame();
        r.draw_bounds(rect, Color::WHITE, BorderStyle::INNER).unwrap();
        r.end_frame().unwrap();
        assert!(r.backend().calls().is_empty());

        let mut r = in_frame();
        r.draw_bounds(rect, Color::WHITE, BorderStyle::VISIBLE | BorderStyle::INNER).unwrap();
        r.end_frame().unwrap();
        assert_eq!(bounds(&r.backend().vertices(PrimitiveClass::Lines)), Rect::new(0.0, 0.0, 19.0, 19.0));

        let mut r = in_frame();
        r.draw_bounds(rect, Color::WHITE, BorderStyle::VISIBLE | BorderStyle::THICK).unwrap();
        r.end_frame().unwrap();
        assert_eq!(bounds(&r.backend().vertices(PrimitiveClass::Triangles)), rect.inflated(2.0));
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_reseeds_floors() {
        let mut r = renderer();
        r.push_offset(Vec2::new(1.0, 1.0));
        r.push_clip(Rect::new(0.0, 0.0, 5.0, 5.0));
        let target = Rect::new(0.0, 0.0, 1024.0, 768.0);
        r.resize(target);
        assert_eq!(r.peek_offset(), Vec2::zero());
        assert_eq!(r.peek_clip(), target);
        assert_eq!(r.pop_viewport(), target);
    }
}
