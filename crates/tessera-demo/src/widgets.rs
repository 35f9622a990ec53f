//! Demo widget tree. Widgets decide what to draw; `Renderer` decides how.

use tessera_engine::coords::{Rect, Vec2};
use tessera_engine::paint::Color;
use tessera_engine::render::{BorderStyle, GpuBackend, Renderer};
use tessera_engine::text::{GlyphBatch, TextFont};
use tessera_engine::RenderError;

type UiRenderer<B> = Renderer<B, GlyphBatch>;

const SCROLLBAR_WIDTH: f32 = 8.0;
const SCROLLBAR_RADIUS: f32 = 4.0;
const MIN_THUMB: f32 = 16.0;

pub enum Node {
    Panel(Panel),
    Scroll(ScrollPanel),
    Label(Label),
}

impl Node {
    pub fn draw<B: GpuBackend>(&self, r: &mut UiRenderer<B>, font: Option<&TextFont>) -> Result<(), RenderError> {
        match self {
            Node::Panel(p) => p.draw(r, font),
            Node::Scroll(s) => s.draw(r, font),
            Node::Label(l) => l.draw(r, font),
        }
    }

    /// Scrolls the innermost scroll panel under `pos`. Returns whether one
    /// took the delta.
    pub fn scroll_at(&mut self, pos: Vec2, delta: f32) -> bool {
        match self {
            Node::Panel(p) => scroll_children(&mut p.children, pos, delta),
            Node::Scroll(s) if s.bounds.contains(pos) => {
                // children live in content space
                let content_pos = pos + Vec2::new(0.0, s.scroll);
                if !scroll_children(&mut s.children, content_pos, delta) {
                    s.scroll_by(delta);
                }
                true
            }
            _ => false,
        }
    }
}

fn scroll_children(children: &mut [Node], pos: Vec2, delta: f32) -> bool {
    children.iter_mut().any(|c| c.scroll_at(pos, delta))
}

pub struct Panel {
    pub bounds: Rect,
    pub fill: Color,
    pub border: Color,
    pub style: BorderStyle,
    /// Zero for square corners.
    pub radius: f32,
    pub samples: u32,
    pub children: Vec<Node>,
}

impl Panel {
    fn draw<B: GpuBackend>(&self, r: &mut UiRenderer<B>, font: Option<&TextFont>) -> Result<(), RenderError> {
        if self.radius > 0.0 {
            r.fill_rounded_rect(self.bounds, self.fill, self.radius, self.samples)?;
            if self.style.contains(BorderStyle::VISIBLE) {
                r.draw_rounded_rect(
                    self.bounds,
                    self.border,
                    self.radius,
                    self.style.contains(BorderStyle::INNER),
                    self.style.thickness(),
                    self.samples,
                )?;
            }
        } else {
            r.fill_bounds(self.bounds, self.fill)?;
            r.draw_bounds(self.bounds, self.border, self.style)?;
        }

        for child in &self.children {
            child.draw(r, font)?;
        }
        Ok(())
    }
}

/// Vertically scrolling container.
///
/// Children are laid out in content space (`bounds.top()` is content y = 0)
/// and drawn with the offset shifted by `-scroll`, clipped to the bounds.
pub struct ScrollPanel {
    pub bounds: Rect,
    pub fill: Color,
    pub content_height: f32,
    pub scroll: f32,
    pub samples: u32,
    pub children: Vec<Node>,
}

impl ScrollPanel {
    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.bounds.height()).max(0.0)
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll = (self.scroll + delta).clamp(0.0, self.max_scroll());
    }

    fn draw<B: GpuBackend>(&self, r: &mut UiRenderer<B>, font: Option<&TextFont>) -> Result<(), RenderError> {
        r.fill_bounds(self.bounds, self.fill)?;

        let base = r.peek_offset();
        {
            let mut clip = r.scoped_clip(self.bounds.translated(base));
            // offsets replace, so pass the summed value
            let mut content = clip.scoped_offset(base - Vec2::new(0.0, self.scroll));
            for child in &self.children {
                child.draw(&mut *content, font)?;
            }
        }

        self.draw_scrollbar(r)
    }

    fn draw_scrollbar<B: GpuBackend>(&self, r: &mut UiRenderer<B>) -> Result<(), RenderError> {
        let max = self.max_scroll();
        if max <= 0.0 {
            return Ok(());
        }

        let b = self.bounds;
        let track = Rect::new(b.right() - SCROLLBAR_WIDTH - 2.0, b.top() + 2.0, SCROLLBAR_WIDTH, b.height() - 4.0);
        let thumb_h = (track.height() * b.height() / self.content_height).max(MIN_THUMB).min(track.height());
        let thumb_y = track.top() + (track.height() - thumb_h) * (self.scroll / max);
        let thumb = Rect::new(track.left(), thumb_y, SCROLLBAR_WIDTH, thumb_h);

        r.fill_rounded_rect(track, Color::from_srgb_u8(0, 0, 0, 60), SCROLLBAR_RADIUS, self.samples)?;
        r.fill_rounded_rect(thumb, Color::from_srgb_u8(200, 200, 210, 220), SCROLLBAR_RADIUS, self.samples)?;
        r.draw_rounded_rect(thumb, Color::DARK_GRAY, SCROLLBAR_RADIUS, true, 1.0, self.samples)
    }
}

pub struct Label {
    pub position: Vec2,
    pub text: String,
    pub color: Color,
}

impl Label {
    fn draw<B: GpuBackend>(&self, r: &mut UiRenderer<B>, font: Option<&TextFont>) -> Result<(), RenderError> {
        match font {
            Some(f) => r.draw_text(f, &self.text, self.position, self.color),
            None => Ok(()),
        }
    }
}

fn label(x: f32, y: f32, text: impl Into<String>, color: Color) -> Node {
    Node::Label(Label { position: Vec2::new(x, y), text: text.into(), color })
}

/// The demo scene for a `size` logical-pixel target.
pub fn build_ui(size: (f32, f32), samples: u32) -> Node {
    let (w, h) = size;
    let bg = Color::from_srgb_u8(30, 32, 38, 255);
    let card = Color::from_srgb_u8(48, 52, 62, 255);
    let text = Color::from_srgb_u8(230, 232, 240, 255);

    let list_bounds = Rect::new(24.0, 72.0, w * 0.5 - 36.0, h - 96.0);
    let row_h = 36.0;
    let rows: Vec<Node> = (0..40)
        .map(|i| {
            let top = list_bounds.top() + 4.0 + i as f32 * row_h;
            let row = Rect::new(list_bounds.left() + 4.0, top, list_bounds.width() - 24.0, row_h - 4.0);
            let fill = if i % 2 == 0 { card } else { Color::from_srgb_u8(56, 60, 72, 255) };
            Node::Panel(Panel {
                bounds: row,
                fill,
                border: Color::from_srgb_u8(90, 96, 110, 255),
                style: BorderStyle::VISIBLE | BorderStyle::INNER,
                radius: 0.0,
                samples,
                children: vec![label(row.left() + 10.0, row.top() + 7.0, format!("row {i}"), text)],
            })
        })
        .collect();

    let side = Rect::new(w * 0.5 + 12.0, 72.0, w * 0.5 - 36.0, h - 96.0);
    let button = Rect::new(side.left() + 24.0, side.top() + 24.0, 160.0, 40.0);
    let badge = Rect::new(side.left() + 24.0, side.top() + 96.0, 48.0, 48.0);

    Node::Panel(Panel {
        bounds: Rect::new(0.0, 0.0, w, h),
        fill: bg,
        border: Color::TRANSPARENT,
        style: BorderStyle::empty(),
        radius: 0.0,
        samples,
        children: vec![
            label(24.0, 24.0, "tessera", text),
            Node::Scroll(ScrollPanel {
                bounds: list_bounds,
                fill: Color::from_srgb_u8(36, 38, 46, 255),
                content_height: rows.len() as f32 * row_h + 8.0,
                scroll: 0.0,
                samples,
                children: rows,
            }),
            Node::Panel(Panel {
                bounds: side,
                fill: card,
                border: Color::from_srgb_u8(120, 128, 150, 255),
                style: BorderStyle::VISIBLE | BorderStyle::THICK,
                radius: 12.0,
                samples,
                children: vec![
                    Node::Panel(Panel {
                        bounds: button,
                        fill: Color::CORNFLOWER_BLUE,
                        border: Color::WHITE,
                        style: BorderStyle::VISIBLE | BorderStyle::INNER,
                        radius: 8.0,
                        samples,
                        children: vec![label(button.left() + 16.0, button.top() + 10.0, "rounded", Color::WHITE)],
                    }),
                    Node::Panel(Panel {
                        bounds: badge,
                        fill: Color::from_srgb_u8(220, 90, 80, 255),
                        border: Color::BLACK,
                        style: BorderStyle::VISIBLE,
                        radius: 24.0,
                        samples,
                        children: Vec::new(),
                    }),
                ],
            }),
        ],
    })
}
