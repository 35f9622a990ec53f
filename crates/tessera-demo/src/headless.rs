use anyhow::{Context, Result};
use tessera_engine::coords::Rect;
use tessera_engine::render::{BackendCall, PrimitiveClass, Recorder, Renderer, RendererConfig};
use tessera_engine::text::GlyphBatch;

use crate::widgets::build_ui;
use crate::{load_fonts, DemoConfig};

/// Renders one frame of the demo scene into a [`Recorder`] and logs what the
/// GPU would have been asked to do.
pub fn run(config: &DemoConfig) -> Result<()> {
    let (fonts, font) = load_fonts();
    let (w, h) = config.size;

    let mut renderer = Renderer::new(
        Recorder::new(),
        GlyphBatch::new(fonts),
        RendererConfig::new(Rect::new(0.0, 0.0, w, h)),
    )
    .context("failed to create renderer")?;

    let ui = build_ui(config.size, config.samples);

    renderer.start_frame()?;
    let drawn = ui.draw(&mut renderer, font.as_ref());
    renderer.end_frame()?;
    drawn.context("demo scene failed to draw")?;

    let stats = renderer.stats();
    for class in PrimitiveClass::FLUSH_ORDER {
        log::info!(
            "{class:?}: {} draw calls, {} vertices",
            stats.draw_calls(class),
            stats.vertices(class)
        );
    }

    let rec = renderer.backend();
    let state_changes = rec
        .calls()
        .iter()
        .filter(|c| matches!(c, BackendCall::Viewport(_) | BackendCall::Scissor(_)))
        .count();
    let atlas_uploads = rec
        .calls()
        .iter()
        .filter(|c| matches!(c, BackendCall::Atlas { .. }))
        .count();

    log::info!(
        "frame: {} backend calls ({} state changes, {} atlas uploads), {} glyph quads cached",
        rec.calls().len(),
        state_changes,
        atlas_uploads,
        renderer.text().cached_glyphs()
    );
    Ok(())
}
