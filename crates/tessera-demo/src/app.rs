use std::sync::Arc;

use anyhow::{Context, Result};
use tessera_engine::coords::{Rect, Vec2};
use tessera_engine::device::{Gpu, GpuInit, SurfaceErrorAction};
use tessera_engine::paint::Color;
use tessera_engine::render::{BatchConfig, RenderCtx, RenderTarget, Renderer, RendererConfig, WgpuBackend};
use tessera_engine::text::{GlyphBatch, TextFont};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::widgets::{build_ui, Node};
use crate::{load_fonts, DemoConfig};

/// Pixels scrolled per wheel line.
const LINE_SCROLL: f32 = 40.0;

pub fn run(config: DemoConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = DemoApp { config, state: None, fatal: None };

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    match app.fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct DemoApp {
    config: DemoConfig,
    state: Option<WindowState>,
    fatal: Option<anyhow::Error>,
}

struct WindowState {
    window: Arc<Window>,
    gpu: Gpu,
    renderer: Renderer<WgpuBackend, GlyphBatch>,
    font: Option<TextFont>,
    ui: Node,
    cursor: Vec2,
}

impl WindowState {
    fn new(event_loop: &ActiveEventLoop, config: &DemoConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("tessera")
            .with_inner_size(LogicalSize::new(config.size.0 as f64, config.size.1 as f64));
        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

        let physical = window.inner_size();
        let gpu = pollster::block_on(Gpu::new(
            window.clone(),
            (physical.width, physical.height),
            GpuInit::default(),
        ))?;

        let (fonts, font) = load_fonts();
        let target = logical_target(&window);
        let batch = BatchConfig::default();
        let backend = WgpuBackend::new(gpu.device(), gpu.surface_format(), &batch);
        let renderer = Renderer::new(backend, GlyphBatch::new(fonts), RendererConfig { batch, target })?;

        let ui = build_ui((target.width(), target.height()), config.samples);

        Ok(Self { window, gpu, renderer, font, ui, cursor: Vec2::zero() })
    }

    fn resize(&mut self, width: u32, height: u32, samples: u32) {
        self.gpu.resize((width, height));
        if width == 0 || height == 0 {
            return;
        }
        let target = logical_target(&self.window);
        self.renderer.resize(target);
        self.ui = build_ui((target.width(), target.height()), samples);
    }

    /// Returns `false` when rendering cannot continue.
    fn redraw(&mut self) -> bool {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(e) => {
                log::debug!("surface error: {e:?}");
                let action = self.gpu.handle_surface_error(e);
                log::debug!("surface error handled: {action:?}");
                return action != SurfaceErrorAction::Fatal;
            }
        };

        clear(&mut frame.encoder, &frame.view, Color::BLACK);

        if let Err(e) = self.draw_ui() {
            log::error!("ui draw failed: {e}");
        }

        let ctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.window.scale_factor() as f32,
            self.gpu.size(),
        );
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        self.renderer.backend_mut().render(&ctx, &mut target);

        self.gpu.submit(frame);
        true
    }

    fn draw_ui(&mut self) -> Result<()> {
        self.renderer.start_frame()?;
        let drawn = self.ui.draw(&mut self.renderer, self.font.as_ref());
        // always close the frame so the next one can start
        self.renderer.end_frame()?;
        drawn?;
        Ok(())
    }
}

fn logical_target(window: &Window) -> Rect {
    let size = window.inner_size().to_logical::<f32>(window.scale_factor());
    Rect::new(0.0, 0.0, size.width, size.height)
}

fn clear(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, color: Color) {
    let (r, g, b, a) = (color.r as f64, color.g as f64, color.b as f64, color.a as f64);
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("tessera clear pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

impl DemoApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match WindowState::new(event_loop, &self.config) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e.context("failed to initialize demo window")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.resize(size.width, size.height, self.config.samples);
                state.window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(state.window.scale_factor());
                state.cursor = Vec2::new(logical.x, logical.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_SCROLL,
                    MouseScrollDelta::PixelDelta(p) => -(p.y / state.window.scale_factor()) as f32,
                };
                if state.ui.scroll_at(state.cursor, dy) {
                    state.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                if !state.redraw() {
                    let err = anyhow::anyhow!("surface lost beyond recovery");
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}
