use bytemuck::{Pod, Zeroable};

use crate::coords::Rect;
use crate::text::ATLAS_SIZE;

use super::backend::GpuBackend;
use super::batch::BatchConfig;
use super::ctx::{RenderCtx, RenderTarget};
use super::vertex::{PrimitiveClass, Vertex};

/// Dynamic uniform offsets must be 256-byte aligned.
const UNIFORM_STRIDE: u64 = 256;

const MIN_DRAW_CAPACITY: usize = 64;

// ── GPU types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    origin: [f32; 2], // logical px, absolute
    target: [f32; 2], // logical px
}

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

// ── staging ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone)]
struct StagedDraw {
    class: PrimitiveClass,
    first_vertex: u32,
    vertex_count: u32,
    viewport: Rect,
    scissor: Rect,
}

struct AtlasUpload {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

// ── backend ───────────────────────────────────────────────────────────────

/// [`GpuBackend`] on `wgpu`.
///
/// Batch flushes are staged on the CPU as they happen and replayed by
/// [`render`](Self::render) in one render pass: every staged draw keeps the
/// viewport and scissor that were active when it was issued, and gets its own
/// slot in a dynamic-offset uniform buffer.
///
/// The viewport translates geometry and also bounds the scissor.
pub struct WgpuBackend {
    // indexed by `PrimitiveClass::index`
    pipelines: [wgpu::RenderPipeline; 3],
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,

    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    uniform_buffer: wgpu::Buffer,
    draw_capacity: usize,

    atlas_texture: wgpu::Texture,
    atlas_view: wgpu::TextureView,
    sampler: wgpu::Sampler,

    viewport: Rect,
    scissor: Rect,
    vertices: Vec<Vertex>,
    draws: Vec<StagedDraw>,
    uploads: Vec<AtlasUpload>,
    uniform_scratch: Vec<u8>,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, config: &BatchConfig) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera primitive shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/primitive.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera primitive bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera primitive pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipelines = [
            PrimitiveClass::Lines,
            PrimitiveClass::Triangles,
            PrimitiveClass::TexturedTriangles,
        ]
        .map(|class| create_pipeline(device, &pipeline_layout, &shader, surface_format, class));

        let vertex_capacity = PrimitiveClass::FLUSH_ORDER
            .iter()
            .map(|c| config.vertex_capacity(*c))
            .sum::<usize>()
            .next_power_of_two();
        let vertex_buffer = create_vertex_buffer(device, vertex_capacity);
        let uniform_buffer = create_uniform_buffer(device, MIN_DRAW_CAPACITY);

        let atlas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera glyph atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessera atlas sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::debug!(
            "wgpu backend: {surface_format:?}, {vertex_capacity} vertices, {MIN_DRAW_CAPACITY} draws preallocated"
        );

        let unbounded = Rect::new(0.0, 0.0, f32::MAX, f32::MAX);
        Self {
            pipelines,
            bind_group_layout,
            bind_group: None,
            vertex_buffer,
            vertex_capacity,
            uniform_buffer,
            draw_capacity: MIN_DRAW_CAPACITY,
            atlas_texture,
            atlas_view,
            sampler,
            viewport: unbounded,
            scissor: unbounded,
            vertices: Vec::new(),
            draws: Vec::new(),
            uploads: Vec::new(),
            uniform_scratch: Vec::new(),
        }
    }

    /// Uploads staged atlas regions and replays every staged draw into one
    /// render pass over `target` (loading, not clearing, its contents).
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.upload_atlas(ctx);

        if self.draws.is_empty() {
            self.vertices.clear();
            return;
        }

        self.ensure_vertex_capacity(ctx.device, self.vertices.len());
        self.ensure_draw_capacity(ctx.device, self.draws.len());
        self.ensure_bind_group(ctx.device);

        ctx.queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
        self.write_uniforms(ctx);

        let Some(bind_group) = self.bind_group.as_ref() else {
            return;
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera primitive pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        let mut skipped = 0usize;
        for (i, draw) in self.draws.iter().enumerate() {
            let clip = draw.scissor.intersect(draw.viewport);
            let Some((x, y, w, h)) = logical_clip_to_scissor(clip, ctx.scale_factor, ctx.target_size) else {
                skipped += 1;
                continue;
            };

            rpass.set_pipeline(&self.pipelines[draw.class.index()]);
            rpass.set_bind_group(0, bind_group, &[(i as u64 * UNIFORM_STRIDE) as u32]);
            rpass.set_scissor_rect(x, y, w, h);
            rpass.draw(draw.first_vertex..draw.first_vertex + draw.vertex_count, 0..1);
        }
        drop(rpass);

        log::trace!(
            "replayed {} draws ({} vertices, {} fully clipped)",
            self.draws.len(),
            self.vertices.len(),
            skipped
        );

        self.vertices.clear();
        self.draws.clear();
    }

    // ── uploads ───────────────────────────────────────────────────────────

    fn upload_atlas(&mut self, ctx: &RenderCtx<'_>) {
        for up in self.uploads.drain(..) {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &self.atlas_texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d { x: up.x, y: up.y, z: 0 },
                    aspect: wgpu::TextureAspect::All,
                },
                &up.coverage,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(up.width),
                    rows_per_image: Some(up.height),
                },
                wgpu::Extent3d { width: up.width, height: up.height, depth_or_array_layers: 1 },
            );
        }
    }

    fn write_uniforms(&mut self, ctx: &RenderCtx<'_>) {
        let (target_w, target_h) = ctx.logical_size();
        let stride = UNIFORM_STRIDE as usize;

        self.uniform_scratch.clear();
        self.uniform_scratch.resize(self.draws.len() * stride, 0);
        for (i, draw) in self.draws.iter().enumerate() {
            let uniform = ViewportUniform {
                origin: [draw.viewport.left(), draw.viewport.top()],
                target: [target_w.max(1.0), target_h.max(1.0)],
            };
            let bytes = bytemuck::bytes_of(&uniform);
            self.uniform_scratch[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        ctx.queue.write_buffer(&self.uniform_buffer, 0, &self.uniform_scratch);
    }

    // ── growth ────────────────────────────────────────────────────────────

    fn ensure_vertex_capacity(&mut self, device: &wgpu::Device, required: usize) {
        if required <= self.vertex_capacity {
            return;
        }
        let new_cap = required.next_power_of_two();
        log::debug!("growing vertex buffer {} -> {new_cap}", self.vertex_capacity);
        self.vertex_buffer = create_vertex_buffer(device, new_cap);
        self.vertex_capacity = new_cap;
    }

    fn ensure_draw_capacity(&mut self, device: &wgpu::Device, required: usize) {
        if required <= self.draw_capacity {
            return;
        }
        let new_cap = required.next_power_of_two().max(MIN_DRAW_CAPACITY);
        log::debug!("growing uniform buffer {} -> {new_cap} draws", self.draw_capacity);
        self.uniform_buffer = create_uniform_buffer(device, new_cap);
        self.draw_capacity = new_cap;
        self.bind_group = None;
    }

    fn ensure_bind_group(&mut self, device: &wgpu::Device) {
        if self.bind_group.is_some() {
            return;
        }
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera primitive bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.uniform_buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
    }
}

impl GpuBackend for WgpuBackend {
    fn draw(&mut self, class: PrimitiveClass, vertices: &[Vertex]) {
        if vertices.is_empty() {
            return;
        }
        let first_vertex = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.draws.push(StagedDraw {
            class,
            first_vertex,
            vertex_count: vertices.len() as u32,
            viewport: self.viewport,
            scissor: self.scissor,
        });
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
    }

    fn set_scissor(&mut self, rect: Rect) {
        self.scissor = rect;
    }

    fn write_atlas(&mut self, x: u32, y: u32, width: u32, height: u32, coverage: &[u8]) {
        if x + width > ATLAS_SIZE || y + height > ATLAS_SIZE || coverage.len() != (width * height) as usize {
            log::warn!("atlas upload {width}x{height} at ({x}, {y}) out of bounds; dropped");
            return;
        }
        self.uploads.push(AtlasUpload { x, y, width, height, coverage: coverage.to_vec() });
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    class: PrimitiveClass,
) -> wgpu::RenderPipeline {
    let (topology, vs, fs) = match class {
        PrimitiveClass::Lines => (wgpu::PrimitiveTopology::LineList, "vs_line", "fs_solid"),
        PrimitiveClass::Triangles => (wgpu::PrimitiveTopology::TriangleList, "vs_main", "fs_solid"),
        PrimitiveClass::TexturedTriangles => (wgpu::PrimitiveTopology::TriangleList, "vs_main", "fs_textured"),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(class.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            // Triangles are emitted clockwise on screen (y-down), which is CCW in NDC.
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn create_vertex_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("tessera vertex buffer"),
        size: (vertices * std::mem::size_of::<Vertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_buffer(device: &wgpu::Device, draws: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("tessera viewport uniforms"),
        size: draws as u64 * UNIFORM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Converts a logical clip rect to physical scissor arguments clamped to the
/// target. `None` (no overlap, or zero area) means the draw is skipped.
fn logical_clip_to_scissor(clip: Option<Rect>, scale: f32, target: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let r = clip?;
    let (tw, th) = target;

    let x = ((r.left() * scale).max(0.0) as u32).min(tw);
    let y = ((r.top() * scale).max(0.0) as u32).min(th);
    let x2 = ((r.right() * scale).max(0.0) as u32).min(tw);
    let y2 = ((r.bottom() * scale).max(0.0) as u32).min(th);
    let (w, h) = (x2.saturating_sub(x), y2.saturating_sub(y));

    if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scissor_scales_and_clamps() {
        let clip = Some(Rect::new(10.0, 20.0, 100.0, 1000.0));
        assert_eq!(logical_clip_to_scissor(clip, 2.0, (400, 300)), Some((20, 40, 200, 260)));
    }

    #[test]
    fn scissor_outside_target_is_skipped() {
        assert_eq!(logical_clip_to_scissor(Some(Rect::new(500.0, 0.0, 10.0, 10.0)), 1.0, (400, 300)), None);
        assert_eq!(logical_clip_to_scissor(Some(Rect::new(-20.0, 0.0, 10.0, 10.0)), 1.0, (400, 300)), None);
        assert_eq!(logical_clip_to_scissor(None, 1.0, (400, 300)), None);
    }

    #[test]
    fn unbounded_state_covers_target() {
        let unbounded = Rect::new(0.0, 0.0, f32::MAX, f32::MAX);
        let clip = unbounded.intersect(unbounded);
        assert_eq!(logical_clip_to_scissor(clip, 1.5, (300, 200)), Some((0, 0, 300, 200)));
    }

    #[test]
    fn uniform_fits_its_slot() {
        assert!(std::mem::size_of::<ViewportUniform>() as u64 <= UNIFORM_STRIDE);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }
}
