/// Renderer-facing GPU context for one frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
    /// Render target size in physical pixels.
    pub target_size: (u32, u32),
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        scale_factor: f32,
        target_size: (u32, u32),
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            scale_factor,
            target_size,
        }
    }

    /// Target size in logical pixels.
    #[inline]
    pub fn logical_size(&self) -> (f32, f32) {
        let scale = self.scale_factor.max(f32::EPSILON);
        (self.target_size.0 as f32 / scale, self.target_size.1 as f32 / scale)
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
