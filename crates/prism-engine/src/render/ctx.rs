use super::RenderError;

/// Renderer-facing context (device/queue + target format + physical extent).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub format: wgpu::TextureFormat,
    /// Physical pixels of the frame being rendered.
    pub extent: (u32, u32),
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        format: wgpu::TextureFormat,
        extent: (u32, u32),
    ) -> Self {
        Self {
            device,
            queue,
            format,
            extent,
        }
    }

    /// Runs `create` inside a validation error scope and reports anything wgpu
    /// rejected instead of handing it to the uncaptured-error handler.
    pub fn validated<T>(&self, label: &str, create: impl FnOnce(&wgpu::Device) -> T) -> Result<T, RenderError> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(self.device);
        match pollster::block_on(scope.pop()) {
            None => Ok(value),
            Some(err) => Err(RenderError::Validation {
                label: label.to_string(),
                message: err.to_string(),
            }),
        }
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
