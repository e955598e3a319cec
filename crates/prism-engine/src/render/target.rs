pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen colour texture that can be rendered to and sampled from.
pub struct ColorTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: (u32, u32),
    format: wgpu::TextureFormat,
}

impl ColorTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        extent: (u32, u32),
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: texture_size(extent),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
            extent,
            format,
        }
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn matches(&self, extent: (u32, u32), format: wgpu::TextureFormat) -> bool {
        self.extent == extent && self.format == format
    }
}

/// Depth buffer for the scene pass.
pub struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: (u32, u32),
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, extent: (u32, u32)) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism depth"),
            size: texture_size(extent),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
            extent,
        }
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn matches(&self, extent: (u32, u32)) -> bool {
        self.extent == extent
    }
}

fn texture_size((w, h): (u32, u32)) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: w.max(1),
        height: h.max(1),
        depth_or_array_layers: 1,
    }
}
