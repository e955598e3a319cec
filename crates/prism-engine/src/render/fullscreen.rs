use crate::render::mesh::uniform_entry;
use crate::render::{RenderCtx, RenderError};
use crate::uniforms::UniformBlock;

const FULLSCREEN_PRELUDE: &str = include_str!("shaders/fullscreen.wgsl");

/// WGSL module for a fullscreen pass: the fullscreen prelude followed by the
/// fragment body.
///
/// The prelude provides `vs_main`, `FullscreenOut` (clip position + uv with a
/// top-left origin), `t_input` and `s_input`. The body declares its uniforms at
/// `@group(0) @binding(2)` with one `vec4<f32>` per uniform and provides
/// `fs_main`.
pub(crate) fn fullscreen_shader_source(body: &str) -> String {
    format!("{FULLSCREEN_PRELUDE}\n{body}")
}

/// Runs one fragment shader over a fullscreen triangle, sampling an input
/// texture and writing to an output view.
pub struct FullscreenPass {
    label: String,
    source: String,

    format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    ubo: Option<wgpu::Buffer>,
    ubo_size: u64,
    uploaded_revision: Option<u64>,
}

impl FullscreenPass {
    pub fn new(label: impl Into<String>, body: &str) -> Self {
        Self {
            label: label.into(),
            source: fullscreen_shader_source(body),
            format: None,
            pipeline: None,
            bind_group_layout: None,
            sampler: None,
            ubo: None,
            ubo_size: 0,
            uploaded_revision: None,
        }
    }

    /// Records the pass into `encoder`.
    pub fn run(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
        uniforms: &UniformBlock,
    ) -> Result<(), RenderError> {
        self.ensure_pipeline(ctx)?;
        self.ensure_uniforms(ctx, uniforms);

        let missing = |resource| RenderError::missing(&self.label, resource);
        let pipeline = self.pipeline.as_ref().ok_or_else(|| missing("pipeline"))?;
        let bgl = self.bind_group_layout.as_ref().ok_or_else(|| missing("bind group layout"))?;
        let sampler = self.sampler.as_ref().ok_or_else(|| missing("sampler"))?;
        let ubo = self.ubo.as_ref().ok_or_else(|| missing("uniform buffer"))?;

        // Input alternates between ping-pong buffers; rebuilt per run.
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&self.label),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: ubo.as_entire_binding(),
                },
            ],
        });

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
        Ok(())
    }

    /// Builds the pipeline for the current format. A rejected program is
    /// reported and not cached, so the next run retries.
    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        if self.format == Some(ctx.format) && self.pipeline.is_some() {
            return Ok(());
        }

        log::debug!("fullscreen: building pipeline `{}` for {:?}", self.label, ctx.format);

        let (bind_group_layout, pipeline) =
            ctx.validated(&self.label, |device| self.build_pipeline(device, ctx.format))?;

        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("prism fullscreen sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            }));
        }

        self.format = Some(ctx.format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        Ok(())
    }

    fn build_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> (wgpu::BindGroupLayout, wgpu::RenderPipeline) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.label),
            source: wgpu::ShaderSource::Wgsl(self.source.as_str().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&self.label),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&self.label),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&self.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        (bind_group_layout, pipeline)
    }

    fn ensure_uniforms(&mut self, ctx: &RenderCtx<'_>, uniforms: &UniformBlock) {
        let size = uniforms.byte_size();
        if self.ubo.is_none() || self.ubo_size != size {
            self.ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.ubo_size = size;
            self.uploaded_revision = None;
        }

        if self.uploaded_revision == Some(uniforms.revision()) {
            return;
        }
        let Some(ubo) = self.ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::cast_slice(&uniforms.to_slots()));
        self.uploaded_revision = Some(uniforms.revision());
    }
}
