use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::render::target::{DepthTarget, DEPTH_FORMAT};
use crate::render::{RenderCtx, RenderError, RenderTarget};
use crate::scene::{Material, ObjectHandle, Program, RenderableObject, Scene, Vertex};

const MESH_PRELUDE: &str = include_str!("shaders/mesh_prelude.wgsl");
const BASIC_PROGRAM: &str = include_str!("shaders/basic.wgsl");

/// WGSL module for `material`: the mesh prelude followed by the program body.
pub(crate) fn mesh_shader_source(material: &Material) -> String {
    let body = match &material.program {
        Program::Basic => BASIC_PROGRAM,
        Program::Custom { source, .. } => source.as_ref(),
    };
    format!("{MESH_PRELUDE}\n{body}")
}

/// Draws the visible objects of a scene with depth testing.
///
/// GPU resources are created lazily:
/// - one pipeline per `Material::pipeline_key` (and target format)
/// - vertex/index/uniform buffers per object handle, dropped once the handle
///   leaves the scene
#[derive(Default)]
pub struct MeshRenderer {
    format: Option<wgpu::TextureFormat>,

    transform_bgl: Option<wgpu::BindGroupLayout>,
    material_bgl: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,

    pipelines: HashMap<u64, wgpu::RenderPipeline>,
    meshes: HashMap<ObjectHandle, MeshGpu>,
    depth: Option<DepthTarget>,
}

struct MeshGpu {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
    vertex_count: usize,

    transform_ubo: wgpu::Buffer,
    transform_bg: wgpu::BindGroup,

    material_ubo: wgpu::Buffer,
    material_bg: wgpu::BindGroup,
    material_key: u64,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `target` to the scene background and draws every visible object.
    ///
    /// A material program wgpu rejects aborts the pass with
    /// [`RenderError::Validation`].
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &Scene,
    ) -> Result<(), RenderError> {
        self.ensure_layouts(ctx);
        self.ensure_depth(ctx);

        self.meshes.retain(|handle, _| scene.contains(*handle));

        let view_proj = scene.camera.view_projection();
        let mut draws: Vec<(ObjectHandle, u64)> = Vec::new();

        for (handle, object) in scene.iter() {
            if !object.visible || object.geometry.indices().is_empty() {
                continue;
            }

            let key = object.material.pipeline_key();
            self.ensure_pipeline(ctx, key, &object.material)?;
            self.ensure_mesh(ctx, handle, object);
            self.write_uniforms(ctx, handle, object, view_proj);
            draws.push((handle, key));
        }

        // Immutable borrows from here on.
        let depth = self
            .depth
            .as_ref()
            .ok_or_else(|| RenderError::missing("prism scene pass", "depth target"))?;
        let clear = scene.background.map(|c| c.to_wgpu()).unwrap_or(wgpu::Color::TRANSPARENT);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (handle, key) in draws {
            let Some(pipeline) = self.pipelines.get(&key) else { continue };
            let Some(mesh) = self.meshes.get(&handle) else { continue };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &mesh.transform_bg, &[]);
            rpass.set_bind_group(1, &mesh.material_bg, &[]);
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        Ok(())
    }

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.format != Some(ctx.format) {
            // Pipelines bake the colour format.
            self.pipelines.clear();
            self.format = Some(ctx.format);
        }
        if self.pipeline_layout.is_some() {
            return;
        }

        let transform_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism mesh transforms bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let material_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism mesh material bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism mesh pipeline layout"),
            bind_group_layouts: &[&transform_bgl, &material_bgl],
            immediate_size: 0,
        });

        self.transform_bgl = Some(transform_bgl);
        self.material_bgl = Some(material_bgl);
        self.pipeline_layout = Some(pipeline_layout);
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth.as_ref().is_some_and(|d| d.matches(ctx.extent)) {
            return;
        }
        self.depth = Some(DepthTarget::new(ctx.device, ctx.extent));
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, key: u64, material: &Material) -> Result<(), RenderError> {
        if self.pipelines.contains_key(&key) {
            return Ok(());
        }
        let label = material.label();
        let layout = self
            .pipeline_layout
            .as_ref()
            .ok_or_else(|| RenderError::missing(label, "pipeline layout"))?;

        log::debug!("mesh: building pipeline `{label}` ({key:016x})");

        let pipeline = ctx.validated(label, |device| build_pipeline(device, layout, ctx.format, material))?;
        self.pipelines.insert(key, pipeline);
        Ok(())
    }

    fn ensure_mesh(&mut self, ctx: &RenderCtx<'_>, handle: ObjectHandle, object: &RenderableObject) {
        let geometry = &object.geometry;
        let key = object.material.pipeline_key();

        if let Some(mesh) = self.meshes.get(&handle) {
            let same_geometry = mesh.vertex_count == geometry.vertices().len()
                && mesh.index_count as usize == geometry.indices().len();
            if same_geometry && mesh.material_key == key {
                return;
            }
        }

        let (Some(transform_bgl), Some(material_bgl)) =
            (self.transform_bgl.as_ref(), self.material_bgl.as_ref())
        else {
            return;
        };

        let label = object.name.as_str();

        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let transform_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism mesh transforms ubo"),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let transform_bg = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism mesh transforms bind group"),
            layout: transform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_ubo.as_entire_binding(),
            }],
        });

        let material_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism mesh material ubo"),
            size: object.material.uniforms.byte_size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let material_bg = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism mesh material bind group"),
            layout: material_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_ubo.as_entire_binding(),
            }],
        });

        self.meshes.insert(
            handle,
            MeshGpu {
                vbo,
                ibo,
                index_count: geometry.indices().len() as u32,
                vertex_count: geometry.vertices().len(),
                transform_ubo,
                transform_bg,
                material_ubo,
                material_bg,
                material_key: key,
            },
        );
    }

    fn write_uniforms(&self, ctx: &RenderCtx<'_>, handle: ObjectHandle, object: &RenderableObject, view_proj: Mat4) {
        let Some(mesh) = self.meshes.get(&handle) else { return };

        let t = TransformUniform {
            view_proj: view_proj.to_cols_array_2d(),
            model: object.transform.matrix().to_cols_array_2d(),
        };
        ctx.queue.write_buffer(&mesh.transform_ubo, 0, bytemuck::bytes_of(&t));
        ctx.queue.write_buffer(
            &mesh.material_ubo,
            0,
            bytemuck::cast_slice(&object.material.uniforms.to_slots()),
        );
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    material: &Material,
) -> wgpu::RenderPipeline {
    let label = material.label();
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(mesh_shader_source(material).into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: material.side.cull_mode(),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
