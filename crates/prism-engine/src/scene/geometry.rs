use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved mesh vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list in object space.
///
/// Front faces wind counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounding_radius: f32,
}

impl Geometry {
    /// Builds a geometry from raw buffers.
    ///
    /// Trailing indices that do not form a whole triangle are dropped, as are
    /// triangles referencing out-of-range vertices.
    pub fn new(vertices: Vec<Vertex>, mut indices: Vec<u32>) -> Self {
        indices.truncate(indices.len() - indices.len() % 3);

        let n = vertices.len() as u32;
        if indices.iter().any(|&i| i >= n) {
            log::warn!("geometry: dropping triangles with out-of-range indices");
            indices = indices
                .chunks_exact(3)
                .filter(|tri| tri.iter().all(|&i| i < n))
                .flatten()
                .copied()
                .collect();
        }

        let bounding_radius = vertices
            .iter()
            .map(|v| Vec3::from(v.position).length())
            .fold(0.0f32, f32::max);

        Self { vertices, indices, bounding_radius }
    }

    /// Rectangle in the XY plane facing +Z, centered on the origin.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let gx = width_segments.max(1);
        let gy = height_segments.max(1);
        let seg_w = width / gx as f32;
        let seg_h = height / gy as f32;

        let mut vertices = Vec::with_capacity(((gx + 1) * (gy + 1)) as usize);
        for iy in 0..=gy {
            let y = iy as f32 * seg_h - height * 0.5;
            for ix in 0..=gx {
                let x = ix as f32 * seg_w - width * 0.5;
                vertices.push(Vertex {
                    position: [x, -y, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
                });
            }
        }

        let row = gx + 1;
        let mut indices = Vec::with_capacity((gx * gy * 6) as usize);
        for iy in 0..gy {
            for ix in 0..gx {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = ix + 1 + row * (iy + 1);
                let d = ix + 1 + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self::new(vertices, indices)
    }

    /// Torus around the Z axis.
    ///
    /// `radius` is the distance from the center to the middle of the tube.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial = radial_segments.max(3);
        let tubular = tubular_segments.max(3);
        let tau = std::f32::consts::TAU;

        let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
        for j in 0..=radial {
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * tau;
                let v = j as f32 / radial as f32 * tau;

                let position = Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center).normalize_or_zero();

                vertices.push(Vertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [i as f32 / tubular as f32, j as f32 / radial as f32],
                });
            }
        }

        let row = tubular + 1;
        let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self::new(vertices, indices)
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Radius of the origin-centered sphere enclosing every vertex.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Iterates triangles as object-space corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from(self.vertices[tri[0] as usize].position),
                Vec3::from(self.vertices[tri[1] as usize].position),
                Vec3::from(self.vertices[tri[2] as usize].position),
            ]
        })
    }
}
