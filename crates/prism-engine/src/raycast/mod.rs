//! Ray casting against scene meshes.
//!
//! Each object is tested in its own local space: a bounding-sphere reject
//! first, then every triangle, honouring the material's `Side`.

mod ray;

pub use ray::Ray;

use glam::{Vec2, Vec3};

use crate::scene::{ObjectHandle, PerspectiveCamera, RenderableObject, Scene, Side};

/// Nearest hit of the ray on one object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Intersection {
    pub handle: ObjectHandle,
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

#[derive(Debug, Clone)]
pub struct Raycaster {
    ray: Ray,
    skip_hidden: bool,
}

impl Raycaster {
    pub fn new(ray: Ray) -> Self {
        Self { ray, skip_hidden: false }
    }

    /// Raycaster whose ray starts at the camera and passes through `ndc`.
    pub fn from_camera(camera: &PerspectiveCamera, ndc: Vec2) -> Self {
        Self::new(Ray::from_camera(camera, ndc))
    }

    /// Hidden objects are hit-tested by default; this opts out.
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    #[inline]
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Nearest intersection with a single object.
    pub fn intersect_object(
        &self,
        handle: ObjectHandle,
        object: &RenderableObject,
    ) -> Option<Intersection> {
        if self.skip_hidden && !object.visible {
            return None;
        }

        let model = object.transform.matrix();
        let scale = object.transform.scale.abs().max_element();
        let center = model.transform_point3(Vec3::ZERO);
        if !self.ray.hits_sphere(center, object.geometry.bounding_radius() * scale) {
            return None;
        }

        let local = self.ray.transformed(&model.inverse());

        let nearest_t = object
            .geometry
            .triangles()
            .filter_map(|[a, b, c]| match object.material.side {
                Side::Front => local.intersect_triangle(a, b, c, true),
                Side::Back => local.intersect_triangle(c, b, a, true),
                Side::Double => local.intersect_triangle(a, b, c, false),
            })
            .fold(None, |best: Option<f32>, t| Some(best.map_or(t, |b| b.min(t))))?;

        let point = model.transform_point3(local.at(nearest_t));
        Some(Intersection {
            handle,
            distance: point.distance(self.ray.origin),
            point,
        })
    }

    /// All objects hit by the ray, nearest first, at most one entry per object.
    pub fn intersect_objects(&self, scene: &Scene) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = scene
            .iter()
            .filter_map(|(handle, object)| self.intersect_object(handle, object))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
