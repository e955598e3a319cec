use glam::{Mat4, Vec2, Vec3};

use crate::scene::PerspectiveCamera;

/// Half-line `origin + t * direction`, `t >= 0`. `direction` is unit length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn from_camera(camera: &PerspectiveCamera, ndc: Vec2) -> Self {
        let origin = camera.position;
        let through = camera.unproject(ndc.extend(0.5));
        Self::new(origin, through - origin)
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Re-expresses the ray in the space `m` maps into. The direction is left
    /// unnormalized so `t` stays comparable across spaces.
    pub(crate) fn transformed(&self, m: &Mat4) -> Self {
        let origin = m.transform_point3(self.origin);
        let direction = m.transform_vector3(self.direction);
        Self { origin, direction }
    }

    /// True when the ray passes within `radius` of `center`.
    pub fn hits_sphere(&self, center: Vec3, radius: f32) -> bool {
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        let closest = if along < 0.0 { self.origin } else { self.at(along) };
        closest.distance_squared(center) <= radius * radius
    }

    /// Möller–Trumbore intersection returning the ray parameter `t`.
    ///
    /// With `cull_back`, triangles whose counter-clockwise face points away from
    /// the ray origin are ignored.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3, cull_back: bool) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2);

        let mut d_dot_n = self.direction.dot(normal);
        let sign = if d_dot_n > 0.0 {
            if cull_back {
                return None;
            }
            1.0
        } else if d_dot_n < 0.0 {
            d_dot_n = -d_dot_n;
            -1.0
        } else {
            return None;
        };

        let diff = self.origin - a;
        let d_dot_q_x_e2 = sign * self.direction.dot(diff.cross(edge2));
        if d_dot_q_x_e2 < 0.0 {
            return None;
        }

        let d_dot_e1_x_q = sign * self.direction.dot(edge1.cross(diff));
        if d_dot_e1_x_q < 0.0 || d_dot_q_x_e2 + d_dot_e1_x_q > d_dot_n {
            return None;
        }

        let q_dot_n = -sign * diff.dot(normal);
        if q_dot_n < 0.0 {
            return None;
        }

        Some(q_dot_n / d_dot_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> (Vec3, Vec3, Vec3) {
        (Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn front_face_hit_reports_distance() {
        let (a, b, c) = tri();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        assert_eq!(ray.intersect_triangle(a, b, c, true), Some(2.0));
    }

    #[test]
    fn back_face_is_culled_only_when_asked() {
        let (a, b, c) = tri();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert_eq!(ray.intersect_triangle(a, b, c, true), None);
        assert_eq!(ray.intersect_triangle(a, b, c, false), Some(2.0));
    }

    #[test]
    fn miss_outside_edges_and_behind_origin() {
        let (a, b, c) = tri();
        let outside = Ray::new(Vec3::new(2.0, 0.0, 2.0), Vec3::NEG_Z);
        assert_eq!(outside.intersect_triangle(a, b, c, false), None);

        let behind = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::Z);
        assert_eq!(behind.intersect_triangle(a, b, c, false), None);
    }

    #[test]
    fn sphere_test_ignores_spheres_behind() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(ray.hits_sphere(Vec3::new(5.0, 0.5, 0.0), 1.0));
        assert!(!ray.hits_sphere(Vec3::new(-5.0, 0.0, 0.0), 1.0));
        assert!(ray.hits_sphere(Vec3::new(-0.5, 0.0, 0.0), 1.0));
    }
}
